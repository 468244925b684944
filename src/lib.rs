// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attendance Ledger - Wallet-identified student attendance service
//!
//! Students register once per wallet address and mark attendance at most
//! once per calendar day.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Caller identification by wallet header
//! - `ledger` - Registration and attendance rules
//! - `storage` - Record stores (redb, JSON documents, memory)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod state;
pub mod storage;
