// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Callers identify themselves with their wallet address.
//!
//! ## Auth Flow
//!
//! 1. Frontend connects the user's wallet
//! 2. Frontend sends `X-Wallet-Address: <address>` on every `/v1` request
//! 3. Server:
//!    - Rejects a missing or blank header with `401`
//!    - Resolves `admin` if the address is in `ADMIN_ADDRESSES`, else `student`
//!    - Rejects students on admin routes with `403`
//!
//! Health and documentation endpoints need no header.

pub mod error;
pub mod extractor;
pub mod identity;
pub mod roles;

pub use error::AuthError;
pub use extractor::{AdminOnly, Wallet, WALLET_HEADER};
pub use identity::WalletIdentity;
pub use roles::Role;
