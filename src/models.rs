// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps the wallet a user connects with. It is
//! the identity key for students and admins, and it is always compared
//! case-insensitively (`0xAA` and `0xaa` are the same wallet).
//!
//! ## Model Categories
//!
//! - **Registration**: self and admin student registration
//! - **Attendance**: marking and checking daily attendance

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Wallet address wrapper.
///
/// The original casing is preserved for display; [`WalletAddress::key`]
/// gives the case-folded form used for every comparison and index.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::from("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12");
/// assert!(addr.matches(&WalletAddress::from("0x742D35CC6634C0532925A3B844BC9E7595F4AB12")));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Case-folded form used as the identity key.
    pub fn key(&self) -> String {
        self.0.trim().to_lowercase()
    }

    /// Case-insensitive comparison.
    pub fn matches(&self, other: &WalletAddress) -> bool {
        self.key() == other.key()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Registration Models
// =============================================================================

/// Request from a student registering their own connected wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterStudentRequest {
    /// Optional student identifier (e.g. a roll number). Generated when absent.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// Request from an admin registering a student's wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminRegisterStudentRequest {
    /// Optional student identifier. Generated when absent.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// The student's wallet address.
    #[serde(alias = "student_address")]
    pub wallet_address: WalletAddress,
}

/// Response for registration checks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RegisteredResponse {
    /// The wallet that was checked.
    pub wallet_address: WalletAddress,
    /// Whether an active student holds this wallet.
    pub registered: bool,
}

// =============================================================================
// Attendance Models
// =============================================================================

/// Request to mark the caller present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceRequest {
    /// Calendar day to mark (`YYYY-MM-DD`). Defaults to the server's today.
    #[serde(default)]
    #[schema(example = "2024-01-01")]
    pub date: Option<NaiveDate>,
}

/// Query parameters for the "already marked" check.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct MarkedQuery {
    /// Calendar day to check (`YYYY-MM-DD`). Defaults to the server's today.
    pub date: Option<NaiveDate>,
}

/// Response for the "already marked" check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MarkedResponse {
    /// The day that was checked.
    pub date: NaiveDate,
    /// Whether the caller has a record for that day.
    pub marked: bool,
}
