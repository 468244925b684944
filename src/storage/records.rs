// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record types.
//!
//! Both collections are append-only. An [`AttendanceRecord`] carries a
//! snapshot of the student it was marked for, so later changes to the
//! [`Student`] never rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::WalletAddress;

/// How a student came to be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    /// The student registered their own wallet.
    #[serde(rename = "self")]
    SelfService,
    /// An admin registered the wallet on the student's behalf.
    Admin,
}

impl Default for RegistrationType {
    fn default() -> Self {
        Self::SelfService
    }
}

/// Attendance status. Only `present` is produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
}

/// A registered student.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Student {
    /// Display identifier (caller-supplied or `STU<millis>`)
    pub id: String,
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Identity key, unique case-insensitively
    #[serde(alias = "student_address")]
    pub wallet_address: WalletAddress,
    /// Lookups only consider active students
    pub is_active: bool,
    /// Provenance tag
    pub registration_type: RegistrationType,
    /// When the student was registered
    pub created_at: DateTime<Utc>,
}

/// One student present on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Student id at marking time
    pub student_id: String,
    /// Student name at marking time
    pub student_name: String,
    /// Student wallet at marking time
    pub student_address: WalletAddress,
    /// Calendar day (`YYYY-MM-DD`)
    #[schema(example = "2024-01-01")]
    pub date: NaiveDate,
    /// Marking instant, seconds since the Unix epoch
    pub timestamp: i64,
    pub status: AttendanceStatus,
    /// When the record was written
    pub marked_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Key of the (wallet, day) uniqueness constraint.
    pub fn day_key(&self) -> String {
        day_key(&self.student_address, self.date)
    }
}

/// Build the `wallet|YYYY-MM-DD` key used to index attendance by day.
pub fn day_key(wallet: &WalletAddress, date: NaiveDate) -> String {
    format!("{}|{}", wallet.key(), date.format("%Y-%m-%d"))
}
