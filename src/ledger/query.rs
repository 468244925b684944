// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only projections consumed by the HTTP layer.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    AttendanceService, AttendanceStats, LedgerError, LedgerResult, RegistrationService,
};
use crate::models::WalletAddress;
use crate::storage::{AttendanceRecord, AttendanceStatus, RecordStore, Student};

/// Per-student attendance overview.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StudentSummary {
    /// Days with any record.
    pub total_days: usize,
    /// Days marked present.
    pub present_days: usize,
    /// Rounded percentage of present days, 0 with no records.
    #[schema(example = 75)]
    pub attendance_percentage: u32,
    /// Whether the student has a record for the current day.
    pub marked_today: bool,
}

#[derive(Clone)]
pub struct QueryFacade {
    registration: RegistrationService,
    attendance: AttendanceService,
    store: Arc<dyn RecordStore>,
}

impl QueryFacade {
    pub fn new(
        registration: RegistrationService,
        attendance: AttendanceService,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            registration,
            attendance,
            store,
        }
    }

    pub fn student(&self, wallet: &WalletAddress) -> Option<Student> {
        self.registration.find_by_wallet(wallet)
    }

    pub fn is_registered(&self, wallet: &WalletAddress) -> bool {
        self.registration.is_registered(wallet)
    }

    pub fn marked_on(&self, wallet: &WalletAddress, date: NaiveDate) -> bool {
        self.attendance.is_marked_on(wallet, date)
    }

    pub fn history(&self, wallet: &WalletAddress) -> Vec<AttendanceRecord> {
        self.attendance.student_history(wallet)
    }

    pub fn stats(&self) -> AttendanceStats {
        self.attendance.compute_stats()
    }

    /// Every student, active or not, in registration order.
    pub fn list_students(&self) -> Vec<Student> {
        self.store.load_students()
    }

    /// Every attendance record, in insertion order.
    pub fn list_attendance(&self) -> Vec<AttendanceRecord> {
        self.store.load_attendance()
    }

    /// Attendance overview for the active student holding `wallet`.
    pub fn student_summary(
        &self,
        wallet: &WalletAddress,
        today: NaiveDate,
    ) -> LedgerResult<StudentSummary> {
        if !self.registration.is_registered(wallet) {
            return Err(LedgerError::NotRegistered(wallet.clone()));
        }

        let history = self.attendance.student_history(wallet);
        let total_days = history.len();
        let present_days = history
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        let marked_today = history.iter().any(|r| r.date == today);

        Ok(StudentSummary {
            total_days,
            present_days,
            attendance_percentage: percentage(present_days, total_days),
            marked_today,
        })
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
