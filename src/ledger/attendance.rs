// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Daily attendance marking and statistics.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{find_active_student, local_today, LedgerError, LedgerResult};
use crate::models::WalletAddress;
use crate::storage::{AttendanceRecord, AttendanceStatus, RecordStore, StorageError};

/// Ledger-wide counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct AttendanceStats {
    /// Every registered student, active or not.
    pub total_students: usize,
    /// Records dated today with status `present`.
    pub present_today: usize,
    /// Every attendance record.
    pub total_records: usize,
}

/// Enforces at most one attendance record per student per calendar day.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn RecordStore>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Mark the student holding `wallet` present on `date`.
    ///
    /// The record snapshots the student's id, name and wallet as they are
    /// now.
    pub fn mark_attendance(
        &self,
        wallet: &WalletAddress,
        date: NaiveDate,
    ) -> LedgerResult<AttendanceRecord> {
        let Some(student) = find_active_student(self.store.as_ref(), wallet) else {
            tracing::debug!(wallet = %wallet, "Rejected attendance for unregistered wallet");
            return Err(LedgerError::NotRegistered(wallet.clone()));
        };

        if self.is_marked_on(wallet, date) {
            tracing::debug!(wallet = %wallet, date = %date, "Attendance already marked");
            return Err(LedgerError::AlreadyMarked {
                wallet: wallet.clone(),
                date,
            });
        }

        let now = Utc::now();
        let record = AttendanceRecord {
            student_id: student.id,
            student_name: student.name,
            student_address: student.wallet_address,
            date,
            timestamp: now.timestamp(),
            status: AttendanceStatus::Present,
            marked_at: now,
        };

        match self.store.insert_attendance(&record) {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                tracing::debug!(wallet = %wallet, date = %date, "Attendance already marked");
                return Err(LedgerError::AlreadyMarked {
                    wallet: wallet.clone(),
                    date,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            student_id = %record.student_id,
            wallet = %record.student_address,
            date = %record.date,
            "Attendance marked"
        );
        Ok(record)
    }

    /// Whether `wallet` has a record for `date`.
    pub fn is_marked_on(&self, wallet: &WalletAddress, date: NaiveDate) -> bool {
        self.store
            .load_attendance()
            .iter()
            .any(|r| r.date == date && r.student_address.matches(wallet))
    }

    /// Every record for `wallet`, in insertion order.
    pub fn student_history(&self, wallet: &WalletAddress) -> Vec<AttendanceRecord> {
        self.store
            .load_attendance()
            .into_iter()
            .filter(|r| r.student_address.matches(wallet))
            .collect()
    }

    /// Counters with "today" taken as the server's local date.
    pub fn compute_stats(&self) -> AttendanceStats {
        self.compute_stats_on(local_today())
    }

    /// Counters with "today" taken as `today`.
    pub fn compute_stats_on(&self, today: NaiveDate) -> AttendanceStats {
        let total_students = self.store.load_students().len();
        let attendance = self.store.load_attendance();
        let present_today = attendance
            .iter()
            .filter(|r| r.date == today && r.status == AttendanceStatus::Present)
            .count();

        AttendanceStats {
            total_students,
            present_today,
            total_records: attendance.len(),
        }
    }
}
