// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Attendance Ledger
//!
//! Business rules on top of a [`RecordStore`]:
//!
//! - [`RegistrationService`]: one student per wallet address
//! - [`AttendanceService`]: at most one record per student per calendar day
//! - [`QueryFacade`]: read-only projections for the HTTP layer
//!
//! [`Ledger`] bundles the three over one shared store handle. It is built
//! once at startup and cloned into request handlers.
//!
//! Services do a read-side check first so the common rejection is cheap and
//! clearly logged, but the store's conditional insert is what enforces
//! uniqueness.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::models::WalletAddress;
use crate::storage::{RecordStore, StorageError, Student};

pub mod attendance;
pub mod query;
pub mod registration;

pub use attendance::{AttendanceService, AttendanceStats};
pub use query::{QueryFacade, StudentSummary};
pub use registration::{NewStudent, RegistrationService};

/// Errors returned by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The wallet is already bound to a student.
    #[error("Student with wallet address {0} already exists")]
    DuplicateRegistration(WalletAddress),

    /// No active student holds the wallet.
    #[error("Student with wallet address {0} is not registered")]
    NotRegistered(WalletAddress),

    /// The student already has a record for the day.
    #[error("Attendance already marked for {wallet} on {date}")]
    AlreadyMarked { wallet: WalletAddress, date: NaiveDate },

    /// The store refused the write; nothing was committed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Today's calendar date in the server's local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// First active student holding `wallet`, compared case-insensitively.
pub(crate) fn find_active_student(store: &dyn RecordStore, wallet: &WalletAddress) -> Option<Student> {
    store
        .load_students()
        .into_iter()
        .find(|s| s.is_active && s.wallet_address.matches(wallet))
}

/// The ledger services over one shared store.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn RecordStore>,
    registration: RegistrationService,
    attendance: AttendanceService,
    queries: QueryFacade,
}

impl Ledger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let registration = RegistrationService::new(Arc::clone(&store));
        let attendance = AttendanceService::new(Arc::clone(&store));
        let queries = QueryFacade::new(registration.clone(), attendance.clone(), Arc::clone(&store));
        Self {
            store,
            registration,
            attendance,
            queries,
        }
    }

    pub fn registration(&self) -> &RegistrationService {
        &self.registration
    }

    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    pub fn queries(&self) -> &QueryFacade {
        &self.queries
    }

    /// The underlying store, for health probes.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Remove every student and attendance record.
    pub fn reset(&self) -> LedgerResult<()> {
        self.store.clear()?;
        tracing::warn!(backend = self.store.backend(), "Ledger reset, all records removed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use refusing::RefusingStore;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(MemoryStore::new()))
    }

    fn candidate(wallet: &str, name: &str) -> NewStudent {
        NewStudent {
            id: None,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            wallet_address: WalletAddress::from(wallet),
            registration_type: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn end_to_end_scenario() {
        let ledger = ledger();
        let ann = WalletAddress::from("0xAA");

        let student = ledger
            .registration()
            .register_student(candidate("0xAA", "Ann"))
            .unwrap();
        assert!(student.is_active);

        let dup = ledger.registration().register_student(candidate("0xaa", "Dup"));
        assert!(matches!(dup, Err(LedgerError::DuplicateRegistration(_))));

        let first = ledger.attendance().mark_attendance(&ann, day(1)).unwrap();
        assert_eq!(first.status, crate::storage::AttendanceStatus::Present);

        let again = ledger.attendance().mark_attendance(&ann, day(1));
        assert!(matches!(again, Err(LedgerError::AlreadyMarked { .. })));

        ledger.attendance().mark_attendance(&ann, day(2)).unwrap();
        assert_eq!(ledger.attendance().student_history(&ann).len(), 2);
    }

    #[test]
    fn reset_clears_both_collections() {
        let ledger = ledger();
        let ann = WalletAddress::from("0xAA");
        ledger
            .registration()
            .register_student(candidate("0xAA", "Ann"))
            .unwrap();
        ledger.attendance().mark_attendance(&ann, day(1)).unwrap();

        ledger.reset().unwrap();

        assert!(!ledger.registration().is_registered(&ann));
        assert!(ledger.queries().list_attendance().is_empty());
        // The wallet can register again after a reset.
        ledger
            .registration()
            .register_student(candidate("0xaa", "Ann"))
            .unwrap();
    }

    #[test]
    fn error_messages_name_the_wallet() {
        let err = LedgerError::NotRegistered(WalletAddress::from("0xAA"));
        assert_eq!(err.to_string(), "Student with wallet address 0xAA is not registered");

        let err = LedgerError::AlreadyMarked {
            wallet: WalletAddress::from("0xAA"),
            date: day(1),
        };
        assert_eq!(err.to_string(), "Attendance already marked for 0xAA on 2024-01-01");
    }
}
