// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Student registration.

use std::sync::Arc;

use chrono::Utc;

use super::{find_active_student, LedgerError, LedgerResult};
use crate::models::WalletAddress;
use crate::storage::{RecordStore, RegistrationType, StorageError, Student};

/// A registration candidate before system fields are assigned.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// Caller-chosen id; blank or absent means generate one.
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub wallet_address: WalletAddress,
    /// Defaults to [`RegistrationType::SelfService`].
    pub registration_type: Option<RegistrationType>,
}

/// Enforces one student per wallet address.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RecordStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Register a student.
    ///
    /// Fails with [`LedgerError::DuplicateRegistration`] if any student,
    /// active or not, already holds the wallet. Nothing is written in that
    /// case.
    pub fn register_student(&self, candidate: NewStudent) -> LedgerResult<Student> {
        let wallet = candidate.wallet_address;

        if self
            .store
            .load_students()
            .iter()
            .any(|s| s.wallet_address.matches(&wallet))
        {
            tracing::debug!(wallet = %wallet, "Rejected duplicate registration");
            return Err(LedgerError::DuplicateRegistration(wallet));
        }

        let now = Utc::now();
        let id = candidate
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("STU{}", now.timestamp_millis()));

        let student = Student {
            id,
            name: candidate.name,
            email: candidate.email,
            wallet_address: wallet,
            is_active: true,
            registration_type: candidate.registration_type.unwrap_or_default(),
            created_at: now,
        };

        match self.store.insert_student(&student) {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                // Lost a race with a concurrent registration.
                tracing::debug!(wallet = %student.wallet_address, "Rejected duplicate registration");
                return Err(LedgerError::DuplicateRegistration(student.wallet_address));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            student_id = %student.id,
            wallet = %student.wallet_address,
            registration_type = ?student.registration_type,
            "Student registered"
        );
        Ok(student)
    }

    /// Whether an active student holds `wallet`.
    pub fn is_registered(&self, wallet: &WalletAddress) -> bool {
        self.find_by_wallet(wallet).is_some()
    }

    /// The active student holding `wallet`, if any.
    pub fn find_by_wallet(&self, wallet: &WalletAddress) -> Option<Student> {
        find_active_student(self.store.as_ref(), wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RefusingStore;
    use crate::storage::MemoryStore;

    fn service() -> (RegistrationService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (RegistrationService::new(store.clone()), store)
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

    #[test]
    fn register_assigns_system_fields() {
        let (service, _) = service();
        let student = service.register_student(candidate("0xAA", "Ann")).unwrap();

        assert!(student.id.starts_with("STU"));
        assert!(student.is_active);
        assert_eq!(student.registration_type, RegistrationType::SelfService);
        assert_eq!(student.name, "Ann");
        assert_eq!(student.email, "ann@example.com");
        assert_eq!(student.wallet_address, WalletAddress::from("0xAA"));
    }

    #[test]
    fn register_keeps_caller_id_and_type() {
        let (service, _) = service();
        let mut c = candidate("0xAA", "Ann");
        c.id = Some(" R-042 ".to_string());
        c.registration_type = Some(RegistrationType::Admin);

        let student = service.register_student(c).unwrap();
        assert_eq!(student.id, "R-042");
        assert_eq!(student.registration_type, RegistrationType::Admin);
    }

    #[test]
    fn blank_id_falls_back_to_generated() {
        let (service, _) = service();
        let mut c = candidate("0xAA", "Ann");
        c.id = Some("   ".to_string());

        let student = service.register_student(c).unwrap();
        assert!(student.id.starts_with("STU"));
        assert!(student.id[3..].parse::<i64>().is_ok());
    }

    #[test]
    fn duplicate_wallet_leaves_store_unchanged() {
        let (service, store) = service();
        service.register_student(candidate("0xAA", "Ann")).unwrap();
        let before = store.load_students();

        for wallet in ["0xAA", "0xaa", " 0xAa "] {
            let result = service.register_student(candidate(wallet, "Dup"));
            assert!(matches!(result, Err(LedgerError::DuplicateRegistration(_))));
        }

        assert_eq!(store.load_students(), before);
    }

    #[test]
    fn inactive_students_still_hold_their_wallet() {
        let (service, store) = service();
        let mut student = service.register_student(candidate("0xAA", "Ann")).unwrap();
        student.is_active = false;
        store.save_students(&[student]).unwrap();

        assert!(!service.is_registered(&WalletAddress::from("0xAA")));
        assert!(service.find_by_wallet(&WalletAddress::from("0xAA")).is_none());
        assert!(matches!(
            service.register_student(candidate("0xaa", "Again")),
            Err(LedgerError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn lost_insert_race_reports_duplicate() {
        let store = Arc::new(RefusingStore::conflicting());
        let service = RegistrationService::new(store.clone());

        let result = service.register_student(candidate("0xAA", "Ann"));
        assert!(matches!(result, Err(LedgerError::DuplicateRegistration(w)) if w.as_str() == "0xAA"));
        assert!(store.load_students().is_empty());
    }

    #[test]
    fn failed_insert_reports_persistence_and_writes_nothing() {
        let store = Arc::new(RefusingStore::broken());
        let service = RegistrationService::new(store.clone());

        let result = service.register_student(candidate("0xAA", "Ann"));
        assert!(matches!(
            result,
            Err(LedgerError::Persistence(StorageError::LockPoisoned))
        ));
        assert!(store.load_students().is_empty());
        assert!(!service.is_registered(&WalletAddress::from("0xAA")));
    }

    #[test]
    fn read_after_write_matches_input() {
        let (service, _) = service();
        let stored = service.register_student(candidate("0xAbC", "Ann")).unwrap();

        let wallet = WalletAddress::from("0xabc");
        assert!(service.is_registered(&wallet));
        assert_eq!(service.find_by_wallet(&wallet), Some(stored));
        assert!(!service.is_registered(&WalletAddress::from("0xdef")));
    }
}
