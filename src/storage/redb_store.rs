// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded record database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `students`: insertion sequence → serialized Student
//! - `student_wallets`: lowercase wallet → students sequence (unique index)
//! - `attendance`: insertion sequence → serialized AttendanceRecord
//! - `attendance_days`: `lowercase_wallet|YYYY-MM-DD` → attendance sequence
//!   (unique index)
//!
//! redb admits one write transaction at a time, so a conditional insert that
//! checks the index and writes both tables in the same transaction has no
//! race window.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;

use super::{AttendanceRecord, RecordStore, StorageError, StorageResult, Student};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: sequence → serialized Student (JSON bytes).
const STUDENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("students");

/// Index: lowercase wallet → students sequence.
const STUDENT_WALLETS: TableDefinition<&str, u64> = TableDefinition::new("student_wallets");

/// Primary table: sequence → serialized AttendanceRecord (JSON bytes).
const ATTENDANCE: TableDefinition<u64, &[u8]> = TableDefinition::new("attendance");

/// Index: `wallet|date` → attendance sequence.
const ATTENDANCE_DAYS: TableDefinition<&str, u64> = TableDefinition::new("attendance_days");

/// Health check scratch table.
const HEALTH: TableDefinition<&str, u64> = TableDefinition::new("health");

// =============================================================================
// RedbStore
// =============================================================================

/// Record store on an embedded ACID database.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STUDENTS)?;
            let _ = write_txn.open_table(STUDENT_WALLETS)?;
            let _ = write_txn.open_table(ATTENDANCE)?;
            let _ = write_txn.open_table(ATTENDANCE_DAYS)?;
            let _ = write_txn.open_table(HEALTH)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Opened record database");
        Ok(Self { db })
    }

    /// Read every value of a sequence-keyed table in key order.
    fn load_all<T: DeserializeOwned>(
        &self,
        definition: TableDefinition<u64, &[u8]>,
    ) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition)?;

        let mut items = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }
}

impl RecordStore for RedbStore {
    fn backend(&self) -> &'static str {
        "redb"
    }

    fn try_load_students(&self) -> StorageResult<Vec<Student>> {
        self.load_all(STUDENTS)
    }

    fn save_students(&self, students: &[Student]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(STUDENTS)?;
        write_txn.delete_table(STUDENT_WALLETS)?;
        {
            let mut table = write_txn.open_table(STUDENTS)?;
            let mut index = write_txn.open_table(STUDENT_WALLETS)?;
            for (seq, student) in (0u64..).zip(students) {
                let key = student.wallet_address.key();
                // First row wins the index; later rows for the wallet stay unindexed.
                if index.get(key.as_str())?.is_none() {
                    index.insert(key.as_str(), seq)?;
                }
                let json = serde_json::to_vec(student)?;
                table.insert(seq, json.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn try_load_attendance(&self) -> StorageResult<Vec<AttendanceRecord>> {
        self.load_all(ATTENDANCE)
    }

    fn save_attendance(&self, records: &[AttendanceRecord]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(ATTENDANCE)?;
        write_txn.delete_table(ATTENDANCE_DAYS)?;
        {
            let mut table = write_txn.open_table(ATTENDANCE)?;
            let mut index = write_txn.open_table(ATTENDANCE_DAYS)?;
            for (seq, record) in (0u64..).zip(records) {
                let key = record.day_key();
                if index.get(key.as_str())?.is_none() {
                    index.insert(key.as_str(), seq)?;
                }
                let json = serde_json::to_vec(record)?;
                table.insert(seq, json.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn insert_student(&self, student: &Student) -> StorageResult<()> {
        let key = student.wallet_address.key();
        let json = serde_json::to_vec(student)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut index = write_txn.open_table(STUDENT_WALLETS)?;
            if index.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Student with wallet {}",
                    student.wallet_address
                )));
            }

            let mut table = write_txn.open_table(STUDENTS)?;
            let seq = match table.last()? {
                Some((last, _)) => last.value() + 1,
                None => 0,
            };
            table.insert(seq, json.as_slice())?;
            index.insert(key.as_str(), seq)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> StorageResult<()> {
        let key = record.day_key();
        let json = serde_json::to_vec(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut index = write_txn.open_table(ATTENDANCE_DAYS)?;
            if index.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Attendance for {} on {}",
                    record.student_address, record.date
                )));
            }

            let mut table = write_txn.open_table(ATTENDANCE)?;
            let seq = match table.last()? {
                Some((last, _)) => last.value() + 1,
                None => 0,
            };
            table.insert(seq, json.as_slice())?;
            index.insert(key.as_str(), seq)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(STUDENTS)?;
        write_txn.delete_table(STUDENT_WALLETS)?;
        write_txn.delete_table(ATTENDANCE)?;
        write_txn.delete_table(ATTENDANCE_DAYS)?;
        {
            let _ = write_txn.open_table(STUDENTS)?;
            let _ = write_txn.open_table(STUDENT_WALLETS)?;
            let _ = write_txn.open_table(ATTENDANCE)?;
            let _ = write_txn.open_table(ATTENDANCE_DAYS)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Commit a uniquely keyed value, read it back in a fresh transaction,
    /// then remove it.
    fn health_check(&self) -> StorageResult<()> {
        let key = format!("check-{}", uuid::Uuid::new_v4());
        let stamp = chrono::Utc::now().timestamp_millis() as u64;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(HEALTH)?;
            table.insert(key.as_str(), stamp)?;
        }
        write_txn.commit()?;

        let stored = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(HEALTH)?;
            let value = table.get(key.as_str())?.map(|v| v.value());
            value
        };

        let cleanup_txn = self.db.begin_write()?;
        {
            let mut table = cleanup_txn.open_table(HEALTH)?;
            table.remove(key.as_str())?;
        }
        cleanup_txn.commit()?;

        if stored != Some(stamp) {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WalletAddress;
    use crate::storage::{AttendanceStatus, RegistrationType};
    use chrono::{NaiveDate, Utc};
    use redb::ReadableTableMetadata;
    use std::sync::Arc;
    use std::thread;

    fn temp_db() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = RedbStore::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn student(wallet: &str, name: &str) -> Student {
        Student {
            id: format!("STU-{name}"),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            wallet_address: WalletAddress::from(wallet),
            is_active: true,
            registration_type: RegistrationType::SelfService,
            created_at: Utc::now(),
        }
    }

    fn record(wallet: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            student_id: "STU-ann".to_string(),
            student_name: "ann".to_string(),
            student_address: WalletAddress::from(wallet),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            timestamp: 1_704_067_200,
            status: AttendanceStatus::Present,
            marked_at: Utc::now(),
        }
    }

    #[test]
    fn empty_database_loads_nothing() {
        let (db, _dir) = temp_db();
        assert!(db.try_load_students().unwrap().is_empty());
        assert!(db.try_load_attendance().unwrap().is_empty());
    }

    #[test]
    fn insert_student_keeps_insertion_order() {
        let (db, _dir) = temp_db();
        for (wallet, name) in [("0xCC", "cat"), ("0xAA", "ann"), ("0xBB", "bob")] {
            db.insert_student(&student(wallet, name)).unwrap();
        }

        let names: Vec<_> = db.load_students().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["cat", "ann", "bob"]);
    }

    #[test]
    fn insert_student_rejects_case_variant_wallet() {
        let (db, _dir) = temp_db();
        db.insert_student(&student("0xAA", "ann")).unwrap();

        let result = db.insert_student(&student("0xaa", "dup"));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        assert_eq!(db.load_students().len(), 1);
        assert_eq!(db.load_students()[0].name, "ann");
    }

    #[test]
    fn insert_attendance_is_unique_per_day() {
        let (db, _dir) = temp_db();
        db.insert_attendance(&record("0xAA", 1)).unwrap();

        let result = db.insert_attendance(&record("0xaa", 1));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        db.insert_attendance(&record("0xAA", 2)).unwrap();
        assert_eq!(db.load_attendance().len(), 2);
    }

    #[test]
    fn save_replaces_collection_and_index() {
        let (db, _dir) = temp_db();
        db.insert_student(&student("0xAA", "ann")).unwrap();

        db.save_students(&[student("0xBB", "bob")]).unwrap();
        assert_eq!(db.load_students().len(), 1);

        // The old wallet is free again; the new one is taken.
        db.insert_student(&student("0xAA", "ann")).unwrap();
        assert!(db.insert_student(&student("0xbb", "dup")).is_err());
    }

    #[test]
    fn save_keeps_repeated_wallets_and_index_still_rejects_them() {
        let (db, _dir) = temp_db();
        let mut retired = student("0xBB", "bob");
        retired.is_active = false;

        db.save_students(&[retired, student("0xbb", "bobby")]).unwrap();

        let students = db.load_students();
        assert_eq!(students.len(), 2);
        assert!(!students[0].is_active);
        assert_eq!(students[1].name, "bobby");
        assert!(matches!(
            db.insert_student(&student("0xBB", "dup")),
            Err(StorageError::AlreadyExists(_))
        ));
    }

    #[test]
    fn save_attendance_rebuilds_day_index() {
        let (db, _dir) = temp_db();
        db.save_attendance(&[record("0xAA", 1), record("0xAA", 2)]).unwrap();
        assert_eq!(db.load_attendance().len(), 2);
        assert!(db.insert_attendance(&record("0xAA", 2)).is_err());
        db.insert_attendance(&record("0xAA", 3)).unwrap();
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.redb");
        {
            let db = RedbStore::open(&path).unwrap();
            db.insert_student(&student("0xAA", "ann")).unwrap();
            db.insert_attendance(&record("0xAA", 1)).unwrap();
        }

        let db = RedbStore::open(&path).unwrap();
        assert_eq!(db.load_students()[0].name, "ann");
        assert_eq!(db.load_attendance().len(), 1);
        assert!(db.insert_student(&student("0xaa", "dup")).is_err());
    }

    #[test]
    fn clear_empties_everything() {
        let (db, _dir) = temp_db();
        db.insert_student(&student("0xAA", "ann")).unwrap();
        db.insert_attendance(&record("0xAA", 1)).unwrap();

        db.clear().unwrap();
        assert!(db.load_students().is_empty());
        assert!(db.load_attendance().is_empty());
        db.insert_student(&student("0xAA", "ann")).unwrap();
    }

    #[test]
    fn concurrent_marks_for_one_day_admit_one() {
        let (db, _dir) = temp_db();
        let db = Arc::new(db);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                thread::spawn(move || db.insert_attendance(&record("0xAA", 5)).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(db.load_attendance().len(), 1);
    }

    #[test]
    fn health_check_works() {
        let (db, _dir) = temp_db();
        db.health_check().unwrap();
    }

    #[test]
    fn overlapping_health_checks_all_pass_and_leave_no_rows() {
        let (db, _dir) = temp_db();
        let db = Arc::new(db);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                thread::spawn(move || (0..25).all(|_| db.health_check().is_ok()))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let read_txn = db.db.begin_read().unwrap();
        let table = read_txn.open_table(HEALTH).unwrap();
        assert_eq!(table.len().unwrap(), 0);
    }
}
