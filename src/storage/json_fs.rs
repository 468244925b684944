// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON document record store.
//!
//! Each collection is a single JSON array on disk (`students.json`,
//! `attendance.json`). Saves replace the whole document through a temp file
//! and a rename, so readers see either the old or the new collection and
//! never a torn write. Inserts run load-check-save under one process-wide
//! lock.
//!
//! A missing document is an empty collection, not an error.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use super::{
    ensure_day_free, ensure_wallet_free, AttendanceRecord, RecordStore, StorageError,
    StoragePaths, StorageResult, Student,
};

/// Record store backed by two JSON documents.
#[derive(Debug)]
pub struct JsonFileStore {
    paths: StoragePaths,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, creating the data directory if needed.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        fs::create_dir_all(paths.root())?;
        Ok(Self {
            paths,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Read a JSON array, or an empty one if the file does not exist yet.
    fn read_collection<T: DeserializeOwned>(&self, path: &Path) -> StorageResult<Vec<T>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write a JSON array (atomic write via rename).
    fn write_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, items)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn try_load_students(&self) -> StorageResult<Vec<Student>> {
        self.read_collection(&self.paths.students())
    }

    fn save_students(&self, students: &[Student]) -> StorageResult<()> {
        let _guard = self.lock()?;
        self.write_collection(&self.paths.students(), students)
    }

    fn try_load_attendance(&self) -> StorageResult<Vec<AttendanceRecord>> {
        self.read_collection(&self.paths.attendance())
    }

    fn save_attendance(&self, records: &[AttendanceRecord]) -> StorageResult<()> {
        let _guard = self.lock()?;
        self.write_collection(&self.paths.attendance(), records)
    }

    fn insert_student(&self, student: &Student) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut students = self.try_load_students()?;
        ensure_wallet_free(&students, student)?;
        students.push(student.clone());
        self.write_collection(&self.paths.students(), &students)
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut records = self.try_load_attendance()?;
        ensure_day_free(&records, record)?;
        records.push(record.clone());
        self.write_collection(&self.paths.attendance(), &records)
    }

    fn clear(&self) -> StorageResult<()> {
        let _guard = self.lock()?;
        // Attendance first: a crash in between leaves students without records,
        // never records without students.
        self.write_collection::<AttendanceRecord>(&self.paths.attendance(), &[])?;
        self.write_collection::<Student>(&self.paths.students(), &[])
    }

    /// Write-read-delete probe under the data directory.
    fn health_check(&self) -> StorageResult<()> {
        let probe = self.paths.health_probe(&uuid::Uuid::new_v4().to_string());
        let probe_data = b"health_check_data";

        fs::write(&probe, probe_data)?;
        let read_data = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if read_data != probe_data {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WalletAddress;
    use crate::storage::{AttendanceStatus, RegistrationType};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn test_store() -> (JsonFileStore, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::open(StoragePaths::new(dir.path())).expect("Failed to open");
        (store, dir)
    }

    fn student(wallet: &str, name: &str) -> Student {
        Student {
            id: format!("STU-{name}"),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            wallet_address: WalletAddress::from(wallet),
            is_active: true,
            registration_type: RegistrationType::Admin,
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
    fn missing_documents_read_as_empty() {
        let (store, _dir) = test_store();
        assert!(store.try_load_students().unwrap().is_empty());
        assert!(store.try_load_attendance().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_whole_collection() {
        let (store, _dir) = test_store();
        store
            .save_students(&[student("0xAA", "ann"), student("0xBB", "bob")])
            .unwrap();
        store.save_students(&[student("0xCC", "cat")]).unwrap();

        let loaded = store.try_load_students().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "cat");
        assert!(!store.paths().students().with_extension("tmp").exists());
    }

    #[test]
    fn inserts_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonFileStore::open(StoragePaths::new(dir.path())).unwrap();
            store.insert_student(&student("0xAA", "ann")).unwrap();
            store.insert_attendance(&record("0xAA", 1)).unwrap();
        }

        let reopened = JsonFileStore::open(StoragePaths::new(dir.path())).unwrap();
        let students = reopened.load_students();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "ann");
        assert_eq!(students[0].wallet_address, WalletAddress::from("0xAA"));
        let records = reopened.load_attendance();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn conditional_inserts_reject_duplicates() {
        let (store, _dir) = test_store();
        store.insert_student(&student("0xAA", "ann")).unwrap();
        assert!(matches!(
            store.insert_student(&student("0xaa", "dup")),
            Err(StorageError::AlreadyExists(_))
        ));

        store.insert_attendance(&record("0xAA", 1)).unwrap();
        assert!(matches!(
            store.insert_attendance(&record("0xaa", 1)),
            Err(StorageError::AlreadyExists(_))
        ));
        assert_eq!(store.load_students().len(), 1);
        assert_eq!(store.load_attendance().len(), 1);
    }

    #[test]
    fn corrupt_document_fails_try_load_but_not_load() {
        let (store, _dir) = test_store();
        fs::write(store.paths().students(), b"{not json").unwrap();

        assert!(matches!(store.try_load_students(), Err(StorageError::Json(_))));
        assert!(store.load_students().is_empty());
        // The conditional insert refuses to guess.
        assert!(store.insert_student(&student("0xAA", "ann")).is_err());
    }

    #[test]
    fn clear_empties_both_documents() {
        let (store, _dir) = test_store();
        store.insert_student(&student("0xAA", "ann")).unwrap();
        store.insert_attendance(&record("0xAA", 1)).unwrap();

        store.clear().unwrap();
        assert!(store.load_students().is_empty());
        assert!(store.load_attendance().is_empty());
    }

    #[test]
    fn concurrent_registrations_of_one_wallet_admit_one() {
        let (store, _dir) = test_store();
        let successes = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    scope.spawn(move || {
                        let wallet = if i % 2 == 0 { "0xAA" } else { "0xaa" };
                        store.insert_student(&student(wallet, &format!("s{i}"))).is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(successes, 1);
        assert_eq!(store.try_load_students().unwrap().len(), 1);
    }

    #[test]
    fn health_check_works() {
        let (store, _dir) = test_store();
        store.health_check().expect("Health check should pass");
    }
}
