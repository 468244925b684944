// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Storage Module
//!
//! Durable storage for the two ledger collections: [`Student`] and
//! [`AttendanceRecord`]. Every backend implements [`RecordStore`].
//!
//! ## Backends
//!
//! | Backend | Type | Atomicity |
//! |---------|------|-----------|
//! | `redb` | [`RedbStore`] | one write transaction per insert/replace/clear |
//! | `json` | [`JsonFileStore`] | temp-file + rename per document, inserts behind a lock |
//! | `memory` | [`MemoryStore`] | inserts behind a lock, nothing on disk |
//!
//! The json backend keeps each collection in its own document, so `clear`
//! rewrites the attendance document and then the students document. A crash
//! between the two leaves students without attendance, never the reverse.
//!
//! `save_*` stores the collection exactly as given on every backend. If two
//! rows share a wallet (or a wallet and day), the first one keeps the key and
//! later inserts for it are still rejected.
//!
//! ## Uniqueness
//!
//! `insert_student` and `insert_attendance` are conditional inserts: the
//! uniqueness check and the write happen in the same atomic unit, so two
//! concurrent registrations of one wallet cannot both succeed. A conflict is
//! reported as [`StorageError::AlreadyExists`].
//!
//! ## Fail-open reads
//!
//! `load_students` / `load_attendance` never fail. A read error is logged at
//! `error` level and an empty collection is returned. Callers that must not
//! guess use the `try_load_*` variants.

use std::io;
use std::str::FromStr;
use std::sync::Arc;

pub mod json_fs;
pub mod memory;
pub mod paths;
pub mod records;
pub mod redb_store;

pub use json_fs::JsonFileStore;
pub use memory::MemoryStore;
pub use paths::{StoragePaths, DATA_ROOT};
pub use records::{AttendanceRecord, AttendanceStatus, RegistrationType, Student};
pub use redb_store::RedbStore;

/// Error type for record storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    /// A uniqueness constraint rejected the write.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Stored data is inconsistent (e.g. an index points nowhere).
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// A writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable keyed storage for students and attendance records.
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// All students in insertion order.
    fn try_load_students(&self) -> StorageResult<Vec<Student>>;

    /// Replace the whole student collection atomically.
    fn save_students(&self, students: &[Student]) -> StorageResult<()>;

    /// All attendance records in insertion order.
    fn try_load_attendance(&self) -> StorageResult<Vec<AttendanceRecord>>;

    /// Replace the whole attendance collection atomically.
    fn save_attendance(&self, records: &[AttendanceRecord]) -> StorageResult<()>;

    /// Append a student unless its wallet is already taken.
    fn insert_student(&self, student: &Student) -> StorageResult<()>;

    /// Append a record unless one exists for the same wallet and day.
    fn insert_attendance(&self, record: &AttendanceRecord) -> StorageResult<()>;

    /// Remove every student and attendance record.
    fn clear(&self) -> StorageResult<()>;

    /// Verify the backend can be written and read back.
    fn health_check(&self) -> StorageResult<()>;

    /// Fail-open variant of [`RecordStore::try_load_students`].
    fn load_students(&self) -> Vec<Student> {
        match self.try_load_students() {
            Ok(students) => students,
            Err(e) => {
                tracing::error!(
                    backend = self.backend(),
                    error = %e,
                    "Failed to read students, treating collection as empty"
                );
                Vec::new()
            }
        }
    }

    /// Fail-open variant of [`RecordStore::try_load_attendance`].
    fn load_attendance(&self) -> Vec<AttendanceRecord> {
        match self.try_load_attendance() {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    backend = self.backend(),
                    error = %e,
                    "Failed to read attendance records, treating collection as empty"
                );
                Vec::new()
            }
        }
    }
}

/// Reject `student` if `existing` already holds its wallet.
pub(crate) fn ensure_wallet_free(existing: &[Student], student: &Student) -> StorageResult<()> {
    if existing
        .iter()
        .any(|s| s.wallet_address.matches(&student.wallet_address))
    {
        return Err(StorageError::AlreadyExists(format!(
            "Student with wallet {}",
            student.wallet_address
        )));
    }
    Ok(())
}

/// Reject `record` if `existing` already covers its wallet and day.
pub(crate) fn ensure_day_free(
    existing: &[AttendanceRecord],
    record: &AttendanceRecord,
) -> StorageResult<()> {
    if existing
        .iter()
        .any(|r| r.date == record.date && r.student_address.matches(&record.student_address))
    {
        return Err(StorageError::AlreadyExists(format!(
            "Attendance for {} on {}",
            record.student_address, record.date
        )));
    }
    Ok(())
}

// =============================================================================
// Backend selection
// =============================================================================

/// Which [`RecordStore`] implementation to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Redb,
    Json,
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Redb
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "json" => Ok(Self::Json),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::Json => write!(f, "json"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Open the configured backend rooted at `paths`.
pub fn open_store(
    backend: StorageBackend,
    paths: StoragePaths,
) -> StorageResult<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match backend {
        StorageBackend::Redb => Arc::new(RedbStore::open(&paths.database())?),
        StorageBackend::Json => Arc::new(JsonFileStore::open(paths)?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
