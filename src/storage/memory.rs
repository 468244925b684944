// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process record store.
//!
//! Nothing touches disk; contents are lost on restart. Used by tests and by
//! `STORAGE_BACKEND=memory` for throwaway runs.

use std::sync::{Mutex, MutexGuard};

use super::{
    ensure_day_free, ensure_wallet_free, AttendanceRecord, RecordStore, StorageError,
    StorageResult, Student,
};

#[derive(Default)]
struct Collections {
    students: Vec<Student>,
    attendance: Vec<AttendanceRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Collections>> {
        self.inner.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn try_load_students(&self) -> StorageResult<Vec<Student>> {
        Ok(self.lock()?.students.clone())
    }

    fn save_students(&self, students: &[Student]) -> StorageResult<()> {
        self.lock()?.students = students.to_vec();
        Ok(())
    }

    fn try_load_attendance(&self) -> StorageResult<Vec<AttendanceRecord>> {
        Ok(self.lock()?.attendance.clone())
    }

    fn save_attendance(&self, records: &[AttendanceRecord]) -> StorageResult<()> {
        self.lock()?.attendance = records.to_vec();
        Ok(())
    }

    fn insert_student(&self, student: &Student) -> StorageResult<()> {
        let mut inner = self.lock()?;
        ensure_wallet_free(&inner.students, student)?;
        inner.students.push(student.clone());
        Ok(())
    }

    fn insert_attendance(&self, record: &AttendanceRecord) -> StorageResult<()> {
        let mut inner = self.lock()?;
        ensure_day_free(&inner.attendance, record)?;
        inner.attendance.push(record.clone());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut inner = self.lock()?;
        inner.students.clear();
        inner.attendance.clear();
        Ok(())
    }

    fn health_check(&self) -> StorageResult<()> {
        self.lock().map(|_| ())
    }
}
