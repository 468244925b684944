// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the on-disk storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for persistent storage.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities.
///
/// ```text
/// {root}/
///   ledger.redb        # redb backend
///   students.json      # json backend
///   attendance.json    # json backend
/// ```
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the embedded database file.
    pub fn database(&self) -> PathBuf {
        self.root.join("ledger.redb")
    }

    /// Path to the student collection document.
    pub fn students(&self) -> PathBuf {
        self.root.join("students.json")
    }

    /// Path to the attendance collection document.
    pub fn attendance(&self) -> PathBuf {
        self.root.join("attendance.json")
    }

    /// Scratch file used by write-read-delete health probes.
    pub fn health_probe(&self, probe_id: &str) -> PathBuf {
        self.root.join(format!(".health_check-{probe_id}"))
    }
}
