// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Register students on their behalf, read every record, reset
/// - `Student` - Register and mark attendance for the calling wallet only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::Student, Role::Student) => true,
            _ => false,
        }
    }
}

impl Default for Role {
    /// Least privilege.
    fn default() -> Self {
        Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Student => write!(f, "student"),
        }
    }
}
