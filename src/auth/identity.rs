// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The calling wallet and its role.

use serde::Serialize;
use utoipa::ToSchema;

use super::roles::Role;
use crate::models::WalletAddress;

/// Identity resolved from the `X-Wallet-Address` header.
///
/// This is the type handlers receive to know who is calling. The address
/// keeps the caller's original casing.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct WalletIdentity {
    pub wallet: WalletAddress,
    pub role: Role,
}

impl WalletIdentity {
    pub fn new(wallet: WalletAddress, role: Role) -> Self {
        Self { wallet, role }
    }

    /// Whether the caller holds at least the privileges of `required`.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_identity_passes_every_role_check() {
        let admin = WalletIdentity::new(WalletAddress::from("0xAA"), Role::Admin);
        assert!(admin.has_role(Role::Admin));
        assert!(admin.has_role(Role::Student));
    }

    #[test]
    fn student_identity_is_not_admin() {
        let student = WalletIdentity::new(WalletAddress::from("0xBB"), Role::Student);
        assert!(!student.has_role(Role::Admin));
        assert!(student.has_role(Role::Student));
    }
}
