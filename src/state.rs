// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashSet;
use std::sync::Arc;

use crate::ledger::Ledger;
use crate::models::WalletAddress;
use crate::storage::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    /// Normalized admin wallet keys.
    admins: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            admins: Arc::new(HashSet::new()),
        }
    }

    /// Grant the admin role to `addresses`.
    pub fn with_admins<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<WalletAddress>,
    {
        let admins = addresses
            .into_iter()
            .map(Into::into)
            .filter(|wallet: &WalletAddress| !wallet.is_blank())
            .map(|wallet| wallet.key())
            .collect();
        self.admins = Arc::new(admins);
        self
    }

    pub fn is_admin(&self, wallet: &WalletAddress) -> bool {
        self.admins.contains(&wallet.key())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Ledger::new(Arc::new(MemoryStore::new())))
    }
}
