// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the calling wallet.
//!
//! Use the `Wallet` extractor in handlers to require a caller:
//!
//! ```rust,ignore
//! async fn my_handler(Wallet(caller): Wallet) -> impl IntoResponse {
//!     // caller is WalletIdentity
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Role, WalletIdentity};
use crate::models::WalletAddress;
use crate::state::AppState;

/// Header carrying the caller's wallet address.
pub const WALLET_HEADER: &str = "x-wallet-address";

/// Extractor for the calling wallet.
///
/// Reads `X-Wallet-Address` and resolves the role against the configured
/// admin set. Any wallet that is not an admin is a student.
pub struct Wallet(pub WalletIdentity);

impl FromRequestParts<AppState> for Wallet {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(WALLET_HEADER)
            .ok_or(AuthError::MissingWalletHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidWalletHeader)?;

        let wallet = WalletAddress::from(raw.trim());
        if wallet.is_blank() {
            return Err(AuthError::MissingWalletHeader);
        }

        let role = if state.is_admin(&wallet) {
            Role::Admin
        } else {
            Role::Student
        };

        Ok(Wallet(WalletIdentity::new(wallet, role)))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub WalletIdentity);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Wallet(identity) = Wallet::from_request_parts(parts, state).await?;

        if !identity.has_role(Role::Admin) {
            tracing::debug!(wallet = %identity.wallet, "Rejected non-admin caller");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(identity))
    }
}
