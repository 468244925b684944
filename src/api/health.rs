// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Record store probe result ("ok" or "unavailable").
    pub storage: String,
    /// Active storage backend.
    pub backend: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Run the store's write-read probe.
fn check_storage(state: &AppState) -> bool {
    match state.ledger.store().health_check() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            false
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let storage_ok = check_storage(&state);

    let response = ReadyResponse {
        status: if storage_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            storage: if storage_ok { "ok" } else { "unavailable" }.to_string(),
            backend: state.ledger.store().backend().to_string(),
        },
    };

    let status = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the record store is usable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::storage::{
        AttendanceRecord, RecordStore, StorageError, StorageResult, Student,
    };
    use std::sync::Arc;

    /// Store whose every operation fails.
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn backend(&self) -> &'static str {
            "broken"
        }
        fn try_load_students(&self) -> StorageResult<Vec<Student>> {
            Err(StorageError::LockPoisoned)
        }
        fn save_students(&self, _: &[Student]) -> StorageResult<()> {
            Err(StorageError::LockPoisoned)
        }
        fn try_load_attendance(&self) -> StorageResult<Vec<AttendanceRecord>> {
            Err(StorageError::LockPoisoned)
        }
        fn save_attendance(&self, _: &[AttendanceRecord]) -> StorageResult<()> {
            Err(StorageError::LockPoisoned)
        }
        fn insert_student(&self, _: &Student) -> StorageResult<()> {
            Err(StorageError::LockPoisoned)
        }
        fn insert_attendance(&self, _: &AttendanceRecord) -> StorageResult<()> {
            Err(StorageError::LockPoisoned)
        }
        fn clear(&self) -> StorageResult<()> {
            Err(StorageError::LockPoisoned)
        }
        fn health_check(&self) -> StorageResult<()> {
            Err(StorageError::LockPoisoned)
        }
    }

    #[tokio::test]
    async fn healthy_store_reports_ok() {
        let (status, Json(body)) = readiness(State(AppState::default())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.storage, "ok");
        assert_eq!(body.checks.backend, "memory");
    }

    #[tokio::test]
    async fn broken_store_reports_unavailable() {
        let state = AppState::new(Ledger::new(Arc::new(BrokenStore)));
        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.storage, "unavailable");
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }
}
