// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for ledger management.
//!
//! These endpoints require the Admin role and provide:
//! - Registration on a student's behalf
//! - Full student and attendance listings
//! - Ledger statistics
//! - Data reset

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::students::required;
use crate::{
    auth::AdminOnly,
    error::ApiError,
    ledger::{local_today, NewStudent},
    models::AdminRegisterStudentRequest,
    state::AppState,
    storage::{AttendanceRecord, RegistrationType, Student},
};

/// Ledger statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStatsResponse {
    /// Every registered student, active or not.
    pub total_students: usize,
    /// Students marked present today.
    pub present_today: usize,
    /// Every attendance record.
    pub total_records: usize,
    /// The day counted as today.
    #[schema(example = "2024-01-01")]
    pub date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/v1/admin/students",
    request_body = AdminRegisterStudentRequest,
    params(("X-Wallet-Address" = String, Header, description = "Admin wallet address")),
    tag = "Admin",
    responses(
        (status = 201, body = Student),
        (status = 400, description = "Missing name, email or wallet"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Wallet already registered")
    )
)]
pub async fn register_student(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Json(request): Json<AdminRegisterStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let wallet = required("wallet_address", request.wallet_address.as_str())?;
    let student = state.ledger.registration().register_student(NewStudent {
        id: request.student_id,
        name: required("name", &request.name)?,
        email: required("email", &request.email)?,
        wallet_address: wallet.into(),
        registration_type: Some(RegistrationType::Admin),
    })?;

    tracing::info!(
        admin = %admin.wallet,
        student_id = %student.id,
        "Admin registered student"
    );
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/v1/admin/students",
    params(("X-Wallet-Address" = String, Header, description = "Admin wallet address")),
    tag = "Admin",
    responses(
        (status = 200, body = [Student]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
) -> Json<Vec<Student>> {
    Json(state.ledger.queries().list_students())
}

#[utoipa::path(
    get,
    path = "/v1/admin/attendance",
    params(("X-Wallet-Address" = String, Header, description = "Admin wallet address")),
    tag = "Admin",
    responses(
        (status = 200, body = [AttendanceRecord]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
) -> Json<Vec<AttendanceRecord>> {
    Json(state.ledger.queries().list_attendance())
}

#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    params(("X-Wallet-Address" = String, Header, description = "Admin wallet address")),
    tag = "Admin",
    responses(
        (status = 200, body = AdminStatsResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
) -> Json<AdminStatsResponse> {
    let date = local_today();
    let stats = state.ledger.attendance().compute_stats_on(date);
    Json(AdminStatsResponse {
        total_students: stats.total_students,
        present_today: stats.present_today,
        total_records: stats.total_records,
        date,
    })
}

/// Remove every student and attendance record.
#[utoipa::path(
    delete,
    path = "/v1/admin/data",
    params(("X-Wallet-Address" = String, Header, description = "Admin wallet address")),
    tag = "Admin",
    responses(
        (status = 204, description = "Ledger cleared"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn reset_data(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
) -> Result<StatusCode, ApiError> {
    state.ledger.reset()?;
    tracing::warn!(admin = %admin.wallet, "Admin cleared ledger data");
    Ok(StatusCode::NO_CONTENT)
}
