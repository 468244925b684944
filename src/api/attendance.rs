// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Wallet,
    error::ApiError,
    ledger::{local_today, StudentSummary},
    models::{MarkAttendanceRequest, MarkedQuery, MarkedResponse},
    state::AppState,
    storage::AttendanceRecord,
};

#[utoipa::path(
    post,
    path = "/v1/attendance",
    request_body(content = MarkAttendanceRequest, description = "Omit the body to mark today"),
    params(("X-Wallet-Address" = String, Header, description = "Caller wallet address")),
    tag = "Attendance",
    responses(
        (status = 201, body = AttendanceRecord),
        (status = 404, description = "Caller is not registered"),
        (status = 409, description = "Already marked for that day")
    )
)]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Wallet(caller): Wallet,
    request: Option<Json<MarkAttendanceRequest>>,
) -> Result<(StatusCode, Json<AttendanceRecord>), ApiError> {
    let date = request
        .and_then(|Json(request)| request.date)
        .unwrap_or_else(local_today);

    let record = state
        .ledger
        .attendance()
        .mark_attendance(&caller.wallet, date)?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/v1/attendance/me",
    params(("X-Wallet-Address" = String, Header, description = "Caller wallet address")),
    tag = "Attendance",
    responses((status = 200, body = [AttendanceRecord]))
)]
pub async fn my_history(
    State(state): State<AppState>,
    Wallet(caller): Wallet,
) -> Json<Vec<AttendanceRecord>> {
    Json(state.ledger.queries().history(&caller.wallet))
}

#[utoipa::path(
    get,
    path = "/v1/attendance/me/summary",
    params(("X-Wallet-Address" = String, Header, description = "Caller wallet address")),
    tag = "Attendance",
    responses(
        (status = 200, body = StudentSummary),
        (status = 404, description = "Caller is not registered")
    )
)]
pub async fn my_summary(
    State(state): State<AppState>,
    Wallet(caller): Wallet,
) -> Result<Json<StudentSummary>, ApiError> {
    let summary = state
        .ledger
        .queries()
        .student_summary(&caller.wallet, local_today())?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/v1/attendance/me/marked",
    params(
        MarkedQuery,
        ("X-Wallet-Address" = String, Header, description = "Caller wallet address")
    ),
    tag = "Attendance",
    responses((status = 200, body = MarkedResponse))
)]
pub async fn marked_on(
    State(state): State<AppState>,
    Wallet(caller): Wallet,
    Query(params): Query<MarkedQuery>,
) -> Json<MarkedResponse> {
    let date = params.date.unwrap_or_else(local_today);
    let marked = state.ledger.queries().marked_on(&caller.wallet, date);
    Json(MarkedResponse { date, marked })
}
