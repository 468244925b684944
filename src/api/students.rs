// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Wallet,
    error::ApiError,
    ledger::NewStudent,
    models::{RegisterStudentRequest, RegisteredResponse, WalletAddress},
    state::AppState,
    storage::{RegistrationType, Student},
};

/// Trim a required text field, rejecting it if nothing is left.
pub(super) fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[utoipa::path(
    post,
    path = "/v1/students",
    request_body = RegisterStudentRequest,
    params(("X-Wallet-Address" = String, Header, description = "Caller wallet address")),
    tag = "Students",
    responses(
        (status = 201, body = Student),
        (status = 400, description = "Missing name or email"),
        (status = 401, description = "Missing wallet header"),
        (status = 409, description = "Wallet already registered")
    )
)]
pub async fn register_self(
    State(state): State<AppState>,
    Wallet(caller): Wallet,
    Json(request): Json<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = state.ledger.registration().register_student(NewStudent {
        id: request.student_id,
        name: required("name", &request.name)?,
        email: required("email", &request.email)?,
        wallet_address: caller.wallet,
        registration_type: Some(RegistrationType::SelfService),
    })?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/v1/students/me",
    params(("X-Wallet-Address" = String, Header, description = "Caller wallet address")),
    tag = "Students",
    responses(
        (status = 200, body = Student),
        (status = 404, description = "Caller is not registered")
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    Wallet(caller): Wallet,
) -> Result<Json<Student>, ApiError> {
    state
        .ledger
        .queries()
        .student(&caller.wallet)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Student not found"))
}

#[utoipa::path(
    get,
    path = "/v1/students/{wallet_address}/registered",
    params(
        ("wallet_address" = String, Path, description = "Wallet address to check"),
        ("X-Wallet-Address" = String, Header, description = "Caller wallet address")
    ),
    tag = "Students",
    responses((status = 200, body = RegisteredResponse))
)]
pub async fn is_registered(
    State(state): State<AppState>,
    Wallet(_caller): Wallet,
    Path(wallet_address): Path<String>,
) -> Json<RegisteredResponse> {
    let wallet_address = WalletAddress::from(wallet_address);
    let registered = state.ledger.queries().is_registered(&wallet_address);
    Json(RegisteredResponse {
        wallet_address,
        registered,
    })
}
