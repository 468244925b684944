// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Role, WalletIdentity},
    ledger::{AttendanceStats, StudentSummary},
    models::{
        AdminRegisterStudentRequest, MarkAttendanceRequest, MarkedResponse,
        RegisterStudentRequest, RegisteredResponse, WalletAddress,
    },
    state::AppState,
    storage::{AttendanceRecord, AttendanceStatus, RegistrationType, Student},
};

pub mod admin;
pub mod attendance;
pub mod health;
pub mod students;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/students", post(students::register_self))
        .route("/students/me", get(students::get_me))
        .route(
            "/students/{wallet_address}/registered",
            get(students::is_registered),
        )
        .route("/attendance", post(attendance::mark_attendance))
        .route("/attendance/me", get(attendance::my_history))
        .route("/attendance/me/summary", get(attendance::my_summary))
        .route("/attendance/me/marked", get(attendance::marked_on))
        .route(
            "/admin/students",
            get(admin::list_students).post(admin::register_student),
        )
        .route("/admin/attendance", get(admin::list_attendance))
        .route("/admin/stats", get(admin::get_stats))
        .route("/admin/data", delete(admin::reset_data))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        students::register_self,
        students::get_me,
        students::is_registered,
        attendance::mark_attendance,
        attendance::my_history,
        attendance::my_summary,
        attendance::marked_on,
        admin::register_student,
        admin::list_students,
        admin::list_attendance,
        admin::get_stats,
        admin::reset_data
    ),
    components(
        schemas(
            Student,
            AttendanceRecord,
            AttendanceStatus,
            RegistrationType,
            WalletAddress,
            WalletIdentity,
            Role,
            AttendanceStats,
            StudentSummary,
            RegisterStudentRequest,
            AdminRegisterStudentRequest,
            RegisteredResponse,
            MarkAttendanceRequest,
            MarkedResponse,
            admin::AdminStatsResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Students", description = "Student registration by wallet"),
        (name = "Attendance", description = "Daily attendance marking"),
        (name = "Admin", description = "Ledger administration")
    )
)]
pub struct ApiDoc;
