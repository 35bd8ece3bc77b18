//! HTTP API handlers
//!
//! Each handler decodes the dashboard request, runs the matching
//! `Dashboard` operation and shapes the reply.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use bhyve_core::models::{
    DeviceRequest, EventsQuery, LoginRequest, RainDelayRequest, RunProgramRequest,
    StartZoneRequest, ToggleProgramRequest, UserId,
};
use bhyve_core::SessionStatus;

use crate::error::{undecodable_body, HttpError};
use crate::server::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

type ReadResult = Result<Json<Value>, HttpError>;
/// Request bodies arrive as results so decode failures answer in the JSON
/// error shape instead of axum's plain-text rejection.
type Body<T> = Result<Json<T>, JsonRejection>;
type CommandResult = Result<Json<SuccessResponse>, HttpError>;

// ============================================================================
// Session
// ============================================================================

pub async fn login(
    State(state): State<AppState>,
    body: Body<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(req) = body.map_err(|r| HttpError::Login(undecodable_body(r)))?;
    let outcome = state.dashboard.login(req).await.map_err(HttpError::Login)?;
    Ok(Json(LoginResponse {
        success: true,
        user_id: outcome.user_id,
    }))
}

pub async fn logout(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.dashboard.logout().await;
    SuccessResponse::ok()
}

pub async fn status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.dashboard.status().await)
}

// ============================================================================
// Reads
// ============================================================================

pub async fn devices(State(state): State<AppState>) -> ReadResult {
    Ok(Json(state.dashboard.list_devices().await?))
}

pub async fn device(State(state): State<AppState>, Path(device_id): Path<String>) -> ReadResult {
    Ok(Json(state.dashboard.device(&device_id).await?))
}

pub async fn watering_events(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> ReadResult {
    let Query(query) = query?;
    Ok(Json(state.dashboard.watering_events(&device_id, query).await?))
}

pub async fn programs(State(state): State<AppState>, Path(device_id): Path<String>) -> ReadResult {
    Ok(Json(state.dashboard.programs(&device_id).await?))
}

pub async fn weather(State(state): State<AppState>, Path(device_id): Path<String>) -> ReadResult {
    Ok(Json(state.dashboard.weather(&device_id).await?))
}

pub async fn landscapes(State(state): State<AppState>) -> ReadResult {
    Ok(Json(state.dashboard.landscapes().await?))
}

// ============================================================================
// Commands
// ============================================================================

pub async fn start_zone(
    State(state): State<AppState>,
    body: Body<StartZoneRequest>,
) -> CommandResult {
    let Json(req) = body?;
    state.dashboard.start_zone(req).await?;
    Ok(SuccessResponse::ok())
}

pub async fn stop_zone(State(state): State<AppState>, body: Body<DeviceRequest>) -> CommandResult {
    let Json(req) = body?;
    state.dashboard.stop_zone(req).await?;
    Ok(SuccessResponse::ok())
}

pub async fn rain_delay(
    State(state): State<AppState>,
    body: Body<RainDelayRequest>,
) -> CommandResult {
    let Json(req) = body?;
    state.dashboard.set_rain_delay(req).await?;
    Ok(SuccessResponse::ok())
}

pub async fn clear_rain_delay(
    State(state): State<AppState>,
    body: Body<DeviceRequest>,
) -> CommandResult {
    let Json(req) = body?;
    state.dashboard.clear_rain_delay(req).await?;
    Ok(SuccessResponse::ok())
}

pub async fn run_program(
    State(state): State<AppState>,
    body: Body<RunProgramRequest>,
) -> CommandResult {
    let Json(req) = body?;
    state.dashboard.run_program(req).await?;
    Ok(SuccessResponse::ok())
}

pub async fn toggle_program(
    State(state): State<AppState>,
    body: Body<ToggleProgramRequest>,
) -> CommandResult {
    let Json(req) = body?;
    state.dashboard.toggle_program(req).await?;
    Ok(SuccessResponse::ok())
}
