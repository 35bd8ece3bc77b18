//! Route definitions
//!
//! The `/api/*` endpoints the dashboard calls.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    clear_rain_delay, device, devices, landscapes, login, logout, programs, rain_delay,
    run_program, start_zone, status, stop_zone, toggle_program, watering_events, weather,
};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Session
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/status", get(status))
        // Reads
        .route("/api/devices", get(devices))
        .route("/api/device/{device_id}", get(device))
        .route("/api/watering_events/{device_id}", get(watering_events))
        .route("/api/programs/{device_id}", get(programs))
        .route("/api/weather/{device_id}", get(weather))
        .route("/api/landscapes", get(landscapes))
        // Commands
        .route("/api/start_zone", post(start_zone))
        .route("/api/stop_zone", post(stop_zone))
        .route("/api/rain_delay", post(rain_delay))
        .route("/api/clear_rain_delay", post(clear_rain_delay))
        .route("/api/run_program", post(run_program))
        .route("/api/toggle_program", post(toggle_program))
}
