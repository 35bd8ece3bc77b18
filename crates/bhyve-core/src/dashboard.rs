//! Dashboard operations.
//!
//! Each operation validates its input, obtains a usable token from the
//! `SessionManager` and makes exactly one upstream call, passing the result
//! through. Validation happens before the token check, so a malformed request
//! never causes a renewal login either.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::auth::{LoginOutcome, SessionManager, SessionStatus};
use crate::models::{
    DeviceRequest, DeviceCommand, EventsQuery, LoginRequest, RainDelayRequest, RunProgramRequest,
    StartZoneRequest, ToggleProgramRequest,
};

pub type OpResult<T> = Result<T, ApiError>;

pub struct Dashboard {
    sessions: SessionManager,
}

impl Dashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            sessions: SessionManager::new(api),
        }
    }

    fn api(&self) -> &ApiClient {
        self.sessions.api()
    }

    fn required_path_id(id: &str, name: &str) -> OpResult<()> {
        if id.trim().is_empty() {
            return Err(ApiError::validation(format!("{} required", name)));
        }
        Ok(())
    }

    // ===== Session =====

    pub async fn login(&self, request: LoginRequest) -> OpResult<LoginOutcome> {
        let (email, password) = request.into_parts()?;
        self.sessions.login(&email, &password).await
    }

    pub async fn logout(&self) {
        self.sessions.logout().await;
    }

    pub async fn status(&self) -> SessionStatus {
        self.sessions.status().await
    }

    // ===== Reads =====

    pub async fn list_devices(&self) -> OpResult<Value> {
        let token = self.sessions.authorized_token().await?;
        self.api().fetch_devices(&token).await
    }

    pub async fn device(&self, device_id: &str) -> OpResult<Value> {
        Self::required_path_id(device_id, "device_id")?;
        let token = self.sessions.authorized_token().await?;
        self.api().fetch_device(&token, device_id).await
    }

    pub async fn watering_events(&self, device_id: &str, query: EventsQuery) -> OpResult<Value> {
        Self::required_path_id(device_id, "device_id")?;
        let token = self.sessions.authorized_token().await?;
        self.api()
            .fetch_watering_events(&token, device_id, query.page(), query.per_page())
            .await
    }

    pub async fn programs(&self, device_id: &str) -> OpResult<Value> {
        Self::required_path_id(device_id, "device_id")?;
        let token = self.sessions.authorized_token().await?;
        self.api().fetch_programs(&token, device_id).await
    }

    pub async fn weather(&self, device_id: &str) -> OpResult<Value> {
        Self::required_path_id(device_id, "device_id")?;
        let token = self.sessions.authorized_token().await?;
        self.api().fetch_weather(&token, device_id).await
    }

    pub async fn landscapes(&self) -> OpResult<Value> {
        let token = self.sessions.authorized_token().await?;
        self.api().fetch_landscapes(&token).await
    }

    // ===== Commands =====

    async fn run_command(&self, command: DeviceCommand) -> OpResult<Option<Value>> {
        let token = self.sessions.authorized_token().await?;
        debug!(device_id = command.device_id(), action = command.action(), "Device command");
        self.api().send_command(&token, &command).await
    }

    pub async fn start_zone(&self, request: StartZoneRequest) -> OpResult<Option<Value>> {
        let command = request.into_command(Utc::now())?;
        self.run_command(command).await
    }

    pub async fn stop_zone(&self, request: DeviceRequest) -> OpResult<Option<Value>> {
        let device_id = request.device_id()?;
        self.run_command(DeviceCommand::stop_watering(device_id, Utc::now()))
            .await
    }

    pub async fn set_rain_delay(&self, request: RainDelayRequest) -> OpResult<Option<Value>> {
        let command = request.into_command(Utc::now())?;
        self.run_command(command).await
    }

    pub async fn clear_rain_delay(&self, request: DeviceRequest) -> OpResult<Option<Value>> {
        let device_id = request.device_id()?;
        self.run_command(DeviceCommand::rain_delay(device_id, 0, Utc::now()))
            .await
    }

    pub async fn run_program(&self, request: RunProgramRequest) -> OpResult<Option<Value>> {
        let command = request.into_command(Utc::now())?;
        self.run_command(command).await
    }

    pub async fn toggle_program(&self, request: ToggleProgramRequest) -> OpResult<Option<Value>> {
        let toggle = request.into_toggle()?;
        let token = self.sessions.authorized_token().await?;
        debug!(program_id = %toggle.program_id, enabled = toggle.enabled, "Toggling program");
        self.api().toggle_program(&token, &toggle).await
    }
}
