//! Inbound dashboard payloads.
//!
//! Every field is optional on the wire so that a missing value surfaces as a
//! validation failure with a readable message instead of a decode error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{DeviceCommand, ProgramToggle, ResourceId};
use crate::api::ApiError;

/// Minutes a zone runs when the dashboard does not say
pub const DEFAULT_RUN_MINUTES: u32 = 5;

/// Hours of rain delay when the dashboard does not say
pub const DEFAULT_RAIN_DELAY_HOURS: u32 = 24;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 25;

fn required(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_parts(self) -> Result<(String, String), ApiError> {
        match (required(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ApiError::validation("Email and password required")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartZoneRequest {
    pub device_id: Option<String>,
    pub zone_id: Option<u32>,
    pub duration: Option<u32>,
}

impl StartZoneRequest {
    pub fn into_command(self, at: DateTime<Utc>) -> Result<DeviceCommand, ApiError> {
        let (Some(device_id), Some(zone_id)) = (required(self.device_id), self.zone_id) else {
            return Err(ApiError::validation("device_id and zone_id required"));
        };
        let run_time = self.duration.unwrap_or(DEFAULT_RUN_MINUTES);
        Ok(DeviceCommand::manual_watering(device_id, zone_id, run_time, at))
    }
}

/// A request that only names a device (stop zone, clear rain delay)
#[derive(Debug, Default, Deserialize)]
pub struct DeviceRequest {
    pub device_id: Option<String>,
}

impl DeviceRequest {
    pub fn device_id(self) -> Result<String, ApiError> {
        required(self.device_id).ok_or_else(|| ApiError::validation("device_id required"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RainDelayRequest {
    pub device_id: Option<String>,
    pub hours: Option<u32>,
}

impl RainDelayRequest {
    pub fn into_command(self, at: DateTime<Utc>) -> Result<DeviceCommand, ApiError> {
        let device_id =
            required(self.device_id).ok_or_else(|| ApiError::validation("device_id required"))?;
        let hours = self.hours.unwrap_or(DEFAULT_RAIN_DELAY_HOURS);
        Ok(DeviceCommand::rain_delay(device_id, hours, at))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RunProgramRequest {
    pub device_id: Option<String>,
    pub program_id: Option<ResourceId>,
}

impl RunProgramRequest {
    pub fn into_command(self, at: DateTime<Utc>) -> Result<DeviceCommand, ApiError> {
        let program_id = self.program_id.filter(|id| !id.is_blank());
        let (Some(device_id), Some(program_id)) = (required(self.device_id), program_id) else {
            return Err(ApiError::validation("device_id and program_id required"));
        };
        Ok(DeviceCommand::run_program(device_id, program_id, at))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleProgramRequest {
    pub program_id: Option<ResourceId>,
    pub enabled: Option<bool>,
}

impl ToggleProgramRequest {
    pub fn into_toggle(self) -> Result<ProgramToggle, ApiError> {
        let program_id = self
            .program_id
            .filter(|id| !id.is_blank())
            .ok_or_else(|| ApiError::validation("program_id required"))?;
        Ok(ProgramToggle {
            program_id,
            enabled: self.enabled.unwrap_or(true),
        })
    }
}

/// Accept a count given as a number or a numeric string. Anything else reads
/// as absent so the default applies.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Pagination for watering event history
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct EventsQuery {
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub per_page: Option<u32>,
}

impl EventsQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }
}
