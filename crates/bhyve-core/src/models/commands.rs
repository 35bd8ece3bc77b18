use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ResourceId;

/// Timestamp format the upstream API expects on device commands
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn upstream_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WateringMode {
    Manual,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Station {
    pub station: u32,
    pub run_time: u32,
}

/// A command posted to a device endpoint, discriminated by `event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeviceCommand {
    ChangeMode {
        mode: WateringMode,
        device_id: String,
        timestamp: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        stations: Vec<Station>,
    },
    RainDelay {
        device_id: String,
        delay: u32,
        timestamp: String,
    },
    RunProgram {
        device_id: String,
        program_id: ResourceId,
        timestamp: String,
    },
}

impl DeviceCommand {
    /// Run a single zone for `run_time` minutes
    pub fn manual_watering(device_id: String, zone: u32, run_time: u32, at: DateTime<Utc>) -> Self {
        DeviceCommand::ChangeMode {
            mode: WateringMode::Manual,
            device_id,
            timestamp: upstream_timestamp(at),
            stations: vec![Station {
                station: zone,
                run_time,
            }],
        }
    }

    /// Return the device to its automatic schedule, stopping manual watering
    pub fn stop_watering(device_id: String, at: DateTime<Utc>) -> Self {
        DeviceCommand::ChangeMode {
            mode: WateringMode::Auto,
            device_id,
            timestamp: upstream_timestamp(at),
            stations: Vec::new(),
        }
    }

    /// Suspend scheduled watering for `hours`; zero clears an active delay
    pub fn rain_delay(device_id: String, hours: u32, at: DateTime<Utc>) -> Self {
        DeviceCommand::RainDelay {
            device_id,
            delay: hours,
            timestamp: upstream_timestamp(at),
        }
    }

    pub fn run_program(device_id: String, program_id: ResourceId, at: DateTime<Utc>) -> Self {
        DeviceCommand::RunProgram {
            device_id,
            program_id,
            timestamp: upstream_timestamp(at),
        }
    }

    pub fn device_id(&self) -> &str {
        match self {
            DeviceCommand::ChangeMode { device_id, .. }
            | DeviceCommand::RainDelay { device_id, .. }
            | DeviceCommand::RunProgram { device_id, .. } => device_id,
        }
    }

    /// Last path segment of the device endpoint this command is posted to
    pub fn action(&self) -> &'static str {
        match self {
            DeviceCommand::ChangeMode {
                mode: WateringMode::Manual,
                ..
            } => "manual_watering",
            DeviceCommand::ChangeMode {
                mode: WateringMode::Auto,
                ..
            } => "stop",
            DeviceCommand::RainDelay { .. } => "rain_delay",
            DeviceCommand::RunProgram { .. } => "run",
        }
    }
}

/// Enable or disable a timer program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramToggle {
    #[serde(skip)]
    pub program_id: ResourceId,
    pub enabled: bool,
}
