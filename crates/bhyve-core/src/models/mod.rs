//! Data models for the dashboard proxy.
//!
//! - `ResourceId`: identifiers the upstream API hands out as numbers or strings
//! - Request types: inbound dashboard payloads, validated before any upstream call
//! - `DeviceCommand`, `ProgramToggle`: payloads sent to the upstream API

pub mod commands;
pub mod requests;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use commands::{DeviceCommand, ProgramToggle, Station, WateringMode};
pub use requests::{
    DeviceRequest, EventsQuery, LoginRequest, RainDelayRequest, RunProgramRequest,
    StartZoneRequest, ToggleProgramRequest,
};

/// Identifier issued by the upstream API.
///
/// Orbit returns some ids as JSON numbers and others as strings, so both are
/// accepted and echoed back in the form they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Numeric(i64),
    Text(String),
}

impl ResourceId {
    pub fn is_blank(&self) -> bool {
        match self {
            ResourceId::Numeric(_) => false,
            ResourceId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Numeric(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        ResourceId::Numeric(n)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId::Text(s.to_string())
    }
}

/// The user id returned alongside a session token.
pub type UserId = ResourceId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_accepts_numbers_and_strings() {
        let n: ResourceId = serde_json::from_str("42").unwrap();
        assert_eq!(n, ResourceId::Numeric(42));
        assert_eq!(serde_json::to_string(&n).unwrap(), "42");

        let s: ResourceId = serde_json::from_str(r#""5a1b""#).unwrap();
        assert_eq!(s, ResourceId::from("5a1b"));
        assert_eq!(s.to_string(), "5a1b");
    }

    #[test]
    fn test_resource_id_blank() {
        assert!(ResourceId::from("").is_blank());
        assert!(ResourceId::from("  ").is_blank());
        assert!(!ResourceId::from(0).is_blank());
    }
}
