use serde::{Deserialize, Serialize};

/// A registered one-wire temperature sensor.
///
/// `id` is the externally assigned device address (e.g. `28-00000a2b3c4d`)
/// and the unique registry key. `name` and `pin` are informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pin: Option<u32>,
}

impl Sensor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            pin: None,
        }
    }
}

/// One reading produced by a single poll cycle or request. Never persisted.
///
/// Serializes with the temperature under `temp`, the field downstream
/// consumers key on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: String,
    #[serde(rename = "temp")]
    pub temperature_c: f64,
    pub valid: bool,
}
