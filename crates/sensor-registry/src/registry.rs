use crate::Sensor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Concurrency-safe mapping of sensor id to sensor metadata.
///
/// The handle is cheap to clone; all clones share one map. Reads take the
/// shared side of the lock and may overlap each other, mutations take the
/// exclusive side. No operation performs I/O while holding the lock, so the
/// registry never blocks the read pipeline on the filesystem.
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    sensors: Arc<RwLock<HashMap<String, Sensor>>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a sensor by id. Never fails.
    pub async fn add(&self, sensor: Sensor) {
        let id = sensor.id.clone();
        self.sensors.write().await.insert(id.clone(), sensor);
        info!("added sensor {id}");
    }

    /// Remove a sensor if present. Absent ids are a no-op.
    pub async fn remove(&self, id: &str) {
        if self.sensors.write().await.remove(id).is_some() {
            info!("removed sensor {id}");
        }
    }

    /// Snapshot of all registered sensors at the instant of the call.
    pub async fn list(&self) -> Vec<Sensor> {
        self.sensors.read().await.values().cloned().collect()
    }

    /// Snapshot of the registered ids.
    pub async fn ids(&self) -> Vec<String> {
        self.sensors.read().await.keys().cloned().collect()
    }

    pub async fn lookup(&self, id: &str) -> Option<Sensor> {
        self.sensors.read().await.get(id).cloned()
    }
}
