use crate::{parse_w1_slave, Result, SensorError, SensorRegistry};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::warn;

/// The read pipeline: registry lookup, device file read, parse, CRC check.
#[derive(Debug, Clone)]
pub struct SensorReader {
    registry: SensorRegistry,
    base_dir: PathBuf,
}

impl SensorReader {
    pub fn new(registry: SensorRegistry, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            base_dir: base_dir.into(),
        }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Read a single sensor and return its temperature in Celsius.
    ///
    /// An unregistered sensor or missing device file is `NotFound`; other I/O
    /// errors, malformed driver text, and CRC mismatches are `Read`. A
    /// temperature extracted from a record whose CRC token is not `YES` is
    /// never returned.
    pub async fn read_one(&self, id: &str) -> Result<f64> {
        let sensor = self
            .registry
            .lookup(id)
            .await
            .ok_or_else(|| SensorError::NotFound(format!("sensor not registered: {id}")))?;

        let path = self.base_dir.join(&sensor.id).join("w1_slave");
        let content = read_device_file(&path).await?;

        let (crc_ok, temp_c) = parse_w1_slave(&content)
            .map_err(|err| SensorError::Read(format!("failed to parse sensor {id}: {err}")))?;
        if !crc_ok {
            return Err(SensorError::Read(format!("CRC check failed for sensor {id}")));
        }
        Ok(temp_c)
    }

    /// Read every registered sensor concurrently.
    ///
    /// Failures never propagate: each failed sensor is logged and reported as
    /// `None`. The result holds exactly the ids registered at the moment the
    /// call started, so the aggregate always succeeds structurally.
    pub async fn read_all(&self) -> HashMap<String, Option<f64>> {
        let ids = self.registry.ids().await;
        let mut readings: HashMap<String, Option<f64>> =
            ids.iter().map(|id| (id.clone(), None)).collect();

        let mut tasks = JoinSet::new();
        for id in ids {
            let reader = self.clone();
            tasks.spawn(async move {
                let result = reader.read_one(&id).await;
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(temp_c))) => {
                    readings.insert(id, Some(temp_c));
                }
                Ok((id, Err(err))) => {
                    warn!("failed reading sensor {id}: {err}");
                }
                // A panicked read task; its id already maps to None.
                Err(err) => {
                    warn!("sensor read task aborted: {err}");
                }
            }
        }
        readings
    }
}

async fn read_device_file(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(SensorError::NotFound(format!(
            "file not found: {}",
            path.display()
        ))),
        Err(err) => Err(SensorError::Read(format!(
            "failed to read {}: {err}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sensor;
    use std::fs;

    const GOOD: &str = "aa bb : crc=e1 YES\naa bb t=21500\n";
    const BAD_CRC: &str = "aa bb : crc=e1 NO\naa bb t=21500\n";

    fn write_device(base: &Path, id: &str, content: &str) {
        let dir = base.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("w1_slave"), content).unwrap();
    }

    async fn reader_with(base: &Path, ids: &[&str]) -> SensorReader {
        let registry = SensorRegistry::new();
        for id in ids {
            registry.add(Sensor::new(*id)).await;
        }
        SensorReader::new(registry, base)
    }

    #[tokio::test]
    async fn read_one_returns_celsius() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-0001", GOOD);
        let reader = reader_with(tmp.path(), &["28-0001"]).await;

        let temp = reader.read_one("28-0001").await.unwrap();
        assert_eq!(temp, 21.5);
    }

    #[tokio::test]
    async fn unregistered_sensor_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let reader = reader_with(tmp.path(), &[]).await;

        let err = reader.read_one("28-0001").await.unwrap_err();
        assert!(matches!(err, SensorError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_device_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let reader = reader_with(tmp.path(), &["28-0001"]).await;

        let err = reader.read_one("28-0001").await.unwrap_err();
        assert!(matches!(err, SensorError::NotFound(_)));
    }

    #[tokio::test]
    async fn crc_failure_is_a_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-0001", BAD_CRC);
        let reader = reader_with(tmp.path(), &["28-0001"]).await;

        let err = reader.read_one("28-0001").await.unwrap_err();
        assert!(matches!(err, SensorError::Read(_)));
        assert!(err.to_string().contains("CRC"));
    }

    #[tokio::test]
    async fn malformed_text_is_wrapped_as_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-0001", "one line only\n");
        let reader = reader_with(tmp.path(), &["28-0001"]).await;

        let err = reader.read_one("28-0001").await.unwrap_err();
        assert!(matches!(err, SensorError::Read(_)));
        assert!(err.to_string().contains("failed to parse sensor 28-0001"));
    }

    #[tokio::test]
    async fn read_all_isolates_per_sensor_failures() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-000a", GOOD);
        // 28-000b has no device file at all.
        write_device(tmp.path(), "28-000c", BAD_CRC);
        let reader = reader_with(tmp.path(), &["28-000a", "28-000b", "28-000c"]).await;

        let readings = reader.read_all().await;
        assert_eq!(readings.len(), 3);
        assert_eq!(readings["28-000a"], Some(21.5));
        assert_eq!(readings["28-000b"], None);
        assert_eq!(readings["28-000c"], None);
    }

    #[tokio::test]
    async fn read_all_with_no_sensors_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let reader = reader_with(tmp.path(), &[]).await;
        assert!(reader.read_all().await.is_empty());
    }
}
