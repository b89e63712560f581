//! poll-publish: background poll-and-publish loop
//!
//! Drives the read pipeline at a fixed interval and republishes each present
//! reading onto the message bus, best-effort. The loop runs until its handle
//! signals shutdown; read and publish failures are logged and never terminate
//! it. Cycles do not overlap: the interval wait for the next cycle starts only
//! after the current read-and-publish phase finishes.

use bus_transport::MessageBus;
use sensor_registry::{Reading, SensorReader};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Topic a sensor's readings are published to.
pub fn topic_for(id: &str) -> String {
    format!("sensors/{id}/temperature")
}

/// The poll-and-publish loop. Construct, then [`Poller::spawn`] to run it.
pub struct Poller {
    reader: SensorReader,
    bus: Arc<dyn MessageBus>,
    interval: Duration,
}

impl Poller {
    pub fn new(reader: SensorReader, bus: Arc<dyn MessageBus>, interval: Duration) -> Self {
        Self {
            reader,
            bus,
            interval,
        }
    }

    /// Run one poll cycle: read all sensors, publish every present reading.
    ///
    /// A publish failure for one sensor does not stop the publishes for the
    /// remaining sensors in the same cycle.
    pub async fn run_once(&self) {
        let readings = self.reader.read_all().await;
        for (id, temp) in readings {
            let Some(temperature_c) = temp else { continue };
            let reading = Reading {
                id: id.clone(),
                temperature_c,
                valid: true,
            };
            let topic = topic_for(&id);
            let payload = match serde_json::to_vec(&reading) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("failed to encode reading for {id}: {err}");
                    continue;
                }
            };
            if let Err(err) = self.bus.publish(&topic, &payload).await {
                debug!("failed to publish {topic}: {err}");
            }
        }
    }

    /// Start the loop on the runtime and return its shutdown handle.
    ///
    /// Cancellation is checked at the top of each cycle and during the
    /// interval wait; a cancel during the read-and-publish phase aborts the
    /// in-flight cycle rather than completing it.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown, mut cancelled) = watch::channel(false);
        let task = tokio::spawn(async move {
            info!("poll loop started, interval {:?}", self.interval);
            loop {
                tokio::select! {
                    _ = cancelled.changed() => break,
                    _ = self.run_once() => {}
                }
                tokio::select! {
                    _ = cancelled.changed() => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
            info!("poll loop stopped");
        });
        PollerHandle { shutdown, task }
    }
}

/// Owning handle for a running loop. Dropping it also stops the loop, since
/// the watch sender side goes away.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal cancellation and wait for the loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            warn!("poll loop task failed during shutdown: {err}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_transport::MockBus;
    use sensor_registry::{Sensor, SensorReader, SensorRegistry};
    use std::fs;
    use std::path::Path;

    fn write_device(base: &Path, id: &str, millidegrees: i64) {
        let dir = base.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("w1_slave"),
            format!("aa bb : crc=e1 YES\naa bb t={millidegrees}\n"),
        )
        .unwrap();
    }

    async fn reader_with(base: &Path, ids: &[&str]) -> SensorReader {
        let registry = SensorRegistry::new();
        for id in ids {
            registry.add(Sensor::new(*id)).await;
        }
        SensorReader::new(registry, base)
    }

    #[test]
    fn topic_embeds_the_sensor_id() {
        assert_eq!(topic_for("28-0001"), "sensors/28-0001/temperature");
    }

    #[tokio::test]
    async fn cycle_publishes_each_present_reading() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-000a", 21500);
        write_device(tmp.path(), "28-000b", -500);
        let reader = reader_with(tmp.path(), &["28-000a", "28-000b", "28-dead"]).await;

        let bus = MockBus::default();
        let poller = Poller::new(reader, Arc::new(bus.clone()), Duration::from_secs(60));
        poller.run_once().await;

        let mut published = bus.published().await;
        published.sort();
        // 28-dead has no device file, so only two publishes happen.
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, "sensors/28-000a/temperature");
        let body: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(body["temp"], 21.5);
        assert_eq!(body["valid"], true);
        let body: serde_json::Value = serde_json::from_slice(&published[1].1).unwrap();
        assert_eq!(body["temp"], -0.5);
    }

    #[tokio::test]
    async fn publish_failure_does_not_suppress_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-000a", 1000);
        write_device(tmp.path(), "28-000b", 2000);
        let reader = reader_with(tmp.path(), &["28-000a", "28-000b"]).await;

        let bus = MockBus::default();
        bus.fail_topic(&topic_for("28-000a")).await;
        let poller = Poller::new(reader, Arc::new(bus.clone()), Duration::from_secs(60));
        poller.run_once().await;

        let published = bus.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "sensors/28-000b/temperature");
    }

    #[tokio::test]
    async fn shutdown_mid_interval_stops_promptly() {
        let tmp = tempfile::tempdir().unwrap();
        write_device(tmp.path(), "28-000a", 1000);
        let reader = reader_with(tmp.path(), &["28-000a"]).await;

        let bus = MockBus::default();
        let poller = Poller::new(reader, Arc::new(bus.clone()), Duration::from_secs(3600));
        let handle = poller.spawn();

        // Let the first cycle complete, then cancel during the hour-long wait.
        tokio::time::sleep(Duration::from_millis(100)).await;
        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .unwrap();

        // Exactly one cycle ran before cancellation.
        assert_eq!(bus.published().await.len(), 1);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_loop() {
        let tmp = tempfile::tempdir().unwrap();
        let reader = reader_with(tmp.path(), &[]).await;
        let poller = Poller::new(
            reader,
            Arc::new(MockBus::default()),
            Duration::from_secs(3600),
        );
        let handle = poller.spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let task = handle.task;
        drop(handle.shutdown);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
