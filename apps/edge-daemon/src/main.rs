use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use bus_transport::{BrokerConfig, MessageBus, MockBus, NoopBus};
use poll_publish::Poller;
use sensor_registry::{Sensor, SensorReader, SensorRegistry, DEFAULT_DEVICES_BASE};

#[derive(Parser, Debug)]
#[command(
    name = "edge-daemon",
    version,
    about = "One-wire temperature edge daemon"
)]
struct Args {
    /// Message broker host
    #[arg(long, default_value = "localhost")]
    broker_host: String,

    /// Message broker port
    #[arg(long, default_value_t = 1883)]
    broker_port: u16,

    /// Broker username
    #[arg(long)]
    broker_username: Option<String>,

    /// Broker password
    #[arg(long)]
    broker_password: Option<String>,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 10.0)]
    poll_interval: f64,

    /// Base directory of the one-wire sysfs tree
    #[arg(long, default_value = DEFAULT_DEVICES_BASE)]
    devices_base: String,

    /// Sensor to register at startup, as id[:name[:pin]] (repeatable)
    #[arg(long = "sensor", value_name = "SPEC")]
    sensors: Vec<String>,

    /// Use the in-process mock transport (portable, records publishes)
    #[arg(long, action = ArgAction::SetTrue)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    anyhow::ensure!(
        args.poll_interval.is_finite() && args.poll_interval > 0.0,
        "poll interval must be a positive number of seconds"
    );

    info!("edge daemon starting");

    let registry = SensorRegistry::new();
    for spec in &args.sensors {
        let sensor = parse_sensor_spec(spec)?;
        registry.add(sensor).await;
    }
    let reader = SensorReader::new(registry, args.devices_base.as_str());

    let broker = BrokerConfig {
        host: args.broker_host,
        port: args.broker_port,
        username: args.broker_username,
        password: args.broker_password,
    };
    let bus: Arc<dyn MessageBus> = if args.mock {
        Arc::new(MockBus::new(broker))
    } else {
        warn!("no broker backend configured; readings will not be published");
        Arc::new(NoopBus)
    };

    // Best-effort: a dead broker must not take the read path down with it.
    if let Err(err) = bus.connect().await {
        warn!("broker connection failed, continuing without publishing: {err}");
    }

    let interval = Duration::from_secs_f64(args.poll_interval);
    let poller = Poller::new(reader, bus.clone(), interval).spawn();

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    poller.shutdown().await;
    if let Err(err) = bus.disconnect().await {
        warn!("broker disconnect failed: {err}");
    }

    info!("edge daemon stopped");
    Ok(())
}

/// Parse an `id[:name[:pin]]` sensor registration spec.
fn parse_sensor_spec(spec: &str) -> Result<Sensor> {
    let mut parts = spec.splitn(3, ':');
    let id = parts
        .next()
        .filter(|id| !id.is_empty())
        .with_context(|| format!("empty sensor id in spec '{spec}'"))?;
    let mut sensor = Sensor::new(id);
    sensor.name = parts.next().filter(|name| !name.is_empty()).map(String::from);
    if let Some(pin) = parts.next() {
        sensor.pin = Some(
            pin.parse()
                .with_context(|| format!("invalid pin '{pin}' in spec '{spec}'"))?,
        );
    }
    Ok(sensor)
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
