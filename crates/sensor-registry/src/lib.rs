//! sensor-registry: registry of one-wire temperature sensors and the read pipeline
//!
//! Sensors are registered in memory by their one-wire device address. Readings come
//! from the kernel's w1 sysfs tree: each read loads `<base>/<id>/w1_slave`, parses
//! the driver's two-line text record, and validates the embedded CRC token before
//! trusting the temperature.

mod types;
pub use types::{Reading, Sensor};

mod error;
pub use error::{Result, SensorError};

mod parse;
pub use parse::parse_w1_slave;

mod registry;
pub use registry::SensorRegistry;

mod reader;
pub use reader::SensorReader;

/// Conventional sysfs base for one-wire devices on Linux.
pub const DEFAULT_DEVICES_BASE: &str = "/sys/bus/w1/devices";
