//! bus-transport: message-bus publish abstractions
//!
//! This crate provides the trait and types for publishing sensor telemetry to a
//! message broker, with feature-gated backends. The default build enables a `mock`
//! backend so that binaries and tests can run on any host without a live broker.

mod types;
pub use types::BrokerConfig;

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::MessageBus;

mod noop;
pub use noop::NoopBus;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockBus;
