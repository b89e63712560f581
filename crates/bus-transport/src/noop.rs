use crate::{MessageBus, Result};
use async_trait::async_trait;
use tracing::debug;

/// A disabled transport. Accepts every call and drops every payload.
///
/// Used when no broker is configured or reachable, so the read path keeps
/// working while publishing is unavailable.
#[derive(Debug, Default, Clone)]
pub struct NoopBus;

#[async_trait]
impl MessageBus for NoopBus {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        debug!("noop transport dropping {} bytes for {}", payload.len(), topic);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}
