use crate::Result;
use async_trait::async_trait;

/// A minimal async publish-side interface to a message bus.
///
/// Every operation is fallible and recoverable: a failed `connect` leaves the
/// rest of the process functional, and callers are expected to treat a failed
/// `publish` as best-effort loss, not a fatal condition. Reconnect policy
/// belongs to the backend, never to the caller.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Establish the broker connection.
    async fn connect(&self) -> Result<()>;

    /// Publish one payload to a topic.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Tear down the connection. Idempotent.
    async fn disconnect(&self) -> Result<()>;
}
