use crate::{BrokerConfig, MessageBus, Result, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    connected: bool,
    published: Vec<(String, Vec<u8>)>,
    fail_connect: bool,
    fail_topics: Vec<String>,
}

/// A simple in-process mock bus. Records every publish so flows are testable,
/// and can be armed to fail connects or publishes to selected topics.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    config: BrokerConfig,
    state: Arc<Mutex<MockState>>,
}

impl MockBus {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            state: Arc::default(),
        }
    }

    /// Arm the next (and every subsequent) `connect` call to fail.
    pub async fn fail_connect(&self) {
        self.state.lock().await.fail_connect = true;
    }

    /// Arm publishes to `topic` to fail while others succeed.
    pub async fn fail_topic(&self, topic: &str) {
        self.state.lock().await.fail_topics.push(topic.to_string());
    }

    /// Everything published so far, in publish order.
    pub async fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().await.published.clone()
    }

    pub fn broker(&self) -> &BrokerConfig {
        &self.config
    }
}

#[async_trait]
impl MessageBus for MockBus {
    async fn connect(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_connect {
            return Err(TransportError::Connect(format!(
                "mock broker {}:{} unreachable",
                self.config.host, self.config.port
            )));
        }
        state.connected = true;
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_topics.iter().any(|t| t == topic) {
            return Err(TransportError::Publish {
                topic: topic.to_string(),
                reason: "mock topic armed to fail".to_string(),
            });
        }
        state.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.lock().await.connected = false;
        Ok(())
    }
}
