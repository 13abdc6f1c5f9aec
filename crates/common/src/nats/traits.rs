use anyhow::Result;
use async_nats::HeaderMap;
use async_trait::async_trait;

/// Trait for JetStream publish operations
/// Abstracts publishing so producers can be tested without a broker
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait JetStreamPublisher: Send + Sync {
    /// Publish a message with headers to a subject and await acknowledgment
    async fn publish(&self, subject: String, headers: HeaderMap, payload: bytes::Bytes)
        -> Result<()>;
}
