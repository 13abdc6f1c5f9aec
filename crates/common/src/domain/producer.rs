use crate::domain::result::DomainResult;
use async_trait::async_trait;

/// Outbound feed for denormalized entities.
///
/// Delivery guarantees belong to the implementation; callers treat a returned
/// `Ok` as handed off.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EntityProducer<E: Send + Sync + 'static>: Send + Sync {
    async fn publish(&self, key: &str, entity: &E) -> DomainResult<()>;
}
