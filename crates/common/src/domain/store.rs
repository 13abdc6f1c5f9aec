use crate::domain::result::DomainResult;
use async_trait::async_trait;

/// Keyed cache of the latest upstream record per identifier (last write wins)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RawRecordStore<R: Send + Sync + 'static>: Send + Sync {
    /// Point-in-time copy of every stored record
    async fn get_all(&self) -> DomainResult<Vec<R>>;

    async fn get(&self, id: &str) -> DomainResult<Option<R>>;

    /// Insert or overwrite the record stored under `id`
    async fn put(&self, id: String, value: R) -> DomainResult<()>;

    async fn contains(&self, id: &str) -> DomainResult<bool>;
}

/// Read-only lookup of reference records (device type, platform, org unit)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReferenceStore<T: Send + Sync + 'static>: Send + Sync {
    async fn get(&self, id: &str) -> DomainResult<Option<T>>;
}

/// Last published value per entity identity, used as the diff baseline
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SnapshotStore<E: Send + Sync + 'static>: Send + Sync {
    async fn get(&self, identity: &str) -> DomainResult<Option<E>>;

    async fn contains(&self, identity: &str) -> DomainResult<bool>;
}
