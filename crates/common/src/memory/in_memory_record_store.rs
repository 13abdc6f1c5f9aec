use crate::domain::{DomainResult, RawRecordStore, ReferenceStore, SnapshotStore};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory keyed cache backing raw, reference and snapshot stores.
///
/// Keeps first-insertion order so full scans are deterministic; overwriting a
/// key keeps its position. Readers and writers are serialized by a `RwLock`,
/// so a scan never observes a half-written entry.
pub struct InMemoryRecordStore<V> {
    records: Arc<RwLock<IndexMap<String, V>>>,
}

impl<V> InMemoryRecordStore<V> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<V> Default for InMemoryRecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for InMemoryRecordStore<V> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl<V> RawRecordStore<V> for InMemoryRecordStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get_all(&self) -> DomainResult<Vec<V>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<V>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn put(&self, id: String, value: V) -> DomainResult<()> {
        let mut records = self.records.write().await;
        records.insert(id, value);
        Ok(())
    }

    async fn contains(&self, id: &str) -> DomainResult<bool> {
        let records = self.records.read().await;
        Ok(records.contains_key(id))
    }
}

#[async_trait]
impl<V> ReferenceStore<V> for InMemoryRecordStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: &str) -> DomainResult<Option<V>> {
        RawRecordStore::get(self, id).await
    }
}

#[async_trait]
impl<V> SnapshotStore<V> for InMemoryRecordStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, identity: &str) -> DomainResult<Option<V>> {
        RawRecordStore::get(self, identity).await
    }

    async fn contains(&self, identity: &str) -> DomainResult<bool> {
        RawRecordStore::contains(self, identity).await
    }
}
