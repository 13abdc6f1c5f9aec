use async_trait::async_trait;
use common::domain::{DomainResult, PublishableEntity, RawRecord, RawRecordStore};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::{debug, warn};

/// Result of one pass over a raw record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityScan<E> {
    /// Raw records read, including duplicates and rejected ones
    pub records: usize,
    /// Successfully built entities in encounter order
    pub entities: Vec<E>,
}

/// Bulk enumeration of every entity that currently builds successfully
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EntitySource<E: Send + Sync + 'static>: Send + Sync {
    async fn scan(&self) -> DomainResult<EntityScan<E>>;

    async fn get_all_valid(&self) -> DomainResult<Vec<E>> {
        Ok(self.scan().await?.entities)
    }
}

/// Builds one denormalized entity from one raw record
#[async_trait]
pub trait EntityBuilder: Send + Sync {
    type Raw: RawRecord + Clone + Eq + Hash + Send + Sync + 'static;
    type Entity: PublishableEntity;

    fn raw_records(&self) -> &dyn RawRecordStore<Self::Raw>;

    /// Build the entity or reject the record.
    ///
    /// Rejections are errors for which [`common::domain::DomainError::is_rejection`]
    /// holds; any other error is a store failure.
    async fn build(&self, raw: &Self::Raw) -> DomainResult<Self::Entity>;
}

/// Scan the builder's raw store and build every distinct record.
///
/// Structurally identical records are built once. Rejected records are logged
/// and left out; the first store failure aborts the scan. Output keeps the
/// store's encounter order.
pub async fn collect_valid<B: EntityBuilder>(builder: &B) -> DomainResult<EntityScan<B::Entity>> {
    let records = builder.raw_records().get_all().await?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut entities = Vec::with_capacity(records.len());

    for raw in &records {
        if !seen.insert(raw) {
            debug!(
                entity = %<B::Entity as PublishableEntity>::KIND,
                source_id = %raw.source_id(),
                "skipping duplicate raw record"
            );
            continue;
        }

        match builder.build(raw).await {
            Ok(entity) => entities.push(entity),
            Err(e) if e.is_rejection() => {
                warn!(
                    entity = %<B::Entity as PublishableEntity>::KIND,
                    source_id = %raw.source_id(),
                    reason = %e,
                    "Skipping record that failed to build"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(EntityScan {
        records: records.len(),
        entities,
    })
}
