use crate::domain::EntitySource;
use common::domain::{DomainResult, EntityProducer, PublishableEntity, SnapshotStore};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

/// How a built entity is compared against its last published snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffPolicy {
    /// Publish when the snapshot is missing or differs structurally
    Structural,
    /// Publish only when no snapshot exists for the identity
    PresenceOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Scanning,
    Diffing,
    Publishing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Raw records read
    pub scanned: usize,
    /// Distinct entity identities that built successfully
    pub built: usize,
    pub published: usize,
    pub unchanged: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle of the same publisher was still running
    Skipped,
}

/// Scan, diff and publish loop for one entity type.
///
/// Snapshots are never written here; they reflect published entities once the
/// outbound feed is consumed back.
pub struct IncrementalPublisher<E: PublishableEntity> {
    source: Arc<dyn EntitySource<E>>,
    snapshots: Arc<dyn SnapshotStore<E>>,
    producer: Arc<dyn EntityProducer<E>>,
    diff_policy: DiffPolicy,
    cycle_lock: Mutex<()>,
    state: watch::Sender<CycleState>,
}

impl<E: PublishableEntity> IncrementalPublisher<E> {
    pub fn new(
        source: Arc<dyn EntitySource<E>>,
        snapshots: Arc<dyn SnapshotStore<E>>,
        producer: Arc<dyn EntityProducer<E>>,
        diff_policy: DiffPolicy,
    ) -> Self {
        Self {
            source,
            snapshots,
            producer,
            diff_policy,
            cycle_lock: Mutex::new(()),
            state: watch::Sender::new(CycleState::Idle),
        }
    }

    pub fn state(&self) -> CycleState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    /// Run one cycle unless one is already in progress.
    ///
    /// Store failures abort the cycle and are returned; a failed publish of a
    /// single entity is counted and the rest of the batch continues.
    #[instrument(skip(self), fields(entity = %E::KIND))]
    pub async fn run_cycle(&self) -> DomainResult<CycleOutcome> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            warn!("previous cycle still running, skipping trigger");
            return Ok(CycleOutcome::Skipped);
        };

        let result = self.execute_cycle().await;
        self.state.send_replace(CycleState::Idle);

        result.map(CycleOutcome::Completed)
    }

    async fn execute_cycle(&self) -> DomainResult<CycleReport> {
        self.state.send_replace(CycleState::Scanning);
        let scan = self.source.scan().await?;
        let entities = scan.entities;

        self.state.send_replace(CycleState::Diffing);
        let mut identities = HashSet::with_capacity(entities.len());
        let mut changed = Vec::new();
        for entity in &entities {
            // Distinct records may still share an identity; the first one wins
            if !identities.insert(entity.identity()) {
                debug!(key = %entity.identity(), "identity already selected this cycle");
                continue;
            }
            if self.needs_publish(entity).await? {
                changed.push(entity);
            }
        }

        self.state.send_replace(CycleState::Publishing);
        let mut report = CycleReport {
            scanned: scan.records,
            built: identities.len(),
            unchanged: identities.len() - changed.len(),
            ..Default::default()
        };

        for entity in changed {
            let key = entity.identity();
            match self.producer.publish(&key, entity).await {
                Ok(()) => {
                    info!(key = %key, "Published {}", E::KIND);
                    report.published += 1;
                }
                Err(e) => {
                    error!(key = %key, error = %e, "Failed to publish {}, retrying next cycle", E::KIND);
                    report.failed += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            built = report.built,
            published = report.published,
            unchanged = report.unchanged,
            failed = report.failed,
            "Found {} {}, published {}",
            report.scanned,
            E::KIND.plural(),
            report.published
        );

        Ok(report)
    }

    async fn needs_publish(&self, entity: &E) -> DomainResult<bool> {
        let identity = entity.identity();

        let publish = match self.diff_policy {
            DiffPolicy::PresenceOnly => !self.snapshots.contains(&identity).await?,
            DiffPolicy::Structural => {
                self.snapshots.get(&identity).await?.as_ref() != Some(entity)
            }
        };

        if !publish {
            debug!(key = %identity, "unchanged since last publish");
        }

        Ok(publish)
    }
}
