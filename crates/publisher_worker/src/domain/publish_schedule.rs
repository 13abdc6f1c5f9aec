use crate::domain::{CycleOutcome, IncrementalPublisher};
use common::domain::PublishableEntity;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Fixed-delay cadence: the delay is measured from the end of one cycle to the
/// start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSchedule {
    pub initial_delay: Duration,
    pub fixed_delay: Duration,
}

impl PublishSchedule {
    pub fn from_secs(initial_delay_secs: u64, fixed_delay_secs: u64) -> Self {
        Self {
            initial_delay: Duration::from_secs(initial_delay_secs),
            fixed_delay: Duration::from_secs(fixed_delay_secs),
        }
    }
}

/// Sleep for `delay`; returns false if cancelled first
async fn sleep_unless_cancelled(delay: Duration, ctx: &CancellationToken) -> bool {
    tokio::select! {
        _ = ctx.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

impl<E: PublishableEntity> IncrementalPublisher<E> {
    /// Run cycles on `schedule` until `ctx` is cancelled.
    ///
    /// Cancellation is only observed between cycles. A failed cycle is logged
    /// and retried on the next trigger.
    pub async fn run_scheduled(
        &self,
        schedule: PublishSchedule,
        ctx: CancellationToken,
    ) -> anyhow::Result<()> {
        info!(
            entity = %E::KIND,
            initial_delay_secs = schedule.initial_delay.as_secs(),
            fixed_delay_secs = schedule.fixed_delay.as_secs(),
            "Starting publish schedule"
        );

        if sleep_unless_cancelled(schedule.initial_delay, &ctx).await {
            loop {
                match self.run_cycle().await {
                    Ok(CycleOutcome::Completed(report)) => {
                        debug!(entity = %E::KIND, ?report, "publish cycle completed")
                    }
                    Ok(CycleOutcome::Skipped) => {}
                    Err(e) => error!(entity = %E::KIND, error = %e, "Publish cycle aborted"),
                }

                if !sleep_unless_cancelled(schedule.fixed_delay, &ctx).await {
                    break;
                }
            }
        }

        info!(entity = %E::KIND, "Publish schedule stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiffPolicy, EntityScan, MockEntitySource};
    use common::domain::{
        Device, DomainError, MockEntityProducer, MockSnapshotStore,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_publisher(cycles: Arc<AtomicUsize>, fail: bool) -> Arc<IncrementalPublisher<Device>> {
        let mut source = MockEntitySource::<Device>::new();
        source.expect_scan().returning(move || {
            cycles.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(DomainError::StoreAccessFailure(anyhow::anyhow!("offline")))
            } else {
                Ok(EntityScan {
                    records: 0,
                    entities: Vec::new(),
                })
            }
        });

        Arc::new(IncrementalPublisher::new(
            Arc::new(source),
            Arc::new(MockSnapshotStore::<Device>::new()),
            Arc::new(MockEntityProducer::<Device>::new()),
            DiffPolicy::Structural,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay_then_fixed_delay() {
        let cycles = Arc::new(AtomicUsize::new(0));
        let publisher = counting_publisher(cycles.clone(), false);
        let ctx = CancellationToken::new();

        let handle = tokio::spawn({
            let publisher = publisher.clone();
            let ctx = ctx.clone();
            async move {
                publisher
                    .run_scheduled(PublishSchedule::from_secs(10, 60), ctx)
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(cycles.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(cycles.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(cycles.load(Ordering::SeqCst), 2);

        ctx.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_is_retried_next_trigger() {
        let cycles = Arc::new(AtomicUsize::new(0));
        let publisher = counting_publisher(cycles.clone(), true);
        let ctx = CancellationToken::new();

        let handle = tokio::spawn({
            let ctx = ctx.clone();
            async move {
                publisher
                    .run_scheduled(PublishSchedule::from_secs(0, 30), ctx)
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(75)).await;
        assert_eq!(cycles.load(Ordering::SeqCst), 3);

        ctx.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_before_initial_delay_runs_nothing() {
        let cycles = Arc::new(AtomicUsize::new(0));
        let publisher = counting_publisher(cycles.clone(), false);
        let ctx = CancellationToken::new();
        ctx.cancel();

        publisher
            .run_scheduled(PublishSchedule::from_secs(300, 300), ctx)
            .await
            .unwrap();

        assert_eq!(cycles.load(Ordering::SeqCst), 0);
    }
}
