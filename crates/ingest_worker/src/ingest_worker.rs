use crate::domain::RecordIngestService;
use crate::nats::create_ingest_processor;
use common::domain::RecordKind;
use common::nats::{NatsClient, NatsConsumer};
use factory_runner::AppProcess;
use std::sync::Arc;
use tracing::info;

pub struct IngestWorkerConfig {
    /// Stream consumed for each record kind
    pub streams: Vec<(RecordKind, String)>,
    /// Prefix for durable consumer names
    pub consumer_prefix: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
}

/// One durable consumer per inbound record kind
pub struct IngestWorker {
    consumers: Vec<(RecordKind, NatsConsumer)>,
}

impl IngestWorker {
    pub async fn new(
        nats_client: &NatsClient,
        service: Arc<RecordIngestService>,
        config: IngestWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!(stream_count = config.streams.len(), "Initializing ingest worker");

        let mut consumers = Vec::with_capacity(config.streams.len());
        for (kind, stream) in config.streams {
            let consumer = NatsConsumer::new(
                nats_client.jetstream(),
                &stream,
                &format!("{}-{}", config.consumer_prefix, kind),
                config.nats_batch_size,
                config.nats_batch_wait_secs,
                create_ingest_processor(kind, Arc::clone(&service)),
            )
            .await?;
            consumers.push((kind, consumer));
        }

        info!("Ingest worker initialized");
        Ok(Self { consumers })
    }

    pub fn into_runner_processes(self) -> Vec<(String, AppProcess)> {
        self.consumers
            .into_iter()
            .map(|(kind, consumer)| {
                let process: AppProcess =
                    Box::new(move |ctx| Box::pin(async move { consumer.run(ctx).await }));
                (format!("{}_consumer", kind), process)
            })
            .collect()
    }
}
