mod config;

use common::domain::{
    Device, DeviceGroup, DeviceGroupMembership, RawDevice, RawDeviceGroup, RawMembership,
    ReferenceRecord,
};
use common::memory::InMemoryRecordStore;
use common::nats::NatsClient;
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use crate::config::ServiceConfig;
use factory_runner::Runner;
use ingest_worker::domain::{IngestStores, RecordIngestService};
use ingest_worker::ingest_worker::{IngestWorker, IngestWorkerConfig};
use publisher_worker::domain::ReferenceStores;
use publisher_worker::publisher_worker::{PublisherStores, PublisherWorker, PublisherWorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        otel_endpoint = %config.otel_endpoint,
        "Starting device-factory service"
    );
    debug!("Configuration: {:?}", config);

    let nats_client = match initialize_nats(&config).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to initialize NATS: {:#}", e);
            std::process::exit(1);
        }
    };

    let stores = Stores::new();

    let ingest_service = Arc::new(RecordIngestService::new(stores.ingest_stores()));
    let ingest_worker = match IngestWorker::new(
        &nats_client,
        ingest_service,
        IngestWorkerConfig {
            streams: config.inbound_streams(),
            consumer_prefix: config.consumer_prefix.clone(),
            nats_batch_size: config.nats_batch_size,
            nats_batch_wait_secs: config.nats_batch_wait_secs,
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to initialize ingest worker: {:#}", e);
            std::process::exit(1);
        }
    };

    let publisher_worker = PublisherWorker::new(
        stores.publisher_stores(),
        nats_client.create_publisher_client(),
        PublisherWorkerConfig {
            device_stream: config.published_device_stream.clone(),
            device_group_stream: config.published_device_group_stream.clone(),
            membership_stream: config.published_membership_stream.clone(),
            device_schedule: config.device_schedule(),
            device_group_schedule: config.device_group_schedule(),
            membership_schedule: config.membership_schedule(),
            status_config: config.status_config(),
        },
    );

    let mut runner = Runner::new();

    for (name, process) in ingest_worker.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }
    for (name, process) in publisher_worker.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }

    runner = runner
        .with_closer({
            let nats_for_close = Arc::clone(&nats_client);
            move || {
                Box::pin(async move {
                    info!("Running cleanup tasks...");
                    if let Ok(client) = Arc::try_unwrap(nats_for_close) {
                        client.close().await;
                    }

                    shutdown_telemetry(telemetry_providers);

                    info!("Cleanup complete");
                    Ok(())
                })
            }
        })
        .with_closer_timeout(Duration::from_secs(10));

    drop(nats_client);
    runner.run().await;
}

async fn initialize_nats(config: &ServiceConfig) -> anyhow::Result<NatsClient> {
    info!(url = %config.nats_url, "Connecting to NATS...");
    let client = NatsClient::connect(
        &config.nats_url,
        Duration::from_secs(config.startup_timeout_secs),
    )
    .await?;

    let outbound = [
        &config.published_device_stream,
        &config.published_device_group_stream,
        &config.published_membership_stream,
    ];
    let mut streams: Vec<String> = config
        .inbound_streams()
        .into_iter()
        .map(|(_, stream)| stream)
        .collect();
    for stream in outbound {
        if !streams.contains(stream) {
            streams.push(stream.clone());
        }
    }

    for stream in &streams {
        client.ensure_stream(stream).await?;
    }

    info!(stream_count = streams.len(), "NATS initialized");
    Ok(client)
}

/// Keyed caches shared between ingestion (writer) and the publishers (readers)
struct Stores {
    raw_devices: Arc<InMemoryRecordStore<RawDevice>>,
    raw_device_groups: Arc<InMemoryRecordStore<RawDeviceGroup>>,
    raw_memberships: Arc<InMemoryRecordStore<RawMembership>>,
    device_types: Arc<InMemoryRecordStore<ReferenceRecord>>,
    platforms: Arc<InMemoryRecordStore<ReferenceRecord>>,
    org_units: Arc<InMemoryRecordStore<ReferenceRecord>>,
    device_snapshots: Arc<InMemoryRecordStore<Device>>,
    device_group_snapshots: Arc<InMemoryRecordStore<DeviceGroup>>,
    membership_snapshots: Arc<InMemoryRecordStore<DeviceGroupMembership>>,
}

impl Stores {
    fn new() -> Self {
        Self {
            raw_devices: Arc::new(InMemoryRecordStore::new()),
            raw_device_groups: Arc::new(InMemoryRecordStore::new()),
            raw_memberships: Arc::new(InMemoryRecordStore::new()),
            device_types: Arc::new(InMemoryRecordStore::new()),
            platforms: Arc::new(InMemoryRecordStore::new()),
            org_units: Arc::new(InMemoryRecordStore::new()),
            device_snapshots: Arc::new(InMemoryRecordStore::new()),
            device_group_snapshots: Arc::new(InMemoryRecordStore::new()),
            membership_snapshots: Arc::new(InMemoryRecordStore::new()),
        }
    }

    fn ingest_stores(&self) -> IngestStores {
        IngestStores {
            raw_devices: self.raw_devices.clone(),
            raw_device_groups: self.raw_device_groups.clone(),
            raw_memberships: self.raw_memberships.clone(),
            device_types: self.device_types.clone(),
            platforms: self.platforms.clone(),
            org_units: self.org_units.clone(),
            device_snapshots: self.device_snapshots.clone(),
            device_group_snapshots: self.device_group_snapshots.clone(),
            membership_snapshots: self.membership_snapshots.clone(),
        }
    }

    fn publisher_stores(&self) -> PublisherStores {
        PublisherStores {
            raw_devices: self.raw_devices.clone(),
            raw_device_groups: self.raw_device_groups.clone(),
            raw_memberships: self.raw_memberships.clone(),
            references: ReferenceStores {
                device_types: self.device_types.clone(),
                platforms: self.platforms.clone(),
                org_units: self.org_units.clone(),
            },
            device_snapshots: self.device_snapshots.clone(),
            device_group_snapshots: self.device_group_snapshots.clone(),
            membership_snapshots: self.membership_snapshots.clone(),
        }
    }
}
