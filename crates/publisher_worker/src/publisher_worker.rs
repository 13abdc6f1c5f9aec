use crate::domain::{
    DeviceGroupService, DeviceService, DiffPolicy, IncrementalPublisher, LinkedEntityResolver,
    MembershipService, PublishSchedule, ReferenceStores, StatusConfig,
};
use crate::nats::NatsEntityProducer;
use common::domain::{
    Device, DeviceGroup, DeviceGroupMembership, PublishableEntity, RawDevice, RawDeviceGroup,
    RawMembership, RawRecordStore, SnapshotStore,
};
use common::nats::JetStreamPublisher;
use factory_runner::AppProcess;
use std::sync::Arc;
use tracing::info;

pub struct PublisherWorkerConfig {
    pub device_stream: String,
    pub device_group_stream: String,
    pub membership_stream: String,
    pub device_schedule: PublishSchedule,
    pub device_group_schedule: PublishSchedule,
    pub membership_schedule: PublishSchedule,
    pub status_config: StatusConfig,
}

/// Stores the publishers read from
pub struct PublisherStores {
    pub raw_devices: Arc<dyn RawRecordStore<RawDevice>>,
    pub raw_device_groups: Arc<dyn RawRecordStore<RawDeviceGroup>>,
    pub raw_memberships: Arc<dyn RawRecordStore<RawMembership>>,
    pub references: ReferenceStores,
    pub device_snapshots: Arc<dyn SnapshotStore<Device>>,
    pub device_group_snapshots: Arc<dyn SnapshotStore<DeviceGroup>>,
    pub membership_snapshots: Arc<dyn SnapshotStore<DeviceGroupMembership>>,
}

struct ScheduledPublisher<E: PublishableEntity> {
    publisher: Arc<IncrementalPublisher<E>>,
    schedule: PublishSchedule,
}

impl<E: PublishableEntity> ScheduledPublisher<E> {
    fn into_runner_process(self) -> AppProcess {
        Box::new(move |ctx| {
            Box::pin(async move { self.publisher.run_scheduled(self.schedule, ctx).await })
        })
    }
}

/// The three entity publishers, each on its own schedule
pub struct PublisherWorker {
    devices: ScheduledPublisher<Device>,
    device_groups: ScheduledPublisher<DeviceGroup>,
    memberships: ScheduledPublisher<DeviceGroupMembership>,
}

impl PublisherWorker {
    pub fn new(
        stores: PublisherStores,
        jetstream: Arc<dyn JetStreamPublisher>,
        config: PublisherWorkerConfig,
    ) -> Self {
        info!("Initializing publisher worker");

        let resolver = LinkedEntityResolver::new(stores.references);

        let devices = IncrementalPublisher::new(
            Arc::new(DeviceService::new(
                stores.raw_devices,
                resolver.clone(),
                config.status_config,
            )),
            stores.device_snapshots,
            Arc::new(NatsEntityProducer::<Device>::new(
                jetstream.clone(),
                config.device_stream,
            )),
            DiffPolicy::Structural,
        );

        let device_groups = IncrementalPublisher::new(
            Arc::new(DeviceGroupService::new(stores.raw_device_groups, resolver)),
            stores.device_group_snapshots,
            Arc::new(NatsEntityProducer::<DeviceGroup>::new(
                jetstream.clone(),
                config.device_group_stream,
            )),
            DiffPolicy::Structural,
        );

        // Memberships never change once formed, so only creation is tracked
        let memberships = IncrementalPublisher::new(
            Arc::new(MembershipService::new(stores.raw_memberships)),
            stores.membership_snapshots,
            Arc::new(NatsEntityProducer::<DeviceGroupMembership>::new(
                jetstream,
                config.membership_stream,
            )),
            DiffPolicy::PresenceOnly,
        );

        Self {
            devices: ScheduledPublisher {
                publisher: Arc::new(devices),
                schedule: config.device_schedule,
            },
            device_groups: ScheduledPublisher {
                publisher: Arc::new(device_groups),
                schedule: config.device_group_schedule,
            },
            memberships: ScheduledPublisher {
                publisher: Arc::new(memberships),
                schedule: config.membership_schedule,
            },
        }
    }

    /// One named process per publisher
    pub fn into_runner_processes(self) -> Vec<(String, AppProcess)> {
        vec![
            (
                format!("{}_publisher", Device::KIND),
                self.devices.into_runner_process(),
            ),
            (
                format!("{}_publisher", DeviceGroup::KIND),
                self.device_groups.into_runner_process(),
            ),
            (
                format!("{}_publisher", DeviceGroupMembership::KIND),
                self.memberships.into_runner_process(),
            ),
        ]
    }
}
