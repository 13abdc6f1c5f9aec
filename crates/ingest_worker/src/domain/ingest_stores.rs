use common::domain::{
    Device, DeviceGroup, DeviceGroupMembership, RawDevice, RawDeviceGroup, RawMembership,
    RawRecordStore, ReferenceRecord,
};
use std::sync::Arc;

/// Keyed caches written by inbound consumption, one per record kind
#[derive(Clone)]
pub struct IngestStores {
    pub raw_devices: Arc<dyn RawRecordStore<RawDevice>>,
    pub raw_device_groups: Arc<dyn RawRecordStore<RawDeviceGroup>>,
    pub raw_memberships: Arc<dyn RawRecordStore<RawMembership>>,
    pub device_types: Arc<dyn RawRecordStore<ReferenceRecord>>,
    pub platforms: Arc<dyn RawRecordStore<ReferenceRecord>>,
    pub org_units: Arc<dyn RawRecordStore<ReferenceRecord>>,
    pub device_snapshots: Arc<dyn RawRecordStore<Device>>,
    pub device_group_snapshots: Arc<dyn RawRecordStore<DeviceGroup>>,
    pub membership_snapshots: Arc<dyn RawRecordStore<DeviceGroupMembership>>,
}
