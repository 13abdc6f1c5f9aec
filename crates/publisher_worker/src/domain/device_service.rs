use crate::domain::{
    classify_status, collect_valid, EntityBuilder, EntityScan, EntitySource,
    LinkedEntityResolver, StatusConfig,
};
use async_trait::async_trait;
use common::domain::{
    Device, DomainError, DomainResult, EntityKind, RawDevice, RawRecord, RawRecordStore,
};
use common::garde::validate_struct;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Builds denormalized devices from raw device records
pub struct DeviceService {
    raw_devices: Arc<dyn RawRecordStore<RawDevice>>,
    resolver: LinkedEntityResolver,
    status_config: StatusConfig,
}

impl DeviceService {
    pub fn new(
        raw_devices: Arc<dyn RawRecordStore<RawDevice>>,
        resolver: LinkedEntityResolver,
        status_config: StatusConfig,
    ) -> Self {
        Self {
            raw_devices,
            resolver,
            status_config,
        }
    }

    fn unresolved(raw: &RawDevice, reference: &'static str) -> DomainError {
        DomainError::UnresolvedMandatoryReference {
            entity: EntityKind::Device,
            source_id: raw.source_id().to_string(),
            reference,
        }
    }
}

#[async_trait]
impl EntityBuilder for DeviceService {
    type Raw = RawDevice;
    type Entity = Device;

    fn raw_records(&self) -> &dyn RawRecordStore<RawDevice> {
        self.raw_devices.as_ref()
    }

    #[instrument(skip(self, raw), fields(source_id = %raw.source_id()))]
    async fn build(&self, raw: &RawDevice) -> DomainResult<Device> {
        let device_type = self
            .resolver
            .device_type_name(&raw.links.device_type)
            .await?
            .ok_or_else(|| Self::unresolved(raw, "deviceType"))?;

        let platform = self
            .resolver
            .platform_name(&raw.links.platform)
            .await?
            .ok_or_else(|| Self::unresolved(raw, "platform"))?;

        let status_id = self.resolver.first_linked_id(&raw.links.status);
        if status_id.is_none() {
            debug!("device has no resolvable status link, classifying as INVALID");
        }
        let status = classify_status(status_id.as_deref(), &self.status_config);

        let device = Device {
            source_id: raw.source_id().to_string(),
            serial_number: raw.serial_number.clone(),
            data_object_id: raw.data_object_id.as_ref().map(|id| id.value.clone()),
            name: raw.name.clone(),
            is_private_property: raw.private_property,
            is_shared: raw.shared,
            status,
            device_type,
            platform,
            administrator_org_unit_id: self.resolver.first_linked_id(&raw.links.administrator),
            owner_org_unit_id: self.resolver.first_linked_id(&raw.links.owner),
        };

        validate_struct(&device)?;

        Ok(device)
    }
}

#[async_trait]
impl EntitySource<Device> for DeviceService {
    async fn scan(&self) -> DomainResult<EntityScan<Device>> {
        collect_valid(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceStores;
    use common::domain::{
        DeviceLinks, DeviceStatus, Identifier, Link, MockRawRecordStore, ReferenceRecord,
    };
    use common::memory::InMemoryRecordStore;

    fn link(id: &str) -> Vec<Link> {
        vec![Link::new(format!("https://example.com/ressurs/systemid/{}", id))]
    }

    fn raw_device(id: &str, device_type: &str, platform: &str) -> RawDevice {
        RawDevice {
            system_id: Some(Identifier::new(id)),
            serial_number: format!("SN-{}", id),
            data_object_id: Some(Identifier::new("obj-1")),
            name: Some(format!("Device {}", id)),
            private_property: Some(false),
            shared: None,
            links: DeviceLinks {
                status: link("S1"),
                device_type: link(device_type),
                platform: link(platform),
                administrator: link("admin-org"),
                owner: Vec::new(),
            },
        }
    }

    async fn reference_stores() -> ReferenceStores {
        let device_types = Arc::new(InMemoryRecordStore::<ReferenceRecord>::new());
        device_types
            .put("laptop".to_string(), ReferenceRecord::named("Laptop"))
            .await
            .unwrap();
        let platforms = Arc::new(InMemoryRecordStore::<ReferenceRecord>::new());
        platforms
            .put("win".to_string(), ReferenceRecord::named("Windows"))
            .await
            .unwrap();

        ReferenceStores {
            device_types,
            platforms,
            org_units: Arc::new(InMemoryRecordStore::<ReferenceRecord>::new()),
        }
    }

    async fn service(raw_devices: Arc<dyn RawRecordStore<RawDevice>>) -> DeviceService {
        DeviceService::new(
            raw_devices,
            LinkedEntityResolver::new(reference_stores().await),
            StatusConfig::new(["S1"], ["S2"], ["S3"]),
        )
    }

    #[tokio::test]
    async fn test_build_resolves_all_fields() {
        let service = service(Arc::new(InMemoryRecordStore::<RawDevice>::new())).await;

        let device = service
            .build(&raw_device("dev-1", "laptop", "win"))
            .await
            .unwrap();

        assert_eq!(
            device,
            Device {
                source_id: "dev-1".to_string(),
                serial_number: "SN-dev-1".to_string(),
                data_object_id: Some("obj-1".to_string()),
                name: Some("Device dev-1".to_string()),
                is_private_property: Some(false),
                is_shared: None,
                status: DeviceStatus::Active,
                device_type: "Laptop".to_string(),
                platform: "Windows".to_string(),
                administrator_org_unit_id: Some("admin-org".to_string()),
                owner_org_unit_id: None,
            }
        );
    }

    #[tokio::test]
    async fn test_build_rejects_unresolved_device_type() {
        let service = service(Arc::new(InMemoryRecordStore::<RawDevice>::new())).await;

        let result = service.build(&raw_device("dev-2", "tablet", "win")).await;

        match result {
            Err(DomainError::UnresolvedMandatoryReference {
                entity,
                source_id,
                reference,
            }) => {
                assert_eq!(entity, EntityKind::Device);
                assert_eq!(source_id, "dev-2");
                assert_eq!(reference, "deviceType");
            }
            other => panic!("Expected UnresolvedMandatoryReference, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_rejects_unresolved_platform() {
        let service = service(Arc::new(InMemoryRecordStore::<RawDevice>::new())).await;

        let result = service.build(&raw_device("dev-3", "laptop", "mac")).await;

        assert!(matches!(
            result,
            Err(DomainError::UnresolvedMandatoryReference {
                reference: "platform",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_status_is_invalid_not_rejected() {
        let service = service(Arc::new(InMemoryRecordStore::<RawDevice>::new())).await;
        let mut raw = raw_device("dev-4", "laptop", "win");
        raw.links.status = Vec::new();

        let device = service.build(&raw).await.unwrap();

        assert_eq!(device.status, DeviceStatus::Invalid);
    }

    #[tokio::test]
    async fn test_missing_system_id_fails_validation() {
        let service = service(Arc::new(InMemoryRecordStore::<RawDevice>::new())).await;
        let mut raw = raw_device("dev-5", "laptop", "win");
        raw.system_id = None;

        let result = service.build(&raw).await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_missing_serial_number_is_rejected() {
        let service = service(Arc::new(InMemoryRecordStore::<RawDevice>::new())).await;
        let raw: RawDevice = serde_json::from_value(serde_json::json!({
            "systemId": { "identifikatorverdi": "dev-6" },
            "_links": {
                "enhetstype": [{ "href": "https://example.com/ressurs/systemid/laptop" }],
                "plattform": [{ "href": "https://example.com/ressurs/systemid/win" }]
            }
        }))
        .unwrap();

        let result = service.build(&raw).await;

        match result {
            Err(e @ DomainError::ValidationError(_)) => {
                assert!(e.is_rejection());
                assert!(e.to_string().contains("serial_number"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_all_valid_skips_rejections_and_duplicates() {
        let store = Arc::new(InMemoryRecordStore::<RawDevice>::new());
        store
            .put("dev-1".to_string(), raw_device("dev-1", "laptop", "win"))
            .await
            .unwrap();
        store
            .put("dev-2".to_string(), raw_device("dev-2", "tablet", "win"))
            .await
            .unwrap();
        store
            .put("dev-1-copy".to_string(), raw_device("dev-1", "laptop", "win"))
            .await
            .unwrap();
        store
            .put("dev-3".to_string(), raw_device("dev-3", "laptop", "win"))
            .await
            .unwrap();
        let service = service(store).await;

        let scan = service.scan().await.unwrap();
        let devices = service.get_all_valid().await.unwrap();

        assert_eq!(scan.records, 4);
        assert_eq!(scan.entities, devices);
        let ids: Vec<_> = devices.iter().map(|d| d.source_id.as_str()).collect();
        assert_eq!(ids, vec!["dev-1", "dev-3"]);
    }

    #[tokio::test]
    async fn test_get_all_valid_propagates_store_failure() {
        let mut raw_devices = MockRawRecordStore::<RawDevice>::new();
        raw_devices
            .expect_get_all()
            .times(1)
            .returning(|| Err(DomainError::StoreAccessFailure(anyhow::anyhow!("cache offline"))));
        let service = service(Arc::new(raw_devices)).await;

        let result = service.get_all_valid().await;

        assert!(matches!(result, Err(DomainError::StoreAccessFailure(_))));
    }
}
