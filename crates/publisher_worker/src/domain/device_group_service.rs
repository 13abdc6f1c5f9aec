use crate::domain::{
    collect_valid, EntityBuilder, EntityScan, EntitySource, LinkedEntityResolver,
};
use async_trait::async_trait;
use common::domain::{
    DeviceGroup, DomainError, DomainResult, EntityKind, RawDeviceGroup, RawRecord,
    RawRecordStore,
};
use common::garde::validate_struct;
use std::sync::Arc;
use tracing::instrument;

/// Builds denormalized device groups from raw group records
pub struct DeviceGroupService {
    raw_groups: Arc<dyn RawRecordStore<RawDeviceGroup>>,
    resolver: LinkedEntityResolver,
}

impl DeviceGroupService {
    pub fn new(
        raw_groups: Arc<dyn RawRecordStore<RawDeviceGroup>>,
        resolver: LinkedEntityResolver,
    ) -> Self {
        Self {
            raw_groups,
            resolver,
        }
    }
}

#[async_trait]
impl EntityBuilder for DeviceGroupService {
    type Raw = RawDeviceGroup;
    type Entity = DeviceGroup;

    fn raw_records(&self) -> &dyn RawRecordStore<RawDeviceGroup> {
        self.raw_groups.as_ref()
    }

    #[instrument(skip(self, raw), fields(source_id = %raw.source_id()))]
    async fn build(&self, raw: &RawDeviceGroup) -> DomainResult<DeviceGroup> {
        let unresolved = |reference| DomainError::UnresolvedMandatoryReference {
            entity: EntityKind::DeviceGroup,
            source_id: raw.source_id().to_string(),
            reference,
        };

        let device_type = self
            .resolver
            .device_type_name(&raw.links.device_type)
            .await?
            .ok_or_else(|| unresolved("deviceType"))?;

        let platform = self
            .resolver
            .platform_name(&raw.links.platform)
            .await?
            .ok_or_else(|| unresolved("platform"))?;

        let group = DeviceGroup {
            source_id: raw.source_id().to_string(),
            // A blank name is left empty so validation rejects it
            name: raw
                .name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_default(),
            org_unit_id: self.resolver.first_linked_id(&raw.links.org_unit),
            org_unit_name: self.resolver.org_unit_name(&raw.links.org_unit).await?,
            device_type,
            platform,
        };

        validate_struct(&group)?;

        Ok(group)
    }
}

#[async_trait]
impl EntitySource<DeviceGroup> for DeviceGroupService {
    async fn scan(&self) -> DomainResult<EntityScan<DeviceGroup>> {
        collect_valid(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceStores;
    use common::domain::{DeviceGroupLinks, Identifier, Link, ReferenceRecord};
    use common::memory::InMemoryRecordStore;

    fn link(id: &str) -> Link {
        Link::new(format!("https://example.com/ressurs/systemid/{}", id))
    }

    fn raw_group(id: &str, name: Option<&str>) -> RawDeviceGroup {
        RawDeviceGroup {
            system_id: Some(Identifier::new(id)),
            name: name.map(str::to_string),
            links: DeviceGroupLinks {
                device_type: vec![link("laptop")],
                platform: vec![link("win")],
                org_unit: vec![link("org-1")],
            },
        }
    }

    async fn service() -> DeviceGroupService {
        let references = Arc::new(InMemoryRecordStore::<ReferenceRecord>::new());
        for (id, name) in [("laptop", "Laptop"), ("win", "Windows"), ("org-1", "IT")] {
            references
                .put(id.to_string(), ReferenceRecord::named(name))
                .await
                .unwrap();
        }

        DeviceGroupService::new(
            Arc::new(InMemoryRecordStore::<RawDeviceGroup>::new()),
            LinkedEntityResolver::new(ReferenceStores {
                device_types: references.clone(),
                platforms: references.clone(),
                org_units: references,
            }),
        )
    }

    #[tokio::test]
    async fn test_build_resolves_org_unit() {
        let group = service()
            .await
            .build(&raw_group("g-1", Some("Laptops")))
            .await
            .unwrap();

        assert_eq!(
            group,
            DeviceGroup {
                source_id: "g-1".to_string(),
                name: "Laptops".to_string(),
                org_unit_id: Some("org-1".to_string()),
                org_unit_name: Some("IT".to_string()),
                device_type: "Laptop".to_string(),
                platform: "Windows".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_org_unit_keeps_id_without_name() {
        let mut raw = raw_group("g-2", Some("Tablets"));
        raw.links.org_unit = vec![link("org-unknown")];

        let group = service().await.build(&raw).await.unwrap();

        assert_eq!(group.org_unit_id.as_deref(), Some("org-unknown"));
        assert_eq!(group.org_unit_name, None);
    }

    #[tokio::test]
    async fn test_missing_platform_is_rejected() {
        let mut raw = raw_group("g-3", Some("Phones"));
        raw.links.platform.clear();

        let result = service().await.build(&raw).await;

        let err = result.unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(
            err.to_string(),
            "Unresolved mandatory reference 'platform' for device-group g-3"
        );
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let result = service().await.build(&raw_group("g-4", Some("  "))).await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
