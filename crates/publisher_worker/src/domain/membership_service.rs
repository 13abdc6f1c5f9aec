use crate::domain::{collect_valid, EntityBuilder, EntityScan, EntitySource};
use async_trait::async_trait;
use common::domain::{
    first_linked_id, DeviceGroupMembership, DomainError, DomainResult, EntityKind,
    RawMembership, RawRecord, RawRecordStore,
};
use common::garde::validate_struct;
use std::sync::Arc;

/// Builds memberships from raw membership records.
///
/// Both endpoints are plain identifiers, so no reference lookup is needed.
pub struct MembershipService {
    raw_memberships: Arc<dyn RawRecordStore<RawMembership>>,
}

impl MembershipService {
    pub fn new(raw_memberships: Arc<dyn RawRecordStore<RawMembership>>) -> Self {
        Self { raw_memberships }
    }
}

#[async_trait]
impl EntityBuilder for MembershipService {
    type Raw = RawMembership;
    type Entity = DeviceGroupMembership;

    fn raw_records(&self) -> &dyn RawRecordStore<RawMembership> {
        self.raw_memberships.as_ref()
    }

    async fn build(&self, raw: &RawMembership) -> DomainResult<DeviceGroupMembership> {
        let unresolved = |reference| DomainError::UnresolvedMandatoryReference {
            entity: EntityKind::Membership,
            source_id: raw.source_id().to_string(),
            reference,
        };

        let membership = DeviceGroupMembership {
            group_id: first_linked_id(&raw.links.group).ok_or_else(|| unresolved("group"))?,
            device_id: first_linked_id(&raw.links.device).ok_or_else(|| unresolved("device"))?,
        };

        validate_struct(&membership)?;

        Ok(membership)
    }
}

#[async_trait]
impl EntitySource<DeviceGroupMembership> for MembershipService {
    async fn scan(&self) -> DomainResult<EntityScan<DeviceGroupMembership>> {
        collect_valid(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{Identifier, Link, MembershipLinks, PublishableEntity};
    use common::memory::InMemoryRecordStore;

    fn raw_membership(id: &str, group: &str, device: &str) -> RawMembership {
        RawMembership {
            system_id: Some(Identifier::new(id)),
            links: MembershipLinks {
                group: vec![Link::new(format!("https://example.com/enhetsgruppe/systemid/{}", group))],
                device: vec![Link::new(format!("https://example.com/digitalenhet/systemid/{}", device))],
            },
        }
    }

    #[tokio::test]
    async fn test_build_uses_composite_identity() {
        let service = MembershipService::new(Arc::new(InMemoryRecordStore::<RawMembership>::new()));

        let membership = service
            .build(&raw_membership("m-1", "G1", "D1"))
            .await
            .unwrap();

        assert_eq!(membership.group_id, "G1");
        assert_eq!(membership.device_id, "D1");
        assert_eq!(membership.identity(), "D1_G1");
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_rejected() {
        let service = MembershipService::new(Arc::new(InMemoryRecordStore::<RawMembership>::new()));
        let mut raw = raw_membership("m-2", "G1", "D1");
        raw.links.device = vec![Link::new("https://example.com/digitalenhet/systemid/")];

        let result = service.build(&raw).await;

        assert!(matches!(
            result,
            Err(DomainError::UnresolvedMandatoryReference {
                reference: "device",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_identical_raw_records_collapse() {
        let store = Arc::new(InMemoryRecordStore::<RawMembership>::new());
        store
            .put("m-1".to_string(), raw_membership("m-1", "G1", "D1"))
            .await
            .unwrap();
        store
            .put("m-1-replay".to_string(), raw_membership("m-1", "G1", "D1"))
            .await
            .unwrap();
        store
            .put("m-2".to_string(), raw_membership("m-2", "G2", "D1"))
            .await
            .unwrap();
        let service = MembershipService::new(store);

        let memberships = service.get_all_valid().await.unwrap();

        let ids: Vec<_> = memberships.iter().map(PublishableEntity::identity).collect();
        assert_eq!(ids, vec!["D1_G1", "D1_G2"]);
    }
}
