use common::domain::{first_linked_id, DomainResult, Link, ReferenceRecord, ReferenceStore};
use std::sync::Arc;
use tracing::trace;

/// Reference stores the builders resolve display names against
#[derive(Clone)]
pub struct ReferenceStores {
    pub device_types: Arc<dyn ReferenceStore<ReferenceRecord>>,
    pub platforms: Arc<dyn ReferenceStore<ReferenceRecord>>,
    pub org_units: Arc<dyn ReferenceStore<ReferenceRecord>>,
}

/// Resolves relation links of raw records.
///
/// Links are tried in record order and the first one that resolves wins.
/// Malformed links (no identifier after the last `/`) are skipped without a
/// store lookup. Store failures propagate.
#[derive(Clone)]
pub struct LinkedEntityResolver {
    stores: ReferenceStores,
}

impl LinkedEntityResolver {
    pub fn new(stores: ReferenceStores) -> Self {
        Self { stores }
    }

    /// Identifier of the first well-formed link, for relations whose value is the id itself
    pub fn first_linked_id(&self, links: &[Link]) -> Option<String> {
        first_linked_id(links)
    }

    /// Name of the first linked reference record that exists and carries a name
    pub async fn first_resolved(
        &self,
        links: &[Link],
        store: &dyn ReferenceStore<ReferenceRecord>,
    ) -> DomainResult<Option<String>> {
        for id in links.iter().filter_map(Link::target_id) {
            let name = store
                .get(id)
                .await?
                .and_then(|record| record.name)
                .filter(|name| !name.trim().is_empty());

            match name {
                Some(name) => return Ok(Some(name)),
                None => trace!(reference_id = %id, "link did not resolve"),
            }
        }

        Ok(None)
    }

    pub async fn device_type_name(&self, links: &[Link]) -> DomainResult<Option<String>> {
        self.first_resolved(links, self.stores.device_types.as_ref())
            .await
    }

    pub async fn platform_name(&self, links: &[Link]) -> DomainResult<Option<String>> {
        self.first_resolved(links, self.stores.platforms.as_ref())
            .await
    }

    pub async fn org_unit_name(&self, links: &[Link]) -> DomainResult<Option<String>> {
        self.first_resolved(links, self.stores.org_units.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{DomainError, MockReferenceStore, RawRecordStore};
    use common::memory::InMemoryRecordStore;

    async fn store_with(entries: &[(&str, &str)]) -> Arc<InMemoryRecordStore<ReferenceRecord>> {
        let store = Arc::new(InMemoryRecordStore::<ReferenceRecord>::new());
        for (id, name) in entries {
            store
                .put(id.to_string(), ReferenceRecord::named(*name))
                .await
                .unwrap();
        }
        store
    }

    async fn resolver() -> LinkedEntityResolver {
        LinkedEntityResolver::new(ReferenceStores {
            device_types: store_with(&[("laptop", "Laptop"), ("desktop", "Desktop")]).await,
            platforms: store_with(&[("win", "Windows")]).await,
            org_units: store_with(&[("org-1", "IT")]).await,
        })
    }

    fn links(ids: &[&str]) -> Vec<Link> {
        ids.iter()
            .map(|id| Link::new(format!("https://example.com/ressurs/systemid/{}", id)))
            .collect()
    }

    #[tokio::test]
    async fn test_first_resolving_link_wins() {
        let resolver = resolver().await;

        let name = resolver
            .device_type_name(&links(&["unknown", "desktop", "laptop"]))
            .await
            .unwrap();

        assert_eq!(name.as_deref(), Some("Desktop"));
    }

    #[tokio::test]
    async fn test_empty_and_unresolvable_links_are_absent() {
        let resolver = resolver().await;

        assert_eq!(resolver.platform_name(&[]).await.unwrap(), None);
        assert_eq!(
            resolver.platform_name(&links(&["mac"])).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_malformed_link_is_skipped() {
        let resolver = resolver().await;
        let links = vec![
            Link::new("https://example.com/ressurs/systemid/"),
            Link::new("https://example.com/ressurs/systemid/org-1"),
        ];

        assert_eq!(resolver.org_unit_name(&links).await.unwrap().as_deref(), Some("IT"));
        assert_eq!(resolver.first_linked_id(&links).as_deref(), Some("org-1"));
    }

    #[tokio::test]
    async fn test_record_without_name_does_not_resolve() {
        let store = store_with(&[("named", "Named")]).await;
        store
            .put("nameless".to_string(), ReferenceRecord::default())
            .await
            .unwrap();
        let resolver = LinkedEntityResolver::new(ReferenceStores {
            device_types: store.clone(),
            platforms: store.clone(),
            org_units: store,
        });

        let name = resolver
            .device_type_name(&links(&["nameless", "named"]))
            .await
            .unwrap();

        assert_eq!(name.as_deref(), Some("Named"));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut failing = MockReferenceStore::<ReferenceRecord>::new();
        failing
            .expect_get()
            .times(1)
            .returning(|_| Err(DomainError::StoreAccessFailure(anyhow::anyhow!("unavailable"))));
        let ok = store_with(&[]).await;
        let resolver = LinkedEntityResolver::new(ReferenceStores {
            device_types: Arc::new(failing),
            platforms: ok.clone(),
            org_units: ok,
        });

        let result = resolver.device_type_name(&links(&["laptop"])).await;

        assert!(matches!(result, Err(DomainError::StoreAccessFailure(_))));
    }
}
