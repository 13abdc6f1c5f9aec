use crate::domain::IngestStores;
use common::domain::{id_from_path, DomainError, DomainResult, RawRecordStore, RecordKind};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored { id: String },
    /// The message carried no usable key
    MissingKey,
    /// Empty payload, nothing to store
    Tombstone,
}

/// Writes inbound records into the store registered for their kind.
///
/// Upstream records are stored under the identifier extracted from the message
/// key; published snapshots under the key itself. A later record with the same
/// identifier replaces the earlier one.
pub struct RecordIngestService {
    stores: IngestStores,
}

impl RecordIngestService {
    pub fn new(stores: IngestStores) -> Self {
        Self { stores }
    }

    #[instrument(skip(self, payload), fields(kind = %kind, payload_size = payload.len()))]
    pub async fn ingest(
        &self,
        kind: RecordKind,
        key: Option<&str>,
        payload: &[u8],
    ) -> DomainResult<IngestOutcome> {
        // Snapshot keys are entity identities and are stored verbatim
        let id = match kind.snapshot_of() {
            Some(_) => key,
            None => key.map(id_from_path),
        };
        let Some(id) = id.filter(|id| !id.trim().is_empty()) else {
            warn!(key = ?key, "Skipping record without a usable key");
            return Ok(IngestOutcome::MissingKey);
        };

        if payload.is_empty() {
            debug!(id = %id, "skipping tombstone");
            return Ok(IngestOutcome::Tombstone);
        }

        let id = id.to_string();
        match kind {
            RecordKind::Device => store(kind, &*self.stores.raw_devices, &id, payload).await?,
            RecordKind::DeviceGroup => {
                store(kind, &*self.stores.raw_device_groups, &id, payload).await?
            }
            RecordKind::Membership => {
                store(kind, &*self.stores.raw_memberships, &id, payload).await?
            }
            RecordKind::DeviceType => store(kind, &*self.stores.device_types, &id, payload).await?,
            RecordKind::Platform => store(kind, &*self.stores.platforms, &id, payload).await?,
            RecordKind::OrgUnit => store(kind, &*self.stores.org_units, &id, payload).await?,
            RecordKind::PublishedDevice => {
                store(kind, &*self.stores.device_snapshots, &id, payload).await?
            }
            RecordKind::PublishedDeviceGroup => {
                store(kind, &*self.stores.device_group_snapshots, &id, payload).await?
            }
            RecordKind::PublishedMembership => {
                store(kind, &*self.stores.membership_snapshots, &id, payload).await?
            }
        }

        debug!(id = %id, "stored record");
        Ok(IngestOutcome::Stored { id })
    }
}

async fn store<T>(
    kind: RecordKind,
    store: &dyn RawRecordStore<T>,
    id: &str,
    payload: &[u8],
) -> DomainResult<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let value: T =
        serde_json::from_slice(payload).map_err(|source| DomainError::DecodeError { kind, source })?;
    store.put(id.to_string(), value).await
}
