use crate::domain::{EntityKind, RecordKind};
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unresolved mandatory reference '{reference}' for {entity} {source_id}")]
    UnresolvedMandatoryReference {
        entity: EntityKind,
        source_id: String,
        reference: &'static str,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store access failure: {0}")]
    StoreAccessFailure(#[source] anyhow::Error),

    #[error("Failed to publish {key}: {source}")]
    PublishFailure {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to decode {kind} record: {source}")]
    DecodeError {
        kind: RecordKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DomainError {
    /// Whether the error rejects a single record rather than failing the operation
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::UnresolvedMandatoryReference { .. } | DomainError::ValidationError(_)
        )
    }
}
