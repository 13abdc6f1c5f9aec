use async_nats::HeaderMap;
use async_trait::async_trait;
use bytes::Bytes;
use common::domain::{DomainError, DomainResult, EntityProducer, PublishableEntity};
use common::nats::{record_subject, JetStreamPublisher, RECORD_KEY_HEADER};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Publishes entities as JSON to `{stream}.{key}` with the key in a header
pub struct NatsEntityProducer<E> {
    jetstream: Arc<dyn JetStreamPublisher>,
    stream: String,
    _entity: PhantomData<fn(&E)>,
}

impl<E: PublishableEntity> NatsEntityProducer<E> {
    pub fn new(jetstream: Arc<dyn JetStreamPublisher>, stream: impl Into<String>) -> Self {
        let stream = stream.into();
        debug!(stream = %stream, entity = %E::KIND, "initialized NatsEntityProducer");

        Self {
            jetstream,
            stream,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: PublishableEntity> EntityProducer<E> for NatsEntityProducer<E> {
    #[instrument(skip(self, entity), fields(stream = %self.stream))]
    async fn publish(&self, key: &str, entity: &E) -> DomainResult<()> {
        let payload = serde_json::to_vec(entity)?;

        let mut headers = HeaderMap::new();
        headers.insert(RECORD_KEY_HEADER, key);

        let subject = record_subject(&self.stream, key);
        self.jetstream
            .publish(subject.clone(), headers, Bytes::from(payload))
            .await
            .map_err(|source| DomainError::PublishFailure {
                key: key.to_string(),
                source,
            })?;

        debug!(subject = %subject, "published entity");
        Ok(())
    }
}
