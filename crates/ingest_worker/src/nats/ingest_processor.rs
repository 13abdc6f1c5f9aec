use crate::domain::{IngestOutcome, RecordIngestService};
use common::domain::RecordKind;
use common::nats::{link_span_to_headers, BatchProcessor, InboundMessage, ProcessingResult};
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// Create a BatchProcessor that ingests every message as a record of `kind`.
///
/// Stored, keyless and tombstone messages are acked; decode and store
/// failures are nacked for redelivery.
pub fn create_ingest_processor(
    kind: RecordKind,
    service: Arc<RecordIngestService>,
) -> BatchProcessor {
    Box::new(move |messages: &[InboundMessage]| {
        let service = Arc::clone(&service);
        let messages = messages.to_vec();

        Box::pin(async move {
            let mut ack = Vec::with_capacity(messages.len());
            let mut nak = Vec::new();

            for (idx, message) in messages.iter().enumerate() {
                let span = info_span!("ingest_record", kind = %kind, subject = %message.subject);
                link_span_to_headers(&span, message.headers.as_ref());

                let key = message.record_key();
                match service
                    .ingest(kind, key.as_deref(), &message.payload)
                    .instrument(span)
                    .await
                {
                    Ok(IngestOutcome::Stored { id }) => {
                        debug!(index = idx, id = %id, "ingested record");
                        ack.push(idx);
                    }
                    Ok(_) => ack.push(idx),
                    Err(e) => {
                        warn!(
                            error = %e,
                            index = idx,
                            subject = %message.subject,
                            "failed to ingest record"
                        );
                        nak.push((idx, Some(e.to_string())));
                    }
                }
            }

            Ok(ProcessingResult::new(ack, nak))
        })
    })
}
