use crate::nats::record_key::{key_from_subject_token, RECORD_KEY_HEADER};
use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer::PullConsumer, Message};
use async_nats::HeaderMap;
use bytes::Bytes;
use futures::{future::BoxFuture, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Broker-independent view of a fetched message handed to a [`BatchProcessor`]
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub subject: String,
    pub headers: Option<HeaderMap>,
    pub payload: Bytes,
}

impl InboundMessage {
    pub fn new(subject: impl Into<String>, headers: Option<HeaderMap>, payload: Bytes) -> Self {
        Self {
            subject: subject.into(),
            headers,
            payload,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|headers| headers.get(name))
            .map(|value| value.as_str())
    }

    /// Record key from the `record-key` header, or the unescaped last subject token.
    ///
    /// Returns `None` when neither yields a non-blank key.
    pub fn record_key(&self) -> Option<String> {
        if let Some(key) = self.header(RECORD_KEY_HEADER) {
            return (!key.trim().is_empty()).then(|| key.to_string());
        }

        self.subject
            .rsplit_once('.')
            .and_then(|(_, token)| key_from_subject_token(token))
            .filter(|key| !key.trim().is_empty())
    }
}

impl From<&Message> for InboundMessage {
    fn from(message: &Message) -> Self {
        Self {
            subject: message.subject.to_string(),
            headers: message.headers.clone(),
            payload: message.payload.clone(),
        }
    }
}

/// Result of processing a batch of messages
#[derive(Debug, PartialEq)]
pub struct ProcessingResult {
    /// Indices of messages to acknowledge
    pub ack: Vec<usize>,
    /// Indices of messages to reject for redelivery, with optional error details
    pub nak: Vec<(usize, Option<String>)>,
}

impl ProcessingResult {
    pub fn nak_all(count: usize, error: Option<String>) -> Self {
        Self {
            ack: Vec::new(),
            nak: (0..count).map(|i| (i, error.clone())).collect(),
        }
    }

    pub fn new(ack: Vec<usize>, nak: Vec<(usize, Option<String>)>) -> Self {
        Self { ack, nak }
    }
}

/// Processor invoked with every fetched batch
pub type BatchProcessor =
    Box<dyn Fn(&[InboundMessage]) -> BoxFuture<'static, Result<ProcessingResult>> + Send + Sync>;

/// Durable JetStream pull consumer that hands batches to a [`BatchProcessor`]
pub struct NatsConsumer {
    consumer: PullConsumer,
    batch_size: usize,
    max_wait: Duration,
    processor: BatchProcessor,
}

impl NatsConsumer {
    pub async fn new(
        jetstream: &jetstream::Context,
        stream_name: &str,
        consumer_name: &str,
        batch_size: usize,
        max_wait_secs: u64,
        processor: BatchProcessor,
    ) -> Result<Self> {
        debug!(
            stream = stream_name,
            consumer = consumer_name,
            "Creating JetStream consumer"
        );

        let consumer = jetstream
            .create_consumer_on_stream(
                jetstream::consumer::pull::Config {
                    name: Some(consumer_name.to_string()),
                    durable_name: Some(consumer_name.to_string()),
                    filter_subject: format!("{}.*", stream_name),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    deliver_policy: jetstream::consumer::DeliverPolicy::All,
                    ..Default::default()
                },
                stream_name,
            )
            .await
            .context("Failed to create consumer")?;

        info!(
            stream = stream_name,
            consumer = consumer_name,
            "Consumer created successfully"
        );

        Ok(Self {
            consumer,
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            processor,
        })
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!("Starting consumer loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping consumer");
                    break;
                }
                result = self.fetch_and_process_batch() => {
                    if let Err(e) = result {
                        error!(error = %e, "Error processing batch");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("Consumer stopped gracefully");
        Ok(())
    }

    async fn fetch_and_process_batch(&self) -> Result<()> {
        let mut messages = self
            .consumer
            .fetch()
            .max_messages(self.batch_size)
            .expires(self.max_wait)
            .messages()
            .await
            .context("Failed to fetch messages")?;

        let mut raw_messages = Vec::new();
        while let Some(result) = messages.next().await {
            match result {
                Ok(msg) => raw_messages.push(msg),
                Err(e) => warn!(error = %e, "Error receiving message from batch"),
            }
        }

        if raw_messages.is_empty() {
            return Ok(());
        }

        debug!(message_count = raw_messages.len(), "Received message batch");

        let inbound: Vec<InboundMessage> = raw_messages.iter().map(InboundMessage::from).collect();
        let processing_result = match (self.processor)(&inbound).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Processor returned error, rejecting all messages");
                ProcessingResult::nak_all(raw_messages.len(), Some(e.to_string()))
            }
        };

        for idx in processing_result.ack {
            match raw_messages.get(idx) {
                Some(msg) => {
                    if let Err(e) = msg.ack().await {
                        error!(error = %e, message_index = idx, "Failed to acknowledge message");
                    }
                }
                None => warn!(
                    message_index = idx,
                    batch_size = raw_messages.len(),
                    "Invalid ack index in ProcessingResult"
                ),
            }
        }

        for (idx, error_msg) in processing_result.nak {
            let Some(msg) = raw_messages.get(idx) else {
                warn!(
                    message_index = idx,
                    batch_size = raw_messages.len(),
                    "Invalid nak index in ProcessingResult"
                );
                continue;
            };

            match error_msg {
                Some(err) => error!(
                    message_index = idx,
                    subject = %msg.subject,
                    error = %err,
                    "Rejecting message due to processing error"
                ),
                None => warn!(message_index = idx, subject = %msg.subject, "Rejecting message"),
            }

            if let Err(e) = msg.ack_with(jetstream::AckKind::Nak(None)).await {
                error!(error = %e, message_index = idx, "Failed to reject message");
            }
        }

        Ok(())
    }
}
