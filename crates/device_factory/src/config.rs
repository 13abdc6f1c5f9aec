use common::domain::RecordKind;
use config::{Config, ConfigError, Environment};
use publisher_worker::domain::{PublishSchedule, StatusConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Timeout for the initial NATS connection
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    /// Messages fetched per consumer batch
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Maximum wait for a consumer batch to fill
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Prefix for durable consumer names
    #[serde(default = "default_consumer_prefix")]
    pub consumer_prefix: String,

    // Inbound streams
    /// Stream carrying raw devices
    #[serde(default = "default_device_stream")]
    pub device_stream: String,

    /// Stream carrying raw device groups
    #[serde(default = "default_device_group_stream")]
    pub device_group_stream: String,

    /// Stream carrying raw device group memberships
    #[serde(default = "default_membership_stream")]
    pub membership_stream: String,

    /// Stream carrying device type reference records
    #[serde(default = "default_device_type_stream")]
    pub device_type_stream: String,

    /// Stream carrying platform reference records
    #[serde(default = "default_platform_stream")]
    pub platform_stream: String,

    /// Stream carrying organisation unit reference records
    #[serde(default = "default_org_unit_stream")]
    pub org_unit_stream: String,

    // Outbound streams, also consumed back as published snapshots
    #[serde(default = "default_published_device_stream")]
    pub published_device_stream: String,

    #[serde(default = "default_published_device_group_stream")]
    pub published_device_group_stream: String,

    #[serde(default = "default_published_membership_stream")]
    pub published_membership_stream: String,

    // Publisher schedules
    #[serde(default = "default_entity_initial_delay_secs")]
    pub device_initial_delay_secs: u64,

    #[serde(default = "default_entity_fixed_delay_secs")]
    pub device_fixed_delay_secs: u64,

    #[serde(default = "default_entity_initial_delay_secs")]
    pub device_group_initial_delay_secs: u64,

    #[serde(default = "default_entity_fixed_delay_secs")]
    pub device_group_fixed_delay_secs: u64,

    #[serde(default)]
    pub membership_initial_delay_secs: u64,

    #[serde(default = "default_membership_fixed_delay_secs")]
    pub membership_fixed_delay_secs: u64,

    // Device status mapping
    /// Comma-separated upstream status identifiers mapped to ACTIVE
    #[serde(default)]
    pub status_active: String,

    /// Comma-separated upstream status identifiers mapped to INACTIVE
    #[serde(default)]
    pub status_inactive: String,

    /// Comma-separated upstream status identifiers mapped to DELETED
    #[serde(default)]
    pub status_deleted: String,

    // OpenTelemetry configuration
    /// Enable OpenTelemetry export
    #[serde(default)]
    pub otel_enabled: bool,

    /// OTLP collector endpoint
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Service name reported to the collector
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_startup_timeout_secs() -> u64 {
    30
}

fn default_nats_batch_size() -> usize {
    100
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_consumer_prefix() -> String {
    "device-factory".to_string()
}

fn default_device_stream() -> String {
    "ressurs-datautstyr-digitalenhet".to_string()
}

fn default_device_group_stream() -> String {
    "ressurs-datautstyr-enhetsgruppe".to_string()
}

fn default_membership_stream() -> String {
    "ressurs-datautstyr-enhetsgruppemedlemskap".to_string()
}

fn default_device_type_stream() -> String {
    "ressurs-kodeverk-enhetstype".to_string()
}

fn default_platform_stream() -> String {
    "ressurs-kodeverk-plattform".to_string()
}

fn default_org_unit_stream() -> String {
    "administrasjon-organisasjon-organisasjonselement".to_string()
}

fn default_published_device_stream() -> String {
    "device".to_string()
}

fn default_published_device_group_stream() -> String {
    "device-group".to_string()
}

fn default_published_membership_stream() -> String {
    "device-group-membership".to_string()
}

fn default_entity_initial_delay_secs() -> u64 {
    300
}

fn default_entity_fixed_delay_secs() -> u64 {
    300
}

fn default_membership_fixed_delay_secs() -> u64 {
    60
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "device-factory".to_string()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("DEVICE_FACTORY"))
            .build()?
            .try_deserialize()
    }

    pub fn status_config(&self) -> StatusConfig {
        StatusConfig::new(
            split_list(&self.status_active),
            split_list(&self.status_inactive),
            split_list(&self.status_deleted),
        )
    }

    /// Stream consumed for every inbound record kind
    pub fn inbound_streams(&self) -> Vec<(RecordKind, String)> {
        RecordKind::ALL
            .iter()
            .map(|kind| {
                let stream = match kind {
                    RecordKind::Device => &self.device_stream,
                    RecordKind::DeviceGroup => &self.device_group_stream,
                    RecordKind::Membership => &self.membership_stream,
                    RecordKind::DeviceType => &self.device_type_stream,
                    RecordKind::Platform => &self.platform_stream,
                    RecordKind::OrgUnit => &self.org_unit_stream,
                    RecordKind::PublishedDevice => &self.published_device_stream,
                    RecordKind::PublishedDeviceGroup => &self.published_device_group_stream,
                    RecordKind::PublishedMembership => &self.published_membership_stream,
                };
                (*kind, stream.clone())
            })
            .collect()
    }

    pub fn device_schedule(&self) -> PublishSchedule {
        PublishSchedule::from_secs(self.device_initial_delay_secs, self.device_fixed_delay_secs)
    }

    pub fn device_group_schedule(&self) -> PublishSchedule {
        PublishSchedule::from_secs(
            self.device_group_initial_delay_secs,
            self.device_group_fixed_delay_secs,
        )
    }

    pub fn membership_schedule(&self) -> PublishSchedule {
        PublishSchedule::from_secs(
            self.membership_initial_delay_secs,
            self.membership_fixed_delay_secs,
        )
    }
}
