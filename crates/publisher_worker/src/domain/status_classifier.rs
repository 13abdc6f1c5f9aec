use common::domain::DeviceStatus;
use std::collections::HashSet;

/// Status identifier lists used to normalize device status.
///
/// The lists are expected to be disjoint. When they overlap the fixed
/// precedence active, inactive, deleted decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusConfig {
    active: HashSet<String>,
    inactive: HashSet<String>,
    deleted: HashSet<String>,
}

impl StatusConfig {
    pub fn new<A, I, D>(active: A, inactive: I, deleted: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            active: active.into_iter().map(Into::into).collect(),
            inactive: inactive.into_iter().map(Into::into).collect(),
            deleted: deleted.into_iter().map(Into::into).collect(),
        }
    }
}

/// Classify a raw status identifier. Never fails: anything blank, absent or
/// unlisted is `Invalid`.
pub fn classify_status(raw_status_id: Option<&str>, config: &StatusConfig) -> DeviceStatus {
    let Some(status_id) = raw_status_id.filter(|id| !id.trim().is_empty()) else {
        return DeviceStatus::Invalid;
    };

    if config.active.contains(status_id) {
        DeviceStatus::Active
    } else if config.inactive.contains(status_id) {
        DeviceStatus::Inactive
    } else if config.deleted.contains(status_id) {
        DeviceStatus::Deleted
    } else {
        DeviceStatus::Invalid
    }
}
