use std::fmt;

/// Denormalized entity types this service publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Device,
    DeviceGroup,
    Membership,
}

impl EntityKind {
    /// Resource name used for outbound streams
    pub fn resource_name(&self) -> &'static str {
        match self {
            EntityKind::Device => "device",
            EntityKind::DeviceGroup => "device-group",
            EntityKind::Membership => "device-group-membership",
        }
    }

    /// Plural label used in cycle summaries
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Device => "devices",
            EntityKind::DeviceGroup => "device groups",
            EntityKind::Membership => "memberships",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

/// Every record type consumed from the inbound feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Device,
    DeviceGroup,
    Membership,
    DeviceType,
    Platform,
    OrgUnit,
    PublishedDevice,
    PublishedDeviceGroup,
    PublishedMembership,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        RecordKind::Device,
        RecordKind::DeviceGroup,
        RecordKind::Membership,
        RecordKind::DeviceType,
        RecordKind::Platform,
        RecordKind::OrgUnit,
        RecordKind::PublishedDevice,
        RecordKind::PublishedDeviceGroup,
        RecordKind::PublishedMembership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Device => "device",
            RecordKind::DeviceGroup => "device_group",
            RecordKind::Membership => "membership",
            RecordKind::DeviceType => "device_type",
            RecordKind::Platform => "platform",
            RecordKind::OrgUnit => "org_unit",
            RecordKind::PublishedDevice => "published_device",
            RecordKind::PublishedDeviceGroup => "published_device_group",
            RecordKind::PublishedMembership => "published_membership",
        }
    }

    /// The published entity type whose snapshots this kind carries, if any
    pub fn snapshot_of(&self) -> Option<EntityKind> {
        match self {
            RecordKind::PublishedDevice => Some(EntityKind::Device),
            RecordKind::PublishedDeviceGroup => Some(EntityKind::DeviceGroup),
            RecordKind::PublishedMembership => Some(EntityKind::Membership),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_kinds_map_to_entities() {
        let snapshot_kinds: Vec<_> = RecordKind::ALL
            .iter()
            .filter_map(|kind| kind.snapshot_of())
            .collect();

        assert_eq!(
            snapshot_kinds,
            vec![EntityKind::Device, EntityKind::DeviceGroup, EntityKind::Membership]
        );
    }

    #[test]
    fn test_entity_kind_labels() {
        assert_eq!(EntityKind::Membership.resource_name(), "device-group-membership");
        assert_eq!(EntityKind::DeviceGroup.plural(), "device groups");
    }
}
