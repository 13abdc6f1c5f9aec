use crate::domain::EntityKind;
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the endpoints of a membership identity
pub const MEMBERSHIP_ID_SEPARATOR: &str = "_";

/// Normalized device status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Deleted,
    Invalid,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "ACTIVE",
            DeviceStatus::Inactive => "INACTIVE",
            DeviceStatus::Deleted => "DELETED",
            DeviceStatus::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A denormalized entity that can be diffed against its last published value
pub trait PublishableEntity:
    Clone + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Key the entity is published and snapshotted under
    fn identity(&self) -> String;
}

/// Denormalized device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[garde(length(min = 1))]
    pub source_id: String,
    #[garde(length(min = 1))]
    pub serial_number: String,
    #[garde(skip)]
    pub data_object_id: Option<String>,
    #[garde(skip)]
    pub name: Option<String>,
    #[garde(skip)]
    pub is_private_property: Option<bool>,
    #[garde(skip)]
    pub is_shared: Option<bool>,
    #[garde(skip)]
    pub status: DeviceStatus,
    #[garde(length(min = 1))]
    pub device_type: String,
    #[garde(length(min = 1))]
    pub platform: String,
    #[garde(skip)]
    pub administrator_org_unit_id: Option<String>,
    #[garde(skip)]
    pub owner_org_unit_id: Option<String>,
}

impl PublishableEntity for Device {
    const KIND: EntityKind = EntityKind::Device;

    fn identity(&self) -> String {
        self.source_id.clone()
    }
}

/// Denormalized device group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    #[garde(length(min = 1))]
    pub source_id: String,
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    pub org_unit_id: Option<String>,
    #[garde(skip)]
    pub org_unit_name: Option<String>,
    #[garde(length(min = 1))]
    pub device_type: String,
    #[garde(length(min = 1))]
    pub platform: String,
}

impl PublishableEntity for DeviceGroup {
    const KIND: EntityKind = EntityKind::DeviceGroup;

    fn identity(&self) -> String {
        self.source_id.clone()
    }
}

/// Denormalized device group membership.
///
/// Identity is derived from the two endpoints, so upstream duplicates of the
/// same pair collapse to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroupMembership {
    #[garde(length(min = 1))]
    pub group_id: String,
    #[garde(length(min = 1))]
    pub device_id: String,
}

impl DeviceGroupMembership {
    pub fn id(&self) -> String {
        format!(
            "{}{}{}",
            self.device_id, MEMBERSHIP_ID_SEPARATOR, self.group_id
        )
    }
}

impl PublishableEntity for DeviceGroupMembership {
    const KIND: EntityKind = EntityKind::Membership;

    fn identity(&self) -> String {
        self.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device() -> Device {
        Device {
            source_id: "dev-1".to_string(),
            serial_number: "SN-001".to_string(),
            data_object_id: None,
            name: Some("Laptop".to_string()),
            is_private_property: Some(false),
            is_shared: None,
            status: DeviceStatus::Active,
            device_type: "Laptop".to_string(),
            platform: "Windows".to_string(),
            administrator_org_unit_id: None,
            owner_org_unit_id: Some("org-1".to_string()),
        }
    }

    #[test]
    fn test_device_serializes_camel_case() {
        let value = serde_json::to_value(device()).unwrap();

        assert_eq!(value["sourceId"], json!("dev-1"));
        assert_eq!(value["serialNumber"], json!("SN-001"));
        assert_eq!(value["status"], json!("ACTIVE"));
        assert_eq!(value["isPrivateProperty"], json!(false));
        assert_eq!(value["dataObjectId"], json!(null));
        assert_eq!(value["ownerOrgUnitId"], json!("org-1"));
    }

    #[test]
    fn test_device_identity_is_source_id() {
        assert_eq!(device().identity(), "dev-1");
    }

    #[test]
    fn test_membership_identity_is_device_then_group() {
        let membership = DeviceGroupMembership {
            group_id: "G1".to_string(),
            device_id: "D1".to_string(),
        };

        assert_eq!(membership.identity(), "D1_G1");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(DeviceStatus::Inactive.to_string(), "INACTIVE");
        assert_eq!(
            serde_json::from_value::<DeviceStatus>(json!("DELETED")).unwrap(),
            DeviceStatus::Deleted
        );
    }

    #[test]
    fn test_device_validation_requires_mandatory_fields() {
        let mut invalid = device();
        invalid.platform = String::new();

        assert!(device().validate().is_ok());
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_device_validation_requires_serial_number() {
        let mut invalid = device();
        invalid.serial_number = String::new();

        assert!(invalid.validate().is_err());
    }
}
