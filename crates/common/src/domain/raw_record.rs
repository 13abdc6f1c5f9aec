use crate::domain::{Identifier, Link};
use serde::{Deserialize, Serialize};

/// Common view over upstream records
pub trait RawRecord {
    /// The record's own identifier, empty when the upstream omitted it
    fn source_id(&self) -> &str;
}

fn identifier_value(id: &Option<Identifier>) -> &str {
    id.as_ref().map(|id| id.value.as_str()).unwrap_or_default()
}

/// Upstream device record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDevice {
    #[serde(rename = "systemId")]
    pub system_id: Option<Identifier>,
    #[serde(rename = "serienummer")]
    pub serial_number: String,
    #[serde(rename = "dataobjektId")]
    pub data_object_id: Option<Identifier>,
    #[serde(rename = "navn")]
    pub name: Option<String>,
    #[serde(rename = "privateid")]
    pub private_property: Option<bool>,
    #[serde(rename = "flerbrukerenhet")]
    pub shared: Option<bool>,
    #[serde(rename = "_links")]
    pub links: DeviceLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLinks {
    pub status: Vec<Link>,
    #[serde(rename = "enhetstype")]
    pub device_type: Vec<Link>,
    #[serde(rename = "plattform")]
    pub platform: Vec<Link>,
    pub administrator: Vec<Link>,
    #[serde(rename = "eier")]
    pub owner: Vec<Link>,
}

impl RawRecord for RawDevice {
    fn source_id(&self) -> &str {
        identifier_value(&self.system_id)
    }
}

/// Upstream device group record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDeviceGroup {
    #[serde(rename = "systemId")]
    pub system_id: Option<Identifier>,
    #[serde(rename = "navn")]
    pub name: Option<String>,
    #[serde(rename = "_links")]
    pub links: DeviceGroupLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGroupLinks {
    #[serde(rename = "enhetstype")]
    pub device_type: Vec<Link>,
    #[serde(rename = "plattform")]
    pub platform: Vec<Link>,
    #[serde(rename = "organisasjonsenhet")]
    pub org_unit: Vec<Link>,
}

impl RawRecord for RawDeviceGroup {
    fn source_id(&self) -> &str {
        identifier_value(&self.system_id)
    }
}

/// Upstream device group membership record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMembership {
    #[serde(rename = "systemId")]
    pub system_id: Option<Identifier>,
    #[serde(rename = "_links")]
    pub links: MembershipLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipLinks {
    #[serde(rename = "enhetsgruppe")]
    pub group: Vec<Link>,
    #[serde(rename = "digitalEnhet")]
    pub device: Vec<Link>,
}

impl RawRecord for RawMembership {
    fn source_id(&self) -> &str {
        identifier_value(&self.system_id)
    }
}

/// Code list or organisational record used to resolve display names
/// (device type, platform, org unit)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRecord {
    #[serde(rename = "systemId")]
    pub system_id: Option<Identifier>,
    #[serde(rename = "navn")]
    pub name: Option<String>,
}

impl ReferenceRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}
