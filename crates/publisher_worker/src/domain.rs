mod device_group_service;
mod device_service;
mod entity_source;
mod incremental_publisher;
mod link_resolver;
mod membership_service;
mod publish_schedule;
mod status_classifier;

pub use device_group_service::*;
pub use device_service::*;
pub use entity_source::*;
pub use incremental_publisher::*;
pub use link_resolver::*;
pub use membership_service::*;
pub use publish_schedule::*;
pub use status_classifier::*;
