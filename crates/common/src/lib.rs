pub mod domain;
pub mod garde;
pub mod memory;
pub mod nats;
pub mod telemetry;

pub use domain::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockEntityProducer;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockRawRecordStore;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockReferenceStore;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockSnapshotStore;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamPublisher;
