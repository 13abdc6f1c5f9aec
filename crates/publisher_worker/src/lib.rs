pub mod domain;
pub mod nats;
pub mod publisher_worker;

pub use domain::*;
pub use nats::*;
pub use publisher_worker::*;
