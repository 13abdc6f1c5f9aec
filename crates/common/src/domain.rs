mod entity;
mod link;
mod producer;
mod raw_record;
mod record_kind;
mod result;
mod store;

pub use entity::*;
pub use link::*;
pub use producer::*;
pub use raw_record::*;
pub use record_kind::*;
pub use result::*;
pub use store::*;
