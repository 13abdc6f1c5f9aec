mod ingest_stores;
mod record_ingest_service;

pub use ingest_stores::*;
pub use record_ingest_service::*;
