mod ingest_processor;

pub use ingest_processor::*;
