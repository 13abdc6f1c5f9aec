mod entity_producer;

pub use entity_producer::*;
