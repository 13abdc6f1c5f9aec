mod client;
mod consumer;
mod record_key;
mod trace_context;
mod traits;

pub use client::*;
pub use consumer::*;
pub use record_key::*;
pub use trace_context::*;
pub use traits::*;
