mod validate;

pub use validate::*;
