//! Key Module
//!
//! Call arguments and cache key derivation.

mod args;
mod extract;
mod value;

pub use args::CallArgs;
pub use extract::{derive_key, key_for, CacheKey};
pub use value::ArgValue;
