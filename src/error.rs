//! Error types for the function cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Memo Error Enum ==
/// Errors raised by the cache layer itself.
///
/// Errors returned by a wrapped computation never pass through this type;
/// they reach the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    /// `max_cache_size` was zero or negative
    #[error("Invalid max_cache_size {value}: must be a positive integer")]
    Configuration { value: i64 },
}

// == Result Type Alias ==
/// Convenience Result type for the function cache.
pub type Result<T> = std::result::Result<T, MemoError>;
