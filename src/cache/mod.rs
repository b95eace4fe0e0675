//! Cache Module
//!
//! Bounded in-memory storage for memoized results with oldest-first eviction.

mod order;
mod stats;
mod store;


// Re-export public types
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::{control_cache_size, CacheStore};

// == Public Constants ==
/// Default maximum number of entries for a memoizing wrapper
pub const DEFAULT_MAX_CACHE_SIZE: usize = 50;

/// Default size used by standalone capacity control
pub const STANDALONE_CACHE_SIZE: usize = 20;
