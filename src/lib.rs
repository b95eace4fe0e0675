//! Function Cache - A bounded memoizing call cache
//!
//! Wraps a computation so that repeated calls with the same key-able
//! arguments return the stored result instead of recomputing it. Each
//! wrapper owns its own cache, bounded by oldest-first eviction.
//!
//! ```
//! use function_cache::{CallArgs, Memoized};
//! use std::convert::Infallible;
//!
//! let square = Memoized::new("square", |args: &CallArgs| {
//!     let n = args.positional[0].as_int().unwrap_or(0);
//!     Ok::<_, Infallible>(n * n)
//! });
//!
//! assert_eq!(square.call(&CallArgs::new().arg(12)), Ok(144));
//! assert_eq!(square.stats().misses, 1);
//! assert_eq!(square.call(&CallArgs::new().arg(12)), Ok(144));
//! assert_eq!(square.stats().hits, 1);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod logging;
pub mod memoize;
pub mod truthy;
pub mod util;

pub use cache::{control_cache_size, CacheStats, CacheStore};
pub use config::Config;
pub use error::MemoError;
pub use key::{derive_key, ArgValue, CacheKey, CallArgs};
pub use memoize::{AsyncMemoized, CacheSelection, Memoized};
pub use truthy::Truthy;
