//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::num::NonZeroUsize;

use crate::cache::{DEFAULT_MAX_CACHE_SIZE, STANDALONE_CACHE_SIZE};
use crate::error::{MemoError, Result};

/// Cache configuration parameters.
///
/// `max_cache_size` is kept signed so that a negative value coming from the
/// environment or a caller can be reported instead of silently wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries a wrapper's cache may hold
    pub max_cache_size: i64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_SIZE` - Maximum cache entries (default: 50)
    pub fn from_env() -> Self {
        Self {
            max_cache_size: env::var("MAX_CACHE_SIZE")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_CACHE_SIZE as i64),
        }
    }

    /// Configuration used by the standalone capacity-control path.
    pub fn standalone() -> Self {
        Self {
            max_cache_size: STANDALONE_CACHE_SIZE as i64,
        }
    }

    // == Capacity ==
    /// Validates `max_cache_size` and returns it as a non-zero capacity.
    pub fn capacity(&self) -> Result<NonZeroUsize> {
        usize::try_from(self.max_cache_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(MemoError::Configuration {
                value: self.max_cache_size,
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_cache_size, 50);
        assert_eq!(config.capacity().unwrap().get(), 50);
    }

    #[test]
    fn test_config_standalone() {
        assert_eq!(Config::standalone().max_cache_size, 20);
    }

    #[test]
    fn test_config_from_env() {
        env::remove_var("MAX_CACHE_SIZE");
        assert_eq!(Config::from_env().max_cache_size, 50);

        env::set_var("MAX_CACHE_SIZE", "7");
        assert_eq!(Config::from_env().max_cache_size, 7);

        env::set_var("MAX_CACHE_SIZE", "-2");
        assert_eq!(Config::from_env().max_cache_size, -2);

        env::set_var("MAX_CACHE_SIZE", "lots");
        assert_eq!(Config::from_env().max_cache_size, 50);

        env::remove_var("MAX_CACHE_SIZE");
    }

    #[test]
    fn test_capacity_rejects_zero_and_negative() {
        let zero = Config { max_cache_size: 0 };
        assert_eq!(
            zero.capacity(),
            Err(MemoError::Configuration { value: 0 })
        );

        let negative = Config { max_cache_size: -5 };
        assert_eq!(
            negative.capacity(),
            Err(MemoError::Configuration { value: -5 })
        );
    }
}
