//! Logging setup for applications using the cache.
//!
//! The crate itself only emits `tracing` events; nothing is printed unless a
//! subscriber is installed, either by the application or through
//! [`init_logging`].

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Verbosity for the crate's own events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    /// Key choices, hits, misses, evictions and bypass reasons
    Debug,
}

impl LogLevel {
    fn default_directive(self) -> &'static str {
        match self {
            LogLevel::Info => "function_cache=info",
            LogLevel::Debug => "function_cache=debug",
        }
    }
}

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. Fails if a global
/// subscriber is already installed.
pub fn init_logging(level: LogLevel) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| level.default_directive().into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to install tracing subscriber")
}

/// Shorthand for [`init_logging`] at [`LogLevel::Debug`].
pub fn enable_debug_logging() -> anyhow::Result<()> {
    init_logging(LogLevel::Debug)
}
