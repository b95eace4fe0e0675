//! Key Extraction Module
//!
//! Derives a cache key from the key-able subset of a call's arguments.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::{ArgValue, CallArgs};

// == Cache Key ==
/// An ordered sequence of key-able argument values.
///
/// Only built by [`derive_key`], so every value it holds is key-able.
/// Serializable for reporting, but never read back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(Vec<ArgValue>);

impl CacheKey {
    pub fn values(&self) -> &[ArgValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", value)?;
        }
        write!(f, ")")
    }
}

// == Derive Key ==
/// Derives a cache key from a flattened argument sequence.
///
/// The leftmost non-key-able value is removed and the remainder retested
/// until everything left is key-able. Returns `None` when nothing is left,
/// including for an empty input.
///
/// Two calls that differ only in non-key-able arguments derive the same key.
pub fn derive_key<'a, I>(values: I) -> Option<CacheKey>
where
    I: IntoIterator<Item = &'a ArgValue>,
{
    let mut remaining: Vec<&ArgValue> = values.into_iter().collect();

    while let Some(idx) = remaining.iter().position(|v| !v.is_keyable()) {
        let dropped = remaining.remove(idx);
        trace!(index = idx, value = ?dropped, "dropping non-key-able argument");
    }

    if remaining.is_empty() {
        return None;
    }

    Some(CacheKey(remaining.into_iter().cloned().collect()))
}

/// Derives the cache key for a full set of call arguments.
pub fn key_for(args: &CallArgs) -> Option<CacheKey> {
    derive_key(args.flatten())
}
