//! Call Arguments Module
//!
//! Positional and keyword arguments of a single call.

use serde::{Deserialize, Serialize};

use super::ArgValue;

// == Call Args ==
/// Arguments passed to a memoized computation.
///
/// Keyword arguments keep the order they were first given in. Setting a
/// keyword that already exists replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    pub positional: Vec<ArgValue>,
    #[serde(default)]
    pub keyword: Vec<(String, ArgValue)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds arguments from positional values only.
    pub fn positional<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgValue>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: Vec::new(),
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.keyword.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.keyword.push((name, value)),
        }
        self
    }

    /// Looks up a keyword argument by name.
    pub fn get_kwarg(&self, name: &str) -> Option<&ArgValue> {
        self.keyword
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    // == Flatten ==
    /// All argument values in key order: positional first, then keyword
    /// values. Keyword names do not take part.
    pub fn flatten(&self) -> impl Iterator<Item = &ArgValue> + '_ {
        self.positional
            .iter()
            .chain(self.keyword.iter().map(|(_, v)| v))
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}
