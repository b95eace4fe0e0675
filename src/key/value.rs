//! Argument Value Module
//!
//! Dynamically typed call arguments and the key-able capability check.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::truthy::Truthy;

// == Arg Value ==
/// A single call argument.
///
/// `List` and `Map` model mutable containers: they can be passed to a
/// computation but never take part in a cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Immutable sequence, key-able when every element is
    Tuple(Vec<ArgValue>),
    /// Mutable sequence
    List(Vec<ArgValue>),
    /// Mutable mapping, in insertion order
    Map(Vec<(String, ArgValue)>),
}

impl ArgValue {
    // == Key-able ==
    /// Returns true if the value can be used as part of a cache key.
    ///
    /// NaN floats are excluded since they never compare equal to themselves.
    pub fn is_keyable(&self) -> bool {
        match self {
            ArgValue::Null
            | ArgValue::Bool(_)
            | ArgValue::Int(_)
            | ArgValue::Str(_)
            | ArgValue::Bytes(_) => true,
            ArgValue::Float(f) => !f.is_nan(),
            ArgValue::Tuple(items) => items.iter().all(ArgValue::is_keyable),
            ArgValue::List(_) | ArgValue::Map(_) => false,
        }
    }

    /// Builds a tuple from anything convertible into argument values.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgValue>,
    {
        ArgValue::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a list from anything convertible into argument values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgValue>,
    {
        ArgValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a map from name/value pairs, keeping their order.
    pub fn map<I, K, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<ArgValue>,
    {
        ArgValue::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Bit pattern used for float equality and hashing, with `-0.0` folded into `0.0`.
fn float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgValue::Null, ArgValue::Null) => true,
            (ArgValue::Bool(a), ArgValue::Bool(b)) => a == b,
            (ArgValue::Int(a), ArgValue::Int(b)) => a == b,
            (ArgValue::Float(a), ArgValue::Float(b)) => float_bits(*a) == float_bits(*b),
            (ArgValue::Str(a), ArgValue::Str(b)) => a == b,
            (ArgValue::Bytes(a), ArgValue::Bytes(b)) => a == b,
            (ArgValue::Tuple(a), ArgValue::Tuple(b)) => a == b,
            (ArgValue::List(a), ArgValue::List(b)) => a == b,
            (ArgValue::Map(a), ArgValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ArgValue {}

impl Hash for ArgValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ArgValue::Null => {}
            ArgValue::Bool(b) => b.hash(state),
            ArgValue::Int(i) => i.hash(state),
            ArgValue::Float(f) => float_bits(*f).hash(state),
            ArgValue::Str(s) => s.hash(state),
            ArgValue::Bytes(b) => b.hash(state),
            ArgValue::Tuple(items) | ArgValue::List(items) => items.hash(state),
            ArgValue::Map(pairs) => pairs.hash(state),
        }
    }
}

impl Truthy for ArgValue {
    fn is_truthy(&self) -> bool {
        match self {
            ArgValue::Null => false,
            ArgValue::Bool(b) => *b,
            ArgValue::Int(i) => *i != 0,
            ArgValue::Float(f) => *f != 0.0,
            ArgValue::Str(s) => !s.is_empty(),
            ArgValue::Bytes(b) => !b.is_empty(),
            ArgValue::Tuple(items) | ArgValue::List(items) => !items.is_empty(),
            ArgValue::Map(pairs) => !pairs.is_empty(),
        }
    }
}

// == Conversions ==
impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(value: $t) -> Self {
                ArgValue::Int(i64::from(value))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<f32> for ArgValue {
    fn from(value: f32) -> Self {
        ArgValue::Float(f64::from(value))
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<&[u8]> for ArgValue {
    fn from(value: &[u8]) -> Self {
        ArgValue::Bytes(value.to_vec())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArgValue::Null, Into::into)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(value: Vec<T>) -> Self {
        ArgValue::list(value)
    }
}

impl From<serde_json::Value> for ArgValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ArgValue::Null,
            Value::Bool(b) => ArgValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ArgValue::Int(i),
                None => ArgValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ArgValue::Str(s),
            Value::Array(items) => ArgValue::list(items),
            Value::Object(fields) => ArgValue::map(fields),
        }
    }
}
