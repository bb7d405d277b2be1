mod float64;

pub use float64::Float64;

use crate::record::Record;
use serde::Serialize;
use std::fmt;

///
/// MapValueError
///
/// Invariant violations for `Value::Map` construction/normalization.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MapValueError {
    NonScalarKey { index: usize, key: Box<Value> },
    DuplicateKey { left_index: usize, right_index: usize },
}

impl fmt::Display for MapValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonScalarKey { index, key } => {
                write!(f, "map key at index {index} is not scalar: {key:?}")
            }
            Self::DuplicateKey {
                left_index,
                right_index,
            } => write!(
                f,
                "map contains duplicate keys at normalized positions {left_index} and {right_index}"
            ),
        }
    }
}

impl std::error::Error for MapValueError {}

///
/// Value
///
/// Runtime value stored in record slots and collection entries.
///
/// Variant declaration order doubles as the canonical rank for the total
/// order, so `Ord` is derived rather than hand-ranked.
///
/// Null → the slot is bound but carries no payload.
/// Map  → canonical deterministic map representation: entries are always
///        sorted by key, keys are scalar and unique, insertion order is
///        discarded. Construct through [`Value::map`].
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(Float64),
    Text(String),
    Blob(Vec<u8>),
    /// Ordered list of values; order is significant for equality and hashing.
    List(Vec<Self>),
    Map(Vec<(Self, Self)>),
    /// Nested data object.
    Record(Record),
}

impl Value {
    /// Construct a float value, rejecting non-finite payloads.
    #[must_use]
    pub fn float(v: f64) -> Option<Self> {
        Float64::try_new(v).map(Self::Float)
    }

    /// Construct a canonical map value from unordered entries.
    ///
    /// Keys must be scalar and unique; entries are sorted by key.
    pub fn map(entries: Vec<(Self, Self)>) -> Result<Self, MapValueError> {
        for (index, (key, _)) in entries.iter().enumerate() {
            if !key.is_scalar() {
                return Err(MapValueError::NonScalarKey {
                    index,
                    key: Box::new(key.clone()),
                });
            }
        }

        let mut entries = entries;
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (i, window) in entries.windows(2).enumerate() {
            if window[0].0 == window[1].0 {
                return Err(MapValueError::DuplicateKey {
                    left_index: i,
                    right_index: i + 1,
                });
            }
        }

        Ok(Self::Map(entries))
    }

    /// Return the kind tag used by type-constraint checks.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Blob(_) => ValueKind::Blob,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Record(_) => ValueKind::Record,
        }
    }

    /// Scalars are everything that can key a canonical map.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_) | Self::Record(_))
    }

    /// Return the nested record, if this value is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Blob(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Record(record) => write!(f, "{record}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

///
/// ValueKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Blob,
    List,
    Map,
    Record,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::List => "list",
            Self::Map => "map",
            Self::Record => "record",
        };

        write!(f, "{name}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_sorts_entries_and_discards_insertion_order() {
        let a = Value::map(vec![
            (Value::Int(2), Value::from("b")),
            (Value::Int(1), Value::from("a")),
        ])
        .unwrap();
        let b = Value::map(vec![
            (Value::Int(1), Value::from("a")),
            (Value::Int(2), Value::from("b")),
        ])
        .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn map_rejects_duplicate_keys() {
        let err = Value::map(vec![
            (Value::Int(1), Value::from("a")),
            (Value::Int(1), Value::from("b")),
        ])
        .unwrap_err();

        assert!(matches!(err, MapValueError::DuplicateKey { .. }));
    }

    #[test]
    fn map_rejects_non_scalar_keys() {
        let err = Value::map(vec![(Value::List(vec![]), Value::Null)]).unwrap_err();

        assert!(matches!(err, MapValueError::NonScalarKey { index: 0, .. }));
    }

    #[test]
    fn float_values_hash_and_compare_totally() {
        assert!(Value::float(f64::NAN).is_none());
        assert_eq!(Value::float(-0.0), Value::float(0.0));
        assert!(Value::float(1.0) < Value::float(2.0));
    }
}
