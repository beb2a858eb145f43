//! Value representation of populated object graphs.
//!
//! Every populated instance is a tree of [`GeneratedValue`]s: scalars at the
//! leaves, containers and records above them. Records carry the raw name of
//! the type they were built from so output stays self-describing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use ulid::Ulid;
use uuid::Uuid;

/// Key under which a record's type name is serialized.
pub const TYPE_KEY: &str = "@type";

/// A generated value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    /// Null value (unset field, empty optional, truncated reference)
    Null,

    /// Boolean value
    Bool(bool),

    /// 32-bit signed integer (also carries i8/i16 values)
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit unsigned integer (also carries u8..u32 values)
    UInt64(u64),

    /// Floating point (also carries f32 values)
    Float64(f64),

    /// Decimal value stored as string with precision info
    Decimal {
        /// String representation of the decimal value
        value: String,
        /// Total number of digits
        precision: u8,
        /// Number of digits after decimal point
        scale: u8,
    },

    /// Single character
    Char(char),

    /// String value
    String(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// UUID value
    Uuid(Uuid),

    /// ULID value
    Ulid(Ulid),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Date and time without zone
    LocalDateTime(NaiveDateTime),

    /// Date and time in UTC
    DateTime(DateTime<Utc>),

    /// Elapsed time
    Duration(TimeDelta),

    /// Ordered sequence (lists and arrays)
    Array(Vec<GeneratedValue>),

    /// Distinct elements in insertion order
    Set(Vec<GeneratedValue>),

    /// Entries with distinct keys in insertion order
    Map(Vec<(GeneratedValue, GeneratedValue)>),

    /// Enum variant
    Enum {
        /// Enum type name
        type_name: String,
        /// Variant name
        variant: String,
    },

    /// Populated composite instance
    Record {
        /// Raw name of the instantiated type
        type_name: String,
        /// Field values by name
        fields: BTreeMap<String, GeneratedValue>,
    },
}

impl GeneratedValue {
    /// Create a new decimal value.
    pub fn decimal(value: impl Into<String>, precision: u8, scale: u8) -> Self {
        Self::Decimal {
            value: value.into(),
            precision,
            scale,
        }
    }

    /// Create an empty record.
    pub fn record(type_name: impl Into<String>) -> Self {
        Self::Record {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(i) => Some(*i),
            Self::Int32(i) => Some(*i as i64),
            Self::UInt64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Enum { variant, .. } => Some(variant),
            _ => None,
        }
    }

    /// Try to get this value's elements (arrays and sets).
    pub fn as_elements(&self) -> Option<&[GeneratedValue]> {
        match self {
            Self::Array(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value's map entries.
    pub fn as_entries(&self) -> Option<&[(GeneratedValue, GeneratedValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Try to get this value's record fields.
    pub fn as_record(&self) -> Option<&BTreeMap<String, GeneratedValue>> {
        match self {
            Self::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Get a record field by name.
    pub fn get_field(&self, name: &str) -> Option<&GeneratedValue> {
        self.as_record().and_then(|fields| fields.get(name))
    }

    /// Type name of a record or enum value.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Record { type_name, .. } | Self::Enum { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Number of elements, entries or characters, for sized values.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(items) | Self::Set(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            Self::String(s) => Some(s.chars().count()),
            Self::Bytes(b) => Some(b.len()),
            _ => None,
        }
    }

    /// Text form used for map keys in serialized output.
    pub fn key_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Char(c) => c.to_string(),
            Self::Enum { variant, .. } => variant.clone(),
            Self::Decimal { value, .. } => value.clone(),
            other => match serde_json::to_value(other) {
                Ok(serde_json::Value::String(s)) => s,
                Ok(value) => value.to_string(),
                Err(_) => String::new(),
            },
        }
    }
}

impl Serialize for GeneratedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int32(i) => serializer.serialize_i32(*i),
            Self::Int64(i) => serializer.serialize_i64(*i),
            Self::UInt64(u) => serializer.serialize_u64(*u),
            Self::Float64(f) => serializer.serialize_f64(*f),
            Self::Decimal { value, .. } => serializer.serialize_str(value),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Self::Uuid(u) => serializer.collect_str(u),
            Self::Ulid(u) => serializer.collect_str(u),
            Self::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Self::Time(t) => serializer.collect_str(&t.format("%H:%M:%S%.f")),
            Self::LocalDateTime(dt) => serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Self::Duration(d) => serializer.collect_str(d),
            Self::Array(items) | Self::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&key.key_string(), value)?;
                }
                map.end()
            }
            Self::Enum { variant, .. } => serializer.serialize_str(variant),
            Self::Record { type_name, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry(TYPE_KEY, type_name)?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}
