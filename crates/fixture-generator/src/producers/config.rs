//! Config-driven producers.
//!
//! Lets a parameters file replace the built-in producer of a type or a
//! single field:
//!
//! ```yaml
//! producers:
//!   - field: User.email
//!     generator:
//!       type: pattern
//!       pattern: "user_{index}@example.com"
//!   - type: Long
//!     generator:
//!       type: int_range
//!       min: 1
//!       max: 1000
//! ```

use super::static_value::{coerce, yaml_to_generated_value};
use super::{array, numeric, pattern, temporal, uuid, ProducerContext, ValueProducer};
use crate::error::ProducerError;
use crate::parameters::MAX_COLLECTION_SIZE;
use fixture_core::{BuiltinType, GeneratedValue, TypeExpr};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Producer configuration.
///
/// This enum defines the different kinds of configurable producers. Every
/// produced value is coerced to the type of the field or type it is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProducerConfig {
    /// Generate UUIDs (v4) from the seeded source
    UuidV4,

    /// Generate integers counting up from `start` with the object index
    Sequential {
        /// Starting value
        #[serde(default)]
        start: i64,
    },

    /// Generate values using a pattern with placeholders
    Pattern {
        /// Pattern string (supports {index}, {uuid}, {rand:N})
        pattern: String,
    },

    /// Generate random integers in a range
    IntRange {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Generate random floats in a range
    FloatRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate random decimals in a range
    DecimalRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate timestamps in a range
    TimestampRange {
        /// Start timestamp (ISO 8601)
        start: String,
        /// End timestamp (ISO 8601)
        end: String,
    },

    /// Generate random durations in a range (in seconds)
    DurationRange {
        /// Minimum duration in seconds (inclusive)
        min_secs: u64,
        /// Maximum duration in seconds (inclusive)
        max_secs: u64,
    },

    /// Generate weighted boolean values
    WeightedBool {
        /// Weight for true value (0.0 to 1.0)
        true_weight: f64,
    },

    /// Generate random selection from a pool of values
    OneOf {
        /// Pool of values to select from
        values: Vec<serde_yaml::Value>,
    },

    /// Generate arrays by sampling from a pool
    SampleArray {
        /// Pool of values to sample from
        pool: Vec<String>,
        /// Minimum array length
        #[serde(default)]
        min_length: usize,
        /// Maximum array length
        max_length: usize,
    },

    /// Generate a static value
    Static {
        /// The static value to use
        value: serde_yaml::Value,
    },

    /// Generate null values
    Null,
}

impl ProducerConfig {
    /// Check the configuration, returning the reason it is unusable.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::IntRange { min, max } if min > max => {
                Err(format!("int_range min ({min}) is greater than max ({max})"))
            }
            Self::FloatRange { min, max } | Self::DecimalRange { min, max }
                if !(min <= max) =>
            {
                Err(format!("range min ({min}) is greater than max ({max})"))
            }
            Self::DurationRange { min_secs, max_secs } if min_secs > max_secs => Err(format!(
                "duration_range min_secs ({min_secs}) is greater than max_secs ({max_secs})"
            )),
            Self::DurationRange { max_secs, .. } if i64::try_from(*max_secs).is_err() => {
                Err(format!("duration_range max_secs ({max_secs}) is too large"))
            }
            Self::WeightedBool { true_weight } if !(0.0..=1.0).contains(true_weight) => Err(
                format!("weighted_bool true_weight ({true_weight}) must be within 0.0..=1.0"),
            ),
            Self::TimestampRange { start, end } => {
                match (
                    temporal::parse_timestamp(start),
                    temporal::parse_timestamp(end),
                ) {
                    (Some(s), Some(e)) if s <= e => Ok(()),
                    (Some(_), Some(_)) => Err(format!("timestamp_range {start} is after {end}")),
                    _ => Err(format!(
                        "timestamp_range bounds '{start}' and '{end}' must be ISO 8601"
                    )),
                }
            }
            Self::SampleArray {
                min_length,
                max_length,
                ..
            } if min_length > max_length => Err(format!(
                "sample_array min_length ({min_length}) is greater than max_length ({max_length})"
            )),
            Self::SampleArray { max_length, .. } if *max_length > MAX_COLLECTION_SIZE => Err(
                format!("sample_array max_length ({max_length}) exceeds {MAX_COLLECTION_SIZE}"),
            ),
            Self::Pattern { pattern } => match pattern::oversized_rand_placeholder(pattern) {
                Some(digits) => Err(format!(
                    "pattern placeholder {{rand:{digits}}} exceeds {} digits",
                    pattern::MAX_RANDOM_DIGITS
                )),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

impl ValueProducer for ProducerConfig {
    fn produce(&self, ctx: &mut ProducerContext<'_>) -> Result<GeneratedValue, ProducerError> {
        let kind = match ctx.target.builtin() {
            Some(BuiltinType::Scalar(kind)) => Some(kind),
            _ => None,
        };
        let rng = &mut *ctx.rng;

        let value = match self {
            Self::UuidV4 => uuid::generate_uuid_v4(rng),

            Self::Sequential { start } => {
                GeneratedValue::Int64(start.wrapping_add(ctx.index as i64))
            }

            Self::Pattern { pattern } => pattern::generate_pattern(pattern, rng, ctx.index),

            Self::IntRange { min, max } => numeric::integer_in(rng, kind, *min, *max),

            Self::FloatRange { min, max } => numeric::float_in(rng, kind, *min, *max),

            Self::DecimalRange { min, max } => {
                numeric::decimal_in(rng, *min, *max, numeric::DEFAULT_DECIMAL_SCALE)
            }

            Self::TimestampRange { start, end } => {
                temporal::generate_timestamp_range(rng, start, end).ok_or_else(|| {
                    ProducerError::new(format!("invalid timestamp range '{start}'..'{end}'"))
                })?
            }

            Self::DurationRange { min_secs, max_secs } => {
                let min = i64::try_from(*min_secs).unwrap_or(i64::MAX);
                let max = i64::try_from(*max_secs).unwrap_or(i64::MAX);
                temporal::generate_duration(rng, min, max)
            }

            Self::WeightedBool { true_weight } => {
                if !(0.0..=1.0).contains(true_weight) {
                    return Err(ProducerError::new(format!(
                        "true_weight {true_weight} is not a probability"
                    )));
                }
                GeneratedValue::Bool(rng.random_bool(*true_weight))
            }

            Self::OneOf { values } => {
                if values.is_empty() {
                    GeneratedValue::Null
                } else {
                    let idx = rng.random_range(0..values.len());
                    yaml_to_generated_value(&values[idx])
                }
            }

            Self::SampleArray {
                pool,
                min_length,
                max_length,
            } => {
                return Ok(array::generate_sample_array_for(
                    rng,
                    pool,
                    *min_length,
                    *max_length,
                    ctx.target,
                    ctx.resolver,
                ))
            }

            Self::Static { value } => yaml_to_generated_value(value),

            Self::Null => GeneratedValue::Null,
        };

        Ok(coerce(value, ctx.target, ctx.resolver))
    }
}

/// A producer bound to a type or to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerBinding {
    /// Field as `Type.field`, or a bare field name matching any type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Type the producer applies to (narrows field bindings)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TypeExpr>,

    /// Producer configuration
    pub generator: ProducerConfig,
}

impl ProducerBinding {
    /// Split `field` into its declaring type and field name.
    pub fn field_parts(&self) -> Option<(Option<&str>, &str)> {
        self.field.as_deref().map(|field| match field.rsplit_once('.') {
            Some((declaring, name)) => (Some(declaring), name),
            None => (None, field),
        })
    }
}
