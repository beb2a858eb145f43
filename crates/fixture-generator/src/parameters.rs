//! Generation parameters.
//!
//! Parameters are an immutable snapshot handed to the generator. They can be
//! built in code or read from YAML; missing keys take their defaults.
//!
//! ```yaml
//! seed: 42
//! collection_size_range: { min: 1, max: 3 }
//! string_length_range: { min: 5, max: 10 }
//! max_depth: 4
//! excluded_fields: [Order.internal_notes, customer.password]
//! ```

use crate::error::ConfigurationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Largest element count a collection may be asked for.
pub const MAX_COLLECTION_SIZE: usize = 100_000;

/// Largest length a generated string or byte array may be asked for.
pub const MAX_STRING_LENGTH: usize = 1 << 20;

/// Inclusive size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    /// Minimum size (inclusive)
    pub min: usize,
    /// Maximum size (inclusive)
    pub max: usize,
}

impl SizeRange {
    /// Create a new range.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check if `size` lies within the range.
    pub fn contains(&self, size: usize) -> bool {
        (self.min..=self.max).contains(&size)
    }

    fn validate(&self, name: &'static str, limit: usize) -> Result<(), ConfigurationError> {
        if self.min > self.max {
            return Err(ConfigurationError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        if self.max > limit {
            return Err(ConfigurationError::RangeTooLarge {
                name,
                max: self.max,
                limit,
            });
        }
        Ok(())
    }
}

/// Inclusive bounds for generated dates and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Parameters controlling one generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Seed of the random source
    pub seed: u64,

    /// Element count of lists, sets, maps and arrays
    pub collection_size_range: SizeRange,

    /// Length of generated strings and byte arrays
    pub string_length_range: SizeRange,

    /// Recursion ceiling; values deeper than this are left empty
    pub max_depth: usize,

    /// Instances kept per type for reuse
    pub object_pool_size: usize,

    /// Re-populate initialized fields and reuse pooled instances
    pub override_default_initialization: bool,

    /// Fields to leave unpopulated, as `Type.field` or a dotted path from the root
    pub excluded_fields: BTreeSet<String>,

    /// Fail instead of skipping fields whose type cannot be resolved
    pub strict_unresolved_types: bool,

    /// Populate abstract types and interfaces through a concrete subtype
    pub scan_concrete_types: bool,

    /// Bounds for dates and timestamps
    pub date_range: DateRange,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            seed: 123,
            collection_size_range: SizeRange::new(1, 5),
            string_length_range: SizeRange::new(1, 32),
            max_depth: 16,
            object_pool_size: 10,
            override_default_initialization: false,
            excluded_fields: BTreeSet::new(),
            strict_unresolved_types: false,
            scan_concrete_types: false,
            date_range: DateRange::default(),
        }
    }
}

impl Parameters {
    /// Create parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse parameters from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Set the seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set both the collection size and the string length range.
    pub fn size_range(mut self, min: usize, max: usize) -> Self {
        self.collection_size_range = SizeRange::new(min, max);
        self.string_length_range = SizeRange::new(min, max);
        self
    }

    /// Set the collection size range.
    pub fn collection_size_range(mut self, min: usize, max: usize) -> Self {
        self.collection_size_range = SizeRange::new(min, max);
        self
    }

    /// Set the string length range.
    pub fn string_length_range(mut self, min: usize, max: usize) -> Self {
        self.string_length_range = SizeRange::new(min, max);
        self
    }

    /// Set the maximum depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the object pool capacity per type.
    pub fn object_pool_size(mut self, size: usize) -> Self {
        self.object_pool_size = size;
        self
    }

    /// Enable or disable re-population of initialized fields.
    pub fn override_default_initialization(mut self, enabled: bool) -> Self {
        self.override_default_initialization = enabled;
        self
    }

    /// Exclude a field (`Type.field` or a dotted path from the root).
    pub fn exclude_field(mut self, field: impl Into<String>) -> Self {
        self.excluded_fields.insert(field.into());
        self
    }

    /// Enable or disable strict handling of unresolved types.
    pub fn strict_unresolved_types(mut self, enabled: bool) -> Self {
        self.strict_unresolved_types = enabled;
        self
    }

    /// Enable or disable concrete subtype substitution.
    pub fn scan_concrete_types(mut self, enabled: bool) -> Self {
        self.scan_concrete_types = enabled;
        self
    }

    /// Set the date range.
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = DateRange { start, end };
        self
    }

    /// Check the parameters for consistency.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.collection_size_range
            .validate("collection_size_range", MAX_COLLECTION_SIZE)?;
        self.string_length_range
            .validate("string_length_range", MAX_STRING_LENGTH)?;
        if self.date_range.start > self.date_range.end {
            return Err(ConfigurationError::InvalidDateRange {
                start: self.date_range.start.to_string(),
                end: self.date_range.end.to_string(),
            });
        }
        Ok(())
    }
}
