//! Error types for object generation.

use fixture_core::{CatalogError, TypeParseError};

/// Invalid generation parameters, raised before any population starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Inclusive range with min above max
    #[error("Invalid {name}: min ({min}) is greater than max ({max})")]
    InvalidRange {
        name: &'static str,
        min: usize,
        max: usize,
    },

    /// Range whose upper bound exceeds what the generator will allocate
    #[error("Invalid {name}: max ({max}) exceeds the limit of {limit}")]
    RangeTooLarge {
        name: &'static str,
        max: usize,
        limit: usize,
    },

    /// Date range with start after end
    #[error("Invalid date_range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Producer configuration that cannot be applied
    #[error("Invalid producer for '{target}': {reason}")]
    InvalidProducer { target: String, reason: String },
}

/// Failure reported by a value producer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ProducerError {
    /// What went wrong
    pub message: String,
}

impl ProducerError {
    /// Create a new producer error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error type for generator operations.
///
/// Every failure that aborts a population call carries the field path that
/// was being populated, e.g. `Order.lines[2].product`.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Invalid parameters
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Malformed requested type
    #[error("Invalid type: {0}")]
    InvalidType(#[from] TypeParseError),

    /// Requested type is neither built in nor in the catalog
    #[error("Type not found: {0}")]
    UnknownType(String),

    /// A composite type could not be instantiated
    #[error("Cannot create instance of '{type_name}' at {path}: {reason}")]
    ObjectCreation {
        type_name: String,
        path: String,
        reason: String,
    },

    /// A registered producer failed
    #[error("Producer for '{type_name}' failed at {path}: {source}")]
    Population {
        type_name: String,
        path: String,
        #[source]
        source: ProducerError,
    },

    /// Unresolvable type in strict mode
    #[error("Unresolved type at {path}")]
    UnresolvedType { path: String },
}

impl GeneratorError {
    /// Field path the failure occurred at, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::ObjectCreation { path, .. }
            | Self::Population { path, .. }
            | Self::UnresolvedType { path } => Some(path),
            _ => None,
        }
    }
}
