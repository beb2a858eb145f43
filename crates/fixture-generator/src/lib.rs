//! Seeded object graph generator.
//!
//! This crate provides the `ObjectGenerator` which fills instances of the
//! types in a [`TypeCatalog`](fixture_core::TypeCatalog) with pseudo-random
//! values. The generator uses a seeded RNG per object, so the same seed,
//! catalog and configuration always produce the same graph.
//!
//! # Architecture
//!
//! ```text
//! TypeCatalog (YAML)      Parameters
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────────────────────────┐
//! │          ObjectGenerator         │
//! │                                  │
//! │  - Resolver (generic bindings)   │
//! │  - ProducerRegistry              │
//! │  - PopulationContext (per call)  │
//! └────────────────┬─────────────────┘
//!                  │
//!                  ▼
//!      GeneratedValue::Record { type_name, fields }
//! ```
//!
//! # Example
//!
//! ```rust
//! use fixture_core::TypeCatalog;
//! use fixture_generator::{ObjectGenerator, Parameters};
//!
//! let catalog = TypeCatalog::from_yaml(r#"
//! types:
//!   - name: Parent
//!     kind: abstract
//!     params: [T]
//!     fields:
//!       - name: id
//!         type: T
//!   - name: User
//!     extends: Parent<Long>
//!     fields:
//!       - name: email
//!         type: String
//!       - name: tags
//!         type: List<String>
//! "#).unwrap();
//!
//! let generator = ObjectGenerator::new(catalog, Parameters::new().seed(42)).unwrap();
//! let user = generator.next_object("User").unwrap();
//! assert!(user.get_field("id").and_then(|id| id.as_i64()).is_some());
//! ```
//!
//! # Producers
//!
//! Every built-in scalar has a producer. Producers registered later take
//! priority, and a parameters file may bind config-driven producers to types
//! or fields:
//!
//! - `uuid_v4` - Random UUID v4
//! - `sequential` - Sequential integers
//! - `pattern` - Pattern strings with placeholders (`{index}`, `{uuid}`, `{rand:N}`)
//! - `int_range` - Random integers in a range
//! - `float_range` - Random floats in a range
//! - `decimal_range` - Random decimals in a range
//! - `timestamp_range` - Random timestamps in a date range
//! - `duration_range` - Random durations in a range of seconds
//! - `weighted_bool` - Boolean with configurable true probability
//! - `one_of` - Random selection from a list
//! - `sample_array` - Array of random samples from a pool
//! - `static` - Static value
//! - `null` - Null value

pub mod context;
pub mod error;
pub mod generator;
pub mod parameters;
pub mod producers;
pub mod random;
pub mod registry;

// Re-exports for convenience
pub use context::{Diagnostic, DiagnosticKind, FieldPath, ObjectPool, PathSegment, PopulationContext};
pub use error::{ConfigurationError, GeneratorError, ProducerError};
pub use generator::{ObjectGenerator, ObjectIterator, Population};
pub use parameters::{DateRange, Parameters, SizeRange, MAX_COLLECTION_SIZE, MAX_STRING_LENGTH};
pub use producers::{
    ConstantProducer, ProducerBinding, ProducerConfig, ProducerContext, ScalarProducer,
    ValueProducer,
};
pub use random::RandomSource;
pub use registry::{FieldMatcher, ProducerRegistry, TypeMatcher, TypePredicate};
