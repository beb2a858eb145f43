//! Core types for fixture-gen.
//!
//! This crate provides the static type model that object population works
//! from:
//!
//! - [`TypeExpr`] - Types as declared, possibly mentioning type variables
//! - [`TypeCatalog`] - Type definitions loaded from YAML or built in code
//! - [`Resolver`] - Generic type resolution along inheritance chains
//! - [`TypeDescriptor`] - Fully resolved type occurrences
//! - [`GeneratedValue`] - The populated object graph
//!
//! # Architecture
//!
//! ```text
//! fixture-core (this crate)
//!    │
//!    └─── fixture-generator  (populates descriptors into GeneratedValues)
//!            │
//!            └─── fixture-gen  (CLI)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fixture_core::{Resolver, TypeCatalog, TypeDescriptor};
//!
//! let catalog = TypeCatalog::from_yaml(r#"
//! types:
//!   - name: Parent
//!     kind: abstract
//!     params: [T]
//!     fields:
//!       - name: id
//!         type: T
//!   - name: Intermediate
//!     kind: abstract
//!     params: [T]
//!     extends: Parent<T>
//!   - name: Sub
//!     extends: Intermediate<List<String>>
//! "#).unwrap();
//!
//! let resolver = Resolver::new(Arc::new(catalog));
//! let fields = resolver.fields_of(&TypeDescriptor::named("Sub"));
//! assert_eq!(fields[0].field_type.to_string(), "list<string>");
//! ```

pub mod catalog;
pub mod descriptor;
pub mod resolver;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use catalog::{
    CatalogError, ConstructorDefinition, ConstructorParameter, FieldDefinition, Shape,
    TypeCatalog, TypeDefinition, TypeKind, TypeParameter,
};
pub use descriptor::TypeDescriptor;
pub use resolver::{BindingContext, ResolvedConstructor, ResolvedField, Resolver, Supertypes};
pub use types::{
    canonical_name, BuiltinType, ContainerKind, ScalarKind, TypeExpr, TypeParseError, OBJECT,
};
pub use values::{GeneratedValue, TYPE_KEY};
