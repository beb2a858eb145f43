//! Value-producer registry.
//!
//! Producers are registered against a type matcher or a field matcher. Type
//! lookups try exact matches first (the most recent registration wins), then
//! predicate matches ordered by specificity. Built-in scalar producers are
//! registered first, so anything registered later replaces them.

use crate::producers::{ScalarProducer, ValueProducer};
use fixture_core::{canonical_name, ResolvedField, Resolver, ScalarKind, TypeDescriptor};
use std::fmt;
use std::sync::Arc;

/// Predicate over resolved descriptors.
pub type TypePredicate = Arc<dyn Fn(&TypeDescriptor) -> bool + Send + Sync>;

/// Selects the descriptors a producer applies to.
#[derive(Clone)]
pub enum TypeMatcher {
    /// Exactly this descriptor. A descriptor without arguments matches every
    /// parameterization of its raw type.
    Exact(TypeDescriptor),
    /// Every descriptor assignable to the named raw type
    AssignableTo(String),
    /// Arbitrary predicate; higher specificity wins over lower
    Predicate {
        /// Rank among predicate matches
        specificity: usize,
        /// Test applied to the looked-up descriptor
        test: TypePredicate,
    },
}

impl TypeMatcher {
    /// Exact match on the descriptor named `raw`.
    pub fn exact(raw: &str) -> Self {
        Self::Exact(TypeDescriptor::named(canonical_name(raw)))
    }

    /// Assignability match on the raw type.
    pub fn assignable_to(raw: &str) -> Self {
        Self::AssignableTo(canonical_name(raw).to_string())
    }

    /// Predicate match.
    pub fn predicate<F>(specificity: usize, test: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> bool + Send + Sync + 'static,
    {
        Self::Predicate {
            specificity,
            test: Arc::new(test),
        }
    }
}

impl fmt::Debug for TypeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(desc) => f.debug_tuple("Exact").field(desc).finish(),
            Self::AssignableTo(raw) => f.debug_tuple("AssignableTo").field(raw).finish(),
            Self::Predicate { specificity, .. } => f
                .debug_struct("Predicate")
                .field("specificity", specificity)
                .finish_non_exhaustive(),
        }
    }
}

/// Selects the fields a producer applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatcher {
    /// Field name
    pub name: String,
    /// Type declaring the field, or any of its subtypes
    pub declaring_type: Option<String>,
    /// Resolved field type; without arguments it matches any parameterization
    pub field_type: Option<TypeDescriptor>,
}

impl FieldMatcher {
    /// Match every field called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type: None,
            field_type: None,
        }
    }

    /// Restrict the match to fields of `declaring_type` and its subtypes.
    pub fn on(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    /// Restrict the match to fields of the given resolved type.
    pub fn of_type(mut self, field_type: TypeDescriptor) -> Self {
        self.field_type = Some(field_type);
        self
    }

    fn constraints(&self) -> usize {
        usize::from(self.declaring_type.is_some()) + usize::from(self.field_type.is_some())
    }

    fn matches(&self, instance: &TypeDescriptor, field: &ResolvedField, resolver: &Resolver) -> bool {
        if self.name != field.name {
            return false;
        }
        if let Some(declaring) = &self.declaring_type {
            if *declaring != field.declaring_type && !resolver.is_subtype(instance, declaring) {
                return false;
            }
        }
        match &self.field_type {
            Some(expected) => exact_match(expected, &field.field_type),
            None => true,
        }
    }
}

fn exact_match(registered: &TypeDescriptor, desc: &TypeDescriptor) -> bool {
    registered == desc
        || (registered.args().is_empty()
            && registered.raw().is_some()
            && registered.raw() == desc.raw())
}

/// Ordered producer registrations.
#[derive(Clone, Default)]
pub struct ProducerRegistry {
    types: Vec<(TypeMatcher, Arc<dyn ValueProducer>)>,
    fields: Vec<(FieldMatcher, Arc<dyn ValueProducer>)>,
}

impl ProducerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding a producer for every built-in scalar kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in ScalarKind::ALL {
            registry.register(TypeMatcher::exact(kind.name()), Arc::new(ScalarProducer(kind)));
        }
        registry
    }

    /// Register a producer for matching types.
    pub fn register(&mut self, matcher: TypeMatcher, producer: Arc<dyn ValueProducer>) {
        self.types.push((matcher, producer));
    }

    /// Register a producer for matching fields.
    pub fn register_field(&mut self, matcher: FieldMatcher, producer: Arc<dyn ValueProducer>) {
        self.fields.push((matcher, producer));
    }

    /// Number of type and field registrations.
    pub fn len(&self) -> usize {
        self.types.len() + self.fields.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.fields.is_empty()
    }

    /// Find the producer for a resolved descriptor.
    ///
    /// An unknown descriptor is looked up as the top type.
    pub fn lookup(&self, desc: &TypeDescriptor, resolver: &Resolver) -> Option<Arc<dyn ValueProducer>> {
        let object;
        let desc = if desc.is_unknown() {
            object = TypeDescriptor::object();
            &object
        } else {
            desc
        };

        // Full equality beats a raw-only match; max_by_key keeps the last maximum
        let exact = self
            .types
            .iter()
            .filter_map(|(matcher, producer)| match matcher {
                TypeMatcher::Exact(registered) if exact_match(registered, desc) => {
                    Some((registered == desc, producer))
                }
                _ => None,
            })
            .max_by_key(|(full, _)| *full);
        if let Some((_, producer)) = exact {
            return Some(Arc::clone(producer));
        }

        let mut best: Option<(usize, &Arc<dyn ValueProducer>)> = None;
        for (matcher, producer) in &self.types {
            let specificity = match matcher {
                TypeMatcher::Exact(_) => continue,
                TypeMatcher::AssignableTo(raw) => {
                    if !resolver.is_subtype(desc, raw) {
                        continue;
                    }
                    resolver.inheritance_depth(raw)
                }
                TypeMatcher::Predicate { specificity, test } => {
                    if !test(desc) {
                        continue;
                    }
                    *specificity
                }
            };
            // Later registrations win ties
            if best.map_or(true, |(current, _)| specificity >= current) {
                best = Some((specificity, producer));
            }
        }
        best.map(|(_, producer)| Arc::clone(producer))
    }

    /// Find the producer bound to a field of `instance`.
    ///
    /// The matcher with the most constraints wins; later registrations win
    /// ties.
    pub fn lookup_field(
        &self,
        instance: &TypeDescriptor,
        field: &ResolvedField,
        resolver: &Resolver,
    ) -> Option<Arc<dyn ValueProducer>> {
        let mut best: Option<(usize, &Arc<dyn ValueProducer>)> = None;
        for (matcher, producer) in &self.fields {
            if !matcher.matches(instance, field, resolver) {
                continue;
            }
            let constraints = matcher.constraints();
            if best.map_or(true, |(current, _)| constraints >= current) {
                best = Some((constraints, producer));
            }
        }
        best.map(|(_, producer)| Arc::clone(producer))
    }
}

impl fmt::Debug for ProducerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerRegistry")
            .field(
                "types",
                &self.types.iter().map(|(m, _)| m).collect::<Vec<_>>(),
            )
            .field(
                "fields",
                &self.fields.iter().map(|(m, _)| m).collect::<Vec<_>>(),
            )
            .finish()
    }
}
