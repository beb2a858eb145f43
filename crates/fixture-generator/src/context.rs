//! Per-call population state.

use crate::random::RandomSource;
use fixture_core::{GeneratedValue, TypeDescriptor};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named field or constructor parameter
    Field(String),
    /// Position in a sequence, set or array
    Index(usize),
    /// Entry of a map, by rendered key
    Key(String),
}

/// Path from the root object to the value being populated.
///
/// Renders as `Order.lines[2].product{sku}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    root: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Path of a root object.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// Append a segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Segments after the root.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Field names from the root down to `field`, joined with dots.
    ///
    /// Indices and keys are skipped, so `lines[2].product` and
    /// `lines[0].product` share the dotted path `lines.product`.
    pub fn dotted_with(&self, field: &str) -> String {
        let mut dotted = String::new();
        for segment in &self.segments {
            if let PathSegment::Field(name) = segment {
                dotted.push_str(name);
                dotted.push('.');
            }
        }
        dotted.push_str(field);
        dotted
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(key) => write!(f, "{{{key}}}")?,
            }
        }
        Ok(())
    }
}

/// Kind of a non-fatal population event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The type could not be resolved; the value was left empty
    UnresolvedType,
    /// The type is the top type; the value was left empty
    TopType,
    /// The maximum depth was exceeded; the value was left empty
    DepthLimit,
    /// The type was already being populated; a pooled or empty value was used
    Cycle,
    /// A set or map came out smaller than its drawn size because of duplicates
    SizeShortfall,
}

/// Non-fatal event raised while populating one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What happened
    pub kind: DiagnosticKind,
    /// Path of the affected value
    pub path: String,
    /// Type of the affected value
    pub type_name: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {} ({})", self.kind, self.path, self.type_name)
    }
}

/// Bounded store of finished instances, keyed by resolved type.
#[derive(Debug, Clone, Default)]
pub struct ObjectPool {
    capacity: usize,
    entries: HashMap<TypeDescriptor, Vec<GeneratedValue>>,
}

impl ObjectPool {
    /// Create a pool keeping at most `capacity` instances per type.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Keep an instance if its type has room left.
    pub fn offer(&mut self, desc: &TypeDescriptor, value: &GeneratedValue) {
        if self.capacity == 0 {
            return;
        }
        let instances = self.entries.entry(desc.clone()).or_default();
        if instances.len() < self.capacity {
            instances.push(value.clone());
        }
    }

    /// Copy of a random pooled instance of `desc`.
    pub fn pick(&self, desc: &TypeDescriptor, rng: &mut RandomSource) -> Option<GeneratedValue> {
        let instances = self.entries.get(desc).filter(|v| !v.is_empty())?;
        instances.get(rng.index_below(instances.len())).cloned()
    }

    /// Check if any instance of `desc` is pooled.
    pub fn has(&self, desc: &TypeDescriptor) -> bool {
        self.entries.get(desc).is_some_and(|v| !v.is_empty())
    }

    /// Number of pooled instances of `desc`.
    pub fn count(&self, desc: &TypeDescriptor) -> usize {
        self.entries.get(desc).map_or(0, Vec::len)
    }
}

/// Mutable state of one population call.
///
/// Created at the start of a call and dropped at its end; never shared.
#[derive(Debug)]
pub struct PopulationContext {
    /// Random source seeded for this call
    pub rng: RandomSource,
    /// Index of the root object in its stream
    pub index: u64,
    depth: usize,
    stack: Vec<TypeDescriptor>,
    path: FieldPath,
    pool: ObjectPool,
    diagnostics: Vec<Diagnostic>,
}

impl PopulationContext {
    /// Create the context for one root object.
    pub fn new(rng: RandomSource, index: u64, root: impl Into<String>, pool_capacity: usize) -> Self {
        Self {
            rng,
            index,
            depth: 0,
            stack: Vec::new(),
            path: FieldPath::new(root),
            pool: ObjectPool::new(pool_capacity),
            diagnostics: Vec::new(),
        }
    }

    /// Current depth; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Path of the value being populated.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Step into a member one level deeper.
    pub fn descend(&mut self, segment: PathSegment) {
        self.path.push(segment);
        self.depth += 1;
    }

    /// Step back out of the member entered last.
    pub fn ascend(&mut self) {
        self.path.pop();
        self.depth = self.depth.saturating_sub(1);
    }

    /// Check if `desc` is being populated further up the current path.
    pub fn is_active(&self, desc: &TypeDescriptor) -> bool {
        self.stack.contains(desc)
    }

    /// Mark `desc` as being populated.
    pub fn enter(&mut self, desc: &TypeDescriptor) {
        self.stack.push(desc.clone());
    }

    /// Unmark the type entered last.
    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Object pool of this call.
    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    /// Copy of a random pooled instance of `desc`.
    pub fn pick_pooled(&mut self, desc: &TypeDescriptor) -> Option<GeneratedValue> {
        self.pool.pick(desc, &mut self.rng)
    }

    /// Offer a finished instance to the pool.
    pub fn offer_pooled(&mut self, desc: &TypeDescriptor, value: &GeneratedValue) {
        self.pool.offer(desc, value);
    }

    /// Record a diagnostic at the current path.
    pub fn diagnose(&mut self, kind: DiagnosticKind, desc: &TypeDescriptor) {
        self.diagnostics.push(Diagnostic {
            kind,
            path: self.path.to_string(),
            type_name: desc.to_string(),
        });
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, keeping its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
