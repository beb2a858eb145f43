//! Object graph populator.

use crate::context::{Diagnostic, DiagnosticKind, PathSegment, PopulationContext};
use crate::error::{ConfigurationError, GeneratorError};
use crate::parameters::Parameters;
use crate::producers::static_value::yaml_to_value_for;
use crate::producers::{ProducerBinding, ProducerContext, ScalarProducer, ValueProducer};
use crate::random::RandomSource;
use crate::registry::{FieldMatcher, ProducerRegistry, TypeMatcher};
use fixture_core::{
    BindingContext, BuiltinType, GeneratedValue, ResolvedField, Resolver, ScalarKind, Shape, TypeCatalog,
    TypeDefinition, TypeDescriptor, TypeExpr, TypeKind,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Draws per element before a set or map gives up on reaching its size.
const ATTEMPTS_PER_ELEMENT: usize = 10;

/// A populated object and the diagnostics raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    /// The populated object
    pub value: GeneratedValue,
    /// Non-fatal events, in the order they occurred
    pub diagnostics: Vec<Diagnostic>,
}

/// Generator that populates object graphs from a type catalog.
///
/// The generator itself is immutable once built and can be shared between
/// threads; every call creates its own random source and population context,
/// so the result depends only on the seed, the object index and the
/// configuration.
#[derive(Debug)]
pub struct ObjectGenerator {
    resolver: Resolver,
    registry: ProducerRegistry,
    parameters: Parameters,
}

impl ObjectGenerator {
    /// Create a generator with the built-in scalar producers.
    pub fn new(
        catalog: impl Into<Arc<TypeCatalog>>,
        parameters: Parameters,
    ) -> Result<Self, GeneratorError> {
        parameters.validate()?;
        Ok(Self {
            resolver: Resolver::new(catalog.into()),
            registry: ProducerRegistry::with_builtins(),
            parameters,
        })
    }

    /// Generation parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Resolver over the catalog.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The type catalog.
    pub fn catalog(&self) -> &TypeCatalog {
        self.resolver.catalog()
    }

    /// Producer registrations.
    pub fn registry(&self) -> &ProducerRegistry {
        &self.registry
    }

    /// Register a producer for matching types, ahead of earlier registrations.
    pub fn register(
        &mut self,
        matcher: TypeMatcher,
        producer: impl ValueProducer + 'static,
    ) -> &mut Self {
        self.registry.register(matcher, Arc::new(producer));
        self
    }

    /// Register a producer for matching fields.
    pub fn register_field(
        &mut self,
        matcher: FieldMatcher,
        producer: impl ValueProducer + 'static,
    ) -> &mut Self {
        self.registry.register_field(matcher, Arc::new(producer));
        self
    }

    /// Register config-driven producers.
    pub fn register_bindings(&mut self, bindings: &[ProducerBinding]) -> Result<(), GeneratorError> {
        for binding in bindings {
            let target = binding
                .field
                .clone()
                .or_else(|| binding.target_type.as_ref().map(ToString::to_string))
                .unwrap_or_else(|| "<unnamed>".to_string());

            binding.generator.validate().map_err(|reason| {
                ConfigurationError::InvalidProducer {
                    target: target.clone(),
                    reason,
                }
            })?;

            let target_type = binding
                .target_type
                .as_ref()
                .map(|expr| self.resolve_expr(expr))
                .transpose()?;
            let producer = Arc::new(binding.generator.clone());

            match (binding.field_parts(), target_type) {
                (Some((declaring, name)), field_type) => {
                    if let Some(declaring) = declaring {
                        self.catalog().require_type(declaring)?;
                    }
                    let matcher = FieldMatcher {
                        name: name.to_string(),
                        declaring_type: declaring.map(str::to_string),
                        field_type,
                    };
                    debug!("Registering producer for field '{target}'");
                    self.registry.register_field(matcher, producer);
                }
                (None, Some(desc)) => {
                    debug!("Registering producer for type '{desc}'");
                    self.registry.register(TypeMatcher::Exact(desc), producer);
                }
                (None, None) => {
                    return Err(ConfigurationError::InvalidProducer {
                        target,
                        reason: "binding names neither a field nor a type".to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Parse and resolve a requested type.
    ///
    /// Every raw name must be built in or defined in the catalog.
    pub fn resolve_type(&self, text: &str) -> Result<TypeDescriptor, GeneratorError> {
        let expr = TypeExpr::parse(text)?;
        self.resolve_expr(&expr)
    }

    fn resolve_expr(&self, expr: &TypeExpr) -> Result<TypeDescriptor, GeneratorError> {
        let desc = self.resolver.resolve(expr, &BindingContext::empty());
        self.check_known(&desc)?;
        Ok(desc)
    }

    fn check_known(&self, desc: &TypeDescriptor) -> Result<(), GeneratorError> {
        match desc {
            TypeDescriptor::Unknown => Ok(()),
            TypeDescriptor::Array(element) => self.check_known(element),
            TypeDescriptor::Named { raw, args } => {
                if BuiltinType::from_name(raw).is_none() && self.catalog().get_type(raw).is_none() {
                    return Err(GeneratorError::UnknownType(raw.clone()));
                }
                args.iter().try_for_each(|arg| self.check_known(arg))
            }
        }
    }

    /// Populate one object of the named type.
    pub fn next_object(&self, type_name: &str) -> Result<GeneratedValue, GeneratorError> {
        self.object_at(type_name, 0)
    }

    /// Populate one object of a resolved type.
    pub fn next_object_of(&self, desc: &TypeDescriptor) -> Result<GeneratedValue, GeneratorError> {
        self.report_at(desc, 0).map(|population| population.value)
    }

    /// Populate one object of the named type, keeping the diagnostics.
    pub fn next_object_report(&self, type_name: &str) -> Result<Population, GeneratorError> {
        let desc = self.resolve_type(type_name)?;
        self.report_at(&desc, 0)
    }

    /// Populate object `index` of the stream of the named type.
    ///
    /// Index 0 is the object `next_object` returns.
    pub fn object_at(&self, type_name: &str, index: u64) -> Result<GeneratedValue, GeneratorError> {
        let desc = self.resolve_type(type_name)?;
        self.report_at(&desc, index).map(|population| population.value)
    }

    /// Populate `count` objects of the named type.
    ///
    /// Returns an iterator that lazily populates objects, each seeded from
    /// the generator seed and its index.
    pub fn objects(&self, type_name: &str, count: u64) -> Result<ObjectIterator<'_>, GeneratorError> {
        let desc = self.resolve_type(type_name)?;
        Ok(ObjectIterator {
            generator: self,
            desc,
            next_index: 0,
            remaining: count,
        })
    }

    /// Populate object `index` of the stream of a resolved type, keeping the
    /// diagnostics.
    pub fn report_at(&self, desc: &TypeDescriptor, index: u64) -> Result<Population, GeneratorError> {
        debug!("Populating '{desc}' #{index}");
        let rng = RandomSource::for_index(self.parameters.seed, index);
        let root = desc
            .raw()
            .map(str::to_string)
            .unwrap_or_else(|| desc.to_string());
        let mut ctx = PopulationContext::new(rng, index, root, self.parameters.object_pool_size);

        let value = self.populate(&mut ctx, desc)?;
        Ok(Population {
            value,
            diagnostics: ctx.into_diagnostics(),
        })
    }

    fn populate(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
    ) -> Result<GeneratedValue, GeneratorError> {
        if ctx.is_active(desc) {
            debug!("Cycle on '{desc}' at {}", ctx.path());
            ctx.diagnose(DiagnosticKind::Cycle, desc);
            return Ok(ctx
                .pick_pooled(desc)
                .unwrap_or_else(|| self.zero_value(desc)));
        }

        if ctx.depth() > self.parameters.max_depth {
            debug!("Depth limit reached for '{desc}' at {}", ctx.path());
            ctx.diagnose(DiagnosticKind::DepthLimit, desc);
            return Ok(self.zero_value(desc));
        }

        if let Some(producer) = self.registry.lookup(desc, &self.resolver) {
            return self.invoke(ctx, producer.as_ref(), desc);
        }

        match self.catalog().shape(desc) {
            Shape::Scalar(kind) => self.invoke(ctx, &ScalarProducer(kind), desc),
            Shape::Sequence(element) | Shape::Array(element) => {
                let size = ctx.rng.size_in(&self.parameters.collection_size_range);
                let mut elements = Vec::with_capacity(size);
                for i in 0..size {
                    elements.push(self.populate_member(ctx, PathSegment::Index(i), element)?);
                }
                Ok(GeneratedValue::Array(elements))
            }
            Shape::Set(element) => self.populate_set(ctx, desc, element),
            Shape::Map(key, value) => self.populate_map(ctx, desc, key, value),
            Shape::Optional(inner) => self.populate(ctx, inner),
            Shape::Enum(def) => Ok(if def.variants.is_empty() {
                GeneratedValue::Null
            } else {
                let variant = &def.variants[ctx.rng.index_below(def.variants.len())];
                GeneratedValue::Enum {
                    type_name: def.name.clone(),
                    variant: variant.clone(),
                }
            }),
            Shape::Composite(def) => self.populate_composite(ctx, desc, def),
            Shape::Object => {
                debug!("Leaving top-type value at {} empty", ctx.path());
                ctx.diagnose(DiagnosticKind::TopType, desc);
                Ok(GeneratedValue::Null)
            }
            Shape::Undefined => {
                match self.registry.lookup(&TypeDescriptor::object(), &self.resolver) {
                    Some(producer) => self.invoke(ctx, producer.as_ref(), desc),
                    None => self.unresolved(ctx, desc),
                }
            }
            Shape::Unknown => self.unresolved(ctx, desc),
        }
    }

    fn populate_member(
        &self,
        ctx: &mut PopulationContext,
        segment: PathSegment,
        desc: &TypeDescriptor,
    ) -> Result<GeneratedValue, GeneratorError> {
        ctx.descend(segment);
        let result = self.populate(ctx, desc);
        ctx.ascend();
        result
    }

    fn populate_set(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
        element: &TypeDescriptor,
    ) -> Result<GeneratedValue, GeneratorError> {
        let size = ctx.rng.size_in(&self.parameters.collection_size_range);
        let mut elements: Vec<GeneratedValue> = Vec::with_capacity(size);
        let mut attempts = 0;
        while elements.len() < size && attempts < size * ATTEMPTS_PER_ELEMENT {
            attempts += 1;
            let value = self.populate_member(ctx, PathSegment::Index(elements.len()), element)?;
            if !elements.contains(&value) {
                elements.push(value);
            }
        }
        if elements.len() < size {
            debug!(
                "Set at {} holds {} of {size} elements",
                ctx.path(),
                elements.len()
            );
            ctx.diagnose(DiagnosticKind::SizeShortfall, desc);
        }
        Ok(GeneratedValue::Set(elements))
    }

    fn populate_map(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
        key_type: &TypeDescriptor,
        value_type: &TypeDescriptor,
    ) -> Result<GeneratedValue, GeneratorError> {
        let size = ctx.rng.size_in(&self.parameters.collection_size_range);
        let mut entries: Vec<(GeneratedValue, GeneratedValue)> = Vec::with_capacity(size);
        let mut attempts = 0;
        while entries.len() < size && attempts < size * ATTEMPTS_PER_ELEMENT {
            attempts += 1;
            let key = self.populate_member(ctx, PathSegment::Index(entries.len()), key_type)?;
            if entries.iter().any(|(existing, _)| *existing == key) {
                continue;
            }
            let value = self.populate_member(ctx, PathSegment::Key(key.key_string()), value_type)?;
            entries.push((key, value));
        }
        if entries.len() < size {
            debug!(
                "Map at {} holds {} of {size} entries",
                ctx.path(),
                entries.len()
            );
            ctx.diagnose(DiagnosticKind::SizeShortfall, desc);
        }
        Ok(GeneratedValue::Map(entries))
    }

    fn populate_composite(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
        def: &TypeDefinition,
    ) -> Result<GeneratedValue, GeneratorError> {
        if !def.is_instantiable() {
            return self.populate_concrete(ctx, desc, def);
        }

        ctx.enter(desc);
        let result = self.fill_composite(ctx, desc, def);
        ctx.exit();

        let value = result?;
        ctx.offer_pooled(desc, &value);
        Ok(value)
    }

    fn populate_concrete(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
        def: &TypeDefinition,
    ) -> Result<GeneratedValue, GeneratorError> {
        let kind = match def.kind {
            TypeKind::Interface => "interface",
            _ => "abstract type",
        };
        if !self.parameters.scan_concrete_types {
            return Err(self.creation_error(ctx, desc, format!("{kind} cannot be instantiated")));
        }

        let candidates = self.resolver.concrete_subtypes(desc);
        if candidates.is_empty() {
            return Err(self.creation_error(
                ctx,
                desc,
                format!("{kind} has no concrete subtype in the catalog"),
            ));
        }
        let chosen = &candidates[ctx.rng.index_below(candidates.len())];
        debug!("Populating '{desc}' as '{chosen}' at {}", ctx.path());
        self.populate(ctx, chosen)
    }

    fn fill_composite(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
        def: &TypeDefinition,
    ) -> Result<GeneratedValue, GeneratorError> {
        let override_init = self.parameters.override_default_initialization;
        let resolved = self.resolver.fields_of(desc);
        let mut fields = BTreeMap::new();
        let mut initialized = HashSet::new();

        let pooled = if override_init {
            ctx.pick_pooled(desc)
        } else {
            None
        };
        match pooled {
            Some(GeneratedValue::Record {
                fields: previous, ..
            }) => {
                debug!("Re-populating pooled '{desc}' at {}", ctx.path());
                fields = previous;
            }
            _ => {
                for field in resolved.iter() {
                    if let Some(default) = &field.default {
                        let value = yaml_to_value_for(default, &field.field_type, &self.resolver);
                        fields.insert(field.name.clone(), value);
                        initialized.insert(field.name.clone());
                    }
                }
                self.construct(ctx, desc, &resolved, &mut fields, &mut initialized)?;
            }
        }

        for field in resolved.iter() {
            if self.is_excluded(ctx, desc, field) {
                debug!("Skipping excluded field '{}' at {}", field.name, ctx.path());
                fields.insert(field.name.clone(), self.zero_value(&field.field_type));
                continue;
            }
            if !override_init && initialized.contains(&field.name) {
                continue;
            }

            ctx.descend(PathSegment::Field(field.name.clone()));
            let result = if ctx.depth() > self.parameters.max_depth {
                debug!("Depth limit reached for '{}' at {}", field.field_type, ctx.path());
                ctx.diagnose(DiagnosticKind::DepthLimit, &field.field_type);
                Ok(self.zero_value(&field.field_type))
            } else {
                match self.registry.lookup_field(desc, field, &self.resolver) {
                    Some(producer) => self.invoke(ctx, producer.as_ref(), &field.field_type),
                    None => self.populate(ctx, &field.field_type),
                }
            };
            ctx.ascend();
            fields.insert(field.name.clone(), result?);
        }

        Ok(GeneratedValue::Record {
            type_name: def.name.clone(),
            fields,
        })
    }

    /// Call the accessible constructor with the fewest parameters, the
    /// first declared on ties.
    fn construct(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
        resolved: &[ResolvedField],
        fields: &mut BTreeMap<String, GeneratedValue>,
        initialized: &mut HashSet<String>,
    ) -> Result<(), GeneratorError> {
        let constructors = self.resolver.constructors_of(desc);
        let Some(constructor) = constructors
            .iter()
            .filter(|c| c.accessible)
            .min_by_key(|c| c.params.len())
        else {
            return Err(self.creation_error(ctx, desc, "no accessible constructor".to_string()));
        };

        for (name, param_type) in &constructor.params {
            let field = resolved.iter().find(|f| f.name == *name);
            let value = if field.is_some_and(|f| self.is_excluded(ctx, desc, f)) {
                self.zero_value(param_type)
            } else {
                self.populate_member(ctx, PathSegment::Field(name.clone()), param_type)?
            };
            if field.is_some() {
                fields.insert(name.clone(), value);
                initialized.insert(name.clone());
            }
        }
        Ok(())
    }

    fn is_excluded(
        &self,
        ctx: &PopulationContext,
        instance: &TypeDescriptor,
        field: &ResolvedField,
    ) -> bool {
        let excluded = &self.parameters.excluded_fields;
        if excluded.is_empty() {
            return false;
        }
        excluded.contains(&format!("{}.{}", field.declaring_type, field.name))
            || instance
                .raw()
                .is_some_and(|raw| excluded.contains(&format!("{raw}.{}", field.name)))
            || excluded.contains(&ctx.path().dotted_with(&field.name))
    }

    fn invoke(
        &self,
        ctx: &mut PopulationContext,
        producer: &dyn ValueProducer,
        target: &TypeDescriptor,
    ) -> Result<GeneratedValue, GeneratorError> {
        let mut producer_ctx = ProducerContext {
            rng: &mut ctx.rng,
            target,
            parameters: &self.parameters,
            resolver: &self.resolver,
            index: ctx.index,
        };
        let result = producer.produce(&mut producer_ctx);
        result.map_err(|source| GeneratorError::Population {
            type_name: target.to_string(),
            path: ctx.path().to_string(),
            source,
        })
    }

    fn unresolved(
        &self,
        ctx: &mut PopulationContext,
        desc: &TypeDescriptor,
    ) -> Result<GeneratedValue, GeneratorError> {
        if self.parameters.strict_unresolved_types {
            return Err(GeneratorError::UnresolvedType {
                path: ctx.path().to_string(),
            });
        }
        warn!("Cannot resolve type '{desc}' at {}, leaving it empty", ctx.path());
        ctx.diagnose(DiagnosticKind::UnresolvedType, desc);
        Ok(GeneratedValue::Null)
    }

    fn creation_error(
        &self,
        ctx: &PopulationContext,
        desc: &TypeDescriptor,
        reason: String,
    ) -> GeneratorError {
        GeneratorError::ObjectCreation {
            type_name: desc.to_string(),
            path: ctx.path().to_string(),
            reason,
        }
    }

    /// Value left in place of anything not populated.
    fn zero_value(&self, desc: &TypeDescriptor) -> GeneratedValue {
        match self.catalog().shape(desc) {
            Shape::Scalar(kind) => match kind {
                ScalarKind::Bool => GeneratedValue::Bool(false),
                ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 => {
                    GeneratedValue::Int32(0)
                }
                ScalarKind::Int64 => GeneratedValue::Int64(0),
                ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32 | ScalarKind::UInt64 => {
                    GeneratedValue::UInt64(0)
                }
                ScalarKind::Float32 | ScalarKind::Float64 => GeneratedValue::Float64(0.0),
                ScalarKind::Decimal => GeneratedValue::decimal("0", 10, 0),
                ScalarKind::Char => GeneratedValue::Char('\0'),
                ScalarKind::String => GeneratedValue::String(String::new()),
                ScalarKind::Bytes => GeneratedValue::Bytes(Vec::new()),
                _ => GeneratedValue::Null,
            },
            Shape::Sequence(_) | Shape::Array(_) => GeneratedValue::Array(Vec::new()),
            Shape::Set(_) => GeneratedValue::Set(Vec::new()),
            Shape::Map(..) => GeneratedValue::Map(Vec::new()),
            _ => GeneratedValue::Null,
        }
    }
}

/// Iterator that lazily populates objects.
pub struct ObjectIterator<'a> {
    generator: &'a ObjectGenerator,
    desc: TypeDescriptor,
    next_index: u64,
    remaining: u64,
}

impl Iterator for ObjectIterator<'_> {
    type Item = Result<GeneratedValue, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let index = self.next_index;
        self.next_index += 1;

        Some(
            self.generator
                .report_at(&self.desc, index)
                .map(|population| population.value),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ObjectIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProducerError;
    use crate::producers::{ConstantProducer, ProducerConfig};

    fn catalog() -> TypeCatalog {
        TypeCatalog::from_yaml(
            r#"
version: 1
types:
  - name: Leaf
    fields:
      - name: value
        type: int
  - name: Node
    fields:
      - name: leaf
        type: Leaf
      - name: next
        type: Optional<Node>
  - name: Parent
    kind: abstract
    params: [T]
    fields:
      - name: id
        type: T
  - name: Intermediate
    kind: abstract
    params: [T]
    extends: Parent<T>
  - name: Sub
    extends: Intermediate<List<String>>
  - name: Box
    params: [T]
    fields:
      - name: value
        type: T
  - name: Color
    kind: enum
    variants: [RED, GREEN, BLUE]
  - name: Palette
    fields:
      - name: colors
        type: Set<Color>
      - name: weights
        type: Map<String, Double>
      - name: tags
        type: List<String>
  - name: Shape
    kind: interface
  - name: Circle
    implements: [Shape]
    fields:
      - name: radius
        type: double
  - name: Canvas
    fields:
      - name: shape
        type: Shape
  - name: Account
    fields:
      - name: owner
        type: String
      - name: status
        type: String
        default: active
      - name: balance
        type: Long
    constructors:
      - params:
          - name: owner
            type: String
  - name: Sealed
    constructors:
      - accessible: false
  - name: Level0
    fields:
      - name: next
        type: Level1
  - name: Level1
    fields:
      - name: next
        type: Level2
  - name: Level2
    fields:
      - name: next
        type: Level3
  - name: Level3
    fields:
      - name: value
        type: int
  - name: Tag
    fields:
      - name: label
        type: String
      - name: code
        type: String
    constructors:
      - params:
          - name: code
            type: String
  - name: Pair
    fields:
      - name: a
        type: Tag
      - name: b
        type: Tag
  - name: Item
    fields:
      - name: sub
        type: Optional<Item>
      - name: weight
        type: int
  - name: Holder
    fields:
      - name: first
        type: Item
      - name: second
        type: Item
"#,
        )
        .unwrap()
    }

    fn generator(parameters: Parameters) -> ObjectGenerator {
        ObjectGenerator::new(catalog(), parameters).unwrap()
    }

    #[test]
    fn test_deterministic_generation() {
        let gen1 = generator(Parameters::new().seed(42));
        let gen2 = generator(Parameters::new().seed(42));

        for type_name in ["Node", "Palette", "Sub", "Account"] {
            assert_eq!(
                gen1.next_object(type_name).unwrap(),
                gen2.next_object(type_name).unwrap()
            );
            // Same generator, second call
            assert_eq!(
                gen1.next_object(type_name).unwrap(),
                gen1.next_object(type_name).unwrap()
            );
        }

        let gen3 = generator(Parameters::new().seed(43));
        assert_ne!(
            gen1.next_object("Palette").unwrap(),
            gen3.next_object("Palette").unwrap()
        );
    }

    #[test]
    fn test_node_chain_terminates() {
        let generator = generator(Parameters::new().seed(42).max_depth(3));
        let first = generator.next_object_report("Node").unwrap();
        let second = generator.next_object_report("Node").unwrap();
        assert_eq!(first, second);

        let mut levels = 0;
        let mut current = &first.value;
        while let Some(next) = current.get_field("next").filter(|next| !next.is_null()) {
            levels += 1;
            current = next;
        }
        assert!(levels <= 3);
        assert!(first.value.get_field("leaf").unwrap().get_field("value").unwrap().as_i32().is_some());
        assert!(first
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Cycle && d.path == "Node.next"));
    }

    #[test]
    fn test_generic_field_through_inheritance_chain() {
        let generator = generator(Parameters::new().seed(7).size_range(2, 2));
        let sub = generator.next_object("Sub").unwrap();
        assert_eq!(sub.type_name(), Some("Sub"));

        let id = sub.get_field("id").unwrap();
        let elements = id.as_elements().unwrap();
        assert_eq!(elements.len(), 2);
        assert!(elements.iter().all(|e| e.as_str().is_some_and(|s| s.len() == 2)));
    }

    #[test]
    fn test_generic_argument_from_request() {
        let generator = generator(Parameters::new());
        let boxed = generator.next_object("Box<Long>").unwrap();
        assert!(matches!(boxed.get_field("value"), Some(GeneratedValue::Int64(_))));
    }

    #[test]
    fn test_size_range_containment() {
        for seed in 0..20 {
            let generator = generator(Parameters::new().seed(seed).size_range(2, 3));
            let palette = generator.next_object("Palette").unwrap();
            let tags = palette.get_field("tags").unwrap();
            assert!((2..=3).contains(&tags.len().unwrap()));
            for tag in tags.as_elements().unwrap() {
                assert!((2..=3).contains(&tag.as_str().unwrap().chars().count()));
            }
            assert!((2..=3).contains(&palette.get_field("colors").unwrap().len().unwrap()));
            assert!((2..=3).contains(&palette.get_field("weights").unwrap().len().unwrap()));
        }
    }

    #[test]
    fn test_set_shortfall_is_diagnosed() {
        // Three colors cannot fill a set of five
        let generator = generator(Parameters::new().collection_size_range(5, 5));
        let report = generator.next_object_report("Palette").unwrap();
        assert_eq!(report.value.get_field("colors").unwrap().len(), Some(3));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::SizeShortfall && d.path == "Palette.colors"));
    }

    #[test]
    fn test_depth_limit() {
        let generator = generator(Parameters::new().max_depth(2));
        let report = generator.next_object_report("Level0").unwrap();
        let level2 = report
            .value
            .get_field("next")
            .and_then(|v| v.get_field("next"))
            .unwrap();
        assert_eq!(level2.type_name(), Some("Level2"));
        assert_eq!(level2.get_field("next"), Some(&GeneratedValue::Null));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DepthLimit && d.path == "Level0.next.next.next"));
    }

    #[test]
    fn test_unresolved_type() {
        let lenient = generator(Parameters::new());
        let report = lenient.next_object_report("Box").unwrap();
        assert_eq!(report.value.get_field("value"), Some(&GeneratedValue::Null));
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::UnresolvedType);
        assert_eq!(report.diagnostics[0].path, "Box.value");

        let strict = generator(Parameters::new().strict_unresolved_types(true));
        let err = strict.next_object("Box").unwrap_err();
        assert!(matches!(err, GeneratorError::UnresolvedType { .. }));
        assert_eq!(err.path(), Some("Box.value"));

        // Top type is not an error
        assert!(strict.next_object("Box<Object>").is_ok());
    }

    #[test]
    fn test_unknown_falls_back_to_object_producer() {
        let mut generator = generator(Parameters::new().strict_unresolved_types(true));
        generator.register(
            TypeMatcher::exact("Object"),
            ConstantProducer(GeneratedValue::String("any".to_string())),
        );
        let boxed = generator.next_object("Box").unwrap();
        assert_eq!(boxed.get_field("value").and_then(GeneratedValue::as_str), Some("any"));
    }

    #[test]
    fn test_object_creation_errors() {
        let generator = generator(Parameters::new());
        let err = generator.next_object("Canvas").unwrap_err();
        match &err {
            GeneratorError::ObjectCreation { type_name, path, .. } => {
                assert_eq!(type_name, "Shape");
                assert_eq!(path, "Canvas.shape");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = generator.next_object("Sealed").unwrap_err();
        assert!(matches!(err, GeneratorError::ObjectCreation { .. }));

        assert!(matches!(
            generator.next_object("Missing"),
            Err(GeneratorError::UnknownType(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_scan_concrete_types() {
        let generator = generator(Parameters::new().scan_concrete_types(true));
        let canvas = generator.next_object("Canvas").unwrap();
        let shape = canvas.get_field("shape").unwrap();
        assert_eq!(shape.type_name(), Some("Circle"));
        assert!(shape.get_field("radius").unwrap().as_f64().is_some());
    }

    #[test]
    fn test_producer_error_carries_path() {
        let mut generator = generator(Parameters::new());
        generator.register(TypeMatcher::exact("int"), |_: &mut ProducerContext<'_>| {
            Err::<GeneratedValue, _>(ProducerError::new("boom"))
        });
        let err = generator.next_object("Node").unwrap_err();
        match err {
            GeneratorError::Population { path, source, .. } => {
                assert_eq!(path, "Node.leaf.value");
                assert_eq!(source.message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_user_producer_beats_builtin() {
        let mut generator = generator(Parameters::new());
        generator.register(TypeMatcher::exact("int"), ConstantProducer(GeneratedValue::Int32(7)));
        let leaf = generator.next_object("Leaf").unwrap();
        assert_eq!(leaf.get_field("value"), Some(&GeneratedValue::Int32(7)));
    }

    #[test]
    fn test_excluded_fields() {
        let generator = generator(
            Parameters::new()
                .exclude_field("Leaf.value")
                .exclude_field("weights"),
        );
        let node = generator.next_object("Node").unwrap();
        assert_eq!(
            node.get_field("leaf").unwrap().get_field("value"),
            Some(&GeneratedValue::Int32(0))
        );

        let palette = generator.next_object("Palette").unwrap();
        assert_eq!(palette.get_field("weights"), Some(&GeneratedValue::Map(vec![])));
    }

    #[test]
    fn test_defaults_and_constructor_arguments() {
        let generator = generator(Parameters::new());
        let account = generator.next_object("Account").unwrap();
        assert_eq!(account.get_field("status").and_then(GeneratedValue::as_str), Some("active"));
        assert!(account.get_field("owner").and_then(GeneratedValue::as_str).is_some());
        assert!(account.get_field("balance").unwrap().as_i64().is_some());

        let overriding = generator_with_override();
        let account = overriding.next_object("Account").unwrap();
        assert_ne!(account.get_field("status").and_then(GeneratedValue::as_str), Some("active"));
    }

    #[test]
    fn test_pooled_instance_reused_with_override() {
        let pooled = generator(Parameters::new().seed(5).override_default_initialization(true));
        let first = pooled.next_object("Pair").unwrap();
        assert_eq!(first, pooled.next_object("Pair").unwrap());

        let b = first.get_field("b").unwrap();
        assert_eq!(b.type_name(), Some("Tag"));
        assert!(!b.get_field("label").and_then(GeneratedValue::as_str).unwrap().is_empty());

        // Without a pool the second Tag is constructed, drawing its constructor argument first
        let unpooled = generator(
            Parameters::new()
                .seed(5)
                .override_default_initialization(true)
                .object_pool_size(0),
        );
        let fresh = unpooled.next_object("Pair").unwrap();
        assert_eq!(first.get_field("a"), fresh.get_field("a"));
        assert_ne!(
            b.get_field("label"),
            fresh.get_field("b").and_then(|t| t.get_field("label"))
        );
    }

    #[test]
    fn test_excluded_field_of_pooled_instance() {
        let generator = generator(
            Parameters::new()
                .override_default_initialization(true)
                .exclude_field("b.label"),
        );
        let pair = generator.next_object("Pair").unwrap();

        let a = pair.get_field("a").unwrap();
        let b = pair.get_field("b").unwrap();
        assert!(!a.get_field("label").and_then(GeneratedValue::as_str).unwrap().is_empty());
        assert_eq!(b.get_field("label"), Some(&GeneratedValue::String(String::new())));
        assert!(!b.get_field("code").and_then(GeneratedValue::as_str).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_returns_pooled_sibling() {
        let generator = generator(Parameters::new().seed(11));
        let report = generator.next_object_report("Holder").unwrap();

        let first = report.value.get_field("first").unwrap();
        let second = report.value.get_field("second").unwrap();
        // Nothing is pooled yet when the first item revisits itself
        assert_eq!(first.get_field("sub"), Some(&GeneratedValue::Null));
        assert_eq!(second.get_field("sub"), Some(first));

        let cycles: Vec<&str> = report
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Cycle)
            .map(|d| d.path.as_str())
            .collect();
        assert_eq!(cycles, ["Holder.first.sub", "Holder.second.sub"]);

        assert_eq!(report.value, generator.next_object("Holder").unwrap());
    }

    #[test]
    fn test_field_producer_respects_depth_limit() {
        let mut shallow = generator(Parameters::new().max_depth(0));
        shallow.register_field(FieldMatcher::named("value"), ConstantProducer(GeneratedValue::Int32(7)));
        let report = shallow.next_object_report("Leaf").unwrap();
        assert_eq!(report.value.get_field("value"), Some(&GeneratedValue::Int32(0)));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DepthLimit && d.path == "Leaf.value"));

        let mut deep = generator(Parameters::new().max_depth(1));
        deep.register_field(FieldMatcher::named("value"), ConstantProducer(GeneratedValue::Int32(7)));
        let leaf = deep.next_object("Leaf").unwrap();
        assert_eq!(leaf.get_field("value"), Some(&GeneratedValue::Int32(7)));
    }

    fn generator_with_override() -> ObjectGenerator {
        generator(
            Parameters::new()
                .string_length_range(8, 8)
                .override_default_initialization(true),
        )
    }

    #[test]
    fn test_enum_variants() {
        let generator = generator(Parameters::new());
        for index in 0..10 {
            let color = generator.object_at("Color", index).unwrap();
            match color {
                GeneratedValue::Enum { type_name, variant } => {
                    assert_eq!(type_name, "Color");
                    assert!(["RED", "GREEN", "BLUE"].contains(&variant.as_str()));
                }
                other => panic!("expected enum, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_objects_stream() {
        let generator = generator(Parameters::new().seed(5));
        let objects: Vec<_> = generator
            .objects("Node", 4)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(objects.len(), 4);
        assert_eq!(objects[0], generator.next_object("Node").unwrap());
        assert_eq!(objects[2], generator.object_at("Node", 2).unwrap());
        assert_ne!(objects[1], objects[2]);

        assert_eq!(generator.objects("Node", 9).unwrap().len(), 9);
        assert!(generator.objects("Missing", 1).is_err());
    }

    #[test]
    fn test_register_bindings() {
        let bindings: Vec<ProducerBinding> = serde_yaml::from_str(
            r#"
- field: Account.owner
  generator:
    type: pattern
    pattern: "owner-{index}"
- type: Long
  generator:
    type: int_range
    min: 10
    max: 10
"#,
        )
        .unwrap();
        let mut generator = generator(Parameters::new());
        generator.register_bindings(&bindings).unwrap();

        let account = generator.object_at("Account", 3).unwrap();
        assert_eq!(account.get_field("owner").and_then(GeneratedValue::as_str), Some("owner-3"));
        assert_eq!(account.get_field("balance"), Some(&GeneratedValue::Int64(10)));

        let invalid = vec![ProducerBinding {
            field: None,
            target_type: Some(TypeExpr::named("Long")),
            generator: ProducerConfig::IntRange { min: 3, max: 1 },
        }];
        assert!(matches!(
            generator.register_bindings(&invalid),
            Err(GeneratorError::Configuration(ConfigurationError::InvalidProducer { .. }))
        ));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let result = ObjectGenerator::new(catalog(), Parameters::new().collection_size_range(3, 1));
        assert!(matches!(result, Err(GeneratorError::Configuration(_))));
    }

    #[test]
    fn test_shared_between_threads() {
        let generator = Arc::new(generator(Parameters::new().seed(11)));
        let expected = generator.next_object("Palette").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || generator.next_object("Palette").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
