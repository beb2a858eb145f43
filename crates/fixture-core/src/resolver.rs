//! Generic type resolution.
//!
//! Turns declared [`TypeExpr`]s into concrete [`TypeDescriptor`]s by walking
//! the inheritance chain of the instantiating type and binding each level's
//! type variables to the arguments supplied one level below.
//!
//! For `Sub extends Intermediate<List<String>>`, `Intermediate<T> extends
//! Parent<T>` and a field `id: T` on `Parent`, the chain from `Sub` to
//! `Parent` binds `Intermediate.T = list<string>`, then `Parent.T` to the
//! same descriptor, so `id` resolves to `list<string>`.

use crate::catalog::TypeCatalog;
use crate::descriptor::TypeDescriptor;
use crate::types::{canonical_name, BuiltinType, TypeExpr, OBJECT};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Variable bindings for one declaring type in one instantiation chain.
///
/// Contexts are immutable once built. A context created for a supertype
/// keeps the context of the subtype it was reached from as its parent and
/// delegates lookups it cannot answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingContext {
    owner: Option<String>,
    bindings: Vec<(String, TypeDescriptor)>,
    parent: Option<Arc<BindingContext>>,
}

impl BindingContext {
    /// Context with no bindings and no owner.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Empty context owned by the named declaring type.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Add a binding.
    pub fn bind(mut self, name: impl Into<String>, desc: TypeDescriptor) -> Self {
        self.bindings.push((name.into(), desc));
        self
    }

    /// Set the context lookups are delegated to.
    pub fn with_parent(mut self, parent: Arc<BindingContext>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declaring type this context belongs to.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Context this one delegates to.
    pub fn parent(&self) -> Option<&BindingContext> {
        self.parent.as_deref()
    }

    /// Own bindings in parameter order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.bindings.iter().map(|(name, desc)| (name.as_str(), desc))
    }

    /// Look up a variable here, then up the parent chain.
    pub fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, desc)| desc)
            .or_else(|| self.parent.as_deref().and_then(|p| p.lookup(name)))
    }
}

/// Resolved direct supertypes of one descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Supertypes {
    /// Resolved superclass (absent when it is the top type)
    pub superclass: Option<TypeDescriptor>,
    /// Resolved interfaces in declaration order
    pub interfaces: Vec<TypeDescriptor>,
}

impl Supertypes {
    /// Superclass first, then interfaces.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}

/// A field as seen through a concrete instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// Type that declares the field
    pub declaring_type: String,
    /// Field name
    pub name: String,
    /// Resolved field type
    pub field_type: TypeDescriptor,
    /// Initializer from the declaration
    pub default: Option<serde_yaml::Value>,
}

/// A constructor with resolved parameter types.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConstructor {
    /// `(name, type)` pairs in declaration order
    pub params: Vec<(String, TypeDescriptor)>,
    /// Whether the constructor may be called
    pub accessible: bool,
}

/// Resolves declared types against a catalog.
///
/// Supertype and field resolution are cached per descriptor. The caches are
/// shared between threads; entries are computed outside the lock and the
/// first insert wins, so concurrent first use only repeats work.
#[derive(Debug)]
pub struct Resolver {
    catalog: Arc<TypeCatalog>,
    supertypes: RwLock<HashMap<TypeDescriptor, Arc<Supertypes>>>,
    fields: RwLock<HashMap<TypeDescriptor, Arc<[ResolvedField]>>>,
}

fn is_top(desc: &TypeDescriptor) -> bool {
    desc.builtin() == Some(BuiltinType::Object) && desc.args().is_empty()
}

impl Resolver {
    /// Create a resolver over the catalog.
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            supertypes: RwLock::new(HashMap::new()),
            fields: RwLock::new(HashMap::new()),
        }
    }

    /// The catalog being resolved against.
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Resolve a declared type in the given context.
    pub fn resolve(&self, expr: &TypeExpr, ctx: &BindingContext) -> TypeDescriptor {
        match expr {
            TypeExpr::Named { name, args } => TypeDescriptor::parameterized(
                canonical_name(name),
                args.iter().map(|arg| self.resolve(arg, ctx)).collect(),
            ),
            TypeExpr::Variable(name) => match ctx.lookup(name) {
                Some(desc) => desc.clone(),
                None => self.variable_bound(name, ctx),
            },
            TypeExpr::Wildcard { upper, lower } => {
                if let Some(bound) = upper.first() {
                    let desc = self.resolve(bound, ctx);
                    if !is_top(&desc) {
                        return desc;
                    }
                }
                match lower.first() {
                    Some(bound) => self.resolve(bound, ctx),
                    None => TypeDescriptor::Unknown,
                }
            }
            TypeExpr::Array(component) => TypeDescriptor::array(self.resolve(component, ctx)),
        }
    }

    /// Parse and resolve a free-standing type expression.
    pub fn resolve_str(&self, text: &str) -> Result<TypeDescriptor, crate::types::TypeParseError> {
        let expr = TypeExpr::parse(text)?;
        Ok(self.resolve(&expr, &BindingContext::empty()))
    }

    /// Fallback for a variable without a binding: its first upper bound.
    fn variable_bound(&self, name: &str, ctx: &BindingContext) -> TypeDescriptor {
        let bound = ctx
            .owner()
            .and_then(|owner| self.catalog.get_type(owner))
            .and_then(|def| def.params.iter().find(|p| p.name == name))
            .and_then(|param| param.bounds.first());

        let Some(bound) = bound else {
            debug!("Type variable '{name}' has no binding or bound, resolving to unknown");
            return TypeDescriptor::Unknown;
        };

        // The variable itself is unknown while its own bound is resolved
        let guarded = BindingContext {
            owner: ctx.owner.clone(),
            bindings: vec![(name.to_string(), TypeDescriptor::Unknown)],
            parent: Some(Arc::new(ctx.clone())),
        };
        let desc = self.resolve(bound, &guarded);
        if is_top(&desc) {
            TypeDescriptor::Unknown
        } else {
            desc
        }
    }

    /// Bind the parameters of `desc`'s raw type to its arguments.
    ///
    /// Missing or unknown arguments are bound to the parameter's first upper
    /// bound. Bounds are resolved left to right; parameters not yet bound
    /// count as unknown, so `T extends Comparable<T>` binds to
    /// `Comparable<?>`.
    pub fn binding_context(&self, desc: &TypeDescriptor) -> BindingContext {
        self.bind(desc, None)
    }

    fn bind(&self, desc: &TypeDescriptor, parent: Option<Arc<BindingContext>>) -> BindingContext {
        let Some(def) = desc.raw().and_then(|raw| self.catalog.get_type(raw)) else {
            return BindingContext {
                owner: None,
                bindings: Vec::new(),
                parent,
            };
        };

        let mut ctx = BindingContext {
            owner: Some(def.name.clone()),
            bindings: def
                .params
                .iter()
                .map(|p| (p.name.clone(), TypeDescriptor::Unknown))
                .collect(),
            parent,
        };

        for (i, param) in def.params.iter().enumerate() {
            let bound_to = match desc.args().get(i) {
                Some(arg) if !arg.is_unknown() => arg.clone(),
                _ => param
                    .bounds
                    .first()
                    .map(|bound| self.resolve(bound, &ctx))
                    .filter(|resolved| !is_top(resolved))
                    .unwrap_or(TypeDescriptor::Unknown),
            };
            ctx.bindings[i].1 = bound_to;
        }
        ctx
    }

    /// Resolved superclass and interfaces of a descriptor.
    pub fn direct_supertypes(&self, desc: &TypeDescriptor) -> Arc<Supertypes> {
        if let Some(hit) = self.supertypes.read().get(desc) {
            return Arc::clone(hit);
        }

        let computed = Arc::new(self.compute_supertypes(desc));
        let mut cache = self.supertypes.write();
        Arc::clone(cache.entry(desc.clone()).or_insert(computed))
    }

    fn compute_supertypes(&self, desc: &TypeDescriptor) -> Supertypes {
        let Some(def) = desc.raw().and_then(|raw| self.catalog.get_type(raw)) else {
            return Supertypes::default();
        };
        let ctx = self.binding_context(desc);

        Supertypes {
            superclass: def
                .extends
                .as_ref()
                .map(|expr| self.resolve(expr, &ctx))
                .filter(|resolved| !is_top(resolved)),
            interfaces: def
                .implements
                .iter()
                .map(|expr| self.resolve(expr, &ctx))
                .filter(|resolved| !is_top(resolved))
                .collect(),
        }
    }

    /// Chain of descriptors from `desc` up to the supertype named `raw`.
    fn path_to(&self, desc: &TypeDescriptor, raw: &str) -> Option<Vec<TypeDescriptor>> {
        if desc.raw() == Some(raw) {
            return Some(vec![desc.clone()]);
        }
        for supertype in self.direct_supertypes(desc).iter() {
            if let Some(mut path) = self.path_to(supertype, raw) {
                path.insert(0, desc.clone());
                return Some(path);
            }
        }
        None
    }

    /// View `desc` as its supertype `raw`, with that supertype's arguments
    /// resolved through the chain.
    pub fn as_supertype(&self, desc: &TypeDescriptor, raw: &str) -> Option<TypeDescriptor> {
        self.path_to(desc, canonical_name(raw))
            .and_then(|mut path| path.pop())
    }

    /// Binding context of `declaring` when reached from `instantiating`.
    ///
    /// Falls back to the raw use of `declaring` when it is not a supertype.
    pub fn context_for(&self, instantiating: &TypeDescriptor, declaring: &str) -> BindingContext {
        let declaring = canonical_name(declaring);
        let Some(path) = self.path_to(instantiating, declaring) else {
            debug!("'{declaring}' is not a supertype of '{instantiating}', using its raw form");
            return self.binding_context(&TypeDescriptor::named(declaring));
        };

        let mut steps = path.iter();
        let mut ctx = match steps.next() {
            Some(first) => self.bind(first, None),
            None => return BindingContext::empty(),
        };
        for step in steps {
            ctx = self.bind(step, Some(Arc::new(ctx)));
        }
        ctx
    }

    /// Resolve a type declared on `declaring` as seen from `instantiating`.
    pub fn resolve_declared(
        &self,
        instantiating: &TypeDescriptor,
        declaring: &str,
        expr: &TypeExpr,
    ) -> TypeDescriptor {
        self.resolve(expr, &self.context_for(instantiating, declaring))
    }

    /// All fields of a composite type, base class fields first.
    pub fn fields_of(&self, desc: &TypeDescriptor) -> Arc<[ResolvedField]> {
        if let Some(hit) = self.fields.read().get(desc) {
            return Arc::clone(hit);
        }

        let computed: Arc<[ResolvedField]> = self.compute_fields(desc).into();
        let mut cache = self.fields.write();
        Arc::clone(cache.entry(desc.clone()).or_insert(computed))
    }

    fn compute_fields(&self, desc: &TypeDescriptor) -> Vec<ResolvedField> {
        let mut chain = vec![desc.clone()];
        while let Some(superclass) = chain
            .last()
            .and_then(|last| self.direct_supertypes(last).superclass.clone())
        {
            chain.push(superclass);
        }

        let mut levels = Vec::with_capacity(chain.len());
        let mut parent: Option<Arc<BindingContext>> = None;
        for step in &chain {
            let ctx = Arc::new(self.bind(step, parent.take()));
            if let Some(def) = step.raw().and_then(|raw| self.catalog.get_type(raw)) {
                let resolved: Vec<ResolvedField> = def
                    .fields
                    .iter()
                    .map(|field| ResolvedField {
                        declaring_type: def.name.clone(),
                        name: field.name.clone(),
                        field_type: self.resolve(&field.field_type, &ctx),
                        default: field.default.clone(),
                    })
                    .collect();
                levels.push(resolved);
            }
            parent = Some(ctx);
        }

        levels.into_iter().rev().flatten().collect()
    }

    /// Constructors declared on the raw type, resolved for `desc`.
    pub fn constructors_of(&self, desc: &TypeDescriptor) -> Vec<ResolvedConstructor> {
        let Some(def) = desc.raw().and_then(|raw| self.catalog.get_type(raw)) else {
            return Vec::new();
        };
        let ctx = self.binding_context(desc);

        def.effective_constructors()
            .iter()
            .map(|constructor| ResolvedConstructor {
                params: constructor
                    .params
                    .iter()
                    .map(|p| (p.name.clone(), self.resolve(&p.param_type, &ctx)))
                    .collect(),
                accessible: constructor.accessible,
            })
            .collect()
    }

    /// Whether values of `desc` are assignable to the raw type `raw`.
    pub fn is_subtype(&self, desc: &TypeDescriptor, raw: &str) -> bool {
        let raw = canonical_name(raw);
        if raw == OBJECT {
            return !desc.is_unknown();
        }
        self.path_to(desc, raw).is_some()
    }

    /// Length of the longest supertype chain from `raw` to the top type.
    ///
    /// The top type has depth 0, so deeper types are narrower matches.
    pub fn inheritance_depth(&self, raw: &str) -> usize {
        let raw = canonical_name(raw);
        if raw == OBJECT {
            return 0;
        }
        match self.catalog.get_type(raw) {
            None => 1,
            Some(def) => {
                1 + def
                    .declared_supertypes()
                    .filter_map(|expr| match expr {
                        TypeExpr::Named { name, .. } => Some(self.inheritance_depth(name)),
                        _ => None,
                    })
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Concrete catalog classes assignable to `desc`, in catalog order.
    ///
    /// Generic subtypes are instantiated with whatever arguments make their
    /// view of `desc`'s raw type match `desc`; parameters left undetermined
    /// are unknown.
    pub fn concrete_subtypes(&self, desc: &TypeDescriptor) -> Vec<TypeDescriptor> {
        let Some(target) = desc.raw() else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for def in &self.catalog.types {
            if !def.is_instantiable() {
                continue;
            }
            let placeholders: Vec<TypeDescriptor> = (0..def.params.len())
                .map(|i| TypeDescriptor::named(format!("#{i}")))
                .collect();
            let generic = TypeDescriptor::parameterized(def.name.clone(), placeholders);
            let Some(view) = self.as_supertype(&generic, target) else {
                continue;
            };

            let mut bindings = vec![TypeDescriptor::Unknown; def.params.len()];
            if unify(&view, desc, &mut bindings) {
                found.push(TypeDescriptor::parameterized(def.name.clone(), bindings));
            }
        }
        found
    }
}

fn placeholder_index(desc: &TypeDescriptor) -> Option<usize> {
    match desc {
        TypeDescriptor::Named { raw, args } if args.is_empty() => {
            raw.strip_prefix('#').and_then(|index| index.parse().ok())
        }
        _ => None,
    }
}

/// Match `pattern` (with `#i` placeholders) against `actual`, recording
/// placeholder bindings. Unknown and raw use match anything.
fn unify(pattern: &TypeDescriptor, actual: &TypeDescriptor, bindings: &mut [TypeDescriptor]) -> bool {
    if let Some(index) = placeholder_index(pattern) {
        let Some(slot) = bindings.get_mut(index) else {
            return false;
        };
        if slot.is_unknown() {
            *slot = actual.clone();
            return true;
        }
        return *slot == *actual || actual.is_unknown();
    }
    if actual.is_unknown() {
        return true;
    }

    match (pattern, actual) {
        (
            TypeDescriptor::Named { raw: p_raw, args: p_args },
            TypeDescriptor::Named { raw: a_raw, args: a_args },
        ) => {
            if p_raw != a_raw {
                return false;
            }
            if p_args.is_empty() || a_args.is_empty() {
                return true;
            }
            p_args.len() == a_args.len()
                && p_args
                    .iter()
                    .zip(a_args)
                    .all(|(p, a)| unify(p, a, bindings))
        }
        (TypeDescriptor::Array(p), TypeDescriptor::Array(a)) => unify(p, a, bindings),
        (TypeDescriptor::Unknown, _) => true,
        _ => false,
    }
}
