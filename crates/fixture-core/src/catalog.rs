//! Type catalog: the static type model that population works from.
//!
//! Rust has no runtime reflection over arbitrary types, so the types to be
//! populated are declared up front, either in YAML or programmatically.
//! Each declaration mirrors what a reflective implementation would read off
//! a class: type parameters, the generic superclass and interfaces, fields
//! with their generic types, and constructors.
//!
//! ```yaml
//! version: 1
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
//! ```

use crate::descriptor::TypeDescriptor;
use crate::types::{BuiltinType, ContainerKind, ScalarKind, TypeExpr, TypeParseError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Error reading catalog file
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Malformed type expression
    #[error(transparent)]
    InvalidTypeExpr(#[from] TypeParseError),

    /// Two definitions share a name
    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    /// Definition shadows a built-in type name
    #[error("Type name '{0}' is reserved for a built-in type")]
    ReservedName(String),

    /// Reference to a type that is neither built in nor defined
    #[error("Unknown type '{referenced}' referenced by {context}")]
    UnknownType { referenced: String, context: String },

    /// Wrong number of type arguments
    #[error("Type '{type_name}' takes {expected} type argument(s), found {found} in {context}")]
    ArgumentCount {
        type_name: String,
        expected: usize,
        found: usize,
        context: String,
    },

    /// Illegal superclass or interface
    #[error("Type '{type_name}' cannot inherit from '{supertype}': {reason}")]
    InvalidSupertype {
        type_name: String,
        supertype: String,
        reason: String,
    },

    /// A type is its own supertype
    #[error("Inheritance cycle through type '{0}'")]
    InheritanceCycle(String),

    /// Enum without variants
    #[error("Enum '{0}' declares no variants")]
    EmptyEnum(String),

    /// Type not found in catalog
    #[error("Type not found: {0}")]
    TypeNotFound(String),
}

// ============================================================================
// Definitions
// ============================================================================

/// What kind of type a definition declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Concrete, instantiable class
    #[default]
    Class,
    /// Abstract class, never instantiated directly
    Abstract,
    /// Interface, never instantiated directly
    Interface,
    /// Enumeration of named variants
    Enum,
}

/// A declared type parameter with its upper bounds.
///
/// Accepts the shorthand `"K extends Serializable & Comparable<K>"` or the
/// map form `{ name: K, bounds: [Serializable] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TypeParameterRepr")]
pub struct TypeParameter {
    /// Variable name
    pub name: String,

    /// Upper bounds, first one wins during resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeExpr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeParameterRepr {
    Text(String),
    Full {
        name: String,
        #[serde(default)]
        bounds: Vec<TypeExpr>,
    },
}

impl TryFrom<TypeParameterRepr> for TypeParameter {
    type Error = TypeParseError;

    fn try_from(repr: TypeParameterRepr) -> Result<Self, Self::Error> {
        match repr {
            TypeParameterRepr::Text(text) => TypeParameter::parse(&text),
            TypeParameterRepr::Full { name, bounds } => Ok(TypeParameter { name, bounds }),
        }
    }
}

impl TypeParameter {
    /// Create an unbounded type parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    /// Add an upper bound.
    pub fn bounded_by(mut self, bound: TypeExpr) -> Self {
        self.bounds.push(bound);
        self
    }

    /// Parse `"T"` or `"T extends A & B<T>"`.
    pub fn parse(text: &str) -> Result<Self, TypeParseError> {
        let text = text.trim();
        match text.split_once(" extends ") {
            None => Ok(Self::new(text)),
            Some((name, bounds)) => {
                // A wildcard has exactly the bound grammar we need
                let wildcard = TypeExpr::parse(&format!("? extends {bounds}"))?;
                let bounds = match wildcard {
                    TypeExpr::Wildcard { upper, .. } => upper,
                    _ => Vec::new(),
                };
                Ok(Self {
                    name: name.trim().to_string(),
                    bounds,
                })
            }
        }
    }
}

/// A field declared on a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,

    /// Declared (possibly generic) field type
    #[serde(rename = "type")]
    pub field_type: TypeExpr,

    /// Initializer applied when an instance is constructed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
}

impl FieldDefinition {
    /// Create a new field definition.
    pub fn new(name: impl Into<String>, field_type: TypeExpr) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }
}

/// A constructor parameter. A parameter named like a field initializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorParameter {
    /// Parameter name
    pub name: String,

    /// Declared parameter type
    #[serde(rename = "type")]
    pub param_type: TypeExpr,
}

fn default_accessible() -> bool {
    true
}

/// A constructor declared on a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDefinition {
    /// Parameters in declaration order
    #[serde(default)]
    pub params: Vec<ConstructorParameter>,

    /// Whether the populator may call this constructor
    #[serde(default = "default_accessible")]
    pub accessible: bool,
}

impl ConstructorDefinition {
    /// The no-argument constructor.
    pub fn no_args() -> Self {
        Self {
            params: Vec::new(),
            accessible: true,
        }
    }

    /// Constructor with the given `(name, type)` parameters.
    pub fn with_params(params: Vec<(String, TypeExpr)>) -> Self {
        Self {
            params: params
                .into_iter()
                .map(|(name, param_type)| ConstructorParameter { name, param_type })
                .collect(),
            accessible: true,
        }
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Raw type name
    pub name: String,

    /// Kind of type
    #[serde(default)]
    pub kind: TypeKind,

    /// Type parameters in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<TypeParameter>,

    /// Generic superclass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<TypeExpr>,

    /// Generic interfaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<TypeExpr>,

    /// Fields declared directly on this type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDefinition>,

    /// Declared constructors (none means an implicit no-arg constructor)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorDefinition>,

    /// Enum variants
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl TypeDefinition {
    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Start a concrete class definition.
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Class)
    }

    /// Start an abstract class definition.
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Abstract)
    }

    /// Start an interface definition.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Interface)
    }

    /// Create an enum definition.
    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut def = Self::with_kind(name, TypeKind::Enum);
        def.variants = variants.into_iter().map(Into::into).collect();
        def
    }

    /// Add a type parameter.
    pub fn param(mut self, param: TypeParameter) -> Self {
        self.params.push(param);
        self
    }

    /// Set the generic superclass.
    pub fn extends(mut self, supertype: TypeExpr) -> Self {
        self.extends = Some(supertype);
        self
    }

    /// Add a generic interface.
    pub fn implements(mut self, interface: TypeExpr) -> Self {
        self.implements.push(interface);
        self
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, field_type: TypeExpr) -> Self {
        self.fields.push(FieldDefinition::new(name, field_type));
        self
    }

    /// Add a field with an initializer.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        field_type: TypeExpr,
        default: serde_yaml::Value,
    ) -> Self {
        let mut field = FieldDefinition::new(name, field_type);
        field.default = Some(default);
        self.fields.push(field);
        self
    }

    /// Add a constructor.
    pub fn constructor(mut self, constructor: ConstructorDefinition) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Whether instances of this type can be constructed directly.
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Names of the declared type parameters.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Get a field declared directly on this type.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Constructors the populator may choose from, including the implicit one.
    pub fn effective_constructors(&self) -> Cow<'_, [ConstructorDefinition]> {
        if self.constructors.is_empty() && self.is_instantiable() {
            Cow::Owned(vec![ConstructorDefinition::no_args()])
        } else {
            Cow::Borrowed(&self.constructors)
        }
    }

    /// Direct supertypes as declared: superclass first, then interfaces.
    pub fn declared_supertypes(&self) -> impl Iterator<Item = &TypeExpr> {
        self.extends.iter().chain(self.implements.iter())
    }

    /// Turn bare parameter names into type variables in every expression.
    fn bind_own_variables(&mut self) {
        let names: Vec<String> = self.params.iter().map(|p| p.name.clone()).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        for param in &mut self.params {
            param.bounds = param
                .bounds
                .iter()
                .map(|b| b.bind_variables(&names))
                .collect();
        }
        self.extends = self.extends.as_ref().map(|e| e.bind_variables(&names));
        self.implements = self
            .implements
            .iter()
            .map(|e| e.bind_variables(&names))
            .collect();
        for field in &mut self.fields {
            field.field_type = field.field_type.bind_variables(&names);
        }
        for constructor in &mut self.constructors {
            for param in &mut constructor.params {
                param.param_type = param.param_type.bind_variables(&names);
            }
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// How a resolved descriptor is to be filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// Unresolvable type
    Unknown,
    /// The universal top type
    Object,
    /// Built-in scalar
    Scalar(ScalarKind),
    /// Ordered sequence of the element type
    Sequence(&'a TypeDescriptor),
    /// Set of the element type
    Set(&'a TypeDescriptor),
    /// Mapping from key type to value type
    Map(&'a TypeDescriptor, &'a TypeDescriptor),
    /// Zero or one of the inner type
    Optional(&'a TypeDescriptor),
    /// Array of the element type
    Array(&'a TypeDescriptor),
    /// Catalog enum
    Enum(&'a TypeDefinition),
    /// Catalog class, abstract class or interface
    Composite(&'a TypeDefinition),
    /// Raw name that is neither built in nor defined
    Undefined,
}

fn default_version() -> u32 {
    1
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

/// Collection of type definitions, validated and indexed by name.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCatalog {
    /// Catalog version
    pub version: u32,

    /// Type definitions
    pub types: Vec<TypeDefinition>,

    /// Cached type lookup (not serialized)
    #[serde(skip)]
    type_map: HashMap<String, usize>,
}

impl TypeCatalog {
    /// Build a catalog from definitions, binding type variables and validating
    /// every reference.
    pub fn new(types: Vec<TypeDefinition>) -> Result<Self, CatalogError> {
        Self::with_version(default_version(), types)
    }

    fn with_version(version: u32, mut types: Vec<TypeDefinition>) -> Result<Self, CatalogError> {
        for def in &mut types {
            def.bind_own_variables();
        }

        let mut catalog = Self {
            version,
            types,
            type_map: HashMap::new(),
        };
        catalog.build_type_map()?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load catalog from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse catalog from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::with_version(file.version, file.types)
    }

    fn build_type_map(&mut self) -> Result<(), CatalogError> {
        self.type_map.clear();
        for (idx, def) in self.types.iter().enumerate() {
            if BuiltinType::from_name(&def.name).is_some() {
                return Err(CatalogError::ReservedName(def.name.clone()));
            }
            if self.type_map.insert(def.name.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateType(def.name.clone()));
            }
        }
        Ok(())
    }

    /// Get a type definition by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_map
            .get(name)
            .and_then(|&idx| self.types.get(idx))
    }

    /// Get a type definition by name, or fail.
    pub fn require_type(&self, name: &str) -> Result<&TypeDefinition, CatalogError> {
        self.get_type(name)
            .ok_or_else(|| CatalogError::TypeNotFound(name.to_string()))
    }

    /// Get all type names in the catalog.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Classify a resolved descriptor.
    pub fn shape<'a>(&'a self, desc: &'a TypeDescriptor) -> Shape<'a> {
        match desc {
            TypeDescriptor::Unknown => Shape::Unknown,
            TypeDescriptor::Array(element) => Shape::Array(element),
            TypeDescriptor::Named { raw, .. } => match BuiltinType::from_name(raw) {
                Some(BuiltinType::Object) => Shape::Object,
                Some(BuiltinType::Scalar(kind)) => Shape::Scalar(kind),
                Some(BuiltinType::Container(ContainerKind::List)) => Shape::Sequence(desc.arg(0)),
                Some(BuiltinType::Container(ContainerKind::Set)) => Shape::Set(desc.arg(0)),
                Some(BuiltinType::Container(ContainerKind::Map)) => {
                    Shape::Map(desc.arg(0), desc.arg(1))
                }
                Some(BuiltinType::Container(ContainerKind::Optional)) => {
                    Shape::Optional(desc.arg(0))
                }
                None => match self.get_type(raw) {
                    Some(def) if def.kind == TypeKind::Enum => Shape::Enum(def),
                    Some(def) => Shape::Composite(def),
                    None => Shape::Undefined,
                },
            },
        }
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    fn validate(&self) -> Result<(), CatalogError> {
        for def in &self.types {
            if def.kind == TypeKind::Enum && def.variants.is_empty() {
                return Err(CatalogError::EmptyEnum(def.name.clone()));
            }

            for param in &def.params {
                for bound in &param.bounds {
                    let context = format!("bound of '{}' on '{}'", param.name, def.name);
                    self.check_references(bound, &context)?;
                }
            }
            for field in &def.fields {
                let context = format!("field '{}' of '{}'", field.name, def.name);
                self.check_references(&field.field_type, &context)?;
            }
            for constructor in &def.constructors {
                for param in &constructor.params {
                    let context = format!("constructor parameter '{}' of '{}'", param.name, def.name);
                    self.check_references(&param.param_type, &context)?;
                }
            }

            if let Some(extends) = &def.extends {
                self.check_references(extends, &format!("superclass of '{}'", def.name))?;
                self.check_superclass(def, extends)?;
            }
            for interface in &def.implements {
                self.check_references(interface, &format!("interfaces of '{}'", def.name))?;
                self.check_interface(def, interface)?;
            }
        }

        self.check_cycles()
    }

    fn check_references(&self, expr: &TypeExpr, context: &str) -> Result<(), CatalogError> {
        let mut result = Ok(());
        expr.for_each_named(&mut |name, found| {
            if result.is_err() {
                return;
            }
            let expected = match BuiltinType::from_name(name) {
                Some(BuiltinType::Container(kind)) => kind.arity(),
                Some(_) => 0,
                None => match self.get_type(name) {
                    Some(def) => def.params.len(),
                    None => {
                        result = Err(CatalogError::UnknownType {
                            referenced: name.to_string(),
                            context: context.to_string(),
                        });
                        return;
                    }
                },
            };
            // Raw use (no arguments) is always allowed
            if found != 0 && found != expected {
                result = Err(CatalogError::ArgumentCount {
                    type_name: name.to_string(),
                    expected,
                    found,
                    context: context.to_string(),
                });
            }
        });
        result
    }

    fn supertype_definition<'a>(
        &'a self,
        def: &TypeDefinition,
        expr: &TypeExpr,
    ) -> Result<Option<&'a TypeDefinition>, CatalogError> {
        match expr {
            TypeExpr::Named { name, .. } => {
                if BuiltinType::from_name(name) == Some(BuiltinType::Object) {
                    return Ok(None);
                }
                match self.get_type(name) {
                    Some(target) => Ok(Some(target)),
                    None => Err(CatalogError::InvalidSupertype {
                        type_name: def.name.clone(),
                        supertype: name.clone(),
                        reason: "built-in types cannot be extended".to_string(),
                    }),
                }
            }
            other => Err(CatalogError::InvalidSupertype {
                type_name: def.name.clone(),
                supertype: other.to_string(),
                reason: "supertypes must be named types".to_string(),
            }),
        }
    }

    fn check_superclass(&self, def: &TypeDefinition, expr: &TypeExpr) -> Result<(), CatalogError> {
        if matches!(def.kind, TypeKind::Interface | TypeKind::Enum) {
            return Err(CatalogError::InvalidSupertype {
                type_name: def.name.clone(),
                supertype: expr.to_string(),
                reason: "interfaces and enums use 'implements' only".to_string(),
            });
        }
        if let Some(target) = self.supertype_definition(def, expr)? {
            if !matches!(target.kind, TypeKind::Class | TypeKind::Abstract) {
                return Err(CatalogError::InvalidSupertype {
                    type_name: def.name.clone(),
                    supertype: target.name.clone(),
                    reason: "only classes can be extended".to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_interface(&self, def: &TypeDefinition, expr: &TypeExpr) -> Result<(), CatalogError> {
        if let Some(target) = self.supertype_definition(def, expr)? {
            if target.kind != TypeKind::Interface {
                return Err(CatalogError::InvalidSupertype {
                    type_name: def.name.clone(),
                    supertype: target.name.clone(),
                    reason: "only interfaces can be implemented".to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_cycles(&self) -> Result<(), CatalogError> {
        let mut done: HashSet<&str> = HashSet::new();
        for def in &self.types {
            let mut visiting: Vec<&str> = Vec::new();
            self.visit_supertypes(&def.name, &mut visiting, &mut done)?;
        }
        Ok(())
    }

    fn visit_supertypes<'a>(
        &'a self,
        name: &'a str,
        visiting: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), CatalogError> {
        if done.contains(name) {
            return Ok(());
        }
        if visiting.contains(&name) {
            return Err(CatalogError::InheritanceCycle(name.to_string()));
        }
        let Some(def) = self.get_type(name) else {
            return Ok(());
        };

        visiting.push(name);
        for supertype in def.declared_supertypes() {
            if let TypeExpr::Named { name: super_name, .. } = supertype {
                self.visit_supertypes(super_name, visiting, done)?;
            }
        }
        visiting.pop();
        done.insert(name);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
