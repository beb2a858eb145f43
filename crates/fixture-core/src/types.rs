//! Declared type expressions and the built-in type universe.
//!
//! A [`TypeExpr`] is a type as it is *written* in a type declaration: it may
//! mention type variables and wildcards that only make sense in the scope of
//! the declaring type. The [`Resolver`](crate::resolver::Resolver) turns it
//! into a concrete [`TypeDescriptor`](crate::descriptor::TypeDescriptor).
//!
//! # Text Format
//!
//! ```text
//! String
//! List<String>
//! Map<String, List<T>>
//! ? extends Number
//! ? super T
//! T[]
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A type occurrence as declared in a type definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Raw or parameterized type (`Leaf`, `List<String>`)
    Named {
        /// Raw type name as written
        name: String,
        /// Type arguments, empty for raw use
        args: Vec<TypeExpr>,
    },

    /// Type variable declared by the enclosing type (`T`)
    Variable(String),

    /// Wildcard (`?`, `? extends X`, `? super X`)
    Wildcard {
        /// Upper bounds (`extends`)
        upper: Vec<TypeExpr>,
        /// Lower bounds (`super`)
        lower: Vec<TypeExpr>,
    },

    /// Array of the component type (`T[]`)
    Array(Box<TypeExpr>),
}

/// Error raised when a type expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid type expression '{input}' at offset {offset}: {message}")]
pub struct TypeParseError {
    /// The full input
    pub input: String,
    /// Byte offset of the failure
    pub offset: usize,
    /// What went wrong
    pub message: String,
}

impl TypeExpr {
    /// Create a raw type expression.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a parameterized type expression.
    pub fn parameterized(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Create a type variable expression.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Create an array expression.
    pub fn array(component: TypeExpr) -> Self {
        Self::Array(Box::new(component))
    }

    /// Unbounded wildcard `?`.
    pub fn wildcard() -> Self {
        Self::Wildcard {
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }

    /// Parse a type expression from its text form.
    pub fn parse(input: &str) -> Result<Self, TypeParseError> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        };
        let expr = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos < parser.chars.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Rewrite bare names that match one of `params` into type variables.
    ///
    /// Text parsing cannot tell `T` the variable from `T` a class; the
    /// declaring type knows its own parameter names.
    pub fn bind_variables(&self, params: &[&str]) -> TypeExpr {
        match self {
            Self::Named { name, args } if args.is_empty() && params.contains(&name.as_str()) => {
                Self::Variable(name.clone())
            }
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.bind_variables(params)).collect(),
            },
            Self::Variable(name) => Self::Variable(name.clone()),
            Self::Wildcard { upper, lower } => Self::Wildcard {
                upper: upper.iter().map(|a| a.bind_variables(params)).collect(),
                lower: lower.iter().map(|a| a.bind_variables(params)).collect(),
            },
            Self::Array(component) => Self::Array(Box::new(component.bind_variables(params))),
        }
    }

    /// Visit every named raw type mentioned in this expression.
    pub fn for_each_named<'a>(&'a self, f: &mut impl FnMut(&'a str, usize)) {
        match self {
            Self::Named { name, args } => {
                f(name, args.len());
                for arg in args {
                    arg.for_each_named(f);
                }
            }
            Self::Variable(_) => {}
            Self::Wildcard { upper, lower } => {
                for bound in upper.iter().chain(lower) {
                    bound.for_each_named(f);
                }
            }
            Self::Array(component) => component.for_each_named(f),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                f.write_str(name)?;
                write_args(f, args)
            }
            Self::Variable(name) => f.write_str(name),
            Self::Wildcard { upper, lower } => {
                f.write_str("?")?;
                if !upper.is_empty() {
                    f.write_str(" extends ")?;
                    write_bounds(f, upper)?;
                } else if !lower.is_empty() {
                    f.write_str(" super ")?;
                    write_bounds(f, lower)?;
                }
                Ok(())
            }
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

fn write_args<T: fmt::Display>(f: &mut fmt::Formatter<'_>, args: &[T]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(">")
}

pub(crate) fn write_type_args<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    args: &[T],
) -> fmt::Result {
    write_args(f, args)
}

fn write_bounds(f: &mut fmt::Formatter<'_>, bounds: &[TypeExpr]) -> fmt::Result {
    for (i, bound) in bounds.iter().enumerate() {
        if i > 0 {
            f.write_str(" & ")?;
        }
        write!(f, "{bound}")?;
    }
    Ok(())
}

impl FromStr for TypeExpr {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Serialized as its text form, e.g. "Map<String, List<T>>"

impl Serialize for TypeExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeExpr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct TypeExprVisitor;

        impl Visitor<'_> for TypeExprVisitor {
            type Value = TypeExpr;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a type expression such as \"List<String>\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                TypeExpr::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TypeExprVisitor)
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> TypeParseError {
        let offset = self
            .chars
            .get(self.pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len());
        TypeParseError {
            input: self.input.to_string(),
            offset,
            message: message.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].1.is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn ident(&mut self) -> Result<String, TypeParseError> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos].1;
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        Ok(self.chars[start..self.pos].iter().map(|(_, c)| *c).collect())
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeParseError> {
        if self.eat('?') {
            return self.parse_wildcard();
        }

        let name = self.ident()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                self.expect('>')?;
                break;
            }
        }

        let mut expr = TypeExpr::Named { name, args };
        while self.eat('[') {
            self.expect(']')?;
            expr = TypeExpr::Array(Box::new(expr));
        }
        Ok(expr)
    }

    fn parse_wildcard(&mut self) -> Result<TypeExpr, TypeParseError> {
        let mut upper = Vec::new();
        let mut lower = Vec::new();

        if matches!(self.peek(), Some(c) if c.is_alphabetic()) {
            let keyword = self.ident()?;
            let target = match keyword.as_str() {
                "extends" => &mut upper,
                "super" => &mut lower,
                _ => return Err(self.error("expected 'extends' or 'super' after '?'")),
            };
            target.push(self.parse_type()?);
            while self.eat('&') {
                target.push(self.parse_type()?);
            }
        }

        Ok(TypeExpr::Wildcard { upper, lower })
    }
}

/// Built-in scalar kinds, filled by leaf producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    /// Exact decimal, carried as text
    Decimal,
    Char,
    String,
    Bytes,
    Uuid,
    Ulid,
    Date,
    Time,
    /// Timestamp without zone
    DateTime,
    /// Timestamp with zone offset
    ZonedDateTime,
    Duration,
    /// IANA zone identifier
    ZoneId,
}

/// Built-in container kinds, populated element by element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Ordered sequence
    List,
    /// Set of distinct elements
    Set,
    /// Key/value mapping
    Map,
    /// Zero or one value
    Optional,
}

/// Every raw type name the core understands without a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Scalar(ScalarKind),
    Container(ContainerKind),
    /// The universal top type
    Object,
}

impl ScalarKind {
    /// All scalar kinds, in registration order for built-in producers.
    pub const ALL: [ScalarKind; 23] = [
        Self::Bool,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Decimal,
        Self::Char,
        Self::String,
        Self::Bytes,
        Self::Uuid,
        Self::Ulid,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::ZonedDateTime,
        Self::Duration,
        Self::ZoneId,
    ];

    /// Canonical raw name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "u8",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Ulid => "ulid",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date_time",
            Self::ZonedDateTime => "zoned_date_time",
            Self::Duration => "duration",
            Self::ZoneId => "zone_id",
        }
    }

    /// Check if this kind is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::Float32
                | Self::Float64
                | Self::Decimal
        )
    }

    /// Check if this kind is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::DateTime | Self::ZonedDateTime | Self::Duration
        )
    }
}

impl ContainerKind {
    /// Canonical raw name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Optional => "optional",
        }
    }

    /// Number of type arguments the container takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Map => 2,
            _ => 1,
        }
    }
}

impl BuiltinType {
    /// Look up a built-in by canonical name or alias.
    pub fn from_name(name: &str) -> Option<Self> {
        use ContainerKind as C;
        use ScalarKind as S;

        let builtin = match name {
            "bool" | "boolean" | "Boolean" => Self::Scalar(S::Bool),
            "i8" | "byte" | "Byte" | "tiny_int" => Self::Scalar(S::Int8),
            "i16" | "short" | "Short" | "small_int" => Self::Scalar(S::Int16),
            "i32" | "int" | "Integer" | "integer" => Self::Scalar(S::Int32),
            "i64" | "long" | "Long" | "big_int" => Self::Scalar(S::Int64),
            "u8" => Self::Scalar(S::UInt8),
            "u16" => Self::Scalar(S::UInt16),
            "u32" => Self::Scalar(S::UInt32),
            "u64" | "usize" => Self::Scalar(S::UInt64),
            "f32" | "float" | "Float" => Self::Scalar(S::Float32),
            "f64" | "double" | "Double" => Self::Scalar(S::Float64),
            "decimal" | "Decimal" | "BigDecimal" => Self::Scalar(S::Decimal),
            "char" | "Character" => Self::Scalar(S::Char),
            "string" | "String" | "str" | "text" => Self::Scalar(S::String),
            "bytes" | "Bytes" | "blob" => Self::Scalar(S::Bytes),
            "uuid" | "Uuid" | "UUID" => Self::Scalar(S::Uuid),
            "ulid" | "Ulid" => Self::Scalar(S::Ulid),
            "date" | "LocalDate" | "NaiveDate" => Self::Scalar(S::Date),
            "time" | "LocalTime" | "NaiveTime" => Self::Scalar(S::Time),
            "date_time" | "datetime" | "LocalDateTime" | "NaiveDateTime" | "Date" => {
                Self::Scalar(S::DateTime)
            }
            "zoned_date_time" | "ZonedDateTime" | "OffsetDateTime" | "timestamp_tz"
            | "DateTime" => Self::Scalar(S::ZonedDateTime),
            "duration" | "Duration" => Self::Scalar(S::Duration),
            "zone_id" | "ZoneId" | "Tz" => Self::Scalar(S::ZoneId),
            "list" | "List" | "ArrayList" | "LinkedList" | "Collection" | "Iterable" | "Vec"
            | "sequence" => Self::Container(C::List),
            "set" | "Set" | "HashSet" | "TreeSet" | "LinkedHashSet" | "BTreeSet" => {
                Self::Container(C::Set)
            }
            "map" | "Map" | "HashMap" | "TreeMap" | "LinkedHashMap" | "BTreeMap" => {
                Self::Container(C::Map)
            }
            "optional" | "Optional" | "Option" => Self::Container(C::Optional),
            "object" | "Object" | "any" => Self::Object,
            _ => return None,
        };
        Some(builtin)
    }

    /// Canonical raw name.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.name(),
            Self::Container(kind) => kind.name(),
            Self::Object => OBJECT,
        }
    }
}

/// Canonical name of the universal top type.
pub const OBJECT: &str = "object";

/// Canonicalize a raw name: built-in aliases collapse to one spelling,
/// catalog names are kept as written.
pub fn canonical_name(name: &str) -> &str {
    match BuiltinType::from_name(name) {
        Some(builtin) => builtin.canonical_name(),
        None => name,
    }
}
