//! Resolved type descriptors.

use crate::types::{write_type_args, BuiltinType, OBJECT};
use std::fmt;

/// A fully resolved type occurrence.
///
/// Descriptors carry no type variables: the binding context that produced
/// them has already been applied, so two descriptors are equal exactly when
/// their raw types and arguments are equal. Anything the resolver could not
/// pin down is the [`TypeDescriptor::Unknown`] sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDescriptor {
    /// Unresolvable type (unbound variable with a top bound, unbounded wildcard)
    Unknown,

    /// Raw type with resolved arguments
    Named {
        /// Canonical raw name
        raw: String,
        /// Resolved type arguments (empty for raw use)
        args: Vec<TypeDescriptor>,
    },

    /// Array of the element type
    Array(Box<TypeDescriptor>),
}

static UNKNOWN: TypeDescriptor = TypeDescriptor::Unknown;

impl TypeDescriptor {
    /// Create a raw descriptor.
    pub fn named(raw: impl Into<String>) -> Self {
        Self::Named {
            raw: raw.into(),
            args: Vec::new(),
        }
    }

    /// Create a parameterized descriptor.
    pub fn parameterized(raw: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        Self::Named {
            raw: raw.into(),
            args,
        }
    }

    /// Create an array descriptor.
    pub fn array(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    /// Descriptor of the universal top type.
    pub fn object() -> Self {
        Self::named(OBJECT)
    }

    /// Raw name, if this is a named type.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Named { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Type arguments (empty for arrays and the unknown sentinel).
    pub fn args(&self) -> &[TypeDescriptor] {
        match self {
            Self::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Type argument at `index`, or the unknown sentinel when absent.
    pub fn arg(&self, index: usize) -> &TypeDescriptor {
        self.args().get(index).unwrap_or(&UNKNOWN)
    }

    /// Check if this is the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Built-in type of the raw name, if any.
    pub fn builtin(&self) -> Option<BuiltinType> {
        self.raw().and_then(BuiltinType::from_name)
    }

    /// Same raw type with the arguments dropped.
    pub fn erased(&self) -> TypeDescriptor {
        match self {
            Self::Named { raw, .. } => Self::named(raw.clone()),
            Self::Array(element) => Self::array(element.erased()),
            Self::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("?"),
            Self::Named { raw, args } => {
                f.write_str(raw)?;
                write_type_args(f, args)
            }
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerKind, ScalarKind};

    #[test]
    fn test_display() {
        let desc = TypeDescriptor::parameterized(
            "map",
            vec![
                TypeDescriptor::named("string"),
                TypeDescriptor::parameterized("list", vec![TypeDescriptor::Unknown]),
            ],
        );
        assert_eq!(desc.to_string(), "map<string, list<?>>");
        assert_eq!(
            TypeDescriptor::array(TypeDescriptor::named("i32")).to_string(),
            "i32[]"
        );
    }

    #[test]
    fn test_accessors() {
        let desc = TypeDescriptor::parameterized("list", vec![TypeDescriptor::named("string")]);
        assert_eq!(desc.raw(), Some("list"));
        assert_eq!(desc.arg(0), &TypeDescriptor::named("string"));
        assert!(desc.arg(1).is_unknown());
        assert_eq!(
            desc.builtin(),
            Some(BuiltinType::Container(ContainerKind::List))
        );
        assert_eq!(desc.erased(), TypeDescriptor::named("list"));
        assert_eq!(
            TypeDescriptor::named("uuid").builtin(),
            Some(BuiltinType::Scalar(ScalarKind::Uuid))
        );
        assert!(TypeDescriptor::Unknown.raw().is_none());
    }

    #[test]
    fn test_equality_includes_arguments() {
        let a = TypeDescriptor::parameterized("Box", vec![TypeDescriptor::named("string")]);
        let b = TypeDescriptor::parameterized("Box", vec![TypeDescriptor::named("i64")]);
        assert_ne!(a, b);
        assert_eq!(a.erased(), b.erased());
    }
}
