//! Binary-level types and method descriptors.
//!
//! These are the erased artifacts the mapper produces: the shape the target VM
//! sees after generics, nullability and declaration-site variance are gone.
//!
//! ```
//! use erasure_core::{BinaryType, Method, PrimitiveKind};
//!
//! let method = Method::new(
//!     "get",
//!     vec![BinaryType::Primitive(PrimitiveKind::Int)],
//!     BinaryType::object("java/lang/Object"),
//! );
//! assert_eq!(method.descriptor(), "(I)Ljava/lang/Object;");
//! ```

use std::fmt;

use crate::PrimitiveKind;

/// Well-known internal names.
pub mod internal_names {
    pub const OBJECT: &str = "java/lang/Object";
    pub const STRING: &str = "java/lang/String";
    pub const VOID_WRAPPER: &str = "java/lang/Void";
    pub const UNIT: &str = "kotlin/Unit";
    pub const DEFAULT_CONSTRUCTOR_MARKER: &str = "kotlin/jvm/internal/DefaultConstructorMarker";
    pub const OBJECT_REF: &str = "kotlin/jvm/internal/Ref$ObjectRef";
    pub const NON_EXISTENT_CLASS: &str = "error/NonExistentClass";
    /// Facade of builtin package members.
    pub const BUILTINS_PACKAGE_FACADE: &str = "kotlin/KotlinPackage";
}

/// Suffix of the class holding interface default bodies.
pub const DEFAULT_IMPLS_SUFFIX: &str = "$DefaultImpls";

/// Suffix appended to default-forwarding method names.
pub const DEFAULT_METHOD_SUFFIX: &str = "$default";

/// Suffix of a delegated property's backing field.
pub const DELEGATED_FIELD_SUFFIX: &str = "$delegate";

/// Binary name of constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// An erased type of the target VM.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BinaryType {
    /// `V`, only valid as a return type.
    Void,
    Primitive(PrimitiveKind),
    /// A class type, holding its slash-separated internal name.
    Object(String),
    Array(Box<BinaryType>),
}

impl BinaryType {
    pub fn object(internal_name: impl Into<String>) -> Self {
        BinaryType::Object(internal_name.into())
    }

    pub fn array_of(element: BinaryType) -> Self {
        BinaryType::Array(Box::new(element))
    }

    /// Descriptor string (`I`, `Ljava/lang/String;`, `[J`, ...).
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            BinaryType::Void => out.push('V'),
            BinaryType::Primitive(kind) => out.push(kind.descriptor()),
            BinaryType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            BinaryType::Array(element) => {
                out.push('[');
                element.write_descriptor(out);
            }
        }
    }

    /// Internal name as used for owners: the class name for objects, the
    /// descriptor for arrays and primitives.
    pub fn internal_name(&self) -> String {
        match self {
            BinaryType::Object(name) => name.clone(),
            other => other.descriptor(),
        }
    }

    /// Unqualified class name, after the last `/`.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            BinaryType::Object(name) => Some(name.rsplit('/').next().unwrap_or(name)),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, BinaryType::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, BinaryType::Void)
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

/// A method name with its erased argument and return types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    pub name: String,
    pub arguments: Vec<BinaryType>,
    pub return_type: BinaryType,
}

impl Method {
    pub fn new(name: impl Into<String>, arguments: Vec<BinaryType>, return_type: BinaryType) -> Self {
        Self {
            name: name.into(),
            arguments,
            return_type,
        }
    }

    /// Method descriptor, `(args)ret`.
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for argument in &self.arguments {
            argument.write_descriptor(&mut out);
        }
        out.push(')');
        self.return_type.write_descriptor(&mut out);
        out
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_descriptors() {
        let ints = BinaryType::array_of(BinaryType::Primitive(PrimitiveKind::Int));
        assert_eq!(ints.descriptor(), "[I");
        let strings = BinaryType::array_of(BinaryType::array_of(BinaryType::object(internal_names::STRING)));
        assert_eq!(strings.descriptor(), "[[Ljava/lang/String;");
        assert_eq!(strings.internal_name(), "[[Ljava/lang/String;");
    }

    #[test]
    fn object_internal_name() {
        let ty = BinaryType::object("foo/Bar$Baz");
        assert_eq!(ty.internal_name(), "foo/Bar$Baz");
        assert_eq!(ty.simple_name(), Some("Bar$Baz"));
    }

    #[test]
    fn constructor_descriptor() {
        let method = Method::new(
            CONSTRUCTOR_NAME,
            vec![
                BinaryType::object(internal_names::STRING),
                BinaryType::Primitive(PrimitiveKind::Long),
            ],
            BinaryType::Void,
        );
        assert!(method.is_constructor());
        assert_eq!(method.descriptor(), "(Ljava/lang/String;J)V");
        assert_eq!(method.to_string(), "<init>(Ljava/lang/String;J)V");
    }
}
