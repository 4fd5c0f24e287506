//! Declarations of the resolved descriptor graph.
//!
//! A [`Declaration`] carries the fields every declaration shares (identity,
//! name, visibility, containing declaration, flags, origin) plus a closed
//! [`DeclarationKind`] with the kind-specific data. The mapper matches on the
//! kind exhaustively; there is no open-ended type inspection.
//!
//! Declarations are built with builder methods and handed to a registry,
//! which assigns the [`DeclId`] when none was given:
//!
//! ```
//! use erasure_core::{CallableData, Declaration, DeclFlags, Visibility};
//! # use erasure_core::{DeclId, SemType};
//! # let unit = SemType::class(DeclId::from_class("kotlin.Unit"));
//! # let owner = DeclId::from_class("foo.Foo");
//!
//! let decl = Declaration::function("run", CallableData::returning(unit))
//!     .in_parent(owner)
//!     .with_visibility(Visibility::Internal)
//!     .with_flags(DeclFlags::OPERATOR);
//! assert!(decl.is_callable());
//! ```

mod callable;
mod class;
mod property;
mod type_parameter;

pub use callable::{AccessorDecl, CallableData, CallableKind, ValueParameter};
pub use class::{Builtin, ClassDecl, ClassKind, Modality};
pub use property::PropertyDecl;
pub use type_parameter::TypeParameterDecl;

use bitflags::bitflags;

use crate::{DeclId, Visibility};

bitflags! {
    /// Kind flags of a declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u32 {
        const OPERATOR = 1 << 0;
        /// Declared inside a function body.
        const LOCAL = 1 << 1;
        const ANONYMOUS = 1 << 2;
        const LAMBDA = 1 << 3;
        const FUNCTION_EXPRESSION = 1 << 4;
        /// Inner class holding a reference to its outer instance.
        const INNER = 1 << 5;
        /// Static in the binary sense (foreign static members).
        const STATIC = 1 << 6;
        /// Annotated to be emitted as a static method.
        const JVM_STATIC = 1 << 7;
        /// Synthetic accessor generated for another member, see `accessor_for`.
        const SYNTHETIC_ACCESSOR = 1 << 8;
        const FINAL = 1 << 9;
        /// Compiler-generated name that never reaches binary signatures
        /// when only signatures are produced.
        const SPECIAL_NAME = 1 << 10;
    }
}

/// Where a declaration comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    /// Compiled in this module.
    #[default]
    Source,
    /// Deserialized from previously compiled binaries of this language.
    Binary,
    /// Declared in a foreign language on the same VM.
    Foreign,
    /// Provided by the compiler.
    Builtin,
}

/// Package-specific data of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    /// Dotted fully-qualified name; empty for the root package.
    pub fq_name: String,
}

impl PackageDecl {
    /// Slash-separated prefix used for internal names, empty for the root.
    pub fn internal_prefix(&self) -> String {
        self.fq_name.replace('.', "/")
    }
}

/// Kind-specific data of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    Class(ClassDecl),
    Function(CallableData),
    Property(PropertyDecl),
    Getter(AccessorDecl),
    Setter(AccessorDecl),
    Constructor(CallableData),
    TypeParameter(TypeParameterDecl),
    Package(PackageDecl),
}

impl DeclarationKind {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            DeclarationKind::Class(class) => match class.kind {
                ClassKind::Interface => "interface",
                ClassKind::EnumClass => "enum class",
                ClassKind::EnumEntry => "enum entry",
                ClassKind::Object => "object",
                ClassKind::AnnotationClass => "annotation class",
                ClassKind::Class => "class",
            },
            DeclarationKind::Function(_) => "function",
            DeclarationKind::Property(_) => "property",
            DeclarationKind::Getter(_) => "getter",
            DeclarationKind::Setter(_) => "setter",
            DeclarationKind::Constructor(_) => "constructor",
            DeclarationKind::TypeParameter(_) => "type parameter",
            DeclarationKind::Package(_) => "package",
        }
    }
}

/// A declaration of the descriptor graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Identity; `DeclId::EMPTY` until assigned by a registry.
    pub id: DeclId,
    /// Simple name. Getters and setters use `<get-x>` / `<set-x>`.
    pub name: String,
    pub visibility: Visibility,
    /// Containing declaration; `None` only for packages.
    pub parent: Option<DeclId>,
    pub flags: DeclFlags,
    /// Target member when this is a synthetic accessor.
    pub accessor_for: Option<DeclId>,
    /// Explicit binary name.
    pub platform_name: Option<String>,
    pub origin: Origin,
    /// Source text, for diagnostics.
    pub source: Option<String>,
    pub kind: DeclarationKind,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            id: DeclId::EMPTY,
            name: name.into(),
            visibility: Visibility::Public,
            parent: None,
            flags: DeclFlags::empty(),
            accessor_for: None,
            platform_name: None,
            origin: Origin::Source,
            source: None,
            kind,
        }
    }

    pub fn package(fq_name: impl Into<String>) -> Self {
        let fq_name = fq_name.into();
        let name = fq_name.rsplit('.').next().unwrap_or_default().to_string();
        Self::new(name, DeclarationKind::Package(PackageDecl { fq_name }))
    }

    pub fn class(name: impl Into<String>, class: ClassDecl) -> Self {
        Self::new(name, DeclarationKind::Class(class))
    }

    pub fn function(name: impl Into<String>, callable: CallableData) -> Self {
        Self::new(name, DeclarationKind::Function(callable))
    }

    pub fn property(name: impl Into<String>, property: PropertyDecl) -> Self {
        Self::new(name, DeclarationKind::Property(property))
    }

    pub fn getter(property_name: &str, property: DeclId, callable: CallableData) -> Self {
        Self::new(
            format!("<get-{property_name}>"),
            DeclarationKind::Getter(AccessorDecl { property, callable }),
        )
    }

    pub fn setter(property_name: &str, property: DeclId, callable: CallableData) -> Self {
        Self::new(
            format!("<set-{property_name}>"),
            DeclarationKind::Setter(AccessorDecl { property, callable }),
        )
    }

    pub fn constructor(callable: CallableData) -> Self {
        Self::new("<init>", DeclarationKind::Constructor(callable))
    }

    pub fn type_parameter(name: impl Into<String>, type_parameter: TypeParameterDecl) -> Self {
        Self::new(name, DeclarationKind::TypeParameter(type_parameter))
    }

    // === Builder Methods ===

    pub fn with_id(mut self, id: DeclId) -> Self {
        self.id = id;
        self
    }

    pub fn in_parent(mut self, parent: DeclId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_platform_name(mut self, name: impl Into<String>) -> Self {
        self.platform_name = Some(name.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Mark as a synthetic accessor for `target`.
    pub fn accessor_for(mut self, target: DeclId) -> Self {
        self.accessor_for = Some(target);
        self.flags |= DeclFlags::SYNTHETIC_ACCESSOR;
        self
    }

    // === Query Methods ===

    pub fn has_flag(&self, flag: DeclFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_synthetic_accessor(&self) -> bool {
        self.has_flag(DeclFlags::SYNTHETIC_ACCESSOR)
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match &self.kind {
            DeclarationKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageDecl> {
        match &self.kind {
            DeclarationKind::Package(package) => Some(package),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDecl> {
        match &self.kind {
            DeclarationKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_type_parameter(&self) -> Option<&TypeParameterDecl> {
        match &self.kind {
            DeclarationKind::TypeParameter(tp) => Some(tp),
            _ => None,
        }
    }

    /// Callable data of functions, accessors and constructors.
    pub fn as_callable(&self) -> Option<&CallableData> {
        match &self.kind {
            DeclarationKind::Function(callable) | DeclarationKind::Constructor(callable) => Some(callable),
            DeclarationKind::Getter(accessor) | DeclarationKind::Setter(accessor) => Some(&accessor.callable),
            _ => None,
        }
    }

    pub fn as_accessor(&self) -> Option<&AccessorDecl> {
        match &self.kind {
            DeclarationKind::Getter(accessor) | DeclarationKind::Setter(accessor) => Some(accessor),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.as_callable().is_some()
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, DeclarationKind::Constructor(_))
    }

    pub fn is_property_accessor(&self) -> bool {
        matches!(self.kind, DeclarationKind::Getter(_) | DeclarationKind::Setter(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SemType, Variance};

    fn unit() -> SemType {
        SemType::class(DeclId::from_class("kotlin.Unit"))
    }

    #[test]
    fn package_name_is_last_segment() {
        let decl = Declaration::package("foo.bar");
        assert_eq!(decl.name, "bar");
        assert_eq!(decl.as_package().map(|p| p.internal_prefix()), Some("foo/bar".to_string()));
        assert_eq!(Declaration::package("").name, "");
    }

    #[test]
    fn accessor_for_sets_flag() {
        let target = DeclId::from_class("foo.Foo");
        let decl = Declaration::function("access$run", CallableData::returning(unit())).accessor_for(target);
        assert!(decl.is_synthetic_accessor());
        assert_eq!(decl.accessor_for, Some(target));
    }

    #[test]
    fn flags_accumulate() {
        let decl = Declaration::function("f", CallableData::returning(unit()))
            .with_flags(DeclFlags::OPERATOR)
            .with_flags(DeclFlags::JVM_STATIC);
        assert!(decl.has_flag(DeclFlags::OPERATOR | DeclFlags::JVM_STATIC));
        assert!(!decl.has_flag(DeclFlags::STATIC));
    }

    #[test]
    fn getter_exposes_callable() {
        let property = DeclId::from_class("foo.x");
        let getter = Declaration::getter("x", property, CallableData::returning(unit()));
        assert_eq!(getter.name, "<get-x>");
        assert!(getter.is_property_accessor());
        assert!(getter.as_callable().is_some());
        assert_eq!(getter.as_accessor().map(|a| a.property), Some(property));
    }

    #[test]
    fn interface_classes_are_not_final() {
        assert!(!ClassDecl::interface().is_final());
        assert!(ClassDecl::class().is_final());
        assert!(!ClassDecl::class().as_open().is_final());
        assert_eq!(
            Declaration::type_parameter("T", TypeParameterDecl::new(Variance::Out)).kind.label(),
            "type parameter"
        );
    }
}
