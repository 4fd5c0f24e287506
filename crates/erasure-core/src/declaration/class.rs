//! Classifier declarations.

use crate::{DeclId, PrimitiveKind, SemType};

/// Shape of a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    Object,
    AnnotationClass,
}

impl ClassKind {
    /// Interfaces and annotation classes are interfaces on the binary level.
    pub fn is_jvm_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::AnnotationClass)
    }

    pub fn is_enum(self) -> bool {
        matches!(self, ClassKind::EnumClass | ClassKind::EnumEntry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
    Sealed,
}

/// Builtin classifiers the mapper treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Any,
    Nothing,
    Unit,
    String,
    Primitive(PrimitiveKind),
    /// Generic `Array<T>`.
    Array,
    PrimitiveArray(PrimitiveKind),
    /// `FunctionN` interface with the given arity.
    Function(u8),
}

/// Classifier-specific data of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub kind: ClassKind,
    pub modality: Modality,
    /// Declared type parameters, in order. Ids of `TypeParameter` declarations.
    pub type_parameters: Vec<DeclId>,
    /// Direct supertypes.
    pub supertypes: Vec<SemType>,
    pub builtin: Option<Builtin>,
}

impl ClassDecl {
    pub fn new(kind: ClassKind) -> Self {
        let modality = match kind {
            ClassKind::Interface => Modality::Abstract,
            _ => Modality::Final,
        };
        Self {
            kind,
            modality,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            builtin: None,
        }
    }

    /// A final class.
    pub fn class() -> Self {
        Self::new(ClassKind::Class)
    }

    pub fn interface() -> Self {
        Self::new(ClassKind::Interface)
    }

    // === Builder Methods ===

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    pub fn as_open(self) -> Self {
        self.with_modality(Modality::Open)
    }

    pub fn with_supertype(mut self, supertype: SemType) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn as_builtin(mut self, builtin: Builtin) -> Self {
        self.builtin = Some(builtin);
        self
    }

    // === Query Methods ===

    /// A class type of this classifier cannot have proper subtypes.
    pub fn is_final(&self) -> bool {
        !self.kind.is_jvm_interface() && self.modality == Modality::Final
    }

    pub fn is_builtin(&self, builtin: Builtin) -> bool {
        self.builtin == Some(builtin)
    }
}
