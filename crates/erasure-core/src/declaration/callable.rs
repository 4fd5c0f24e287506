//! Callable members: functions, property accessors and constructors.

use crate::{DeclId, SemType};

/// How a callable came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallableKind {
    #[default]
    Declaration,
    /// Inherited without an explicit override; has no body of its own.
    FakeOverride,
    /// Generated by interface delegation.
    Delegation,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameter {
    pub name: String,
    pub ty: SemType,
    pub has_default: bool,
}

impl ValueParameter {
    pub fn new(name: impl Into<String>, ty: SemType) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Callable-specific data shared by functions, accessors and constructors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallableData {
    /// Declared return type. `None` for constructors.
    pub return_type: Option<SemType>,
    pub extension_receiver: Option<SemType>,
    pub value_parameters: Vec<ValueParameter>,
    /// Declared type parameters. Ids of `TypeParameter` declarations.
    pub type_parameters: Vec<DeclId>,
    pub kind: CallableKind,
    /// Directly overridden members, in declaration order of the supertypes.
    pub overridden: Vec<DeclId>,
}

impl CallableData {
    pub fn returning(return_type: SemType) -> Self {
        Self {
            return_type: Some(return_type),
            ..Self::default()
        }
    }

    pub fn constructor() -> Self {
        Self::default()
    }

    // === Builder Methods ===

    pub fn with_parameter(mut self, parameter: ValueParameter) -> Self {
        self.value_parameters.push(parameter);
        self
    }

    pub fn with_receiver(mut self, receiver: SemType) -> Self {
        self.extension_receiver = Some(receiver);
        self
    }

    pub fn overriding(mut self, overridden: DeclId) -> Self {
        self.overridden.push(overridden);
        self
    }

    pub fn as_fake_override(mut self) -> Self {
        self.kind = CallableKind::FakeOverride;
        self
    }

    pub fn with_kind(mut self, kind: CallableKind) -> Self {
        self.kind = kind;
        self
    }

    // === Query Methods ===

    pub fn is_fake_override(&self) -> bool {
        self.kind == CallableKind::FakeOverride
    }

    /// Classifier ids of the value parameters, used for overload identity.
    pub fn parameter_classifiers(&self) -> Vec<DeclId> {
        self.value_parameters
            .iter()
            .map(|p| {
                p.ty.class_id()
                    .or_else(|| p.ty.type_parameter_id())
                    .unwrap_or(DeclId::EMPTY)
            })
            .collect()
    }
}

/// Data of a property getter or setter.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDecl {
    /// The property this accessor belongs to.
    pub property: DeclId,
    pub callable: CallableData,
}
