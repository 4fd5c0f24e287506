use crate::{DeclId, SemType};

/// Property-specific data of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub ty: SemType,
    pub is_var: bool,
    pub is_const: bool,
    pub is_delegated: bool,
    pub extension_receiver: Option<SemType>,
    pub getter: Option<DeclId>,
    pub setter: Option<DeclId>,
    /// Name fragment used by synthetic accessors of this property.
    pub accessor_suffix: Option<String>,
}

impl PropertyDecl {
    pub fn val(ty: SemType) -> Self {
        Self {
            ty,
            is_var: false,
            is_const: false,
            is_delegated: false,
            extension_receiver: None,
            getter: None,
            setter: None,
            accessor_suffix: None,
        }
    }

    pub fn var(ty: SemType) -> Self {
        Self {
            is_var: true,
            ..Self::val(ty)
        }
    }

    pub fn as_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn as_delegated(mut self) -> Self {
        self.is_delegated = true;
        self
    }

    pub fn with_accessor_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.accessor_suffix = Some(suffix.into());
        self
    }
}
