//! Semantic types: a constructor reference, type-argument projections and
//! nullability.
//!
//! For inner classes the argument list is flattened: the innermost segment's
//! arguments come first, followed by each enclosing inner segment's arguments,
//! outward. The arity of a [`SemType`] therefore equals the total number of
//! type parameters of the constructor and its inner-class chain.

use crate::{DeclId, Variance};

/// Description of an unresolved type placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorType {
    /// Rendered text of the unresolved reference.
    pub text: String,
    /// Declaration in which the unresolved reference appeared.
    pub origin: Option<DeclId>,
}

/// Head of a semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeConstructor {
    Class(DeclId),
    TypeParameter(DeclId),
    Error(ErrorType),
}

/// Payload of a type projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionPayload {
    Type(SemType),
    /// `*`
    Star,
}

/// A type argument with its use-site variance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Projection {
    pub variance: Variance,
    pub payload: ProjectionPayload,
}

impl Projection {
    pub fn invariant(ty: SemType) -> Self {
        Self::of(Variance::Invariant, ty)
    }

    pub fn out(ty: SemType) -> Self {
        Self::of(Variance::Out, ty)
    }

    pub fn contra(ty: SemType) -> Self {
        Self::of(Variance::In, ty)
    }

    pub fn of(variance: Variance, ty: SemType) -> Self {
        Self {
            variance,
            payload: ProjectionPayload::Type(ty),
        }
    }

    pub fn star() -> Self {
        Self {
            variance: Variance::Out,
            payload: ProjectionPayload::Star,
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self.payload, ProjectionPayload::Star)
    }

    /// The projected type, `None` for a star projection.
    pub fn ty(&self) -> Option<&SemType> {
        match &self.payload {
            ProjectionPayload::Type(ty) => Some(ty),
            ProjectionPayload::Star => None,
        }
    }
}

/// A resolved semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemType {
    pub constructor: TypeConstructor,
    pub arguments: Vec<Projection>,
    pub nullable: bool,
}

impl SemType {
    /// Non-null class type without arguments.
    pub fn class(id: DeclId) -> Self {
        Self::generic(id, Vec::new())
    }

    /// Non-null class type with (inner-flattened) arguments.
    pub fn generic(id: DeclId, arguments: Vec<Projection>) -> Self {
        Self {
            constructor: TypeConstructor::Class(id),
            arguments,
            nullable: false,
        }
    }

    /// Non-null reference to a type parameter.
    pub fn type_parameter(id: DeclId) -> Self {
        Self {
            constructor: TypeConstructor::TypeParameter(id),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// Unresolved placeholder.
    pub fn error(text: impl Into<String>, origin: Option<DeclId>) -> Self {
        Self {
            constructor: TypeConstructor::Error(ErrorType {
                text: text.into(),
                origin,
            }),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn class_id(&self) -> Option<DeclId> {
        match self.constructor {
            TypeConstructor::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn type_parameter_id(&self) -> Option<DeclId> {
        match self.constructor {
            TypeConstructor::TypeParameter(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.constructor, TypeConstructor::Error(_))
    }

    /// Same constructor, ignoring arguments and nullability.
    pub fn same_constructor(&self, other: &SemType) -> bool {
        match (&self.constructor, &other.constructor) {
            (TypeConstructor::Class(a), TypeConstructor::Class(b)) => a == b,
            (TypeConstructor::TypeParameter(a), TypeConstructor::TypeParameter(b)) => a == b,
            _ => false,
        }
    }
}
