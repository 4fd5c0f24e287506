use crate::{SemType, Variance};

/// Type-parameter-specific data of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterDecl {
    pub variance: Variance,
    /// Ordered upper bounds. Empty means the nullable root type.
    pub upper_bounds: Vec<SemType>,
    /// Position in the owner's type-parameter list.
    pub index: usize,
}

impl TypeParameterDecl {
    pub fn new(variance: Variance) -> Self {
        Self {
            variance,
            upper_bounds: Vec::new(),
            index: 0,
        }
    }

    pub fn invariant() -> Self {
        Self::new(Variance::Invariant)
    }

    pub fn with_bound(mut self, bound: SemType) -> Self {
        self.upper_bounds.push(bound);
        self
    }
}
