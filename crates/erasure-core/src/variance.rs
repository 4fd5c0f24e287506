//! Declaration-site and use-site variance.

use std::fmt;

/// Variance of a type parameter or of a type projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    #[default]
    Invariant,
    /// Contravariant, `in T`.
    In,
    /// Covariant, `out T`.
    Out,
}

impl Variance {
    /// Source keyword, empty for invariant.
    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }

    pub fn allows_out_position(self) -> bool {
        self != Variance::In
    }

    pub fn allows_in_position(self) -> bool {
        self != Variance::Out
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Invariant => write!(f, "invariant"),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Variance that results from projecting a parameter declared with
/// `parameter` variance using a `projection` at the use site.
///
/// Conflicting combinations (`In<out X>`, `Out<in X>`) collapse to a star
/// projection, which behaves as `out`.
pub fn effective_variance(parameter: Variance, projection: Variance) -> Variance {
    if parameter == Variance::Invariant {
        return projection;
    }
    if projection == Variance::Invariant || projection == parameter {
        return parameter;
    }
    Variance::Out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_parameter_takes_projection() {
        assert_eq!(effective_variance(Variance::Invariant, Variance::In), Variance::In);
        assert_eq!(effective_variance(Variance::Invariant, Variance::Invariant), Variance::Invariant);
    }

    #[test]
    fn invariant_projection_keeps_parameter() {
        assert_eq!(effective_variance(Variance::In, Variance::Invariant), Variance::In);
        assert_eq!(effective_variance(Variance::Out, Variance::Out), Variance::Out);
    }

    #[test]
    fn conflicting_variance_is_star() {
        assert_eq!(effective_variance(Variance::In, Variance::Out), Variance::Out);
        assert_eq!(effective_variance(Variance::Out, Variance::In), Variance::Out);
    }

    #[test]
    fn display() {
        assert_eq!(Variance::In.to_string(), "in");
        assert_eq!(Variance::Invariant.to_string(), "invariant");
    }
}
