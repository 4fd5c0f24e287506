//! Type mapping modes.
//!
//! A [`TypeMappingMode`] tells the type mapper how to treat one position:
//! whether primitives must be boxed, whether declaration-site variance turns
//! into wildcards, and which mode applies to nested type arguments depending
//! on their effective variance.
//!
//! Modes are small `Copy` values. The mode of a nested argument is derived
//! with [`TypeMappingMode::to_generic_argument_mode`] from per-variance
//! selectors, so the recursive structure never needs heap allocation.

use bitflags::bitflags;

use erasure_core::{SemType, Variance};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModeFlags: u8 {
        /// Primitives are written as their wrapper classes.
        const NEED_PRIMITIVE_BOXING = 1 << 0;
        /// Annotation parameter types; arguments never become wildcards.
        const FOR_ANNOTATION_PARAMETER = 1 << 1;
        /// Declaration-site variance is never turned into wildcards.
        const SKIP_DECLARATION_SITE_WILDCARDS = 1 << 2;
        /// Wildcards are dropped when the argument is already most precise.
        const SKIP_DECLARATION_SITE_WILDCARDS_IF_POSSIBLE = 1 << 3;
    }
}

/// Position a mode was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingPosition {
    Default,
    GenericArgument,
    SuperType,
    AnnotationValue,
    ReturnType,
    ValueParameter,
}

/// Mode selected for the arguments of a type mapped in some mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ArgumentMode {
    /// Reuse the current mode.
    Same,
    GenericArgument,
    AnnotationArgument,
    /// Return-type rules: no wildcards except below contravariant arguments.
    Return { annotation: bool },
    /// Wildcards kept unless the argument is most precise.
    ElideIfPossible { annotation: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeMappingMode {
    flags: ModeFlags,
    position: MappingPosition,
    covariant: ArgumentMode,
    contravariant: ArgumentMode,
    invariant: ArgumentMode,
}

impl TypeMappingMode {
    /// Type arguments: primitives boxed, wildcards from declaration-site
    /// variance.
    pub const GENERIC_ARGUMENT: TypeMappingMode = TypeMappingMode {
        flags: ModeFlags::NEED_PRIMITIVE_BOXING,
        position: MappingPosition::GenericArgument,
        covariant: ArgumentMode::Same,
        contravariant: ArgumentMode::Same,
        invariant: ArgumentMode::Same,
    };

    /// Plain descriptor position: primitives unboxed.
    pub const DEFAULT: TypeMappingMode = TypeMappingMode {
        flags: ModeFlags::empty(),
        position: MappingPosition::Default,
        covariant: ArgumentMode::GenericArgument,
        contravariant: ArgumentMode::GenericArgument,
        invariant: ArgumentMode::GenericArgument,
    };

    /// Supertype lists: no declaration-site wildcards.
    pub const SUPER_TYPE: TypeMappingMode = TypeMappingMode {
        flags: ModeFlags::NEED_PRIMITIVE_BOXING.union(ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS),
        position: MappingPosition::SuperType,
        covariant: ArgumentMode::GenericArgument,
        contravariant: ArgumentMode::GenericArgument,
        invariant: ArgumentMode::GenericArgument,
    };

    /// Annotation parameter values.
    pub const VALUE_FOR_ANNOTATION: TypeMappingMode = TypeMappingMode {
        flags: ModeFlags::NEED_PRIMITIVE_BOXING.union(ModeFlags::FOR_ANNOTATION_PARAMETER),
        position: MappingPosition::AnnotationValue,
        covariant: ArgumentMode::AnnotationArgument,
        contravariant: ArgumentMode::AnnotationArgument,
        invariant: ArgumentMode::AnnotationArgument,
    };

    const ANNOTATION_ARGUMENT: TypeMappingMode = TypeMappingMode {
        flags: ModeFlags::NEED_PRIMITIVE_BOXING.union(ModeFlags::FOR_ANNOTATION_PARAMETER),
        position: MappingPosition::GenericArgument,
        covariant: ArgumentMode::GenericArgument,
        contravariant: ArgumentMode::GenericArgument,
        invariant: ArgumentMode::GenericArgument,
    };

    /// Mode of a return type or `val` field when generics are written.
    pub fn optimal_for_return(ty: &SemType, is_annotation_method: bool) -> Self {
        if ty.arguments.is_empty() {
            return Self::DEFAULT;
        }
        Self::return_mode(is_annotation_method)
    }

    /// Mode of a value parameter or `var` field when generics are written.
    pub fn optimal_for_value_parameter(ty: &SemType) -> Self {
        if ty.arguments.is_empty() {
            return Self::DEFAULT;
        }
        TypeMappingMode {
            flags: ModeFlags::NEED_PRIMITIVE_BOXING | ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS_IF_POSSIBLE,
            position: MappingPosition::ValueParameter,
            covariant: ArgumentMode::Same,
            contravariant: ArgumentMode::Same,
            invariant: ArgumentMode::Return { annotation: false },
        }
    }

    /// Mode of a return type when no generic signature is written.
    pub fn return_without_generics(is_annotation_method: bool) -> Self {
        if is_annotation_method {
            Self::VALUE_FOR_ANNOTATION
        } else {
            Self::DEFAULT
        }
    }

    fn return_mode(annotation: bool) -> Self {
        let mut flags = ModeFlags::NEED_PRIMITIVE_BOXING
            | ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS
            | ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS_IF_POSSIBLE;
        flags.set(ModeFlags::FOR_ANNOTATION_PARAMETER, annotation);
        TypeMappingMode {
            flags,
            position: MappingPosition::ReturnType,
            covariant: ArgumentMode::Same,
            contravariant: ArgumentMode::ElideIfPossible { annotation },
            invariant: ArgumentMode::Same,
        }
    }

    fn elide_if_possible(annotation: bool) -> Self {
        let mut flags = ModeFlags::NEED_PRIMITIVE_BOXING | ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS_IF_POSSIBLE;
        flags.set(ModeFlags::FOR_ANNOTATION_PARAMETER, annotation);
        TypeMappingMode {
            flags,
            position: MappingPosition::GenericArgument,
            covariant: ArgumentMode::Same,
            contravariant: ArgumentMode::Same,
            invariant: ArgumentMode::Same,
        }
    }

    /// Mode for a type argument whose effective variance is `variance`.
    pub fn to_generic_argument_mode(self, variance: Variance) -> Self {
        let selector = if self.is_for_annotation_parameter() {
            self.covariant
        } else {
            match variance {
                Variance::In => self.contravariant,
                Variance::Invariant => self.invariant,
                Variance::Out => self.covariant,
            }
        };
        match selector {
            ArgumentMode::Same => self,
            ArgumentMode::GenericArgument => Self::GENERIC_ARGUMENT,
            ArgumentMode::AnnotationArgument => Self::ANNOTATION_ARGUMENT,
            ArgumentMode::Return { annotation } => Self::return_mode(annotation),
            ArgumentMode::ElideIfPossible { annotation } => Self::elide_if_possible(annotation),
        }
    }

    // === Query Methods ===

    pub fn flags(self) -> ModeFlags {
        self.flags
    }

    pub fn position(self) -> MappingPosition {
        self.position
    }

    pub fn needs_primitive_boxing(self) -> bool {
        self.flags.contains(ModeFlags::NEED_PRIMITIVE_BOXING)
    }

    pub fn is_for_annotation_parameter(self) -> bool {
        self.flags.contains(ModeFlags::FOR_ANNOTATION_PARAMETER)
    }

    pub fn skip_declaration_site_wildcards(self) -> bool {
        self.flags.contains(ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS)
    }

    pub fn skip_declaration_site_wildcards_if_possible(self) -> bool {
        self.flags.contains(ModeFlags::SKIP_DECLARATION_SITE_WILDCARDS_IF_POSSIBLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erasure_core::{DeclId, Projection};

    fn generic_type() -> SemType {
        SemType::generic(
            DeclId::from_class("kotlin.collections.List"),
            vec![Projection::invariant(SemType::class(DeclId::from_class("kotlin.String")))],
        )
    }

    #[test]
    fn default_boxes_arguments() {
        assert!(!TypeMappingMode::DEFAULT.needs_primitive_boxing());
        let argument = TypeMappingMode::DEFAULT.to_generic_argument_mode(Variance::Invariant);
        assert_eq!(argument, TypeMappingMode::GENERIC_ARGUMENT);
        assert!(argument.needs_primitive_boxing());
    }

    #[test]
    fn generic_argument_is_a_fixed_point() {
        for variance in [Variance::In, Variance::Out, Variance::Invariant] {
            assert_eq!(
                TypeMappingMode::GENERIC_ARGUMENT.to_generic_argument_mode(variance),
                TypeMappingMode::GENERIC_ARGUMENT
            );
        }
    }

    #[test]
    fn types_without_arguments_use_default() {
        let plain = SemType::class(DeclId::from_class("kotlin.String"));
        assert_eq!(TypeMappingMode::optimal_for_return(&plain, false), TypeMappingMode::DEFAULT);
        assert_eq!(TypeMappingMode::optimal_for_value_parameter(&plain), TypeMappingMode::DEFAULT);
    }

    #[test]
    fn return_mode_skips_wildcards_except_below_contravariance() {
        let mode = TypeMappingMode::optimal_for_return(&generic_type(), false);
        assert!(mode.skip_declaration_site_wildcards());
        assert_eq!(mode.position(), MappingPosition::ReturnType);
        assert!(mode.to_generic_argument_mode(Variance::Out).skip_declaration_site_wildcards());
        let contra = mode.to_generic_argument_mode(Variance::In);
        assert!(!contra.skip_declaration_site_wildcards());
        assert!(contra.skip_declaration_site_wildcards_if_possible());
    }

    #[test]
    fn value_parameter_invariant_arguments_use_return_rules() {
        let mode = TypeMappingMode::optimal_for_value_parameter(&generic_type());
        assert!(!mode.skip_declaration_site_wildcards());
        assert!(mode.skip_declaration_site_wildcards_if_possible());
        assert_eq!(mode.to_generic_argument_mode(Variance::Out), mode);
        assert!(mode.to_generic_argument_mode(Variance::Invariant).skip_declaration_site_wildcards());
    }

    #[test]
    fn annotation_modes_ignore_variance() {
        let mode = TypeMappingMode::VALUE_FOR_ANNOTATION;
        assert_eq!(
            mode.to_generic_argument_mode(Variance::In),
            mode.to_generic_argument_mode(Variance::Out)
        );
        assert!(mode.to_generic_argument_mode(Variance::In).is_for_annotation_parameter());
    }
}
