//! Semantic types to binary types.
//!
//! [`TypeMapper::map_type`] erases a [`SemType`] to the [`BinaryType`] used in
//! descriptors and, when a [`SignatureWriter`] is given, writes the generic
//! form of the same type. The generic form follows a few fixed rules:
//!
//! - type parameters erase to their representative upper bound and are
//!   written as type variables
//! - an argument list holding `Nothing` in a non-contravariant position is
//!   dropped entirely, so `Map<Nothing, Foo>` is written as the raw `Map`
//! - declaration-site variance becomes a wildcard unless the mode suppresses
//!   it or the argument is already the most precise choice
//! - inner classes are written outermost segment first, each segment with
//!   its own arguments

use tracing::{trace, warn};

use erasure_core::{
    BinaryType, Builtin, DeclFlags, DeclId, Declaration, ErrorType, MappingError, Projection, SemType,
    TypeConstructor, TypeParameterDecl, Variance, effective_variance, internal_names,
};

use crate::{Result, SignatureWriter, TypeMapper, TypeMappingMode};

impl TypeMapper<'_> {
    /// Erase `ty` in `mode`, writing its generic form to `sw` if given.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn map_type(&self, ty: &SemType, mode: TypeMappingMode, sw: Option<&mut SignatureWriter>) -> Result<BinaryType> {
        match &ty.constructor {
            TypeConstructor::Error(error) => self.map_error_type(error, sw),
            TypeConstructor::TypeParameter(id) => {
                let decl = self.decl(*id)?;
                let erased = self.erase_type_parameter(decl)?;
                if let Some(sw) = sw {
                    sw.write_type_variable(&decl.name);
                }
                Ok(erased)
            }
            TypeConstructor::Class(id) => self.map_class_type(ty, *id, mode, sw),
        }
    }

    /// Binary type of a class.
    pub fn map_class(&self, class: DeclId) -> Result<BinaryType> {
        let ty = self.default_type(class)?;
        self.map_type(&ty, TypeMappingMode::DEFAULT, None)
    }

    /// Map a supertype; declaration-site variance is not turned into wildcards.
    pub fn map_supertype(&self, ty: &SemType, sw: Option<&mut SignatureWriter>) -> Result<BinaryType> {
        self.map_type(ty, TypeMappingMode::SUPER_TYPE, sw)
    }

    /// Map a type argument; primitives are boxed.
    pub fn map_type_argument(&self, ty: &SemType, sw: Option<&mut SignatureWriter>) -> Result<BinaryType> {
        self.map_type(ty, TypeMappingMode::GENERIC_ARGUMENT, sw)
    }

    /// Container of the method bodies of an interface.
    pub fn map_default_impls(&self, interface: DeclId) -> Result<BinaryType> {
        let name = self.internal_name(interface)?;
        Ok(BinaryType::object(format!("{name}{}", erasure_core::DEFAULT_IMPLS_SUFFIX)))
    }

    /// Internal name of a class.
    ///
    /// Taken from the predefined binary type if the binding context has one,
    /// from the recorded anonymous class type for local classes, and built
    /// from the package path and enclosing class names otherwise.
    pub fn internal_name(&self, class: DeclId) -> Result<String> {
        if let Some(name) = self.cached_class_name(class) {
            return Ok(name);
        }
        if let Some(predefined) = self.bindings.predefined_type(class) {
            return Ok(predefined.internal_name());
        }
        let decl = self.decl(class)?;
        let name = match self.parent(decl) {
            _ if decl.has_flag(DeclFlags::LOCAL) || decl.has_flag(DeclFlags::ANONYMOUS) => {
                self.anonymous_class_type(decl)?.internal_name()
            }
            Some(parent) if parent.as_class().is_some() => {
                format!("{}${}", self.internal_name(parent.id)?, decl.name)
            }
            Some(parent) => match parent.as_package() {
                Some(package) if package.fq_name.is_empty() => decl.name.clone(),
                Some(package) => format!("{}/{}", package.internal_prefix(), decl.name),
                None => self.anonymous_class_type(decl)?.internal_name(),
            },
            None => decl.name.clone(),
        };
        self.cache_class_name(class, &name);
        Ok(name)
    }

    /// Recorded binary type of a local class, lambda or local function.
    pub(crate) fn anonymous_class_type(&self, decl: &Declaration) -> Result<BinaryType> {
        self.bindings
            .anonymous_class_type(decl.id)
            .cloned()
            .ok_or_else(|| MappingError::MissingBinding {
                what: "anonymous class type",
                declaration: self.display_name(decl),
            })
    }

    fn class_binary_type(&self, class: DeclId) -> Result<BinaryType> {
        if let Some(predefined) = self.bindings.predefined_type(class) {
            return Ok(predefined.clone());
        }
        self.internal_name(class).map(BinaryType::object)
    }

    fn map_class_type(
        &self,
        ty: &SemType,
        class_id: DeclId,
        mode: TypeMappingMode,
        sw: Option<&mut SignatureWriter>,
    ) -> Result<BinaryType> {
        let decl = self.decl(class_id)?;
        let class = decl.as_class().ok_or_else(|| MappingError::UnknownClassifier {
            name: self.display_name(decl),
        })?;

        let fixed = match class.builtin {
            Some(Builtin::Primitive(kind)) => Some(if ty.nullable || mode.needs_primitive_boxing() {
                BinaryType::object(kind.wrapper_internal_name())
            } else {
                BinaryType::Primitive(kind)
            }),
            Some(Builtin::PrimitiveArray(kind)) => Some(BinaryType::array_of(BinaryType::Primitive(kind))),
            Some(Builtin::Nothing) => Some(BinaryType::object(internal_names::VOID_WRAPPER)),
            Some(Builtin::Array) => return self.map_array_type(ty, mode, sw),
            _ => None,
        };
        if let Some(binary) = fixed {
            if let Some(sw) = sw {
                sw.write_asm_type(&binary);
            }
            return Ok(binary);
        }

        let binary = self.class_binary_type(class_id)?;
        if let Some(sw) = sw {
            self.write_generic_type(ty, decl, &binary, mode, sw)?;
        }
        Ok(binary)
    }

    fn map_array_type(&self, ty: &SemType, mode: TypeMappingMode, mut sw: Option<&mut SignatureWriter>) -> Result<BinaryType> {
        let [argument] = ty.arguments.as_slice() else {
            return Err(MappingError::ArityMismatch {
                type_name: "Array".to_string(),
                expected: 1,
                found: ty.arguments.len(),
            });
        };

        let element_type = match argument.ty() {
            Some(element) if argument.variance != Variance::In => element,
            _ => {
                let element = BinaryType::object(internal_names::OBJECT);
                if let Some(sw) = sw {
                    sw.write_array_type();
                    sw.write_asm_type(&element);
                    sw.write_array_end();
                }
                return Ok(BinaryType::array_of(element));
            }
        };

        if let Some(sw) = sw.as_deref_mut() {
            sw.write_array_type();
        }
        let element = self.map_type(element_type, mode.to_generic_argument_mode(argument.variance), sw.as_deref_mut())?;
        if let Some(sw) = sw {
            sw.write_array_end();
        }
        Ok(BinaryType::array_of(element))
    }

    fn map_error_type(&self, error: &ErrorType, sw: Option<&mut SignatureWriter>) -> Result<BinaryType> {
        if self.config.mode.generate_bodies() {
            return Err(self.unresolved_type_error(error));
        }
        warn!(text = %error.text, "unresolved type mapped to placeholder class");
        let binary = BinaryType::object(internal_names::NON_EXISTENT_CLASS);
        if let Some(sw) = sw {
            sw.write_asm_type(&binary);
        }
        Ok(binary)
    }

    fn unresolved_type_error(&self, error: &ErrorType) -> MappingError {
        let origin = error.origin.and_then(|id| self.graph.declaration(id));
        let parent = origin.and_then(|decl| self.parent(decl));
        MappingError::UnresolvedType {
            text: error.text.clone(),
            declaration: origin.map_or_else(|| "<unknown>".to_string(), |decl| self.display_name(decl)),
            declaration_source: origin.and_then(|decl| decl.source.clone()),
            parent: parent.map(|decl| self.display_name(decl)),
            parent_source: parent.and_then(|decl| decl.source.clone()),
        }
    }

    // ==========================================================================
    // Type parameters
    // ==========================================================================

    fn erase_type_parameter(&self, decl: &Declaration) -> Result<BinaryType> {
        let parameter = decl.as_type_parameter().ok_or_else(|| MappingError::UnknownClassifier {
            name: self.display_name(decl),
        })?;
        match self.representative_upper_bound(parameter) {
            Some(bound) => self.map_type(bound, TypeMappingMode::GENERIC_ARGUMENT, None),
            None => Ok(BinaryType::object(internal_names::OBJECT)),
        }
    }

    /// First bound that is a class and not an interface, else the first bound.
    pub(crate) fn representative_upper_bound<'t>(&self, parameter: &'t TypeParameterDecl) -> Option<&'t SemType> {
        parameter
            .upper_bounds
            .iter()
            .find(|bound| bound.class_id().is_some() && !self.is_jvm_interface_type(bound))
            .or_else(|| parameter.upper_bounds.first())
    }

    // ==========================================================================
    // Generic signatures
    // ==========================================================================

    fn write_generic_type(
        &self,
        ty: &SemType,
        decl: &Declaration,
        binary: &BinaryType,
        mode: TypeMappingMode,
        sw: &mut SignatureWriter,
    ) -> Result<()> {
        if sw.skips_generic_signature() || ty.arguments.is_empty() {
            sw.write_asm_type(binary);
            return Ok(());
        }

        let parameters = self.flattened_type_parameters(decl.id)?;
        if parameters.len() != ty.arguments.len() {
            return Err(MappingError::ArityMismatch {
                type_name: self.display_name(decl),
                expected: parameters.len(),
                found: ty.arguments.len(),
            });
        }
        if self.has_nothing_in_non_contravariant_position(ty, &parameters) {
            trace!(class = %decl.name, "Nothing argument, writing raw type");
            sw.write_asm_type(binary);
            return Ok(());
        }

        // Segments innermost first, each with its slice of the arguments.
        let mut segments: Vec<(&Declaration, usize, usize)> = Vec::new();
        let mut current = decl;
        let mut offset = 0;
        loop {
            let count = current.as_class().map_or(0, |class| class.type_parameters.len());
            segments.push((current, offset, offset + count));
            offset += count;
            if !current.has_flag(DeclFlags::INNER) {
                break;
            }
            match self.parent(current) {
                Some(parent) if parent.as_class().is_some() => current = parent,
                _ => break,
            }
        }
        segments.reverse();

        let (outermost, start, end) = segments[0];
        if segments.len() == 1 {
            sw.write_class_begin(&binary.internal_name());
        } else {
            sw.write_outer_class_begin(&self.internal_name(outermost.id)?);
        }
        self.write_generic_arguments(sw, &ty.arguments[start..end], &parameters[start..end], mode)?;

        for &(inner, start, end) in &segments[1..] {
            sw.write_inner_class(&inner.name);
            self.write_generic_arguments(sw, &ty.arguments[start..end], &parameters[start..end], mode)?;
        }
        sw.write_class_end();
        Ok(())
    }

    fn write_generic_arguments(
        &self,
        sw: &mut SignatureWriter,
        arguments: &[Projection],
        parameters: &[DeclId],
        mode: TypeMappingMode,
    ) -> Result<()> {
        for (&parameter_id, argument) in parameters.iter().zip(arguments) {
            let parameter = self.type_parameter(parameter_id)?;
            match argument.ty() {
                None => sw.write_unbounded_wildcard(),
                // In<Nothing> accepts nothing, same as In<*>
                Some(ty) if self.is_nothing(ty) && parameter.variance == Variance::In => {
                    sw.write_unbounded_wildcard();
                }
                Some(ty) => {
                    let variance = self.variance_for_wildcard(parameter, argument, mode);
                    sw.write_type_argument(variance);
                    let argument_mode =
                        mode.to_generic_argument_mode(effective_variance(parameter.variance, argument.variance));
                    self.map_type(ty, argument_mode, Some(&mut *sw))?;
                    sw.write_type_argument_end();
                }
            }
        }
        Ok(())
    }

    fn type_parameter(&self, id: DeclId) -> Result<&TypeParameterDecl> {
        let decl = self.decl(id)?;
        decl.as_type_parameter().ok_or_else(|| MappingError::UnknownClassifier {
            name: self.display_name(decl),
        })
    }

    fn has_nothing_in_non_contravariant_position(&self, ty: &SemType, parameters: &[DeclId]) -> bool {
        parameters.iter().zip(&ty.arguments).any(|(&parameter, argument)| {
            let Some(argument) = argument.ty() else {
                return false;
            };
            if self.is_nullable_nothing(argument) {
                return true;
            }
            self.is_nothing(argument)
                && self
                    .graph
                    .declaration(parameter)
                    .and_then(Declaration::as_type_parameter)
                    .is_none_or(|tp| tp.variance != Variance::In)
        })
    }

    /// Wildcard written for `projection` of a parameter in `mode`.
    ///
    /// Rules in order: an invariant parameter keeps the call-site variance; a
    /// mode skipping wildcards writes none; an agreeing or invariant
    /// projection writes the parameter's variance unless the argument is most
    /// precise in elide-if-possible mode; conflicting variance is `out`.
    pub(crate) fn variance_for_wildcard(
        &self,
        parameter: &TypeParameterDecl,
        projection: &Projection,
        mode: TypeMappingMode,
    ) -> Variance {
        let projection_kind = projection.variance;
        let parameter_variance = parameter.variance;

        if parameter_variance == Variance::Invariant {
            return projection_kind;
        }
        if mode.skip_declaration_site_wildcards() {
            return Variance::Invariant;
        }
        if projection_kind == Variance::Invariant || projection_kind == parameter_variance {
            if mode.skip_declaration_site_wildcards_if_possible() {
                if let Some(argument) = projection.ty() {
                    if parameter_variance == Variance::Out && self.is_most_precise_covariant_argument(argument) {
                        return Variance::Invariant;
                    }
                    if parameter_variance == Variance::In
                        && self.is_most_precise_contravariant_argument(argument, parameter)
                    {
                        return Variance::Invariant;
                    }
                }
            }
            return parameter_variance;
        }
        Variance::Out
    }

    /// No proper subtype of `ty` exists.
    pub(crate) fn is_most_precise_covariant_argument(&self, ty: &SemType) -> bool {
        !self.can_have_subtypes(ty)
    }

    /// Every upper bound of `parameter` is a subtype of `ty`.
    pub(crate) fn is_most_precise_contravariant_argument(&self, ty: &SemType, parameter: &TypeParameterDecl) -> bool {
        if parameter.upper_bounds.is_empty() {
            return ty.nullable && self.is_builtin(ty, Builtin::Any);
        }
        parameter.upper_bounds.iter().all(|bound| self.is_subtype(bound, ty))
    }

    fn can_have_subtypes(&self, ty: &SemType) -> bool {
        if ty.nullable {
            return true;
        }
        let TypeConstructor::Class(id) = ty.constructor else {
            return true;
        };
        let Some(class) = self.graph.declaration(id).and_then(Declaration::as_class) else {
            return true;
        };
        if !class.is_final() {
            return true;
        }
        let Ok(parameters) = self.flattened_type_parameters(id) else {
            return true;
        };
        for (&parameter_id, argument) in parameters.iter().zip(&ty.arguments) {
            let Some(argument_type) = argument.ty() else {
                return true;
            };
            let Ok(parameter) = self.type_parameter(parameter_id) else {
                return true;
            };
            let open = match (parameter.variance, argument.variance) {
                (Variance::Invariant, Variance::Invariant) => {
                    self.lower_than_bound(argument_type, parameter) || self.can_have_subtypes(argument_type)
                }
                (Variance::Invariant, Variance::In) | (Variance::Out, Variance::In) => {
                    self.lower_than_bound(argument_type, parameter)
                }
                (Variance::Invariant, Variance::Out) | (Variance::In, Variance::Out) => {
                    self.can_have_subtypes(argument_type)
                }
                (Variance::In, _) => self.lower_than_bound(argument_type, parameter),
                (Variance::Out, _) => self.can_have_subtypes(argument_type),
            };
            if open {
                return true;
            }
        }
        false
    }

    /// `argument` is a proper subtype of one of the bounds of `parameter`.
    fn lower_than_bound(&self, argument: &SemType, parameter: &TypeParameterDecl) -> bool {
        // no declared bound means `Any?`
        if parameter.upper_bounds.is_empty() {
            return !self.is_builtin(argument, Builtin::Any);
        }
        parameter
            .upper_bounds
            .iter()
            .any(|bound| self.is_subtype(argument, bound) && argument.constructor != bound.constructor)
    }
}
