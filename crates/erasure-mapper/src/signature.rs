//! Method and field signatures.
//!
//! A method signature is written in one pass through a [`SignatureWriter`]:
//! formal type parameters, synthetic leading parameters, declared value
//! parameters and the return type. The outer instance and the enum name and
//! ordinal appear in the descriptor only.

use rustc_hash::FxHashSet;
use tracing::debug;

use erasure_core::{
    BinaryType, Builtin, CONSTRUCTOR_NAME, CallArgument, CallableData, CaptureStorage, CapturedVariable, ClassKind,
    DELEGATED_FIELD_SUFFIX, DEFAULT_METHOD_SUFFIX, DeclFlags, DeclId, Declaration, DeclarationKind, DelegatingCall,
    MappingError, Method, Origin, PrimitiveKind, SemType, TypeConstructor, ValueParameter, internal_names,
};

use crate::dispatch::is_static_member;
use crate::special::SpecialSignatureTable;
use crate::{CapturedOffset, Result, MethodSignature, ParameterKind, SignatureWriter, TypeMapper, TypeMappingMode};

const MASK_BITS: usize = 32;
const MUTABLE_COLLECTION_REMOVE: &str = "kotlin.collections.MutableCollection.remove";

/// Which class a signature is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    /// The declaring class itself.
    Implementation,
    /// The `$DefaultImpls` container of an interface; the receiver becomes
    /// the first parameter.
    DefaultBodiesContainer,
    /// The facade of top-level members.
    PackageFacade,
}

impl<'a> TypeMapper<'a> {
    /// Signature of `member` as generated into a class of `kind`.
    pub fn map_signature(&self, member: DeclId, kind: OwnerKind, skip_generic: bool) -> Result<MethodSignature> {
        self.signature_with(self.decl(member)?, kind, None, skip_generic)
    }

    /// Signature of `member` with `value_parameters` in place of the declared ones.
    pub fn map_signature_with_parameters(
        &self,
        member: DeclId,
        kind: OwnerKind,
        value_parameters: &[ValueParameter],
        skip_generic: bool,
    ) -> Result<MethodSignature> {
        self.signature_with(self.decl(member)?, kind, Some(value_parameters), skip_generic)
    }

    pub fn map_signature_skip_generic(&self, member: DeclId, kind: OwnerKind) -> Result<MethodSignature> {
        self.map_signature(member, kind, true)
    }

    pub fn map_signature_with_generic(&self, member: DeclId, kind: OwnerKind) -> Result<MethodSignature> {
        self.map_signature(member, kind, false)
    }

    /// Erased method of `member` in its own class.
    pub fn map_asm_method(&self, member: DeclId) -> Result<Method> {
        Ok(self.map_signature_skip_generic(member, OwnerKind::Implementation)?.method)
    }

    pub(crate) fn signature_of(&self, decl: &Declaration, kind: OwnerKind, skip_generic: bool) -> Result<MethodSignature> {
        self.signature_with(decl, kind, None, skip_generic)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn signature_with(
        &self,
        decl: &Declaration,
        kind: OwnerKind,
        value_parameters: Option<&[ValueParameter]>,
        skip_generic: bool,
    ) -> Result<MethodSignature> {
        let callable = decl.as_callable().ok_or_else(|| MappingError::UnsupportedOwner {
            member: self.display_name(decl),
            owner_kind: decl.kind.label(),
        })?;
        self.check_owner_compatibility(decl);

        let mut sw = if skip_generic || decl.is_synthetic_accessor() {
            SignatureWriter::descriptor_only()
        } else {
            SignatureWriter::new()
        };
        let parameters = value_parameters.unwrap_or(&callable.value_parameters);

        let captured_offsets = if decl.is_constructor() {
            self.write_constructor_signature(decl, callable, parameters, &mut sw)?
        } else {
            self.write_method_signature(decl, callable, parameters, kind, &mut sw)?;
            Vec::new()
        };

        let mut signature = sw.into_method_signature(self.function_name(decl)?);
        signature.captured_offsets = captured_offsets;
        if kind != OwnerKind::DefaultBodiesContainer {
            self.apply_special_generic_signature(decl, &mut signature)?;
        }
        Ok(signature)
    }

    fn write_method_signature(
        &self,
        decl: &Declaration,
        callable: &CallableData,
        parameters: &[ValueParameter],
        kind: OwnerKind,
        sw: &mut SignatureWriter,
    ) -> Result<()> {
        let this_type = if kind == OwnerKind::DefaultBodiesContainer {
            let (interface_decl, interface) = self.containing_class(decl).ok_or_else(|| MappingError::UnsupportedOwner {
                member: self.display_name(decl),
                owner_kind: "package",
            })?;
            let mut formals = interface.type_parameters.clone();
            formals.extend_from_slice(&callable.type_parameters);
            self.write_formal_type_parameters(&formals, sw)?;
            Some(self.default_type(interface_decl.id)?)
        } else {
            self.write_formal_type_parameters(&callable.type_parameters, sw)?;
            match self.containing_class(decl) {
                Some((class_decl, _)) if self.accessor_callee_with_receiver(decl)? => {
                    Some(self.default_type(class_decl.id)?)
                }
                _ => None,
            }
        };

        sw.write_parameters_start();
        if let Some(this_type) = this_type {
            self.write_parameter_of_type(ParameterKind::This, &this_type, sw)?;
        }
        if let Some(receiver) = &callable.extension_receiver {
            self.write_parameter_of_type(ParameterKind::Receiver, receiver, sw)?;
        }
        let force_boxing = self.force_single_value_parameter_boxing(decl)?;
        for parameter in parameters {
            if force_boxing {
                self.write_parameter_of_type(ParameterKind::Value, &parameter.ty.clone().nullable(), sw)?;
            } else {
                self.write_parameter_of_type(ParameterKind::Value, &parameter.ty, sw)?;
            }
        }

        sw.write_return_type();
        let return_type = self.map_return_type(decl, callable, sw)?;
        sw.write_return_type_end(return_type);
        Ok(())
    }

    /// A synthetic accessor whose callee is an instance member.
    fn accessor_callee_with_receiver(&self, decl: &Declaration) -> Result<bool> {
        let Some(callee) = decl.accessor_for.filter(|_| decl.is_synthetic_accessor()) else {
            return Ok(false);
        };
        let callee = self.decl(callee)?;
        Ok(self.containing_class(callee).is_some()
            && !callee.is_constructor()
            && !callee.has_flag(DeclFlags::STATIC)
            && !callee.has_flag(DeclFlags::JVM_STATIC))
    }

    fn write_constructor_signature(
        &self,
        decl: &Declaration,
        callable: &CallableData,
        parameters: &[ValueParameter],
        sw: &mut SignatureWriter,
    ) -> Result<Vec<CapturedOffset>> {
        let (class_decl, class) = self.containing_class(decl).ok_or_else(|| MappingError::UnsupportedOwner {
            member: self.display_name(decl),
            owner_kind: "package",
        })?;
        self.write_formal_type_parameters(&callable.type_parameters, sw)?;
        sw.write_parameters_start();

        let closure = self.bindings.closure(class_decl.id);
        let outer = match closure.and_then(|c| c.outer_instance) {
            Some(outer) => Some(outer),
            None if class_decl.has_flag(DeclFlags::INNER) => self.containing_class(class_decl).map(|(outer, _)| outer.id),
            None => None,
        };
        if let Some(outer) = outer {
            sw.write_parameter(ParameterKind::Outer, self.map_class(outer)?);
        }
        if let Some(receiver) = closure.and_then(|c| c.captured_receiver.as_ref()) {
            let receiver = self.map_type(receiver, TypeMappingMode::DEFAULT, None)?;
            sw.write_parameter(ParameterKind::Receiver, receiver);
        }
        if class.kind.is_enum() {
            sw.write_parameter(ParameterKind::EnumNameOrOrdinal, BinaryType::object(internal_names::STRING));
            sw.write_parameter(ParameterKind::EnumNameOrOrdinal, BinaryType::Primitive(PrimitiveKind::Int));
        }

        let mut captured_offsets = Vec::new();
        for captured in closure.map(|c| c.captured.as_slice()).unwrap_or_default() {
            let binary_type = match captured.storage {
                CaptureStorage::Delegated => continue,
                CaptureStorage::SharedCell => self.shared_var_type(captured).unwrap_or_else(object_ref),
                CaptureStorage::Value => {
                    let ty = captured.ty.as_ref().ok_or_else(|| MappingError::MissingBinding {
                        what: "captured variable type",
                        declaration: self.display_name(class_decl),
                    })?;
                    self.map_type(ty, TypeMappingMode::DEFAULT, None)?
                }
                CaptureStorage::LocalFunction => self.anonymous_class_type(self.decl(captured.variable)?)?,
            };
            captured_offsets.push(CapturedOffset {
                variable: captured.variable,
                slot: sw.current_signature_size() + 1,
            });
            sw.write_parameter(ParameterKind::CapturedLocalVariable, binary_type);
        }

        if self.config.mode.generate_bodies() {
            if let Some(super_call) = self.first_delegating_super_call(decl, class_decl.id)? {
                self.write_super_call_parameters(super_call, class_decl, outer.is_some(), sw)?;
            }
        }

        for parameter in parameters {
            self.write_parameter_of_type(ParameterKind::Value, &parameter.ty, sw)?;
        }
        if decl.is_synthetic_accessor() {
            sw.write_parameter(
                ParameterKind::ConstructorMarker,
                BinaryType::object(internal_names::DEFAULT_CONSTRUCTOR_MARKER),
            );
        }
        sw.write_void_return();
        Ok(captured_offsets)
    }

    /// First `super(...)` call reached through the constructor's `this(...)` chain.
    fn first_delegating_super_call(&self, constructor: &Declaration, class: DeclId) -> Result<Option<&'a DelegatingCall>> {
        let mut current = constructor.id;
        let mut visited = FxHashSet::default();
        while let Some(call) = self.bindings.delegating_call(current) {
            if self.decl(call.target)?.parent != Some(class) {
                return Ok(Some(call));
            }
            if !visited.insert(current) {
                break;
            }
            current = call.target;
        }
        Ok(None)
    }

    /// Leading synthetic parameters of the super constructor not covered by
    /// this class, plus the explicit super arguments of anonymous objects.
    fn write_super_call_parameters(
        &self,
        super_call: &DelegatingCall,
        class_decl: &Declaration,
        has_outer: bool,
        sw: &mut SignatureWriter,
    ) -> Result<()> {
        let target = self.decl(super_call.target)?;
        let declared = target.as_callable().map_or(0, |callable| callable.value_parameters.len());
        let super_signature = self.signature_of(target, OwnerKind::Implementation, true)?;
        let leading = super_signature.value_parameters.len().saturating_sub(declared);

        for parameter in &super_signature.value_parameters[..leading] {
            match parameter.kind {
                ParameterKind::EnumNameOrOrdinal => continue,
                ParameterKind::Outer if has_outer => continue,
                _ => sw.write_parameter(ParameterKind::SuperCallParam, parameter.binary_type.clone()),
            }
        }

        if class_decl.has_flag(DeclFlags::ANONYMOUS) {
            for (index, argument) in super_call.arguments.iter().enumerate() {
                if *argument == CallArgument::Default {
                    continue;
                }
                if let Some(parameter) = super_signature.value_parameters.get(leading + index) {
                    sw.write_parameter(ParameterKind::SuperCallParam, parameter.binary_type.clone());
                }
            }
        }
        Ok(())
    }

    fn write_parameter_of_type(&self, kind: ParameterKind, ty: &SemType, sw: &mut SignatureWriter) -> Result<()> {
        let mode = if sw.skips_generic_signature() {
            TypeMappingMode::DEFAULT
        } else {
            TypeMappingMode::optimal_for_value_parameter(ty)
        };
        sw.write_parameter_type(kind);
        let binary_type = self.map_type(ty, mode, Some(sw))?;
        sw.write_parameter_type_end(binary_type);
        Ok(())
    }

    fn map_return_type(&self, decl: &Declaration, callable: &CallableData, sw: &mut SignatureWriter) -> Result<BinaryType> {
        let Some(return_type) = callable.return_type.as_ref() else {
            sw.write_asm_type(&BinaryType::Void);
            return Ok(BinaryType::Void);
        };
        let is_getter = matches!(decl.kind, DeclarationKind::Getter(_));
        if !return_type.nullable && self.is_builtin(return_type, Builtin::Unit) && !is_getter {
            sw.write_asm_type(&BinaryType::Void);
            return Ok(BinaryType::Void);
        }
        if self.force_boxed_return_type(decl)? {
            return self.map_type(return_type, TypeMappingMode::GENERIC_ARGUMENT, Some(sw));
        }
        let is_annotation_method = self
            .containing_class(decl)
            .is_some_and(|(_, class)| class.kind == ClassKind::AnnotationClass);
        let mode = if sw.skips_generic_signature() {
            TypeMappingMode::return_without_generics(is_annotation_method)
        } else {
            TypeMappingMode::optimal_for_return(return_type, is_annotation_method)
        };
        self.map_type(return_type, mode, Some(sw))
    }

    /// `remove(Int)` overriding `MutableCollection.remove` takes a boxed
    /// element so it does not clash with `remove(int)` by index.
    fn force_single_value_parameter_boxing(&self, decl: &Declaration) -> Result<bool> {
        let Some(callable) = decl.as_callable() else {
            return Ok(false);
        };
        if decl.name != "remove" || callable.value_parameters.len() != 1 || !callable.type_parameters.is_empty() {
            return Ok(false);
        }
        if !self.is_primitive_type(&callable.value_parameters[0].ty) {
            return Ok(false);
        }
        Ok(self
            .all_overridden(decl)?
            .into_iter()
            .any(|overridden| self.display_name(overridden) == MUTABLE_COLLECTION_REMOVE))
    }

    /// Writes `<T:Bound;...>`; no-op when generics are skipped.
    fn write_formal_type_parameters(&self, parameters: &[DeclId], sw: &mut SignatureWriter) -> Result<()> {
        if sw.skips_generic_signature() {
            return Ok(());
        }
        for &id in parameters {
            let decl = self.decl(id)?;
            let parameter = decl.as_type_parameter().ok_or_else(|| MappingError::UnknownClassifier {
                name: self.display_name(decl),
            })?;
            if !self.config.mode.generate_bodies() && decl.has_flag(DeclFlags::SPECIAL_NAME) {
                continue;
            }
            sw.write_formal_type_parameter(&decl.name);

            let class_bound = parameter
                .upper_bounds
                .iter()
                .find(|bound| bound.class_id().is_some() && !self.is_jvm_interface_type(bound));
            sw.write_class_bound();
            if let Some(bound) = class_bound {
                self.map_type(bound, TypeMappingMode::GENERIC_ARGUMENT, Some(sw))?;
            }
            sw.write_class_bound_end();

            for bound in &parameter.upper_bounds {
                match &bound.constructor {
                    TypeConstructor::Class(_) if !self.is_jvm_interface_type(bound) => {}
                    TypeConstructor::Class(_) | TypeConstructor::TypeParameter(_) => {
                        sw.write_interface_bound();
                        self.map_type(bound, TypeMappingMode::GENERIC_ARGUMENT, Some(sw))?;
                        sw.write_interface_bound_end();
                    }
                    TypeConstructor::Error(error) => {
                        return Err(MappingError::UnknownClassifier {
                            name: error.text.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Rewrite parameters of members overriding a builtin with a fixed
    /// generic signature. The descriptor is left alone.
    fn apply_special_generic_signature(&self, decl: &Declaration, signature: &mut MethodSignature) -> Result<()> {
        let Some(generic) = signature.generic_signature.as_deref() else {
            return Ok(());
        };
        let table = SpecialSignatureTable::CURRENT;
        let mut candidates = vec![self.special_member_key(decl)?];
        for overridden in self.all_overridden(decl)? {
            candidates.push(self.special_member_key(overridden)?);
        }
        if let Some(key) = candidates.iter().find(|key| table.contains(key)) {
            if let Some(rewritten) = table.apply(key, generic) {
                signature.generic_signature = Some(rewritten);
            }
        }
        Ok(())
    }

    /// Record members loaded from binaries of an incompatible version.
    fn check_owner_compatibility(&self, decl: &Declaration) {
        if decl.origin != Origin::Binary {
            return;
        }
        let Some(container) = self.parent(decl) else {
            return;
        };
        let Some(version) = self.bindings.binary_version(container.id) else {
            return;
        };
        if version.is_compatible() {
            return;
        }
        let name = self
            .owner_of(decl, false)
            .map(|owner| owner.internal_name())
            .unwrap_or_else(|_| self.display_name(container));
        debug!(container = %name, %version, member = %decl.name, "incompatible binary version");
        self.tracker.record(&name, version);
    }

    // ==========================================================================
    // Default-argument stubs
    // ==========================================================================

    /// The `$default` stub of `member`: declared parameters, one `int` mask
    /// per 32 of them and a trailing marker.
    pub fn map_default_method(&self, member: DeclId, kind: OwnerKind) -> Result<Method> {
        self.default_method_of(self.decl(member)?, kind)
    }

    pub(crate) fn default_method_of(&self, decl: &Declaration, kind: OwnerKind) -> Result<Method> {
        let method = self.signature_of(decl, kind, true)?.method;
        let declared = decl.as_callable().map_or(0, |callable| callable.value_parameters.len());
        let is_constructor = decl.is_constructor();
        let is_static =
            matches!(kind, OwnerKind::PackageFacade | OwnerKind::DefaultBodiesContainer) || is_static_member(decl);

        let mut arguments = Vec::with_capacity(method.arguments.len() + 3);
        if !is_static && !is_constructor {
            arguments.push(self.owner_of(decl, true)?);
        }
        arguments.extend(method.arguments);
        arguments.extend(std::iter::repeat_n(
            BinaryType::Primitive(PrimitiveKind::Int),
            declared.div_ceil(MASK_BITS),
        ));
        arguments.push(BinaryType::object(if is_constructor {
            internal_names::DEFAULT_CONSTRUCTOR_MARKER
        } else {
            internal_names::OBJECT
        }));

        let name = if is_constructor {
            CONSTRUCTOR_NAME.to_string()
        } else {
            format!("{}{DEFAULT_METHOD_SUFFIX}", method.name)
        };
        Ok(Method::new(name, arguments, method.return_type))
    }

    // ==========================================================================
    // Fields
    // ==========================================================================

    /// Generic signature of a property's backing field, if it needs one.
    pub fn map_field_signature(&self, ty: &SemType, property: DeclId) -> Result<Option<String>> {
        let decl = self.decl(property)?;
        let is_var = decl.as_property().is_some_and(|p| p.is_var);
        let mode = if is_var {
            TypeMappingMode::optimal_for_value_parameter(ty)
        } else {
            TypeMappingMode::optimal_for_return(ty, false)
        };
        let mut sw = SignatureWriter::new();
        self.map_type(ty, mode, Some(&mut sw))?;
        Ok(sw.generic_signature())
    }

    /// Backing field name; delegated properties store their delegate.
    pub fn map_default_field_name(&self, property: DeclId, delegated: bool) -> Result<String> {
        let decl = self.decl(property)?;
        let name = match decl.accessor_for {
            Some(callee) if decl.is_synthetic_accessor() => self.decl(callee)?.name.as_str(),
            _ => decl.name.as_str(),
        };
        Ok(if delegated {
            format!("{name}{DELEGATED_FIELD_SUFFIX}")
        } else {
            name.to_string()
        })
    }

    /// Signature of the method backing an annotation class property.
    pub fn map_annotation_parameter_signature(&self, property: DeclId) -> Result<MethodSignature> {
        let decl = self.decl(property)?;
        let ty = decl
            .as_property()
            .map(|p| &p.ty)
            .ok_or_else(|| MappingError::UnsupportedOwner {
                member: self.display_name(decl),
                owner_kind: decl.kind.label(),
            })?;
        let mut sw = SignatureWriter::new();
        sw.write_parameters_start();
        sw.write_return_type();
        let return_type = self.map_type(ty, TypeMappingMode::VALUE_FOR_ANNOTATION, Some(&mut sw))?;
        sw.write_return_type_end(return_type);
        Ok(sw.into_method_signature(decl.name.clone()))
    }

    /// Cell class of a captured local that is reassigned after capture.
    pub fn shared_var_type(&self, captured: &CapturedVariable) -> Option<BinaryType> {
        if captured.storage != CaptureStorage::SharedCell {
            return None;
        }
        let cell = match captured.ty.as_ref().and_then(|ty| self.builtin_of(ty).filter(|_| !ty.nullable)) {
            Some(Builtin::Primitive(kind)) => kind.ref_cell_internal_name(),
            _ => internal_names::OBJECT_REF,
        };
        Some(BinaryType::object(cell))
    }
}

fn object_ref() -> BinaryType {
    BinaryType::object(internal_names::OBJECT_REF)
}
