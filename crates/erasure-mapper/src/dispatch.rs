//! Override-chain walks and call targets.
//!
//! A call site names a member; the binary call needs an owner class, a
//! descriptor and an invocation form. Fake overrides have no body, so the
//! walk first finds the declaration that does, preferring class members over
//! interface members. The invocation form then follows from a small set of
//! facts about the call, see [`CallShape`].

use rustc_hash::FxHashSet;
use tracing::debug;

use erasure_core::{BinaryType, Builtin, CallableKind, DeclFlags, DeclId, Declaration, MappingError, Origin};

use crate::signature::OwnerKind;
use crate::special::{self, SpecialSignatureTable};
use crate::{MethodSignature, Result, TypeMapper, TypeMappingMode};

/// Invocation instruction of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeForm {
    Virtual,
    Interface,
    Static,
    Special,
}

impl InvokeForm {
    pub fn opcode(self) -> u8 {
        match self {
            InvokeForm::Virtual => 0xb6,
            InvokeForm::Special => 0xb7,
            InvokeForm::Static => 0xb8,
            InvokeForm::Interface => 0xb9,
        }
    }
}

/// Everything a code generator needs to emit a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableMethod {
    /// Class named by the call instruction.
    pub owner: BinaryType,
    /// Class holding the `$default` stub.
    pub default_impl_owner: BinaryType,
    /// Descriptor of the `$default` stub.
    pub default_impl_descriptor: String,
    pub signature: MethodSignature,
    pub invoke: InvokeForm,
    /// Class of the receiver for members of a class, static ones included.
    pub dispatch_receiver: Option<BinaryType>,
    pub extension_receiver: Option<BinaryType>,
    /// Anonymous class of a local function.
    pub callee_type: Option<BinaryType>,
}

impl CallableMethod {
    pub fn is_static_call(&self) -> bool {
        self.invoke == InvokeForm::Static
    }

    pub fn descriptor(&self) -> String {
        self.signature.descriptor()
    }
}

/// Facts about a call that decide its invocation form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CallShape {
    pub constructor: bool,
    /// Static member, static accessor or member forced static.
    pub static_member: bool,
    pub package_member: bool,
    /// Declared in an interface and called as one.
    pub through_interface: bool,
    /// Interface body reached through `super`, a private member or an accessor.
    pub interface_body: bool,
    /// The declaring interface carries its bodies natively.
    pub native_default_bodies: bool,
    pub private: bool,
    pub super_call: bool,
}

/// Where a call goes, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallRoute {
    Constructor,
    Static,
    /// Special call of the body on the current class.
    InterfaceBodyOnClass,
    /// Static call of the body in the `$DefaultImpls` container.
    InterfaceBodyInDefaultImpls,
    Interface,
    Special,
    Virtual,
}

impl CallShape {
    pub(crate) fn route(self) -> CallRoute {
        if self.constructor {
            CallRoute::Constructor
        } else if self.static_member || self.package_member {
            CallRoute::Static
        } else if self.interface_body {
            if self.native_default_bodies {
                CallRoute::InterfaceBodyOnClass
            } else {
                CallRoute::InterfaceBodyInDefaultImpls
            }
        } else if self.through_interface {
            CallRoute::Interface
        } else if self.private || self.super_call {
            CallRoute::Special
        } else {
            CallRoute::Virtual
        }
    }
}

impl CallRoute {
    pub(crate) fn invoke_form(self) -> InvokeForm {
        match self {
            CallRoute::Constructor | CallRoute::InterfaceBodyOnClass | CallRoute::Special => InvokeForm::Special,
            CallRoute::Static | CallRoute::InterfaceBodyInDefaultImpls => InvokeForm::Static,
            CallRoute::Interface => InvokeForm::Interface,
            CallRoute::Virtual => InvokeForm::Virtual,
        }
    }
}

impl<'a> TypeMapper<'a> {
    /// Resolve a call of `member` to its owner, descriptor and invocation form.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn map_to_callable_method(&self, member: DeclId, super_call: bool) -> Result<CallableMethod> {
        let decl = self.decl(member)?;
        let method = self.callable_method(decl, super_call)?;
        debug!(
            member = %self.display_name(decl),
            owner = %method.owner,
            invoke = ?method.invoke,
            descriptor = %method.signature.descriptor(),
            "mapped call"
        );
        Ok(method)
    }

    fn callable_method(&self, decl: &'a Declaration, super_call: bool) -> Result<CallableMethod> {
        if decl.is_constructor() {
            return self.constructor_call(decl);
        }
        if let Some(target) = self.delegated_local_accessor_target(decl)? {
            return self.callable_method(target, false);
        }

        let function = self.find_super_declaration(decl, super_call)?;
        let base = self.find_base_declaration(function)?;
        let extension_receiver = function
            .as_callable()
            .and_then(|callable| callable.extension_receiver.as_ref())
            .map(|receiver| self.map_type(receiver, TypeMappingMode::DEFAULT, None))
            .transpose()?;

        let mut shape = CallShape {
            static_member: is_static_member(function),
            private: function.visibility.is_private(),
            super_call,
            ..CallShape::default()
        };

        let (owner, default_impl_owner, signature, dispatch_receiver) = match self.containing_class(decl) {
            Some((current_owner_decl, current_owner)) => {
                let declaration = self.find_any_declaration(function)?;
                let (declaration_owner_decl, declaration_owner) =
                    self.containing_class(declaration).ok_or_else(|| MappingError::UnsupportedOwner {
                        member: self.display_name(declaration),
                        owner_kind: "package",
                    })?;
                let current_is_interface = current_owner.kind.is_jvm_interface();
                let original_is_interface = declaration_owner.kind.is_jvm_interface();

                shape.through_interface = current_is_interface && original_is_interface;
                shape.interface_body = shape.through_interface
                    && (super_call || decl.visibility.is_private() || decl.is_synthetic_accessor());
                shape.native_default_bodies = self.has_native_default_bodies(declaration_owner_decl);

                let default_impl_owner = match self.containing_class(base) {
                    Some((base_owner_decl, base_owner))
                        if base_owner.kind.is_jvm_interface() && !self.has_native_default_bodies(base_owner_decl) =>
                    {
                        self.map_default_impls(base_owner_decl.id)?
                    }
                    Some((base_owner_decl, _)) => self.map_class(base_owner_decl.id)?,
                    None => self.map_class(current_owner_decl.id)?,
                };

                match shape.route() {
                    CallRoute::InterfaceBodyOnClass => {
                        let this_class = self.map_class(current_owner_decl.id)?;
                        let signature = self.signature_of(function, OwnerKind::Implementation, true)?;
                        (this_class.clone(), default_impl_owner, signature, Some(this_class))
                    }
                    CallRoute::InterfaceBodyInDefaultImpls => {
                        let owner = self.map_default_impls(current_owner_decl.id)?;
                        let signature = self.signature_of(decl, OwnerKind::DefaultBodiesContainer, true)?;
                        let this_class = self.map_class(current_owner_decl.id)?;
                        (owner, default_impl_owner, signature, Some(this_class))
                    }
                    _ => {
                        let to_call = match self.overridden_builtin_reflecting_descriptor(function)? {
                            Some(builtin) if !super_call => builtin,
                            _ => function,
                        };
                        let signature = self.signature_of(to_call, OwnerKind::Implementation, true)?;
                        let receiver = if (current_is_interface && !original_is_interface)
                            || matches!(current_owner.builtin, Some(Builtin::Function(_)))
                        {
                            declaration_owner_decl
                        } else {
                            current_owner_decl
                        };
                        let owner = self.map_class(receiver.id)?;
                        (owner.clone(), default_impl_owner, signature, Some(owner))
                    }
                }
            }
            None => {
                shape.package_member = self.is_top_level(function);
                let owner = self.owner_of(function, true)?;
                let signature = self.signature_of(function, OwnerKind::Implementation, true)?;
                let dispatch_receiver = (!shape.package_member).then(|| owner.clone());
                (owner.clone(), owner, signature, dispatch_receiver)
            }
        };

        let invoke = shape.route().invoke_form();
        let callee_type = self.is_local_function(function).then(|| owner.clone());
        let default_impl_descriptor = self
            .default_method_of(base, self.owner_kind_for_default_call(base))?
            .descriptor();

        Ok(CallableMethod {
            owner,
            default_impl_owner,
            default_impl_descriptor,
            signature,
            invoke,
            dispatch_receiver,
            extension_receiver,
            callee_type,
        })
    }

    fn constructor_call(&self, decl: &Declaration) -> Result<CallableMethod> {
        let (class_decl, _) = self.containing_class(decl).ok_or_else(|| MappingError::UnsupportedOwner {
            member: self.display_name(decl),
            owner_kind: "package",
        })?;
        let owner = self.map_class(class_decl.id)?;
        let signature = self.signature_of(decl, OwnerKind::Implementation, true)?;
        let default_impl_descriptor = self.default_method_of(decl, OwnerKind::Implementation)?.descriptor();
        Ok(CallableMethod {
            owner: owner.clone(),
            default_impl_owner: owner,
            default_impl_descriptor,
            signature,
            invoke: CallShape {
                constructor: true,
                ..CallShape::default()
            }
            .route()
            .invoke_form(),
            dispatch_receiver: None,
            extension_receiver: None,
            callee_type: None,
        })
    }

    /// Accessors of delegated locals call the resolved `getValue`/`setValue`.
    fn delegated_local_accessor_target(&self, decl: &Declaration) -> Result<Option<&'a Declaration>> {
        let Some(accessor) = decl.as_accessor() else {
            return Ok(None);
        };
        let property = self.decl(accessor.property)?;
        let is_local = property.has_flag(DeclFlags::LOCAL) || self.parent(property).is_some_and(Declaration::is_callable);
        let is_delegated = property.as_property().is_some_and(|p| p.is_delegated);
        if !(is_local && is_delegated) {
            return Ok(None);
        }
        let target = self
            .bindings
            .delegated_accessor_call(decl.id)
            .ok_or_else(|| MappingError::MissingBinding {
                what: "delegated accessor call",
                declaration: self.display_name(decl),
            })?;
        self.decl(target).map(Some)
    }

    fn has_native_default_bodies(&self, interface: &Declaration) -> bool {
        interface.origin == Origin::Foreign || self.config.target.supports_interface_default_methods()
    }

    /// Kind of owner the `$default` stub of `base` lives in.
    pub(crate) fn owner_kind_for_default_call(&self, base: &Declaration) -> OwnerKind {
        if self.is_top_level(base) {
            OwnerKind::PackageFacade
        } else if self.is_interface_member(base) {
            OwnerKind::DefaultBodiesContainer
        } else {
            OwnerKind::Implementation
        }
    }

    // ==========================================================================
    // Override chain
    // ==========================================================================

    fn overridden_of(&self, decl: &Declaration) -> Result<Vec<&'a Declaration>> {
        decl.as_callable()
            .map(|callable| callable.overridden.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&id| self.decl(id))
            .collect()
    }

    /// Declaration whose body a call of `decl` reaches.
    ///
    /// Fake overrides are followed until a real declaration is found,
    /// preferring members of classes over members of interfaces. A `super`
    /// call stops at the fake override when interface bodies live in
    /// `$DefaultImpls` containers.
    pub fn find_super_declaration_of(&self, member: DeclId, super_call: bool) -> Result<DeclId> {
        self.find_super_declaration(self.decl(member)?, super_call).map(|decl| decl.id)
    }

    pub(crate) fn find_super_declaration(&self, decl: &'a Declaration, super_call: bool) -> Result<&'a Declaration> {
        let mut current = decl;
        let mut visited = FxHashSet::default();
        loop {
            let Some(callable) = current.as_callable() else {
                return Ok(current);
            };
            if !callable.is_fake_override() {
                return Ok(current);
            }
            if !visited.insert(current.id) {
                return Err(self.malformed_override(current));
            }
            let overridden = self.overridden_of(current)?;
            let Some(&first) = overridden.first() else {
                return Err(self.malformed_override(current));
            };
            if let Some(class_member) = overridden.iter().find(|d| !self.is_interface_member(d)) {
                current = class_member;
                continue;
            }
            if super_call && !self.config.target.supports_interface_default_methods() && !self.is_interface_member(current) {
                return Ok(current);
            }
            current = first;
        }
    }

    /// End of the first-overridden chain.
    pub(crate) fn find_base_declaration(&self, decl: &'a Declaration) -> Result<&'a Declaration> {
        let mut current = decl;
        let mut visited = FxHashSet::default();
        while let Some(&first) = current.as_callable().and_then(|callable| callable.overridden.first()) {
            if !visited.insert(current.id) {
                return Err(self.malformed_override(current));
            }
            current = self.decl(first)?;
        }
        Ok(current)
    }

    /// `decl` itself when it is a real declaration, its base otherwise.
    pub(crate) fn find_any_declaration(&self, decl: &'a Declaration) -> Result<&'a Declaration> {
        match decl.as_callable() {
            Some(callable) if callable.kind != CallableKind::Declaration => self.find_base_declaration(decl),
            _ => Ok(decl),
        }
    }

    /// Every member `decl` overrides, directly or transitively.
    pub(crate) fn all_overridden(&self, decl: &Declaration) -> Result<Vec<&'a Declaration>> {
        let mut result = Vec::new();
        let mut visited = FxHashSet::default();
        let mut queue = self.overridden_of(decl)?;
        queue.reverse();
        while let Some(next) = queue.pop() {
            if !visited.insert(next.id) {
                continue;
            }
            let mut parents = self.overridden_of(next)?;
            parents.reverse();
            // breadth-first: parents go below the current level
            queue.splice(0..0, parents);
            result.push(next);
        }
        Ok(result)
    }

    /// A primitive return type that overrides a non-primitive one is boxed.
    pub(crate) fn force_boxed_return_type(&self, decl: &Declaration) -> Result<bool> {
        let Some(return_type) = decl.as_callable().and_then(|callable| callable.return_type.as_ref()) else {
            return Ok(false);
        };
        if !self.is_primitive_type(return_type) {
            return Ok(false);
        }
        for overridden in self.all_overridden(decl)? {
            let overridden_return = overridden.as_callable().and_then(|callable| callable.return_type.as_ref());
            if overridden_return.is_some_and(|ty| !self.is_primitive_type(ty)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Builtin member up the override chain whose binary shape differs from
    /// the declaration: a platform name or a rewritten signature.
    pub(crate) fn overridden_builtin_reflecting_descriptor(&self, decl: &Declaration) -> Result<Option<&'a Declaration>> {
        if decl.origin == Origin::Builtin {
            return Ok(None);
        }
        for overridden in self.all_overridden(decl)? {
            let key = self.special_member_key(overridden)?;
            if special::special_name(&key).is_some() || SpecialSignatureTable::CURRENT.contains(&key) {
                return Ok(Some(overridden));
            }
        }
        Ok(None)
    }

    fn malformed_override(&self, decl: &Declaration) -> MappingError {
        MappingError::MalformedOverride {
            member: self.display_name(decl),
        }
    }
}

pub(crate) fn is_static_member(decl: &Declaration) -> bool {
    decl.has_flag(DeclFlags::STATIC)
        || decl.has_flag(DeclFlags::JVM_STATIC)
        || (decl.is_synthetic_accessor() && !decl.is_constructor())
}
