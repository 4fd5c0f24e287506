//! TypeMapper - the entry point of all mapping operations.
//!
//! [`TypeMapper`] borrows the descriptor graph and binding context and owns
//! its [`MapperConfig`]. Its operations are split across modules:
//!
//! - `type_mapper` - semantic types to binary types and generic fragments
//! - `owner` - owning classes of members
//! - `dispatch` - override-chain walks and callable methods
//! - `naming` - binary member names
//! - `signature` - method and field signatures
//!
//! This module holds the struct, declaration lookups and class-hierarchy
//! queries shared by all of them.

use std::sync::RwLock;

use rustc_hash::{FxHashMap, FxHashSet};

use erasure_core::{
    BindingContext, Builtin, ClassDecl, DeclFlags, DeclId, Declaration, DeclarationKind, DescriptorGraph,
    FileClassInfo, IgnoreIncompatibilities, IncompatibilityTracker, MappingError, Projection, SemType, TypeConstructor,
};

use crate::{MapperConfig, Result};

static IGNORE_INCOMPATIBILITIES: IgnoreIncompatibilities = IgnoreIncompatibilities;

/// Maps declarations of a descriptor graph to binary names, descriptors,
/// generic signatures and call targets.
///
/// All operations take `&self` and never mutate the graph, so one mapper can
/// be shared across threads.
pub struct TypeMapper<'a> {
    pub(crate) graph: &'a dyn DescriptorGraph,
    pub(crate) bindings: &'a dyn BindingContext,
    pub(crate) tracker: &'a dyn IncompatibilityTracker,
    pub(crate) config: MapperConfig,
    /// Internal names of classes, when caching is enabled.
    class_names: Option<RwLock<FxHashMap<DeclId, String>>>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(graph: &'a dyn DescriptorGraph, bindings: &'a dyn BindingContext, config: MapperConfig) -> Self {
        let class_names = config.cache_class_names.then(|| RwLock::new(FxHashMap::default()));
        Self {
            graph,
            bindings,
            tracker: &IGNORE_INCOMPATIBILITIES,
            config,
            class_names,
        }
    }

    /// Record incompatible binary containers on `tracker`.
    pub fn with_tracker(mut self, tracker: &'a dyn IncompatibilityTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    // ==========================================================================
    // Declaration lookup
    // ==========================================================================

    pub(crate) fn decl(&self, id: DeclId) -> Result<&'a Declaration> {
        self.graph.declaration(id).ok_or(MappingError::UnknownDeclaration { id })
    }

    pub(crate) fn parent(&self, decl: &Declaration) -> Option<&'a Declaration> {
        decl.parent.and_then(|id| self.graph.declaration(id))
    }

    /// Containing class of a member, if it is declared in one.
    pub(crate) fn containing_class(&self, decl: &Declaration) -> Option<(&'a Declaration, &'a ClassDecl)> {
        let parent = self.parent(decl)?;
        parent.as_class().map(|class| (parent, class))
    }

    pub(crate) fn is_top_level(&self, decl: &Declaration) -> bool {
        self.parent(decl).is_some_and(|parent| parent.as_package().is_some())
    }

    pub(crate) fn is_interface_member(&self, decl: &Declaration) -> bool {
        self.containing_class(decl)
            .is_some_and(|(_, class)| class.kind.is_jvm_interface())
    }

    pub(crate) fn is_local_function(&self, decl: &Declaration) -> bool {
        matches!(decl.kind, DeclarationKind::Function(_))
            && (decl.has_flag(DeclFlags::LOCAL) || self.parent(decl).is_some_and(Declaration::is_callable))
    }

    /// File class of a top-level member; accessors fall back to their property.
    pub(crate) fn file_class_info_of(&self, decl: &Declaration) -> Option<&'a FileClassInfo> {
        self.bindings.file_class_info(decl.id).or_else(|| {
            decl.as_accessor()
                .and_then(|accessor| self.bindings.file_class_info(accessor.property))
        })
    }

    /// Dotted qualified name, for diagnostics and table lookups.
    pub(crate) fn display_name(&self, decl: &Declaration) -> String {
        if let Some(package) = decl.as_package() {
            return package.fq_name.clone();
        }
        let mut segments = vec![decl.name.as_str()];
        let mut current = self.parent(decl);
        while let Some(parent) = current {
            match parent.as_package() {
                Some(package) => {
                    if !package.fq_name.is_empty() {
                        segments.push(package.fq_name.as_str());
                    }
                    break;
                }
                None => segments.push(parent.name.as_str()),
            }
            current = self.parent(parent);
        }
        segments.reverse();
        segments.join(".")
    }

    // ==========================================================================
    // Class hierarchy
    // ==========================================================================

    pub(crate) fn builtin_of(&self, ty: &SemType) -> Option<Builtin> {
        let id = ty.class_id()?;
        self.graph.declaration(id)?.as_class()?.builtin
    }

    pub(crate) fn is_builtin(&self, ty: &SemType, builtin: Builtin) -> bool {
        self.builtin_of(ty) == Some(builtin)
    }

    pub(crate) fn is_primitive_type(&self, ty: &SemType) -> bool {
        !ty.nullable && matches!(self.builtin_of(ty), Some(Builtin::Primitive(_)))
    }

    pub(crate) fn is_nothing(&self, ty: &SemType) -> bool {
        !ty.nullable && self.is_builtin(ty, Builtin::Nothing)
    }

    pub(crate) fn is_nullable_nothing(&self, ty: &SemType) -> bool {
        ty.nullable && self.is_builtin(ty, Builtin::Nothing)
    }

    pub(crate) fn is_jvm_interface_type(&self, ty: &SemType) -> bool {
        ty.class_id()
            .and_then(|id| self.graph.declaration(id))
            .and_then(Declaration::as_class)
            .is_some_and(|class| class.kind.is_jvm_interface())
    }

    /// Type parameters of a class followed by those of its enclosing classes
    /// while the class is inner, matching the order of type arguments.
    pub(crate) fn flattened_type_parameters(&self, class_id: DeclId) -> Result<Vec<DeclId>> {
        let mut parameters = Vec::new();
        let mut current = self.decl(class_id)?;
        loop {
            let Some(class) = current.as_class() else { break };
            parameters.extend_from_slice(&class.type_parameters);
            if !current.has_flag(DeclFlags::INNER) {
                break;
            }
            match self.parent(current) {
                Some(parent) if parent.as_class().is_some() => current = parent,
                _ => break,
            }
        }
        Ok(parameters)
    }

    /// Type of a class with its own type parameters as arguments.
    pub(crate) fn default_type(&self, class_id: DeclId) -> Result<SemType> {
        let arguments = self
            .flattened_type_parameters(class_id)?
            .into_iter()
            .map(|parameter| Projection::invariant(SemType::type_parameter(parameter)))
            .collect();
        Ok(SemType::generic(class_id, arguments))
    }

    /// `sub` is `sup` or inherits from it.
    pub(crate) fn is_subclass(&self, sub: DeclId, sup: DeclId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![sub];
        while let Some(id) = stack.pop() {
            if id == sup {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(class) = self.graph.declaration(id).and_then(Declaration::as_class) {
                stack.extend(class.supertypes.iter().filter_map(SemType::class_id));
            }
        }
        false
    }

    /// Subtyping on type constructors and nullability; arguments are ignored.
    pub(crate) fn is_subtype(&self, sub: &SemType, sup: &SemType) -> bool {
        if sub.nullable && !sup.nullable {
            return false;
        }
        if let TypeConstructor::TypeParameter(parameter) = sub.constructor {
            if sup.type_parameter_id() == Some(parameter) {
                return true;
            }
            let bounds = self
                .graph
                .declaration(parameter)
                .and_then(Declaration::as_type_parameter)
                .map(|tp| tp.upper_bounds.as_slice())
                .unwrap_or_default();
            // no declared bound means `Any?`
            if bounds.is_empty() {
                return sup.nullable && self.is_builtin(sup, Builtin::Any);
            }
            return bounds.iter().any(|bound| self.is_subtype(bound, sup));
        }
        if self.is_builtin(sup, Builtin::Any) || self.is_builtin(sub, Builtin::Nothing) {
            return true;
        }
        match (&sub.constructor, &sup.constructor) {
            (TypeConstructor::Class(a), TypeConstructor::Class(b)) => self.is_subclass(*a, *b),
            _ => false,
        }
    }

    // ==========================================================================
    // Class name cache
    // ==========================================================================

    pub(crate) fn cached_class_name(&self, id: DeclId) -> Option<String> {
        let cache = self.class_names.as_ref()?;
        cache.read().ok()?.get(&id).cloned()
    }

    pub(crate) fn cache_class_name(&self, id: DeclId, name: &str) {
        if let Some(cache) = &self.class_names {
            if let Ok(mut names) = cache.write() {
                names.entry(id).or_insert_with(|| name.to_string());
            }
        }
    }
}

impl std::fmt::Debug for TypeMapper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMapper").field("config", &self.config).finish_non_exhaustive()
    }
}
