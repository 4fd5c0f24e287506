//! DeclarationRegistry - in-memory descriptor graph.
//!
//! This module provides [`DeclarationRegistry`], the central storage for all
//! declarations the mapper reads. Declarations are stored by [`DeclId`]; a
//! secondary index maps dotted qualified names to ids.
//!
//! # Identity
//!
//! When a declaration is added without an explicit id the registry derives
//! one from the qualified name of its parent and its own name (see
//! [`DeclId`]), so the same graph always gets the same ids.
//!
//! # Linking
//!
//! Adding a type parameter appends it to its owner's type-parameter list;
//! adding a getter or setter links it to its property. Cross references that
//! may point forward (supertypes, overridden members, accessor targets) are
//! checked by [`DeclarationRegistry::validate`].
//!
//! # Example
//!
//! ```
//! use erasure_core::{ClassDecl, Declaration, DescriptorGraph};
//! use erasure_registry::DeclarationRegistry;
//!
//! let mut registry = DeclarationRegistry::new();
//! let package = registry.add(Declaration::package("foo")).unwrap();
//! let class = registry
//!     .add(Declaration::class("Bar", ClassDecl::class()).in_parent(package))
//!     .unwrap();
//!
//! assert_eq!(registry.lookup("foo.Bar"), Some(class));
//! assert_eq!(registry.declaration(class).map(|d| d.name.as_str()), Some("Bar"));
//! ```

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::trace;

use erasure_core::{
    CallableData, DeclFlags, DeclId, Declaration, DeclarationKind, DescriptorGraph, RegistrationError, SemType,
    TypeConstructor,
};

type Result<T> = std::result::Result<T, RegistrationError>;

/// In-memory descriptor graph.
#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    /// All declarations by id (PRIMARY storage).
    declarations: FxHashMap<DeclId, Declaration>,

    /// Dotted qualified name of every declaration.
    qualified_names: FxHashMap<DeclId, String>,

    /// Reverse index: qualified name -> first declaration registered under it.
    by_name: FxHashMap<String, DeclId>,

    /// Next index of local declarations per (parent, name).
    local_counters: FxHashMap<(DeclId, String), u32>,
}

impl DeclarationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Add a declaration and return its id.
    ///
    /// The parent must already be registered.
    pub fn add(&mut self, mut decl: Declaration) -> Result<DeclId> {
        let parent_name = match decl.parent {
            Some(parent) => {
                let parent_decl = self.declarations.get(&parent).ok_or_else(|| RegistrationError::UnknownParent {
                    name: decl.name.clone(),
                    parent,
                })?;
                check_parent(&decl, parent_decl)?;
                self.qualified_names.get(&parent).cloned()
            }
            None => None,
        };

        let qualified_name = match (&decl.kind, parent_name) {
            (DeclarationKind::Package(package), _) => package.fq_name.clone(),
            (_, Some(parent)) if !parent.is_empty() => format!("{parent}.{}", decl.name),
            _ => decl.name.clone(),
        };

        if decl.id.is_empty() {
            decl.id = self.derive_id(&decl, &qualified_name);
        }
        let id = decl.id;
        if self.declarations.contains_key(&id) {
            return Err(RegistrationError::DuplicateDeclaration { name: qualified_name, id });
        }

        self.link(&mut decl)?;

        trace!(name = %qualified_name, kind = decl.kind.label(), %id, "registered declaration");
        self.by_name.entry(qualified_name.clone()).or_insert(id);
        self.qualified_names.insert(id, qualified_name);
        self.declarations.insert(id, decl);
        Ok(id)
    }

    fn derive_id(&mut self, decl: &Declaration, qualified_name: &str) -> DeclId {
        let parent = decl.parent.unwrap_or(DeclId::EMPTY);
        let is_local = decl.has_flag(DeclFlags::LOCAL)
            || decl.has_flag(DeclFlags::ANONYMOUS)
            || decl.has_flag(DeclFlags::LAMBDA)
            || decl.has_flag(DeclFlags::FUNCTION_EXPRESSION);

        match &decl.kind {
            DeclarationKind::Package(package) => DeclId::from_package(&package.fq_name),
            DeclarationKind::TypeParameter(_) => DeclId::from_type_parameter(parent, &decl.name),
            DeclarationKind::Getter(accessor) => DeclId::from_accessor(accessor.property, true),
            DeclarationKind::Setter(accessor) => DeclId::from_accessor(accessor.property, false),
            _ if is_local => {
                let counter = self.local_counters.entry((parent, decl.name.clone())).or_insert(0);
                let id = DeclId::from_local(parent, &decl.name, *counter);
                *counter += 1;
                id
            }
            DeclarationKind::Class(_) => DeclId::from_class(qualified_name),
            DeclarationKind::Property(_) => DeclId::from_property(parent, &decl.name),
            DeclarationKind::Function(callable) => {
                DeclId::from_member(parent, &decl.name, &callable.parameter_classifiers())
            }
            DeclarationKind::Constructor(callable) => {
                DeclId::from_constructor(parent, &callable.parameter_classifiers())
            }
        }
    }

    /// Update back references of the declaration's owner.
    fn link(&mut self, decl: &mut Declaration) -> Result<()> {
        let mut type_parameter_index = None;
        match &decl.kind {
            DeclarationKind::TypeParameter(_) => {
                let Some(owner_id) = decl.parent else {
                    return Err(RegistrationError::InvalidParent {
                        name: decl.name.clone(),
                        parent_kind: "root",
                    });
                };
                let owner = self
                    .declarations
                    .get_mut(&owner_id)
                    .ok_or_else(|| RegistrationError::UnknownParent {
                        name: decl.name.clone(),
                        parent: owner_id,
                    })?;
                let list = match &mut owner.kind {
                    DeclarationKind::Class(class) => &mut class.type_parameters,
                    DeclarationKind::Function(callable) | DeclarationKind::Constructor(callable) => {
                        &mut callable.type_parameters
                    }
                    DeclarationKind::Getter(accessor) | DeclarationKind::Setter(accessor) => {
                        &mut accessor.callable.type_parameters
                    }
                    other => {
                        return Err(RegistrationError::InvalidParent {
                            name: decl.name.clone(),
                            parent_kind: other.label(),
                        });
                    }
                };
                if !list.contains(&decl.id) {
                    list.push(decl.id);
                }
                type_parameter_index = list.iter().position(|id| *id == decl.id);
            }
            DeclarationKind::Getter(accessor) | DeclarationKind::Setter(accessor) => {
                let is_getter = matches!(decl.kind, DeclarationKind::Getter(_));
                let property = self
                    .declarations
                    .get_mut(&accessor.property)
                    .and_then(|d| match &mut d.kind {
                        DeclarationKind::Property(property) => Some(property),
                        _ => None,
                    })
                    .ok_or_else(|| RegistrationError::UnknownReference {
                        name: decl.name.clone(),
                        id: accessor.property,
                    })?;
                if is_getter {
                    property.getter = Some(decl.id);
                } else {
                    property.setter = Some(decl.id);
                }
            }
            _ => {}
        }
        if let (Some(index), DeclarationKind::TypeParameter(tp)) = (type_parameter_index, &mut decl.kind) {
            tp.index = index;
        }
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(&id)
    }

    /// Mutable access for adjusting a declaration after registration.
    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Declaration> {
        self.declarations.get_mut(&id)
    }

    /// Id registered under a dotted qualified name.
    pub fn lookup(&self, qualified_name: &str) -> Option<DeclId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn qualified_name(&self, id: DeclId) -> Option<&str> {
        self.qualified_names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    // ==========================================================================
    // Validation
    // ==========================================================================

    /// Check cross references and the override graph.
    ///
    /// Every referenced id must be registered, every fake override must have
    /// overridden members and the override graph must be acyclic.
    pub fn validate(&self) -> Result<()> {
        let mut graph: DiGraph<DeclId, ()> = DiGraph::new();
        let mut nodes: FxHashMap<DeclId, NodeIndex> = FxHashMap::default();
        let mut node = |graph: &mut DiGraph<DeclId, ()>, id: DeclId| *nodes.entry(id).or_insert_with(|| graph.add_node(id));

        for decl in self.declarations.values() {
            if let Some(target) = decl.accessor_for {
                self.require(decl, target)?;
            }
            match &decl.kind {
                DeclarationKind::Class(class) => {
                    for supertype in &class.supertypes {
                        self.require_type(decl, supertype)?;
                    }
                }
                DeclarationKind::TypeParameter(tp) => {
                    for bound in &tp.upper_bounds {
                        self.require_type(decl, bound)?;
                    }
                }
                DeclarationKind::Property(property) => self.require_type(decl, &property.ty)?,
                _ => {}
            }
            if let Some(callable) = decl.as_callable() {
                self.require_callable(decl, callable)?;
                let from = node(&mut graph, decl.id);
                for &overridden in &callable.overridden {
                    let to = node(&mut graph, overridden);
                    graph.add_edge(from, to, ());
                }
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            let id = graph[cycle.node_id()];
            RegistrationError::OverrideCycle {
                name: self.display_name(id),
            }
        })
    }

    fn require_callable(&self, decl: &Declaration, callable: &CallableData) -> Result<()> {
        if callable.is_fake_override() && callable.overridden.is_empty() {
            return Err(RegistrationError::FakeOverrideWithoutOverridden {
                name: self.display_name(decl.id),
            });
        }
        for &overridden in &callable.overridden {
            self.require(decl, overridden)?;
        }
        if let Some(ty) = &callable.return_type {
            self.require_type(decl, ty)?;
        }
        if let Some(ty) = &callable.extension_receiver {
            self.require_type(decl, ty)?;
        }
        for parameter in &callable.value_parameters {
            self.require_type(decl, &parameter.ty)?;
        }
        Ok(())
    }

    fn require(&self, decl: &Declaration, id: DeclId) -> Result<()> {
        if self.declarations.contains_key(&id) {
            Ok(())
        } else {
            Err(RegistrationError::UnknownReference {
                name: self.display_name(decl.id),
                id,
            })
        }
    }

    fn require_type(&self, decl: &Declaration, ty: &SemType) -> Result<()> {
        match &ty.constructor {
            TypeConstructor::Class(id) | TypeConstructor::TypeParameter(id) => self.require(decl, *id)?,
            TypeConstructor::Error(_) => {}
        }
        for argument in &ty.arguments {
            if let Some(inner) = argument.ty() {
                self.require_type(decl, inner)?;
            }
        }
        Ok(())
    }

    fn display_name(&self, id: DeclId) -> String {
        self.qualified_names.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

fn check_parent(decl: &Declaration, parent: &Declaration) -> Result<()> {
    let allowed = match (&decl.kind, &parent.kind) {
        (DeclarationKind::Package(_), DeclarationKind::Package(_)) => true,
        (DeclarationKind::Package(_), _) => false,
        (DeclarationKind::Constructor(_), DeclarationKind::Class(_)) => true,
        (DeclarationKind::Constructor(_), _) => false,
        (DeclarationKind::TypeParameter(_), _) => true,
        (_, DeclarationKind::Package(_) | DeclarationKind::Class(_)) => true,
        // local declarations live inside callables
        (_, kind) => !matches!(kind, DeclarationKind::TypeParameter(_) | DeclarationKind::Property(_)),
    };
    if allowed {
        Ok(())
    } else {
        Err(RegistrationError::InvalidParent {
            name: decl.name.clone(),
            parent_kind: parent.kind.label(),
        })
    }
}

impl DescriptorGraph for DeclarationRegistry {
    fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erasure_core::{ClassDecl, PropertyDecl, TypeParameterDecl, ValueParameter, Variance};

    fn setup() -> (DeclarationRegistry, DeclId, DeclId) {
        let mut registry = DeclarationRegistry::new();
        let package = registry.add(Declaration::package("foo")).unwrap();
        let class = registry
            .add(Declaration::class("Bar", ClassDecl::class().as_open()).in_parent(package))
            .unwrap();
        (registry, package, class)
    }

    fn class_type(class: DeclId) -> SemType {
        SemType::class(class)
    }

    #[test]
    fn derived_ids_match_qualified_names() {
        let (registry, package, class) = setup();
        assert_eq!(package, DeclId::from_package("foo"));
        assert_eq!(class, DeclId::from_class("foo.Bar"));
        assert_eq!(registry.qualified_name(class), Some("foo.Bar"));
    }

    #[test]
    fn duplicate_is_rejected() {
        let (mut registry, package, _) = setup();
        let result = registry.add(Declaration::class("Bar", ClassDecl::class()).in_parent(package));
        assert!(matches!(result, Err(RegistrationError::DuplicateDeclaration { .. })));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut registry = DeclarationRegistry::new();
        let result = registry.add(Declaration::class("Bar", ClassDecl::class()).in_parent(DeclId::from_package("x")));
        assert!(matches!(result, Err(RegistrationError::UnknownParent { .. })));
    }

    #[test]
    fn constructor_outside_class_is_rejected() {
        let (mut registry, package, _) = setup();
        let result = registry.add(Declaration::constructor(CallableData::constructor()).in_parent(package));
        assert!(matches!(
            result,
            Err(RegistrationError::InvalidParent { parent_kind: "package", .. })
        ));
    }

    #[test]
    fn type_parameters_are_linked_in_order() {
        let (mut registry, _, class) = setup();
        let t = registry
            .add(Declaration::type_parameter("T", TypeParameterDecl::new(Variance::Out)).in_parent(class))
            .unwrap();
        let u = registry
            .add(Declaration::type_parameter("U", TypeParameterDecl::invariant()).in_parent(class))
            .unwrap();
        let params = &registry.get(class).unwrap().as_class().unwrap().type_parameters;
        assert_eq!(params, &vec![t, u]);
        assert_eq!(registry.get(u).unwrap().as_type_parameter().unwrap().index, 1);
    }

    #[test]
    fn accessors_are_linked_to_property() {
        let (mut registry, _, class) = setup();
        let property = registry
            .add(Declaration::property("x", PropertyDecl::var(class_type(class))).in_parent(class))
            .unwrap();
        let getter = registry
            .add(Declaration::getter("x", property, CallableData::returning(class_type(class))).in_parent(class))
            .unwrap();
        let setter = registry
            .add(
                Declaration::setter(
                    "x",
                    property,
                    CallableData::returning(class_type(class)).with_parameter(ValueParameter::new("value", class_type(class))),
                )
                .in_parent(class),
            )
            .unwrap();
        let decl = registry.get(property).unwrap().as_property().unwrap();
        assert_eq!(decl.getter, Some(getter));
        assert_eq!(decl.setter, Some(setter));
    }

    #[test]
    fn local_declarations_get_distinct_ids() {
        let (mut registry, package, class) = setup();
        let run = registry
            .add(Declaration::function("run", CallableData::returning(class_type(class))).in_parent(package))
            .unwrap();
        let lambda = || {
            Declaration::function("<anonymous>", CallableData::returning(class_type(class)))
                .in_parent(run)
                .with_flags(DeclFlags::LAMBDA)
        };
        let first = registry.add(lambda()).unwrap();
        let second = registry.add(lambda()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn fake_override_without_overridden_fails_validation() {
        let (mut registry, _, class) = setup();
        registry
            .add(Declaration::function("f", CallableData::returning(class_type(class)).as_fake_override()).in_parent(class))
            .unwrap();
        assert!(matches!(
            registry.validate(),
            Err(RegistrationError::FakeOverrideWithoutOverridden { .. })
        ));
    }

    #[test]
    fn unknown_override_target_fails_validation() {
        let (mut registry, _, class) = setup();
        registry
            .add(
                Declaration::function("f", CallableData::returning(class_type(class)).overriding(DeclId::from_class("nope")))
                    .in_parent(class),
            )
            .unwrap();
        assert!(matches!(registry.validate(), Err(RegistrationError::UnknownReference { .. })));
    }

    #[test]
    fn override_cycle_fails_validation() {
        let (mut registry, package, class) = setup();
        let other = registry
            .add(Declaration::class("Baz", ClassDecl::class().as_open()).in_parent(package))
            .unwrap();
        let f_bar = DeclId::from_member(class, "f", &[]);
        let f_baz = DeclId::from_member(other, "f", &[]);
        registry
            .add(Declaration::function("f", CallableData::returning(class_type(class)).overriding(f_baz)).in_parent(class))
            .unwrap();
        registry
            .add(Declaration::function("f", CallableData::returning(class_type(class)).overriding(f_bar)).in_parent(other))
            .unwrap();
        assert!(matches!(registry.validate(), Err(RegistrationError::OverrideCycle { .. })));
    }

    #[test]
    fn valid_graph_passes() {
        let (mut registry, _, class) = setup();
        let base = registry
            .add(Declaration::function("f", CallableData::returning(class_type(class))).in_parent(class))
            .unwrap();
        assert_eq!(base, DeclId::from_member(class, "f", &[]));
        assert!(registry.validate().is_ok());
        assert_eq!(registry.len(), 3);
    }
}
