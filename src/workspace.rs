//! Owned registry, bindings and builtins behind one handle.

use erasure_core::{DeclId, Declaration, RegistrationError};
use erasure_mapper::{MapperConfig, TypeMapper};
use erasure_registry::{BindingTable, Builtins, DeclarationRegistry, IncompatibleClassLog};

/// A descriptor graph with the builtins installed.
///
/// Mappers created by [`Workspace::mapper`] record incompatible binary
/// containers on the workspace's [`IncompatibleClassLog`].
#[derive(Debug)]
pub struct Workspace {
    registry: DeclarationRegistry,
    bindings: BindingTable,
    builtins: Builtins,
    incompatibilities: IncompatibleClassLog,
}

impl Workspace {
    /// Create a workspace holding only the builtins.
    pub fn new() -> Result<Self, RegistrationError> {
        let mut registry = DeclarationRegistry::new();
        let mut bindings = BindingTable::new();
        let builtins = Builtins::install(&mut registry, &mut bindings)?;
        Ok(Self {
            registry,
            bindings,
            builtins,
            incompatibilities: IncompatibleClassLog::new(),
        })
    }

    /// Add a declaration and return its id.
    pub fn add(&mut self, decl: Declaration) -> Result<DeclId, RegistrationError> {
        self.registry.add(decl)
    }

    /// Id of the package `fq_name`, registering it on first use.
    pub fn package(&mut self, fq_name: &str) -> Result<DeclId, RegistrationError> {
        match self.registry.lookup(fq_name) {
            Some(id) if self.registry.get(id).is_some_and(|decl| decl.as_package().is_some()) => Ok(id),
            _ => self.registry.add(Declaration::package(fq_name)),
        }
    }

    /// A mapper over the current declarations.
    pub fn mapper(&self, config: MapperConfig) -> TypeMapper<'_> {
        TypeMapper::new(&self.registry, &self.bindings, config).with_tracker(&self.incompatibilities)
    }

    pub fn registry(&self) -> &DeclarationRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeclarationRegistry {
        &mut self.registry
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingTable {
        &mut self.bindings
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Incompatible binary containers recorded by mappers of this workspace.
    pub fn incompatibilities(&self) -> &IncompatibleClassLog {
        &self.incompatibilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erasure_core::{BinaryVersion, CallableData, ClassDecl, Origin};
    use erasure_mapper::OwnerKind;

    #[test]
    fn packages_are_registered_once() {
        let mut workspace = Workspace::new().unwrap();
        let first = workspace.package("app.model").unwrap();
        let second = workspace.package("app.model").unwrap();
        assert_eq!(first, second);
        assert!(workspace.registry().get(first).unwrap().as_package().is_some());
    }

    #[test]
    fn builtin_packages_are_reused() {
        let mut workspace = Workspace::new().unwrap();
        let kotlin = workspace.builtins().kotlin;
        assert_eq!(workspace.package("kotlin").unwrap(), kotlin);
    }

    #[test]
    fn mappers_record_into_the_workspace_log() {
        let mut workspace = Workspace::new().unwrap();
        let package = workspace.package("lib").unwrap();
        let legacy = workspace
            .add(
                Declaration::class("Legacy", ClassDecl::class())
                    .in_parent(package)
                    .with_origin(Origin::Binary),
            )
            .unwrap();
        let run = workspace
            .add(
                Declaration::function("run", CallableData::returning(workspace.builtins().unit_type()))
                    .in_parent(legacy)
                    .with_origin(Origin::Binary),
            )
            .unwrap();
        workspace.bindings_mut().record_binary_version(legacy, BinaryVersion::new(2, 0, 0));

        let mapper = workspace.mapper(MapperConfig::default());
        assert_eq!(mapper.map_signature_skip_generic(run, OwnerKind::Implementation).unwrap().descriptor(), "()V");
        let records = workspace.incompatibilities().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].internal_name, "lib/Legacy");
    }
}
