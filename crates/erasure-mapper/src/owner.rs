//! Owning classes of members.
//!
//! Class members belong to their class. Top-level members belong to a file
//! class: either the public facade or the implementation part, chosen from
//! the member's visibility and kind. Members loaded from binaries find their
//! classes through the part-to-facade mapping of their package.

use tracing::debug;

use erasure_core::{
    BinaryType, ClassId, ContainingClasses, DEFAULT_IMPLS_SUFFIX, DeclId, Declaration, DeclarationKind, MappingError,
    Origin, PackageDecl, internal_names,
};

use crate::{Result, TypeMapper};

impl TypeMapper<'_> {
    /// Class that owns `member`, using the facade for public top-level members.
    pub fn map_owner(&self, member: DeclId) -> Result<BinaryType> {
        self.owner_of(self.decl(member)?, true)
    }

    /// Class that holds the implementation of `member`.
    pub fn map_implementation_owner(&self, member: DeclId) -> Result<BinaryType> {
        self.owner_of(self.decl(member)?, false)
    }

    pub(crate) fn owner_of(&self, decl: &Declaration, public_facade: bool) -> Result<BinaryType> {
        if self.is_local_function(decl) {
            return self.anonymous_class_type(decl);
        }
        let Some(container) = self.parent(decl) else {
            return Err(MappingError::UnsupportedOwner {
                member: self.display_name(decl),
                owner_kind: "root",
            });
        };
        match &container.kind {
            DeclarationKind::Package(package) => {
                let owner = self.package_member_owner(decl, container, package, public_facade)?;
                debug!(member = %decl.name, %owner, public_facade, "package member owner");
                Ok(BinaryType::object(owner))
            }
            DeclarationKind::Class(_) => self.map_class(container.id),
            other => Err(MappingError::UnsupportedOwner {
                member: self.display_name(decl),
                owner_kind: other.label(),
            }),
        }
    }

    fn package_member_owner(
        &self,
        decl: &Declaration,
        package_decl: &Declaration,
        package: &PackageDecl,
        public_facade: bool,
    ) -> Result<String> {
        // synthetic accessors live next to their callee
        let is_accessor = decl.is_synthetic_accessor();
        let member = match decl.accessor_for {
            Some(callee) if is_accessor => self.decl(callee)?,
            _ => decl,
        };

        if let Some(info) = self.file_class_info_of(member) {
            let use_file_class =
                !public_facade || is_non_const_property(member) || member.visibility.is_private() || is_accessor;
            return Ok(if use_file_class {
                info.file_class_internal_name.clone()
            } else {
                info.facade_internal_name.clone()
            });
        }

        if let Some(classes) = self.package_member_containing_classes(member, package_decl, package) {
            let class_id = if public_facade { classes.facade } else { classes.implementation };
            return Ok(class_id.internal_name());
        }

        Err(MappingError::MissingContainer {
            member: self.display_name(member),
            detail: format!("no file class or binary part in package `{}`", package.fq_name),
        })
    }

    /// Facade and implementation classes of a member loaded from a binary.
    ///
    /// Interface members are implemented in the interface's `$DefaultImpls`
    /// container, which is then both the facade and the implementation.
    pub fn containing_classes_for_deserialized(&self, member: DeclId) -> Result<ContainingClasses> {
        let decl = self.decl(member)?;
        let missing = || MappingError::MissingContainer {
            member: self.display_name(decl),
            detail: "no containing class".to_string(),
        };
        let parent = self.parent(decl).ok_or_else(missing)?;
        match &parent.kind {
            DeclarationKind::Package(package) => {
                self.package_member_containing_classes(decl, parent, package).ok_or_else(missing)
            }
            DeclarationKind::Class(class) => {
                let mut class_id = self.class_id(parent)?;
                if class.kind.is_jvm_interface() {
                    class_id.relative_name.push_str(DEFAULT_IMPLS_SUFFIX);
                }
                Ok(ContainingClasses {
                    facade: class_id.clone(),
                    implementation: class_id,
                })
            }
            other => Err(MappingError::UnsupportedOwner {
                member: self.display_name(decl),
                owner_kind: other.label(),
            }),
        }
    }

    fn package_member_containing_classes(
        &self,
        member: &Declaration,
        package_decl: &Declaration,
        package: &PackageDecl,
    ) -> Option<ContainingClasses> {
        if member.origin == Origin::Builtin || package_decl.origin == Origin::Builtin {
            let (package, name) = internal_names::BUILTINS_PACKAGE_FACADE.rsplit_once('/')?;
            let builtins = ClassId::new(package, name);
            return Some(ContainingClasses {
                facade: builtins.clone(),
                implementation: builtins,
            });
        }
        let part = self.bindings.implementation_part(member.id)?;
        let facade = self.bindings.facade_for_part(package_decl.id, part)?;
        Some(ContainingClasses {
            facade: ClassId::new(package.fq_name.as_str(), facade),
            implementation: ClassId::new(package.fq_name.as_str(), part),
        })
    }

    /// Package and dotted relative name of a class.
    pub(crate) fn class_id(&self, class: &Declaration) -> Result<ClassId> {
        let mut names = vec![class.name.as_str()];
        let mut current = self.parent(class);
        while let Some(parent) = current {
            if let Some(package) = parent.as_package() {
                names.reverse();
                return Ok(ClassId::new(package.fq_name.as_str(), names.join(".")));
            }
            if parent.as_class().is_none() {
                return Err(MappingError::UnsupportedOwner {
                    member: self.display_name(class),
                    owner_kind: parent.kind.label(),
                });
            }
            names.push(parent.name.as_str());
            current = self.parent(parent);
        }
        names.reverse();
        Ok(ClassId::new("", names.join(".")))
    }
}

fn is_non_const_property(decl: &Declaration) -> bool {
    decl.as_property().is_some_and(|property| !property.is_const)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapperConfig;
    use erasure_core::{
        CallableData, ClassDecl, DeclFlags, FileClassInfo, PropertyDecl, Visibility,
    };
    use erasure_registry::{BindingTable, Builtins, DeclarationRegistry};

    struct Fixture {
        registry: DeclarationRegistry,
        bindings: BindingTable,
        builtins: Builtins,
        package: DeclId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = DeclarationRegistry::new();
            let mut bindings = BindingTable::new();
            let builtins = Builtins::install(&mut registry, &mut bindings).unwrap();
            let package = registry.add(Declaration::package("foo.bar")).unwrap();
            Self {
                registry,
                bindings,
                builtins,
                package,
            }
        }

        fn top_level(&mut self, decl: Declaration) -> DeclId {
            let id = self.registry.add(decl.in_parent(self.package)).unwrap();
            self.bindings
                .record_file_class(id, FileClassInfo::multifile_part("foo/bar/Utils", "foo/bar/Utils__StringsKt"));
            id
        }

        fn mapper(&self) -> TypeMapper<'_> {
            TypeMapper::new(&self.registry, &self.bindings, MapperConfig::default())
        }
    }

    #[test]
    fn public_functions_use_the_facade() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let public = fx.top_level(Declaration::function("run", CallableData::returning(unit.clone())));
        let private = fx.top_level(
            Declaration::function("hidden", CallableData::returning(unit)).with_visibility(Visibility::Private),
        );
        let mapper = fx.mapper();
        assert_eq!(mapper.map_owner(public).unwrap().internal_name(), "foo/bar/Utils");
        assert_eq!(mapper.map_implementation_owner(public).unwrap().internal_name(), "foo/bar/Utils__StringsKt");
        assert_eq!(mapper.map_owner(private).unwrap().internal_name(), "foo/bar/Utils__StringsKt");
    }

    #[test]
    fn non_const_properties_use_the_file_class() {
        let mut fx = Fixture::new();
        let var = fx.top_level(Declaration::property("counter", PropertyDecl::var(fx.builtins.int_type())));
        let constant = fx.top_level(Declaration::property(
            "LIMIT",
            PropertyDecl::val(fx.builtins.int_type()).as_const(),
        ));
        let mapper = fx.mapper();
        assert_eq!(mapper.map_owner(var).unwrap().internal_name(), "foo/bar/Utils__StringsKt");
        assert_eq!(mapper.map_owner(constant).unwrap().internal_name(), "foo/bar/Utils");
    }

    #[test]
    fn synthetic_accessors_resolve_against_their_callee() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let callee = fx.top_level(Declaration::function("run", CallableData::returning(unit.clone())));
        let accessor = fx
            .registry
            .add(
                Declaration::function("access$run", CallableData::returning(unit))
                    .in_parent(fx.package)
                    .accessor_for(callee),
            )
            .unwrap();
        assert_eq!(fx.mapper().map_owner(accessor).unwrap().internal_name(), "foo/bar/Utils__StringsKt");
    }

    #[test]
    fn binary_members_use_part_mapping() {
        let mut fx = Fixture::new();
        let member = fx
            .registry
            .add(
                Declaration::function("load", CallableData::returning(fx.builtins.unit_type()))
                    .in_parent(fx.package)
                    .with_origin(Origin::Binary),
            )
            .unwrap();
        assert!(matches!(fx.mapper().map_owner(member), Err(MappingError::MissingContainer { .. })));

        fx.bindings
            .record_implementation_part(member, "Io__LoadKt")
            .record_part_facade(fx.package, "Io__LoadKt", "Io");
        let mapper = fx.mapper();
        assert_eq!(mapper.map_owner(member).unwrap().internal_name(), "foo/bar/Io");
        assert_eq!(mapper.map_implementation_owner(member).unwrap().internal_name(), "foo/bar/Io__LoadKt");
        let classes = mapper.containing_classes_for_deserialized(member).unwrap();
        assert_eq!(classes.facade, ClassId::new("foo.bar", "Io"));
        assert_eq!(classes.implementation, ClassId::new("foo.bar", "Io__LoadKt"));
    }

    #[test]
    fn builtin_package_members_use_the_fixed_facade() {
        let mut fx = Fixture::new();
        let member = fx
            .registry
            .add(
                Declaration::function("println", CallableData::returning(fx.builtins.unit_type()))
                    .in_parent(fx.builtins.kotlin)
                    .with_origin(Origin::Builtin),
            )
            .unwrap();
        assert_eq!(fx.mapper().map_owner(member).unwrap().internal_name(), "kotlin/KotlinPackage");
    }

    #[test]
    fn interface_members_are_contained_in_default_impls() {
        let mut fx = Fixture::new();
        let outer = fx
            .registry
            .add(Declaration::class("Outer", ClassDecl::class()).in_parent(fx.package))
            .unwrap();
        let iface = fx
            .registry
            .add(Declaration::class("Shape", ClassDecl::interface()).in_parent(outer))
            .unwrap();
        let member = fx
            .registry
            .add(
                Declaration::function("area", CallableData::returning(fx.builtins.int_type()))
                    .in_parent(iface)
                    .with_origin(Origin::Binary),
            )
            .unwrap();
        let mapper = fx.mapper();
        let classes = mapper.containing_classes_for_deserialized(member).unwrap();
        assert_eq!(classes.implementation.internal_name(), "foo/bar/Outer$Shape$DefaultImpls");
        assert_eq!(mapper.map_owner(member).unwrap().internal_name(), "foo/bar/Outer$Shape");
    }

    #[test]
    fn local_functions_are_owned_by_their_anonymous_class() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let outer = fx.top_level(Declaration::function("run", CallableData::returning(unit.clone())));
        let local = fx
            .registry
            .add(
                Declaration::function("helper", CallableData::returning(unit))
                    .in_parent(outer)
                    .with_flags(DeclFlags::LOCAL),
            )
            .unwrap();
        fx.bindings
            .record_anonymous_type(local, BinaryType::object("foo/bar/Utils__StringsKt$run$1"));
        assert_eq!(
            fx.mapper().map_owner(local).unwrap().internal_name(),
            "foo/bar/Utils__StringsKt$run$1"
        );
    }
}
