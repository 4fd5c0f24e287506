//! Binary names of members.
//!
//! Name resolution, first match wins:
//!
//! 1. an explicit platform name (not for foreign declarations)
//! 2. the platform name of an overridden builtin (`size`, `keySet`, `charAt`)
//! 3. property accessors: `getX`/`setX`/`isX`, the bare property name in
//!    annotation classes, `access$` names for synthetic property accessors
//! 4. lambdas: the SAM method name or `invoke`; local functions and
//!    function expressions: `invoke`
//! 5. constructors: `<init>`
//! 6. the declared name, mangled for internal class members and for private
//!    top-level members of multifile facade parts

use erasure_core::{CONSTRUCTOR_NAME, ClassKind, DeclFlags, DeclId, Declaration, DeclarationKind, Origin, Visibility};

use crate::{Result, TypeMapper, special};

const INVOKE: &str = "invoke";
const GET_PREFIX: &str = "get";
const SET_PREFIX: &str = "set";
const IS_PREFIX: &str = "is";
const ACCESSOR_PREFIX: &str = "access$";

impl TypeMapper<'_> {
    /// Binary name of a function, accessor or constructor.
    pub fn map_function_name(&self, member: DeclId) -> Result<String> {
        self.function_name(self.decl(member)?)
    }

    pub(crate) fn function_name(&self, decl: &Declaration) -> Result<String> {
        if decl.origin != Origin::Foreign {
            if let Some(name) = &decl.platform_name {
                return Ok(name.clone());
            }
        }
        if let Some(name) = self.special_builtin_name(decl)? {
            return Ok(name.to_string());
        }

        match &decl.kind {
            DeclarationKind::Getter(accessor) | DeclarationKind::Setter(accessor) => {
                let property_decl = self.decl(accessor.property)?;
                let in_annotation = self
                    .containing_class(property_decl)
                    .is_some_and(|(_, class)| class.kind == ClassKind::AnnotationClass);
                if in_annotation {
                    return Ok(property_decl.name.clone());
                }

                let is_synthetic = property_decl.is_synthetic_accessor();
                let property_name = match property_decl.as_property() {
                    Some(property) if is_synthetic => property.accessor_suffix.as_deref().unwrap_or(&property_decl.name),
                    _ => property_decl.name.as_str(),
                };
                let accessor_name = if matches!(decl.kind, DeclarationKind::Getter(_)) {
                    getter_name(property_name)
                } else {
                    setter_name(property_name)
                };
                let name = if is_synthetic {
                    format!("{ACCESSOR_PREFIX}{accessor_name}")
                } else {
                    accessor_name
                };
                Ok(self.mangle_member_name_if_required(name, decl))
            }
            DeclarationKind::Function(_) if decl.has_flag(DeclFlags::LAMBDA) => Ok(self
                .bindings
                .sam_method_name(decl.id)
                .unwrap_or(INVOKE)
                .to_string()),
            DeclarationKind::Function(_)
                if self.is_local_function(decl) || decl.has_flag(DeclFlags::FUNCTION_EXPRESSION) =>
            {
                Ok(INVOKE.to_string())
            }
            DeclarationKind::Constructor(_) => Ok(CONSTRUCTOR_NAME.to_string()),
            _ => Ok(self.mangle_member_name_if_required(decl.name.clone(), decl)),
        }
    }

    fn mangle_member_name_if_required(&self, name: String, decl: &Declaration) -> String {
        if self.is_top_level(decl) {
            if decl.visibility.is_private() && !decl.is_constructor() && name != "<clinit>" {
                if let Some(info) = self.file_class_info_of(decl) {
                    if info.multifile {
                        return format!("{name}${}", info.file_class_short_name());
                    }
                }
            }
            return name;
        }
        if !decl.is_constructor() && decl.visibility == Visibility::Internal {
            return format!("{name}${}", sanitize_as_java_identifier(&self.config.module_name));
        }
        name
    }

    /// Key of a member in the builtin tables; accessors use their property.
    pub(crate) fn special_member_key(&self, decl: &Declaration) -> Result<String> {
        match decl.as_accessor() {
            Some(accessor) => Ok(self.display_name(self.decl(accessor.property)?)),
            None => Ok(self.display_name(decl)),
        }
    }

    /// Platform name inherited from a builtin somewhere up the override chain.
    fn special_builtin_name(&self, decl: &Declaration) -> Result<Option<&'static str>> {
        if !decl.is_callable() || decl.is_constructor() {
            return Ok(None);
        }
        if let Some(name) = special::special_name(&self.special_member_key(decl)?) {
            return Ok(Some(name));
        }
        for overridden in self.all_overridden(decl)? {
            if let Some(name) = special::special_name(&self.special_member_key(overridden)?) {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }
}

/// Getter name of a property; `isX` properties keep their name.
pub fn getter_name(property_name: &str) -> String {
    if starts_with_is_prefix(property_name) {
        property_name.to_string()
    } else {
        format!("{GET_PREFIX}{}", capitalize_ascii_only(property_name))
    }
}

/// Setter name of a property; `isX` properties become `setX`.
pub fn setter_name(property_name: &str) -> String {
    match property_name.strip_prefix(IS_PREFIX) {
        Some(rest) if starts_with_is_prefix(property_name) => format!("{SET_PREFIX}{rest}"),
        _ => format!("{SET_PREFIX}{}", capitalize_ascii_only(property_name)),
    }
}

fn starts_with_is_prefix(name: &str) -> bool {
    match name.strip_prefix(IS_PREFIX).and_then(|rest| rest.chars().next()) {
        Some(c) => !c.is_ascii_lowercase(),
        None => false,
    }
}

fn capitalize_ascii_only(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

/// Replace every character that is not a letter or digit with `_`.
pub fn sanitize_as_java_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapperConfig;
    use erasure_core::{CallableData, ClassDecl, FileClassInfo, PropertyDecl};
    use erasure_registry::{BindingTable, Builtins, DeclarationRegistry};

    #[test]
    fn accessor_names() {
        assert_eq!(getter_name("name"), "getName");
        assert_eq!(setter_name("name"), "setName");
        assert_eq!(getter_name("isOpen"), "isOpen");
        assert_eq!(setter_name("isOpen"), "setOpen");
        assert_eq!(getter_name("issue"), "getIssue");
        assert_eq!(getter_name("is"), "getIs");
        assert_eq!(getter_name("URL"), "getURL");
        assert_eq!(getter_name("émoji"), "getémoji");
    }

    #[test]
    fn module_names_are_sanitized() {
        assert_eq!(sanitize_as_java_identifier("my-module.main"), "my_module_main");
        assert_eq!(sanitize_as_java_identifier("core"), "core");
    }

    struct Fixture {
        registry: DeclarationRegistry,
        bindings: BindingTable,
        builtins: Builtins,
        package: DeclId,
        class: DeclId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = DeclarationRegistry::new();
            let mut bindings = BindingTable::new();
            let builtins = Builtins::install(&mut registry, &mut bindings).unwrap();
            let package = registry.add(Declaration::package("app")).unwrap();
            let class = registry
                .add(Declaration::class("Widget", ClassDecl::class()).in_parent(package))
                .unwrap();
            Self {
                registry,
                bindings,
                builtins,
                package,
                class,
            }
        }

        fn add(&mut self, decl: Declaration) -> DeclId {
            self.registry.add(decl).unwrap()
        }

        fn name(&self, id: DeclId) -> String {
            TypeMapper::new(&self.registry, &self.bindings, MapperConfig::new("my-module"))
                .map_function_name(id)
                .unwrap()
        }
    }

    #[test]
    fn internal_class_members_get_one_module_suffix() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let f = fx.add(
            Declaration::function("render", CallableData::returning(unit))
                .in_parent(fx.class)
                .with_visibility(Visibility::Internal),
        );
        let ctor = fx.add(
            Declaration::constructor(CallableData::constructor())
                .in_parent(fx.class)
                .with_visibility(Visibility::Internal),
        );
        assert_eq!(fx.name(f), "render$my_module");
        assert_eq!(fx.name(ctor), "<init>");
    }

    #[test]
    fn internal_top_level_members_are_not_mangled() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let f = fx.add(
            Declaration::function("helper", CallableData::returning(unit))
                .in_parent(fx.package)
                .with_visibility(Visibility::Internal),
        );
        assert_eq!(fx.name(f), "helper");
    }

    #[test]
    fn private_members_of_multifile_parts_get_the_part_name() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let f = fx.add(
            Declaration::function("helper", CallableData::returning(unit))
                .in_parent(fx.package)
                .with_visibility(Visibility::Private),
        );
        fx.bindings
            .record_file_class(f, FileClassInfo::multifile_part("app/Utils", "app/Utils__TextKt"));
        assert_eq!(fx.name(f), "helper$Utils__TextKt");
    }

    #[test]
    fn platform_name_wins() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let f = fx.add(
            Declaration::function("render", CallableData::returning(unit))
                .in_parent(fx.class)
                .with_visibility(Visibility::Internal)
                .with_platform_name("draw"),
        );
        assert_eq!(fx.name(f), "draw");
    }

    #[test]
    fn property_accessors() {
        let mut fx = Fixture::new();
        let boolean = fx.builtins.boolean_type();
        let property = fx.add(Declaration::property("isVisible", PropertyDecl::var(boolean.clone())).in_parent(fx.class));
        let getter = fx.add(
            Declaration::getter("isVisible", property, CallableData::returning(boolean.clone())).in_parent(fx.class),
        );
        let setter = fx.add(
            Declaration::setter("isVisible", property, CallableData::returning(fx.builtins.unit_type()))
                .in_parent(fx.class),
        );
        assert_eq!(fx.name(getter), "isVisible");
        assert_eq!(fx.name(setter), "setVisible");
    }

    #[test]
    fn synthetic_property_accessors_use_the_suffix() {
        let mut fx = Fixture::new();
        let int = fx.builtins.int_type();
        let target = fx.add(Declaration::property("count", PropertyDecl::var(int.clone())).in_parent(fx.class));
        let accessor_property = fx.add(
            Declaration::property("count", PropertyDecl::var(int.clone()).with_accessor_suffix("count$p"))
                .with_id(DeclId::from_property(fx.class, "count$accessor"))
                .in_parent(fx.class)
                .accessor_for(target),
        );
        let getter = fx.add(
            Declaration::getter("count", accessor_property, CallableData::returning(int)).in_parent(fx.class),
        );
        assert_eq!(fx.name(getter), "access$getCount$p");
    }

    #[test]
    fn special_builtin_names_follow_overrides() {
        let mut fx = Fixture::new();
        let int = fx.builtins.int_type();
        let to_int = fx.registry.lookup("kotlin.Number.toInt").unwrap();
        let f = fx.add(
            Declaration::function("toInt", CallableData::returning(int.clone()).overriding(to_int)).in_parent(fx.class),
        );
        assert_eq!(fx.name(f), "intValue");

        let size = fx.registry.lookup("kotlin.collections.Collection.<get-size>").unwrap();
        assert_eq!(fx.name(size), "size");
    }

    #[test]
    fn lambdas_and_local_functions_are_invoke() {
        let mut fx = Fixture::new();
        let unit = fx.builtins.unit_type();
        let outer = fx.add(Declaration::function("run", CallableData::returning(unit.clone())).in_parent(fx.package));
        let lambda = fx.add(
            Declaration::function("<anonymous>", CallableData::returning(unit.clone()))
                .in_parent(outer)
                .with_flags(DeclFlags::LAMBDA),
        );
        let sam = fx.add(
            Declaration::function("<anonymous>", CallableData::returning(unit.clone()))
                .in_parent(outer)
                .with_flags(DeclFlags::LAMBDA),
        );
        let local = fx.add(
            Declaration::function("step", CallableData::returning(unit))
                .in_parent(outer)
                .with_flags(DeclFlags::LOCAL),
        );
        fx.bindings.record_sam_method(sam, "run");
        assert_eq!(fx.name(lambda), "invoke");
        assert_eq!(fx.name(sam), "run");
        assert_eq!(fx.name(local), "invoke");
    }
}
