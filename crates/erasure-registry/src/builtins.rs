//! Builtin declarations.
//!
//! [`Builtins::install`] registers the compiler-provided classifiers (root
//! types, primitives, arrays, strings, collections and function interfaces)
//! together with the collection members whose binary names or generic
//! signatures differ from their source shape. Classes that live in the
//! platform library get a predefined binary type in the binding table.

use erasure_core::{
    BinaryType, Builtin, CallableData, ClassDecl, ClassKind, DeclId, Declaration, Modality, Origin, PrimitiveKind,
    Projection, PropertyDecl, RegistrationError, SemType, TypeParameterDecl, ValueParameter, Variance,
};

use crate::{BindingTable, DeclarationRegistry};

type Result<T> = std::result::Result<T, RegistrationError>;

/// Ids of the builtin declarations.
#[derive(Debug, Clone)]
pub struct Builtins {
    pub kotlin: DeclId,
    pub collections: DeclId,
    pub any: DeclId,
    pub nothing: DeclId,
    pub unit: DeclId,
    pub string: DeclId,
    pub char_sequence: DeclId,
    pub number: DeclId,
    pub comparable: DeclId,
    pub array: DeclId,
    pub iterable: DeclId,
    pub collection: DeclId,
    pub mutable_collection: DeclId,
    pub list: DeclId,
    pub mutable_list: DeclId,
    pub set: DeclId,
    pub map: DeclId,
    pub mutable_map: DeclId,
}

impl Builtins {
    /// Number of `FunctionN` interfaces registered, `Function0` onwards.
    pub const FUNCTION_ARITIES: u8 = 3;

    /// Register all builtins into `registry` and their binary types into
    /// `bindings`.
    pub fn install(registry: &mut DeclarationRegistry, bindings: &mut BindingTable) -> Result<Self> {
        let mut installer = Installer { registry, bindings };

        let kotlin = installer.package("kotlin")?;
        let collections = installer.package("kotlin.collections")?;

        // === Root types ===
        let any = installer.class(
            kotlin,
            "Any",
            ClassDecl::class().as_open().as_builtin(Builtin::Any),
            Some("java/lang/Object"),
        )?;
        let nothing = installer.class(kotlin, "Nothing", ClassDecl::class().as_builtin(Builtin::Nothing), None)?;
        let unit = installer.class(
            kotlin,
            "Unit",
            ClassDecl::new(ClassKind::Object).as_builtin(Builtin::Unit),
            None,
        )?;

        let comparable = installer.class(kotlin, "Comparable", ClassDecl::interface(), Some("java/lang/Comparable"))?;
        installer.type_parameter(comparable, "T", Variance::In)?;

        let char_sequence = installer.class(
            kotlin,
            "CharSequence",
            ClassDecl::interface(),
            Some("java/lang/CharSequence"),
        )?;
        let int = DeclId::from_class("kotlin.Int");
        let char = DeclId::from_class("kotlin.Char");
        installer.val(char_sequence, "length", SemType::class(int))?;
        installer.function(
            char_sequence,
            "get",
            vec![("index", SemType::class(int))],
            SemType::class(char),
        )?;

        let number = installer.class(
            kotlin,
            "Number",
            ClassDecl::class().with_modality(Modality::Abstract),
            Some("java/lang/Number"),
        )?;

        let string = installer.class(
            kotlin,
            "String",
            ClassDecl::class()
                .as_builtin(Builtin::String)
                .with_supertype(SemType::generic(comparable, vec![Projection::invariant(SemType::class(DeclId::from_class("kotlin.String")))]))
                .with_supertype(SemType::class(char_sequence)),
            Some("java/lang/String"),
        )?;

        // === Primitives ===
        for kind in PrimitiveKind::ALL {
            let id = DeclId::from_class(&format!("kotlin.{}", kind.builtin_name()));
            let mut class = ClassDecl::class()
                .as_builtin(Builtin::Primitive(kind))
                .with_supertype(SemType::generic(comparable, vec![Projection::invariant(SemType::class(id))]));
            if !matches!(kind, PrimitiveKind::Boolean | PrimitiveKind::Char) {
                class = class.with_supertype(SemType::class(number));
            }
            installer.class(kotlin, kind.builtin_name(), class, Some(kind.wrapper_internal_name()))?;

            let array_name = format!("{}Array", kind.builtin_name());
            let array_descriptor = format!("[{}", kind.descriptor());
            installer.class(
                kotlin,
                &array_name,
                ClassDecl::class().as_builtin(Builtin::PrimitiveArray(kind)),
                Some(&array_descriptor),
            )?;
        }
        for kind in [
            PrimitiveKind::Int,
            PrimitiveKind::Long,
            PrimitiveKind::Short,
            PrimitiveKind::Byte,
            PrimitiveKind::Double,
            PrimitiveKind::Float,
        ] {
            let name = format!("to{}", kind.builtin_name());
            let result = SemType::class(DeclId::from_class(&format!("kotlin.{}", kind.builtin_name())));
            installer.function(number, &name, Vec::new(), result)?;
        }

        let array = installer.class(kotlin, "Array", ClassDecl::class().as_builtin(Builtin::Array), None)?;
        installer.type_parameter(array, "T", Variance::Invariant)?;

        // === Function types ===
        for arity in 0..Self::FUNCTION_ARITIES {
            let name = format!("Function{arity}");
            let internal = format!("kotlin/jvm/functions/{name}");
            let function = installer.class(
                kotlin,
                &name,
                ClassDecl::interface().as_builtin(Builtin::Function(arity)),
                Some(&internal),
            )?;
            for p in 1..=arity {
                installer.type_parameter(function, &format!("P{p}"), Variance::In)?;
            }
            installer.type_parameter(function, "R", Variance::Out)?;
        }

        // === Collections ===
        let boolean = SemType::class(DeclId::from_class("kotlin.Boolean"));

        let iterable = installer.class(collections, "Iterable", ClassDecl::interface(), Some("java/lang/Iterable"))?;
        installer.type_parameter(iterable, "T", Variance::Out)?;

        let collection = installer.class(collections, "Collection", ClassDecl::interface(), Some("java/util/Collection"))?;
        let collection_e = installer.type_parameter(collection, "E", Variance::Out)?;
        installer.supertypes(collection, vec![generic(iterable, collection_e)])?;
        installer.val(collection, "size", SemType::class(int))?;
        installer.function(
            collection,
            "contains",
            vec![("element", SemType::type_parameter(collection_e))],
            boolean.clone(),
        )?;
        installer.function(
            collection,
            "containsAll",
            vec![("elements", SemType::generic(collection, vec![Projection::invariant(SemType::type_parameter(collection_e))]))],
            boolean.clone(),
        )?;

        let mutable_collection = installer.class(
            collections,
            "MutableCollection",
            ClassDecl::interface(),
            Some("java/util/Collection"),
        )?;
        let mutable_collection_e = installer.type_parameter(mutable_collection, "E", Variance::Invariant)?;
        installer.supertypes(mutable_collection, vec![generic(collection, mutable_collection_e)])?;
        installer.function(
            mutable_collection,
            "remove",
            vec![("element", SemType::type_parameter(mutable_collection_e))],
            boolean.clone(),
        )?;
        for name in ["removeAll", "retainAll"] {
            installer.function(
                mutable_collection,
                name,
                vec![(
                    "elements",
                    SemType::generic(collection, vec![Projection::invariant(SemType::type_parameter(mutable_collection_e))]),
                )],
                boolean.clone(),
            )?;
        }

        let list = installer.class(collections, "List", ClassDecl::interface(), Some("java/util/List"))?;
        let list_e = installer.type_parameter(list, "E", Variance::Out)?;
        installer.supertypes(list, vec![generic(collection, list_e)])?;
        installer.function(list, "get", vec![("index", SemType::class(int))], SemType::type_parameter(list_e))?;
        for name in ["indexOf", "lastIndexOf"] {
            installer.function(
                list,
                name,
                vec![("element", SemType::type_parameter(list_e))],
                SemType::class(int),
            )?;
        }

        let mutable_list = installer.class(collections, "MutableList", ClassDecl::interface(), Some("java/util/List"))?;
        let mutable_list_e = installer.type_parameter(mutable_list, "E", Variance::Invariant)?;
        installer.supertypes(
            mutable_list,
            vec![
                generic(list, mutable_list_e),
                generic(mutable_collection, mutable_list_e),
            ],
        )?;
        installer.function(
            mutable_list,
            "removeAt",
            vec![("index", SemType::class(int))],
            SemType::type_parameter(mutable_list_e),
        )?;

        let set = installer.class(collections, "Set", ClassDecl::interface(), Some("java/util/Set"))?;
        let set_e = installer.type_parameter(set, "E", Variance::Out)?;
        installer.supertypes(set, vec![generic(collection, set_e)])?;

        let map = installer.class(collections, "Map", ClassDecl::interface(), Some("java/util/Map"))?;
        let map_k = installer.type_parameter(map, "K", Variance::Invariant)?;
        let map_v = installer.type_parameter(map, "V", Variance::Out)?;
        installer.val(map, "size", SemType::class(int))?;
        installer.val(
            map,
            "keys",
            SemType::generic(set, vec![Projection::invariant(SemType::type_parameter(map_k))]),
        )?;
        installer.val(
            map,
            "values",
            SemType::generic(collection, vec![Projection::invariant(SemType::type_parameter(map_v))]),
        )?;
        installer.val(map, "entries", SemType::generic(set, vec![Projection::star()]))?;
        installer.function(
            map,
            "get",
            vec![("key", SemType::type_parameter(map_k))],
            SemType::type_parameter(map_v).nullable(),
        )?;
        installer.function(map, "containsKey", vec![("key", SemType::type_parameter(map_k))], boolean.clone())?;
        installer.function(map, "containsValue", vec![("value", SemType::type_parameter(map_v))], boolean)?;

        let mutable_map = installer.class(collections, "MutableMap", ClassDecl::interface(), Some("java/util/Map"))?;
        let mutable_map_k = installer.type_parameter(mutable_map, "K", Variance::Invariant)?;
        let mutable_map_v = installer.type_parameter(mutable_map, "V", Variance::Invariant)?;
        installer.supertypes(
            mutable_map,
            vec![SemType::generic(
                map,
                vec![
                    Projection::invariant(SemType::type_parameter(mutable_map_k)),
                    Projection::invariant(SemType::type_parameter(mutable_map_v)),
                ],
            )],
        )?;
        installer.function(
            mutable_map,
            "remove",
            vec![("key", SemType::type_parameter(mutable_map_k))],
            SemType::type_parameter(mutable_map_v).nullable(),
        )?;

        Ok(Self {
            kotlin,
            collections,
            any,
            nothing,
            unit,
            string,
            char_sequence,
            number,
            comparable,
            array,
            iterable,
            collection,
            mutable_collection,
            list,
            mutable_list,
            set,
            map,
            mutable_map,
        })
    }

    // === Ids ===

    pub fn primitive(&self, kind: PrimitiveKind) -> DeclId {
        DeclId::from_class(&format!("kotlin.{}", kind.builtin_name()))
    }

    pub fn primitive_array(&self, kind: PrimitiveKind) -> DeclId {
        DeclId::from_class(&format!("kotlin.{}Array", kind.builtin_name()))
    }

    pub fn function(&self, arity: u8) -> DeclId {
        DeclId::from_class(&format!("kotlin.Function{arity}"))
    }

    // === Types ===

    pub fn any_type(&self) -> SemType {
        SemType::class(self.any)
    }

    pub fn nullable_any_type(&self) -> SemType {
        SemType::class(self.any).nullable()
    }

    pub fn nothing_type(&self) -> SemType {
        SemType::class(self.nothing)
    }

    pub fn unit_type(&self) -> SemType {
        SemType::class(self.unit)
    }

    pub fn string_type(&self) -> SemType {
        SemType::class(self.string)
    }

    pub fn int_type(&self) -> SemType {
        self.primitive_type(PrimitiveKind::Int)
    }

    pub fn boolean_type(&self) -> SemType {
        self.primitive_type(PrimitiveKind::Boolean)
    }

    pub fn primitive_type(&self, kind: PrimitiveKind) -> SemType {
        SemType::class(self.primitive(kind))
    }

    pub fn array_of(&self, element: Projection) -> SemType {
        SemType::generic(self.array, vec![element])
    }

    pub fn list_of(&self, element: SemType) -> SemType {
        SemType::generic(self.list, vec![Projection::invariant(element)])
    }

    pub fn mutable_list_of(&self, element: SemType) -> SemType {
        SemType::generic(self.mutable_list, vec![Projection::invariant(element)])
    }

    pub fn collection_of(&self, element: SemType) -> SemType {
        SemType::generic(self.collection, vec![Projection::invariant(element)])
    }

    pub fn map_of(&self, key: SemType, value: SemType) -> SemType {
        SemType::generic(self.map, vec![Projection::invariant(key), Projection::invariant(value)])
    }

    pub fn comparable_of(&self, projection: Projection) -> SemType {
        SemType::generic(self.comparable, vec![projection])
    }
}

/// `Base<P>` where `P` is a type parameter of the subtype.
fn generic(base: DeclId, argument: DeclId) -> SemType {
    SemType::generic(base, vec![Projection::invariant(SemType::type_parameter(argument))])
}

struct Installer<'a> {
    registry: &'a mut DeclarationRegistry,
    bindings: &'a mut BindingTable,
}

impl Installer<'_> {
    fn package(&mut self, fq_name: &str) -> Result<DeclId> {
        self.registry
            .add(Declaration::package(fq_name).with_origin(Origin::Builtin))
    }

    fn class(&mut self, package: DeclId, name: &str, class: ClassDecl, predefined: Option<&str>) -> Result<DeclId> {
        let id = self.registry.add(
            Declaration::class(name, class)
                .in_parent(package)
                .with_origin(Origin::Builtin),
        )?;
        if let Some(internal_name) = predefined {
            let ty = if let Some(descriptor) = internal_name.strip_prefix('[') {
                let kind = descriptor.chars().next().and_then(PrimitiveKind::from_descriptor);
                match kind {
                    Some(kind) => BinaryType::array_of(BinaryType::Primitive(kind)),
                    None => BinaryType::object(internal_name),
                }
            } else {
                BinaryType::object(internal_name)
            };
            self.bindings.record_predefined_type(id, ty);
        }
        Ok(id)
    }

    fn type_parameter(&mut self, owner: DeclId, name: &str, variance: Variance) -> Result<DeclId> {
        self.registry.add(
            Declaration::type_parameter(name, TypeParameterDecl::new(variance))
                .in_parent(owner)
                .with_origin(Origin::Builtin),
        )
    }

    fn supertypes(&mut self, class: DeclId, supertypes: Vec<SemType>) -> Result<()> {
        let decl = self
            .registry
            .get_mut(class)
            .ok_or(RegistrationError::UnknownReference {
                name: "supertypes".to_string(),
                id: class,
            })?;
        if let erasure_core::DeclarationKind::Class(data) = &mut decl.kind {
            data.supertypes = supertypes;
        }
        Ok(())
    }

    fn function(&mut self, owner: DeclId, name: &str, params: Vec<(&str, SemType)>, result: SemType) -> Result<DeclId> {
        let mut callable = CallableData::returning(result);
        for (param_name, ty) in params {
            callable = callable.with_parameter(ValueParameter::new(param_name, ty));
        }
        self.registry.add(
            Declaration::function(name, callable)
                .in_parent(owner)
                .with_origin(Origin::Builtin),
        )
    }

    /// Register a `val` with its getter; returns the property id.
    fn val(&mut self, owner: DeclId, name: &str, ty: SemType) -> Result<DeclId> {
        let property = self.registry.add(
            Declaration::property(name, PropertyDecl::val(ty.clone()))
                .in_parent(owner)
                .with_origin(Origin::Builtin),
        )?;
        self.registry.add(
            Declaration::getter(name, property, CallableData::returning(ty))
                .in_parent(owner)
                .with_origin(Origin::Builtin),
        )?;
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erasure_core::{BindingContext, DescriptorGraph};

    fn install() -> (DeclarationRegistry, BindingTable, Builtins) {
        let mut registry = DeclarationRegistry::new();
        let mut bindings = BindingTable::new();
        let builtins = Builtins::install(&mut registry, &mut bindings).unwrap();
        (registry, bindings, builtins)
    }

    #[test]
    fn builtins_validate() {
        let (registry, _, _) = install();
        registry.validate().unwrap();
    }

    #[test]
    fn ids_follow_qualified_names() {
        let (registry, _, builtins) = install();
        assert_eq!(registry.lookup("kotlin.collections.List"), Some(builtins.list));
        assert_eq!(registry.lookup("kotlin.Int"), Some(builtins.primitive(PrimitiveKind::Int)));
        assert!(registry.lookup("kotlin.collections.Map.get").is_some());
        assert!(registry.lookup("kotlin.collections.Collection.size.<get-size>").is_none());
        assert!(registry.lookup("kotlin.collections.Collection.<get-size>").is_some());
    }

    #[test]
    fn platform_classes_have_predefined_types() {
        let (_, bindings, builtins) = install();
        assert_eq!(bindings.predefined_type(builtins.any), Some(&BinaryType::object("java/lang/Object")));
        assert_eq!(bindings.predefined_type(builtins.mutable_list), Some(&BinaryType::object("java/util/List")));
        assert_eq!(
            bindings.predefined_type(builtins.primitive_array(PrimitiveKind::Long)),
            Some(&BinaryType::array_of(BinaryType::Primitive(PrimitiveKind::Long)))
        );
        assert_eq!(bindings.predefined_type(builtins.unit), None);
    }

    #[test]
    fn collection_variance() {
        let (registry, _, builtins) = install();
        let list = registry.declaration(builtins.list).unwrap().as_class().unwrap();
        let e = registry.declaration(list.type_parameters[0]).unwrap();
        assert_eq!(e.as_type_parameter().unwrap().variance, Variance::Out);
        let map = registry.declaration(builtins.map).unwrap().as_class().unwrap();
        assert_eq!(map.type_parameters.len(), 2);
    }
}
