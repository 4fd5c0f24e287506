//! BindingTable - side tables consulted by the mapper.
//!
//! Holds the facts earlier compiler phases record about declarations:
//! closures of local classes, generated class names, file-class placement of
//! top-level members, multifile part mapping, delegated accessor calls,
//! delegating constructor calls and binary versions of deserialized
//! containers.

use rustc_hash::FxHashMap;

use erasure_core::{
    BinaryType, BinaryVersion, BindingContext, Closure, DeclId, DelegatingCall, FileClassInfo,
};

/// In-memory [`BindingContext`].
#[derive(Debug, Default)]
pub struct BindingTable {
    closures: FxHashMap<DeclId, Closure>,
    delegated_calls: FxHashMap<DeclId, DeclId>,
    sam_methods: FxHashMap<DeclId, String>,
    file_classes: FxHashMap<DeclId, FileClassInfo>,
    implementation_parts: FxHashMap<DeclId, String>,
    /// (package, part short name) -> facade short name.
    part_facades: FxHashMap<(DeclId, String), String>,
    predefined_types: FxHashMap<DeclId, BinaryType>,
    anonymous_types: FxHashMap<DeclId, BinaryType>,
    delegating_calls: FxHashMap<DeclId, DelegatingCall>,
    binary_versions: FxHashMap<DeclId, BinaryVersion>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    // === Recording ===

    pub fn record_closure(&mut self, class: DeclId, closure: Closure) -> &mut Self {
        self.closures.insert(class, closure);
        self
    }

    pub fn record_delegated_call(&mut self, accessor: DeclId, call: DeclId) -> &mut Self {
        self.delegated_calls.insert(accessor, call);
        self
    }

    pub fn record_sam_method(&mut self, lambda: DeclId, method: impl Into<String>) -> &mut Self {
        self.sam_methods.insert(lambda, method.into());
        self
    }

    pub fn record_file_class(&mut self, member: DeclId, info: FileClassInfo) -> &mut Self {
        self.file_classes.insert(member, info);
        self
    }

    /// Record the implementation part of a deserialized top-level member.
    pub fn record_implementation_part(&mut self, member: DeclId, part: impl Into<String>) -> &mut Self {
        self.implementation_parts.insert(member, part.into());
        self
    }

    /// Record that `part` in `package` belongs to the multifile `facade`.
    pub fn record_part_facade(&mut self, package: DeclId, part: impl Into<String>, facade: impl Into<String>) -> &mut Self {
        self.part_facades.insert((package, part.into()), facade.into());
        self
    }

    pub fn record_predefined_type(&mut self, class: DeclId, ty: BinaryType) -> &mut Self {
        self.predefined_types.insert(class, ty);
        self
    }

    pub fn record_anonymous_type(&mut self, declaration: DeclId, ty: BinaryType) -> &mut Self {
        self.anonymous_types.insert(declaration, ty);
        self
    }

    pub fn record_delegating_call(&mut self, constructor: DeclId, call: DelegatingCall) -> &mut Self {
        self.delegating_calls.insert(constructor, call);
        self
    }

    pub fn record_binary_version(&mut self, container: DeclId, version: BinaryVersion) -> &mut Self {
        self.binary_versions.insert(container, version);
        self
    }
}

impl BindingContext for BindingTable {
    fn closure(&self, class: DeclId) -> Option<&Closure> {
        self.closures.get(&class)
    }

    fn delegated_accessor_call(&self, accessor: DeclId) -> Option<DeclId> {
        self.delegated_calls.get(&accessor).copied()
    }

    fn sam_method_name(&self, lambda: DeclId) -> Option<&str> {
        self.sam_methods.get(&lambda).map(String::as_str)
    }

    fn file_class_info(&self, member: DeclId) -> Option<&FileClassInfo> {
        self.file_classes.get(&member)
    }

    fn implementation_part(&self, member: DeclId) -> Option<&str> {
        self.implementation_parts.get(&member).map(String::as_str)
    }

    fn facade_for_part(&self, package: DeclId, part: &str) -> Option<&str> {
        self.part_facades.get(&(package, part.to_string())).map(String::as_str)
    }

    fn predefined_type(&self, class: DeclId) -> Option<&BinaryType> {
        self.predefined_types.get(&class)
    }

    fn anonymous_class_type(&self, declaration: DeclId) -> Option<&BinaryType> {
        self.anonymous_types.get(&declaration)
    }

    fn delegating_call(&self, constructor: DeclId) -> Option<&DelegatingCall> {
        self.delegating_calls.get(&constructor)
    }

    fn binary_version(&self, container: DeclId) -> Option<BinaryVersion> {
        self.binary_versions.get(&container).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_facts_are_visible_through_the_trait() {
        let class = DeclId::from_class("foo.Bar");
        let package = DeclId::from_package("foo");
        let mut table = BindingTable::new();
        table
            .record_anonymous_type(class, BinaryType::object("foo/Bar$1"))
            .record_part_facade(package, "Utils__AKt", "Utils")
            .record_binary_version(class, BinaryVersion::new(1, 0, 3));

        let context: &dyn BindingContext = &table;
        assert_eq!(context.anonymous_class_type(class), Some(&BinaryType::object("foo/Bar$1")));
        assert_eq!(context.facade_for_part(package, "Utils__AKt"), Some("Utils"));
        assert_eq!(context.facade_for_part(package, "Other"), None);
        assert_eq!(context.binary_version(class), Some(BinaryVersion::new(1, 0, 3)));
        assert!(context.closure(class).is_none());
    }
}
