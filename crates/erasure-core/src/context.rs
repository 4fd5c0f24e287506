//! Read-only collaborators consulted by the mapper.
//!
//! The mapper never owns the semantic graph or the compiler's side tables; it
//! borrows them through these traits. All of them require `Sync` so a single
//! mapper can be shared between threads.

use std::fmt;

use crate::{BinaryType, Closure, DeclId, Declaration};

/// Lookup of declarations by identity.
pub trait DescriptorGraph: Sync {
    fn declaration(&self, id: DeclId) -> Option<&Declaration>;
}

/// Where a source top-level member ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassInfo {
    /// Internal name of the public facade class.
    pub facade_internal_name: String,
    /// Internal name of the class compiled from the member's file.
    pub file_class_internal_name: String,
    /// The file is one part of a multifile facade.
    pub multifile: bool,
}

impl FileClassInfo {
    /// Single-file facade: facade and file class coincide.
    pub fn single(internal_name: impl Into<String>) -> Self {
        let internal_name = internal_name.into();
        Self {
            facade_internal_name: internal_name.clone(),
            file_class_internal_name: internal_name,
            multifile: false,
        }
    }

    pub fn multifile_part(facade: impl Into<String>, part: impl Into<String>) -> Self {
        Self {
            facade_internal_name: facade.into(),
            file_class_internal_name: part.into(),
            multifile: true,
        }
    }

    /// File class name without its package.
    pub fn file_class_short_name(&self) -> &str {
        let name = &self.file_class_internal_name;
        name.rsplit('/').next().unwrap_or(name)
    }
}

/// Package plus relative class name, e.g. `foo.bar` / `Outer.Inner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassId {
    pub package: String,
    pub relative_name: String,
}

impl ClassId {
    pub fn new(package: impl Into<String>, relative_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            relative_name: relative_name.into(),
        }
    }

    pub fn internal_name(&self) -> String {
        let relative = self.relative_name.replace('.', "$");
        if self.package.is_empty() {
            relative
        } else {
            format!("{}/{}", self.package.replace('.', "/"), relative)
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.internal_name())
    }
}

/// Facade and implementation classes of a deserialized member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainingClasses {
    pub facade: ClassId,
    pub implementation: ClassId,
}

/// Argument shape of a delegating constructor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArgument {
    Explicit,
    /// Omitted; the default value is used.
    Default,
}

/// A `this(...)` or `super(...)` call made by a constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatingCall {
    pub target: DeclId,
    pub arguments: Vec<CallArgument>,
}

/// Metadata version of a compiled binary container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinaryVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl BinaryVersion {
    /// Version written by this mapper's generation of the toolchain.
    pub const CURRENT: BinaryVersion = BinaryVersion::new(1, 1, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Same major version and not newer than [`Self::CURRENT`].
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major && *self <= Self::CURRENT
    }
}

impl fmt::Display for BinaryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Side tables produced by earlier compiler phases.
pub trait BindingContext: Sync {
    /// Captured state of a local or anonymous class.
    fn closure(&self, class: DeclId) -> Option<&Closure>;

    /// Resolved `getValue`/`setValue` call behind a delegated local accessor.
    fn delegated_accessor_call(&self, accessor: DeclId) -> Option<DeclId>;

    /// Method a lambda implements when converted to a SAM interface.
    fn sam_method_name(&self, lambda: DeclId) -> Option<&str>;

    /// File-class placement of a source top-level member.
    fn file_class_info(&self, member: DeclId) -> Option<&FileClassInfo>;

    /// Implementation part name of a deserialized top-level member.
    fn implementation_part(&self, member: DeclId) -> Option<&str>;

    /// Facade short name of a multifile part in `package`.
    fn facade_for_part(&self, package: DeclId, part: &str) -> Option<&str>;

    /// Precomputed binary type overriding the computed class name.
    fn predefined_type(&self, class: DeclId) -> Option<&BinaryType>;

    /// Generated class of a local/anonymous class, lambda or local function.
    fn anonymous_class_type(&self, declaration: DeclId) -> Option<&BinaryType>;

    /// Delegating constructor call made by `constructor`.
    fn delegating_call(&self, constructor: DeclId) -> Option<&DelegatingCall>;

    /// Metadata version of a deserialized container.
    fn binary_version(&self, container: DeclId) -> Option<BinaryVersion>;
}

/// Sink for binary containers compiled with an incompatible metadata version.
pub trait IncompatibilityTracker: Sync {
    fn record(&self, container_internal_name: &str, version: BinaryVersion);
}

/// Tracker that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreIncompatibilities;

impl IncompatibilityTracker for IgnoreIncompatibilities {
    fn record(&self, _container_internal_name: &str, _version: BinaryVersion) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_id_internal_name() {
        assert_eq!(ClassId::new("foo.bar", "Outer.Inner").internal_name(), "foo/bar/Outer$Inner");
        assert_eq!(ClassId::new("", "Top").internal_name(), "Top");
    }

    #[test]
    fn file_class_short_name() {
        let info = FileClassInfo::multifile_part("foo/Utils", "foo/Utils__StringsKt");
        assert_eq!(info.file_class_short_name(), "Utils__StringsKt");
        assert!(!FileClassInfo::single("FooKt").multifile);
        assert_eq!(FileClassInfo::single("FooKt").file_class_short_name(), "FooKt");
    }

    #[test]
    fn version_compatibility() {
        assert!(BinaryVersion::CURRENT.is_compatible());
        assert!(BinaryVersion::new(1, 0, 3).is_compatible());
        assert!(!BinaryVersion::new(1, 2, 0).is_compatible());
        assert!(!BinaryVersion::new(2, 0, 0).is_compatible());
        assert_eq!(BinaryVersion::new(1, 0, 3).to_string(), "1.0.3");
    }
}
