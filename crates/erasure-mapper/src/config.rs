//! Mapper configuration.

/// Bytecode target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JvmTarget {
    #[default]
    Jvm6,
    Jvm8,
}

impl JvmTarget {
    /// Interfaces may carry method bodies natively.
    pub fn supports_interface_default_methods(self) -> bool {
        self == JvmTarget::Jvm8
    }
}

/// What the class builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassBuilderMode {
    /// Full classes with method bodies.
    #[default]
    Full,
    /// Signatures only; unresolved types are tolerated.
    LightClasses,
}

impl ClassBuilderMode {
    pub fn generate_bodies(self) -> bool {
        self == ClassBuilderMode::Full
    }
}

/// Configuration of a [`TypeMapper`](crate::TypeMapper).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Name of the module being compiled; mangles internal members.
    pub module_name: String,
    pub target: JvmTarget,
    pub mode: ClassBuilderMode,
    /// Cache computed class internal names per declaration.
    pub cache_class_names: bool,
}

impl MapperConfig {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            target: JvmTarget::default(),
            mode: ClassBuilderMode::default(),
            cache_class_names: false,
        }
    }

    pub fn with_target(mut self, target: JvmTarget) -> Self {
        self.target = target;
        self
    }

    /// Produce signatures only.
    pub fn signatures_only(mut self) -> Self {
        self.mode = ClassBuilderMode::LightClasses;
        self
    }

    pub fn with_class_name_cache(mut self) -> Self {
        self.cache_class_names = true;
        self
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new("main")
    }
}
