//! Type and signature mapping for a type-erased target VM.
//!
//! This crate bundles the workspace:
//!
//! - [`core`] - declarations, semantic types and binary artifacts
//! - [`registry`] - in-memory descriptor graph, binding tables and builtins
//! - [`mapper`] - the [`TypeMapper`](mapper::TypeMapper) and its configuration
//!
//! [`Workspace`] owns a registry with the builtins installed and hands out
//! mappers over it:
//!
//! ```
//! use erasure::prelude::*;
//!
//! let mut workspace = Workspace::new()?;
//! let package = workspace.package("app")?;
//! let int = workspace.builtins().int_type();
//! let class = workspace.add(Declaration::class("Counter", ClassDecl::class()).in_parent(package))?;
//! let next = workspace.add(Declaration::function("next", CallableData::returning(int)).in_parent(class))?;
//!
//! let mapper = workspace.mapper(MapperConfig::new("app"));
//! let method = mapper.map_to_callable_method(next, false)?;
//! assert_eq!(method.owner.internal_name(), "app/Counter");
//! assert_eq!(method.descriptor(), "()I");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod workspace;

pub use erasure_core as core;
pub use erasure_mapper as mapper;
pub use erasure_registry as registry;

pub use workspace::Workspace;

// Re-export main types
pub mod prelude {
    pub use crate::Workspace;
    pub use erasure_core::{
        BinaryType, BinaryVersion, CallableData, CapturedVariable, ClassDecl, ClassKind, Closure, DeclFlags, DeclId,
        Declaration, FileClassInfo, MappingError, Method, Origin, Projection, PropertyDecl, RegistrationError,
        SemType, TypeParameterDecl, ValueParameter, Variance, Visibility,
    };
    pub use erasure_mapper::{
        CallableMethod, ClassBuilderMode, InvokeForm, JvmTarget, MapperConfig, MethodSignature, OwnerKind,
        TypeMapper, TypeMappingMode,
    };
    pub use erasure_registry::{BindingTable, Builtins, DeclarationRegistry, IncompatibleClassLog};
}
