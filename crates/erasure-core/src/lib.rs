//! Core data model of the erasure workspace.
//!
//! This crate defines the resolved, generic, variance-annotated object model
//! the mapper consumes and the erased binary artifacts it produces:
//!
//! - [`DeclId`] - deterministic declaration identity
//! - [`Declaration`] and [`DeclarationKind`] - classes, functions, properties,
//!   accessors, constructors, type parameters and packages
//! - [`SemType`] and [`Projection`] - semantic types with use-site variance
//! - [`Closure`] - captured state of local classes
//! - [`BinaryType`] and [`Method`] - erased types and method descriptors
//! - [`DescriptorGraph`], [`BindingContext`], [`IncompatibilityTracker`] -
//!   read-only collaborators
//! - [`MappingError`] and [`RegistrationError`]

pub mod binary;
mod closure;
mod context;
mod decl_id;
mod declaration;
mod error;
mod primitive;
mod types;
mod variance;
mod visibility;

pub use binary::{
    BinaryType, CONSTRUCTOR_NAME, DEFAULT_IMPLS_SUFFIX, DEFAULT_METHOD_SUFFIX, DELEGATED_FIELD_SUFFIX, Method,
    internal_names,
};
pub use closure::{CaptureStorage, CapturedVariable, Closure};
pub use context::{
    BinaryVersion, BindingContext, CallArgument, ClassId, ContainingClasses, DelegatingCall, DescriptorGraph,
    FileClassInfo, IgnoreIncompatibilities, IncompatibilityTracker,
};
pub use decl_id::{DeclId, id_constants};
pub use declaration::{
    AccessorDecl, Builtin, CallableData, CallableKind, ClassDecl, ClassKind, DeclFlags, Declaration, DeclarationKind,
    Modality, Origin, PackageDecl, PropertyDecl, TypeParameterDecl, ValueParameter,
};
pub use error::{MappingError, RegistrationError};
pub use primitive::PrimitiveKind;
pub use types::{ErrorType, Projection, ProjectionPayload, SemType, TypeConstructor};
pub use variance::{Variance, effective_variance};
pub use visibility::Visibility;
