//! Type and signature mapping for a type-erased target VM.
//!
//! [`TypeMapper`] turns declarations of a resolved, generic descriptor graph
//! into what a class-file writer needs:
//!
//! - erased [`BinaryType`](erasure_core::BinaryType)s and generic signature
//!   fragments of semantic types
//! - binary member names, including accessor naming and name mangling
//! - owner classes of members and the call target of a call site
//!   ([`CallableMethod`])
//! - full method signatures with synthetic parameters, `$default` stubs and
//!   field signatures
//!
//! # Example
//!
//! ```
//! use erasure_core::{CallableData, ClassDecl, Declaration, ValueParameter};
//! use erasure_mapper::{MapperConfig, OwnerKind, TypeMapper};
//! use erasure_registry::{BindingTable, Builtins, DeclarationRegistry};
//!
//! let mut registry = DeclarationRegistry::new();
//! let mut bindings = BindingTable::new();
//! let builtins = Builtins::install(&mut registry, &mut bindings)?;
//! let package = registry.add(Declaration::package("app"))?;
//! let class = registry.add(Declaration::class("Greeter", ClassDecl::class()).in_parent(package))?;
//! let greet = registry.add(
//!     Declaration::function(
//!         "greet",
//!         CallableData::returning(builtins.unit_type())
//!             .with_parameter(ValueParameter::new("names", builtins.list_of(builtins.string_type()))),
//!     )
//!     .in_parent(class),
//! )?;
//!
//! let mapper = TypeMapper::new(&registry, &bindings, MapperConfig::new("app"));
//! let signature = mapper.map_signature_with_generic(greet, OwnerKind::Implementation)?;
//! assert_eq!(signature.descriptor(), "(Ljava/util/List;)V");
//! assert_eq!(
//!     signature.generic_signature.as_deref(),
//!     Some("(Ljava/util/List<Ljava/lang/String;>;)V")
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod dispatch;
mod mapper;
mod mode;
mod naming;
mod owner;
mod signature;
pub mod special;
mod type_mapper;
mod writer;

pub use config::{ClassBuilderMode, JvmTarget, MapperConfig};
pub use dispatch::{CallableMethod, InvokeForm};
pub use mapper::TypeMapper;
pub use mode::{MappingPosition, ModeFlags, TypeMappingMode};
pub use naming::{getter_name, sanitize_as_java_identifier, setter_name};
pub use signature::OwnerKind;
pub use special::{SPECIAL_NAMES, SpecialSignatureTable};
pub use writer::{CapturedOffset, MethodSignature, ParameterKind, ParameterSignature, SignatureWriter};

pub use erasure_core::MappingError;

/// Result type of mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;
