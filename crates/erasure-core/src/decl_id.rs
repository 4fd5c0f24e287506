//! Deterministic hash-based declaration identity.
//!
//! Every declaration in the descriptor graph is identified by a [`DeclId`], a
//! 64-bit hash computed from the declaration's qualified name and, for
//! callables, from the identities of its parameter classifiers. Because ids are
//! derived rather than allocated:
//!
//! - a declaration can be referenced before it is registered
//! - repeated runs over the same graph produce the same ids
//! - lookups need a single map keyed by id
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a class, a
//! package and a function sharing a qualified name never collide.
//!
//! # Examples
//!
//! ```
//! use erasure_core::DeclId;
//!
//! let list = DeclId::from_class("kotlin.collections.List");
//! assert_eq!(list, DeclId::from_class("kotlin.collections.List"));
//!
//! let int = DeclId::from_class("kotlin.Int");
//! let long = DeclId::from_class("kotlin.Long");
//! let owner = DeclId::from_class("foo.Bar");
//! assert_ne!(
//!     DeclId::from_member(owner, "f", &[int]),
//!     DeclId::from_member(owner, "f", &[long]),
//! );
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for id computation.
pub mod id_constants {
    /// Separator constant for chained components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for classes, interfaces and objects.
    pub const CLASS: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for packages.
    pub const PACKAGE: u64 = 0x1a095090689d4647;

    /// Domain marker for functions.
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for properties.
    pub const PROPERTY: u64 = 0xd6e8feb86659fd93;

    /// Domain marker for constructors.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for type parameters.
    pub const TYPE_PARAMETER: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for property getters and setters.
    pub const ACCESSOR: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for local declarations (lambdas, local classes).
    pub const LOCAL: u64 = 0xc6a4a7935bd1e995;

    /// Parameter position mixing constants.
    /// Each position gets its own constant so that parameter order matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x0f1e2d3c4b5a6978,
        0x89abcdef01234567,
    ];
}

/// A deterministic 64-bit identity of a declaration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct DeclId(pub u64);

impl DeclId {
    /// Empty/invalid id.
    pub const EMPTY: DeclId = DeclId(0);

    /// Id of a classifier from its dotted qualified name (`pkg.Outer.Inner`).
    #[inline]
    pub fn from_class(qualified_name: &str) -> Self {
        DeclId(id_constants::CLASS ^ xxh64(qualified_name.as_bytes(), 0))
    }

    /// Id of a package from its dotted fully-qualified name.
    #[inline]
    pub fn from_package(fq_name: &str) -> Self {
        DeclId(id_constants::PACKAGE ^ xxh64(fq_name.as_bytes(), 0))
    }

    /// Id of a function.
    ///
    /// `params` are the ids of the parameter classifiers, in order, so that
    /// overloads get distinct ids.
    #[inline]
    pub fn from_member(owner: DeclId, name: &str, params: &[DeclId]) -> Self {
        let seed = id_constants::MEMBER ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        DeclId(mix_params(seed, params))
    }

    /// Id of a property. Properties cannot be overloaded.
    #[inline]
    pub fn from_property(owner: DeclId, name: &str) -> Self {
        DeclId(id_constants::PROPERTY ^ owner.0 ^ xxh64(name.as_bytes(), 0))
    }

    /// Id of a constructor from its owner and parameter classifiers.
    #[inline]
    pub fn from_constructor(owner: DeclId, params: &[DeclId]) -> Self {
        DeclId(mix_params(id_constants::CONSTRUCTOR ^ owner.0, params))
    }

    /// Id of a type parameter declared by `owner`.
    #[inline]
    pub fn from_type_parameter(owner: DeclId, name: &str) -> Self {
        let hash = (id_constants::TYPE_PARAMETER ^ owner.0)
            .wrapping_mul(id_constants::SEP)
            .wrapping_add(xxh64(name.as_bytes(), 0));
        DeclId(hash)
    }

    /// Id of the getter (`is_getter`) or setter of a property.
    #[inline]
    pub fn from_accessor(property: DeclId, is_getter: bool) -> Self {
        let marker = if is_getter { 0x1 } else { 0x2 };
        DeclId((id_constants::ACCESSOR ^ property.0).wrapping_mul(id_constants::SEP) ^ marker)
    }

    /// Id of the `index`-th local declaration named `name` inside `parent`.
    #[inline]
    pub fn from_local(parent: DeclId, name: &str, index: u32) -> Self {
        let seed = id_constants::LOCAL ^ parent.0 ^ xxh64(name.as_bytes(), 0);
        DeclId(seed.wrapping_mul(id_constants::SEP).wrapping_add(index as u64))
    }

    /// Check if this is the empty/invalid id.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params(seed: u64, params: &[DeclId]) -> u64 {
    let mut hash = seed;
    for (i, param) in params.iter().enumerate() {
        let marker = id_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| id_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the mix order-sensitive
        hash = hash.wrapping_mul(id_constants::SEP).wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({:#018x})", self.0)
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
