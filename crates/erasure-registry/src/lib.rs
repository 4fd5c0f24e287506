//! In-memory descriptor graph and binding tables.
//!
//! - [`DeclarationRegistry`] - declarations by id, implements
//!   [`DescriptorGraph`](erasure_core::DescriptorGraph)
//! - [`BindingTable`] - compiler side tables, implements
//!   [`BindingContext`](erasure_core::BindingContext)
//! - [`Builtins`] - builtin classifiers and collection members
//! - [`IncompatibleClassLog`] - collects incompatible binary containers

mod bindings;
mod builtins;
mod registry;
mod tracker;

pub use bindings::BindingTable;
pub use builtins::Builtins;
pub use registry::DeclarationRegistry;
pub use tracker::{IncompatibleClass, IncompatibleClassLog};
