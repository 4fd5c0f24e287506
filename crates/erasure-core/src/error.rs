//! Error types of the mapping workspace.
//!
//! ## Error Hierarchy
//!
//! ```text
//! MappingError       - fatal failures while mapping types, owners and signatures
//! RegistrationError  - malformed declarations rejected by a registry
//! ```
//!
//! Binary-version incompatibilities are not errors: they are recorded on an
//! [`IncompatibilityTracker`](crate::IncompatibilityTracker) and mapping
//! continues.

use thiserror::Error;

use crate::DeclId;

// ============================================================================
// Mapping Errors
// ============================================================================

/// Fatal errors raised by the mapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// An unresolved type reached signature generation while method bodies
    /// are being generated.
    #[error("unresolved type `{text}` in {declaration}{}", describe_context(.declaration_source, .parent, .parent_source))]
    UnresolvedType {
        /// Rendered text of the unresolved reference.
        text: String,
        /// Declaration in which the reference appeared.
        declaration: String,
        /// Source text of that declaration.
        declaration_source: Option<String>,
        /// Name of the containing declaration.
        parent: Option<String>,
        /// Source text of the containing declaration.
        parent_source: Option<String>,
    },

    /// A top-level member has no facade or implementation class.
    #[error("no container class found for `{member}`: {detail}")]
    MissingContainer { member: String, detail: String },

    /// A member is contained in a declaration that cannot own it.
    #[error("unsupported owner of `{member}`: {owner_kind}")]
    UnsupportedOwner { member: String, owner_kind: &'static str },

    /// A type-parameter bound or type head has an unknown classifier.
    #[error("unknown classifier `{name}`")]
    UnknownClassifier { name: String },

    /// An id that is not present in the descriptor graph.
    #[error("unknown declaration {id}")]
    UnknownDeclaration { id: DeclId },

    /// A fake override without overridden members.
    #[error("fake override `{member}` has no overridden members")]
    MalformedOverride { member: String },

    /// A fact the binding context must provide is absent.
    #[error("missing {what} for `{declaration}`")]
    MissingBinding { what: &'static str, declaration: String },

    /// Argument count does not match the classifier's parameters.
    #[error("`{type_name}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        type_name: String,
        expected: usize,
        found: usize,
    },
}

fn describe_context(declaration_source: &Option<String>, parent: &Option<String>, parent_source: &Option<String>) -> String {
    let mut out = String::new();
    if let Some(source) = declaration_source {
        out.push_str(&format!("\n  declaration: {source}"));
    }
    if let Some(parent) = parent {
        out.push_str(&format!("\n  in {parent}"));
    }
    if let Some(parent_source) = parent_source {
        out.push_str(&format!("\n  parent: {parent_source}"));
    }
    out
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while building a descriptor graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two declarations share an id.
    #[error("duplicate declaration `{name}` ({id})")]
    DuplicateDeclaration { name: String, id: DeclId },

    /// The containing declaration is not registered.
    #[error("parent {parent} of `{name}` is not registered")]
    UnknownParent { name: String, parent: DeclId },

    /// A declaration refers to an id that was never registered.
    #[error("`{name}` refers to unregistered declaration {id}")]
    UnknownReference { name: String, id: DeclId },

    /// A member cannot be declared inside this kind of declaration.
    #[error("`{name}` cannot be declared inside a {parent_kind}")]
    InvalidParent { name: String, parent_kind: &'static str },

    /// A fake override without overridden members.
    #[error("fake override `{name}` has no overridden members")]
    FakeOverrideWithoutOverridden { name: String },

    /// The override graph contains a cycle.
    #[error("override cycle through `{name}`")]
    OverrideCycle { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_type_message_includes_context() {
        let err = MappingError::UnresolvedType {
            text: "Foo".to_string(),
            declaration: "bar".to_string(),
            declaration_source: Some("fun bar(): Foo".to_string()),
            parent: Some("Baz".to_string()),
            parent_source: None,
        };
        let message = err.to_string();
        assert!(message.starts_with("unresolved type `Foo` in bar"));
        assert!(message.contains("declaration: fun bar(): Foo"));
        assert!(message.contains("in Baz"));
        assert!(!message.contains("parent:"));
    }

    #[test]
    fn arity_message() {
        let err = MappingError::ArityMismatch {
            type_name: "Array".to_string(),
            expected: 1,
            found: 0,
        };
        assert_eq!(err.to_string(), "`Array` expects 1 type argument(s), found 0");
    }
}
