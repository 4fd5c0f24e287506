//! Captured state of local and anonymous classes.

use crate::{DeclId, SemType};

/// How a captured variable reaches the closure's constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureStorage {
    /// Passed as its own erased type.
    Value,
    /// Reassigned after capture; passed wrapped in a shared mutable cell.
    SharedCell,
    /// A captured local function; passed as its anonymous class instance.
    LocalFunction,
    /// Delegated local; not passed through the constructor.
    Delegated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedVariable {
    pub variable: DeclId,
    /// Declared type of the variable. Absent for local functions.
    pub ty: Option<SemType>,
    pub storage: CaptureStorage,
}

impl CapturedVariable {
    pub fn value(variable: DeclId, ty: SemType) -> Self {
        Self {
            variable,
            ty: Some(ty),
            storage: CaptureStorage::Value,
        }
    }

    pub fn shared(variable: DeclId, ty: SemType) -> Self {
        Self {
            variable,
            ty: Some(ty),
            storage: CaptureStorage::SharedCell,
        }
    }

    pub fn local_function(function: DeclId) -> Self {
        Self {
            variable: function,
            ty: None,
            storage: CaptureStorage::LocalFunction,
        }
    }

    pub fn delegated(variable: DeclId) -> Self {
        Self {
            variable,
            ty: None,
            storage: CaptureStorage::Delegated,
        }
    }
}

/// Everything a local or anonymous class captures from its context.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Closure {
    /// Captured variables in capture order.
    pub captured: Vec<CapturedVariable>,
    /// Class whose instance is captured as the outer `this`.
    pub outer_instance: Option<DeclId>,
    /// Type of a captured extension receiver.
    pub captured_receiver: Option<SemType>,
}

impl Closure {
    pub fn with_captured(mut self, variable: CapturedVariable) -> Self {
        self.captured.push(variable);
        self
    }

    pub fn with_outer(mut self, outer: DeclId) -> Self {
        self.outer_instance = Some(outer);
        self
    }

    pub fn with_receiver(mut self, receiver: SemType) -> Self {
        self.captured_receiver = Some(receiver);
        self
    }
}
