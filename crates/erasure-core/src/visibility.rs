use std::fmt;

/// Declared visibility of a member or classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Visible inside the declaring module; mangled on the binary level.
    Internal,
    Protected,
    Private,
    /// Declared inside a function body.
    Local,
}

impl Visibility {
    /// `private` in the binary sense. Local declarations are not private.
    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
            Visibility::Local => write!(f, "local"),
        }
    }
}
