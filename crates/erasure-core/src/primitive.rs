//! Primitive value kinds of the target VM.

use std::fmt;

/// A primitive kind, shared by source-level builtins and the binary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Float,
        PrimitiveKind::Long,
        PrimitiveKind::Double,
    ];

    /// Single-character descriptor (`I`, `Z`, ...).
    pub const fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Internal name of the boxed wrapper class.
    pub const fn wrapper_internal_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java/lang/Boolean",
            PrimitiveKind::Char => "java/lang/Character",
            PrimitiveKind::Byte => "java/lang/Byte",
            PrimitiveKind::Short => "java/lang/Short",
            PrimitiveKind::Int => "java/lang/Integer",
            PrimitiveKind::Float => "java/lang/Float",
            PrimitiveKind::Long => "java/lang/Long",
            PrimitiveKind::Double => "java/lang/Double",
        }
    }

    /// Source-level builtin class name (`Int`, `Boolean`, ...).
    pub const fn builtin_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Int",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Double => "Double",
        }
    }

    /// Internal name of the mutable cell used for captured, reassigned locals.
    pub const fn ref_cell_internal_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "kotlin/jvm/internal/Ref$BooleanRef",
            PrimitiveKind::Char => "kotlin/jvm/internal/Ref$CharRef",
            PrimitiveKind::Byte => "kotlin/jvm/internal/Ref$ByteRef",
            PrimitiveKind::Short => "kotlin/jvm/internal/Ref$ShortRef",
            PrimitiveKind::Int => "kotlin/jvm/internal/Ref$IntRef",
            PrimitiveKind::Float => "kotlin/jvm/internal/Ref$FloatRef",
            PrimitiveKind::Long => "kotlin/jvm/internal/Ref$LongRef",
            PrimitiveKind::Double => "kotlin/jvm/internal/Ref$DoubleRef",
        }
    }

    pub fn from_descriptor(c: char) -> Option<Self> {
        PrimitiveKind::ALL.into_iter().find(|kind| kind.descriptor() == c)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.builtin_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_descriptor(kind.descriptor()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_descriptor('V'), None);
    }

    #[test]
    fn long_is_j() {
        assert_eq!(PrimitiveKind::Long.descriptor(), 'J');
        assert_eq!(PrimitiveKind::Long.wrapper_internal_name(), "java/lang/Long");
    }
}
