//! Signature writer.
//!
//! [`SignatureWriter`] collects two things at once while a method or field is
//! mapped:
//!
//! - the erased parameter and return types, which become the [`Method`]
//!   descriptor
//! - optionally, the generic signature in class-file grammar
//!
//! A writer created with [`SignatureWriter::descriptor_only`] holds no generic
//! buffer at all; every generic write is a no-op and
//! [`SignatureWriter::skips_generic_signature`] lets the type mapper skip the
//! wildcard and bound logic entirely.
//!
//! The generic signature is only kept when something in it cannot be derived
//! from the descriptor (a type variable, a type argument or a formal type
//! parameter).

use erasure_core::{BinaryType, DeclId, Method};

/// Role of a parameter in a method signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Value,
    /// Dispatch receiver passed explicitly (default-bodies containers, accessors).
    This,
    /// Extension receiver.
    Receiver,
    /// Outer instance of an inner or local class.
    Outer,
    /// Enum constant name or ordinal.
    EnumNameOrOrdinal,
    CapturedLocalVariable,
    /// Parameter forwarded to the delegating super constructor.
    SuperCallParam,
    /// Trailing marker of synthetic constructor accessors.
    ConstructorMarker,
}

impl ParameterKind {
    /// Synthetic parameters left out of the generic signature.
    pub fn is_skipped_in_generic_signature(self) -> bool {
        matches!(self, ParameterKind::Outer | ParameterKind::EnumNameOrOrdinal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSignature {
    pub kind: ParameterKind,
    pub binary_type: BinaryType,
}

/// Position of a captured variable among a constructor's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapturedOffset {
    pub variable: DeclId,
    /// Parameter position plus one; slot 0 is the receiver.
    pub slot: usize,
}

/// A method descriptor together with its parameter roles and generic metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub method: Method,
    pub value_parameters: Vec<ParameterSignature>,
    pub generic_signature: Option<String>,
    /// Slots of captured variables, for constructors of local classes.
    pub captured_offsets: Vec<CapturedOffset>,
}

impl MethodSignature {
    pub fn descriptor(&self) -> String {
        self.method.descriptor()
    }

    pub fn name(&self) -> &str {
        &self.method.name
    }

    pub fn return_type(&self) -> &BinaryType {
        &self.method.return_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Formals,
    Parameters,
    Return,
}

#[derive(Debug, Default)]
struct GenericBuffer {
    out: String,
    /// The signature carries information the descriptor lacks.
    needed: bool,
    formals_open: bool,
    /// Position in `out` where the current class bound's content starts.
    class_bound_start: Option<usize>,
    /// The last class bound was empty and no interface bound followed yet.
    root_bound_pending: bool,
    /// Per open class: whether `<` was written.
    arguments_open: Vec<bool>,
    /// Depth of type writing inside a skipped parameter.
    skipping: bool,
}

impl GenericBuffer {
    fn push(&mut self, s: &str) {
        if !self.skipping {
            self.out.push_str(s);
        }
    }

    fn push_char(&mut self, c: char) {
        if !self.skipping {
            self.out.push(c);
        }
    }

    fn flush_root_bound(&mut self) {
        if std::mem::take(&mut self.root_bound_pending) {
            self.out.push_str("Ljava/lang/Object;");
        }
    }

    fn mark_needed(&mut self) {
        if !self.skipping {
            self.needed = true;
        }
    }

    fn open_arguments(&mut self) {
        if let Some(open) = self.arguments_open.last_mut() {
            if !*open {
                *open = true;
                if !self.skipping {
                    self.out.push('<');
                }
            }
        }
    }

    fn close_arguments(&mut self) {
        if let Some(open) = self.arguments_open.last_mut() {
            if *open {
                *open = false;
                if !self.skipping {
                    self.out.push('>');
                }
            }
        }
    }
}

/// Writer for method and field signatures.
#[derive(Debug)]
pub struct SignatureWriter {
    generic: Option<GenericBuffer>,
    section: Section,
    parameters: Vec<ParameterSignature>,
    current_parameter: Option<ParameterKind>,
    return_type: Option<BinaryType>,
}

impl SignatureWriter {
    /// Writer producing a descriptor and a generic signature.
    pub fn new() -> Self {
        Self {
            generic: Some(GenericBuffer::default()),
            section: Section::Formals,
            parameters: Vec::new(),
            current_parameter: None,
            return_type: None,
        }
    }

    /// Writer producing only a descriptor.
    pub fn descriptor_only() -> Self {
        Self {
            generic: None,
            ..Self::new()
        }
    }

    pub fn skips_generic_signature(&self) -> bool {
        self.generic.is_none()
    }

    // === Formal type parameters ===

    pub fn write_formal_type_parameter(&mut self, name: &str) {
        if let Some(g) = &mut self.generic {
            g.flush_root_bound();
            if !g.formals_open {
                g.formals_open = true;
                g.out.push('<');
            }
            g.out.push_str(name);
            g.needed = true;
        }
    }

    pub fn write_class_bound(&mut self) {
        if let Some(g) = &mut self.generic {
            g.out.push(':');
            g.class_bound_start = Some(g.out.len());
        }
    }

    /// Ends the class bound. An empty bound becomes the root class unless an
    /// interface bound follows.
    pub fn write_class_bound_end(&mut self) {
        if let Some(g) = &mut self.generic {
            g.root_bound_pending = g.class_bound_start.take() == Some(g.out.len());
        }
    }

    pub fn write_interface_bound(&mut self) {
        if let Some(g) = &mut self.generic {
            g.root_bound_pending = false;
            g.out.push(':');
        }
    }

    pub fn write_interface_bound_end(&mut self) {}

    // === Parameters and return type ===

    pub fn write_parameters_start(&mut self) {
        self.section = Section::Parameters;
        if let Some(g) = &mut self.generic {
            g.flush_root_bound();
            if g.formals_open {
                g.out.push('>');
            }
            g.out.push('(');
        }
    }

    /// Begins a parameter; the type mapper writes its generic form next.
    pub fn write_parameter_type(&mut self, kind: ParameterKind) {
        self.current_parameter = Some(kind);
        if let Some(g) = &mut self.generic {
            g.skipping = kind.is_skipped_in_generic_signature();
        }
    }

    /// Ends a parameter, recording its erased type.
    pub fn write_parameter_type_end(&mut self, binary_type: BinaryType) {
        let kind = self.current_parameter.take().unwrap_or(ParameterKind::Value);
        self.parameters.push(ParameterSignature { kind, binary_type });
        if let Some(g) = &mut self.generic {
            g.skipping = false;
        }
    }

    /// Writes a complete parameter whose type is already erased.
    pub fn write_parameter(&mut self, kind: ParameterKind, binary_type: BinaryType) {
        self.write_parameter_type(kind);
        self.write_asm_type(&binary_type);
        self.write_parameter_type_end(binary_type);
    }

    pub fn write_return_type(&mut self) {
        self.section = Section::Return;
        if let Some(g) = &mut self.generic {
            g.out.push(')');
        }
    }

    pub fn write_return_type_end(&mut self, binary_type: BinaryType) {
        self.return_type = Some(binary_type);
    }

    pub fn write_void_return(&mut self) {
        self.write_return_type();
        self.write_asm_type(&BinaryType::Void);
        self.write_return_type_end(BinaryType::Void);
    }

    /// Number of parameters written so far.
    pub fn current_signature_size(&self) -> usize {
        self.parameters.len()
    }

    // === Type fragments ===

    /// Writes a type whose generic form equals its descriptor.
    pub fn write_asm_type(&mut self, ty: &BinaryType) {
        if let Some(g) = &mut self.generic {
            g.push(&ty.descriptor());
        }
    }

    pub fn write_class_begin(&mut self, internal_name: &str) {
        if let Some(g) = &mut self.generic {
            g.push_char('L');
            g.push(internal_name);
            g.arguments_open.push(false);
        }
    }

    /// Begins the outermost segment of an inner-class type.
    pub fn write_outer_class_begin(&mut self, outer_internal_name: &str) {
        self.write_class_begin(outer_internal_name);
    }

    pub fn write_inner_class(&mut self, short_name: &str) {
        if let Some(g) = &mut self.generic {
            g.close_arguments();
            g.push_char('.');
            g.push(short_name);
            g.mark_needed();
        }
    }

    pub fn write_class_end(&mut self) {
        if let Some(g) = &mut self.generic {
            g.close_arguments();
            g.arguments_open.pop();
            g.push_char(';');
        }
    }

    /// Begins a type argument; `Out` writes `+`, `In` writes `-`.
    pub fn write_type_argument(&mut self, variance: erasure_core::Variance) {
        if let Some(g) = &mut self.generic {
            g.open_arguments();
            match variance {
                erasure_core::Variance::Out => g.push_char('+'),
                erasure_core::Variance::In => g.push_char('-'),
                erasure_core::Variance::Invariant => {}
            }
            g.mark_needed();
        }
    }

    pub fn write_type_argument_end(&mut self) {}

    pub fn write_unbounded_wildcard(&mut self) {
        if let Some(g) = &mut self.generic {
            g.open_arguments();
            g.push_char('*');
            g.mark_needed();
        }
    }

    pub fn write_type_variable(&mut self, name: &str) {
        if let Some(g) = &mut self.generic {
            g.push_char('T');
            g.push(name);
            g.push_char(';');
            g.mark_needed();
        }
    }

    pub fn write_array_type(&mut self) {
        if let Some(g) = &mut self.generic {
            g.push_char('[');
        }
    }

    pub fn write_array_end(&mut self) {}

    // === Results ===

    /// Generic signature, if one is needed.
    pub fn generic_signature(&self) -> Option<String> {
        self.generic
            .as_ref()
            .filter(|g| g.needed)
            .map(|g| g.out.clone())
    }

    pub fn into_method(self, name: impl Into<String>) -> Method {
        let arguments = self.parameters.into_iter().map(|p| p.binary_type).collect();
        Method::new(name, arguments, self.return_type.unwrap_or(BinaryType::Void))
    }

    pub fn into_method_signature(self, name: impl Into<String>) -> MethodSignature {
        let generic_signature = self.generic_signature();
        let value_parameters = self.parameters.clone();
        let method = self.into_method(name);
        MethodSignature {
            method,
            value_parameters,
            generic_signature,
            captured_offsets: Vec::new(),
        }
    }
}

impl Default for SignatureWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erasure_core::{PrimitiveKind, Variance};

    #[test]
    fn plain_method_needs_no_generic_signature() {
        let mut sw = SignatureWriter::new();
        sw.write_parameters_start();
        sw.write_parameter(ParameterKind::Value, BinaryType::Primitive(PrimitiveKind::Int));
        sw.write_void_return();
        assert_eq!(sw.generic_signature(), None);
        assert_eq!(sw.into_method("f").descriptor(), "(I)V");
    }

    #[test]
    fn formal_parameter_with_empty_class_bound() {
        let mut sw = SignatureWriter::new();
        sw.write_formal_type_parameter("T");
        sw.write_class_bound();
        sw.write_class_bound_end();
        sw.write_parameters_start();
        sw.write_parameter_type(ParameterKind::Value);
        sw.write_type_variable("T");
        sw.write_parameter_type_end(BinaryType::object("java/lang/Object"));
        sw.write_void_return();
        assert_eq!(
            sw.generic_signature().as_deref(),
            Some("<T:Ljava/lang/Object;>(TT;)V")
        );
    }

    #[test]
    fn interface_bound_keeps_class_bound_empty() {
        let mut sw = SignatureWriter::new();
        sw.write_formal_type_parameter("T");
        sw.write_class_bound();
        sw.write_class_bound_end();
        sw.write_interface_bound();
        sw.write_class_begin("java/lang/Comparable");
        sw.write_type_argument(Variance::In);
        sw.write_type_variable("T");
        sw.write_type_argument_end();
        sw.write_class_end();
        sw.write_interface_bound_end();
        sw.write_formal_type_parameter("U");
        sw.write_class_bound();
        sw.write_class_bound_end();
        sw.write_parameters_start();
        sw.write_void_return();
        assert_eq!(
            sw.generic_signature().as_deref(),
            Some("<T::Ljava/lang/Comparable<-TT;>;U:Ljava/lang/Object;>()V")
        );
    }

    #[test]
    fn explicit_this_is_part_of_generic_signature() {
        let mut sw = SignatureWriter::new();
        sw.write_parameters_start();
        sw.write_parameter_type(ParameterKind::This);
        sw.write_class_begin("foo/Box");
        sw.write_type_argument(Variance::Invariant);
        sw.write_type_variable("T");
        sw.write_type_argument_end();
        sw.write_class_end();
        sw.write_parameter_type_end(BinaryType::object("foo/Box"));
        sw.write_void_return();
        assert_eq!(sw.generic_signature().as_deref(), Some("(Lfoo/Box<TT;>;)V"));
    }

    #[test]
    fn nested_arguments_and_inner_classes() {
        let mut sw = SignatureWriter::new();
        sw.write_class_begin("foo/Outer");
        sw.write_type_argument(Variance::Out);
        sw.write_class_begin("java/lang/String");
        sw.write_class_end();
        sw.write_inner_class("Inner");
        sw.write_unbounded_wildcard();
        sw.write_class_end();
        assert_eq!(
            sw.generic_signature().as_deref(),
            Some("Lfoo/Outer<+Ljava/lang/String;>.Inner<*>;")
        );
    }

    #[test]
    fn synthetic_parameters_are_left_out_of_generic_signature() {
        let mut sw = SignatureWriter::new();
        sw.write_parameters_start();
        sw.write_parameter(ParameterKind::Outer, BinaryType::object("foo/Outer"));
        sw.write_parameter_type(ParameterKind::Value);
        sw.write_type_variable("T");
        sw.write_parameter_type_end(BinaryType::object("java/lang/Object"));
        sw.write_void_return();
        let signature = sw.into_method_signature("<init>");
        assert_eq!(signature.generic_signature.as_deref(), Some("(TT;)V"));
        assert_eq!(signature.descriptor(), "(Lfoo/Outer;Ljava/lang/Object;)V");
        assert_eq!(signature.value_parameters[0].kind, ParameterKind::Outer);
    }

    #[test]
    fn descriptor_only_writer_ignores_generic_writes() {
        let mut sw = SignatureWriter::descriptor_only();
        assert!(sw.skips_generic_signature());
        sw.write_formal_type_parameter("T");
        sw.write_parameters_start();
        sw.write_parameter_type(ParameterKind::Value);
        sw.write_type_variable("T");
        sw.write_parameter_type_end(BinaryType::object("java/lang/Object"));
        sw.write_return_type();
        sw.write_return_type_end(BinaryType::Primitive(PrimitiveKind::Boolean));
        assert_eq!(sw.generic_signature(), None);
        assert_eq!(sw.into_method("f").descriptor(), "(Ljava/lang/Object;)Z");
    }
}
