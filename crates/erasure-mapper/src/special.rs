//! Builtin members whose binary shape differs from their declaration.
//!
//! Two fixed tables, keyed by the dotted qualified name of the builtin
//! member (properties by the property name, not the accessor):
//!
//! - [`SPECIAL_NAMES`] - members compiled under a platform name, e.g.
//!   `Map.keys` is `keySet()` and `Number.toInt` is `intValue()`
//! - [`SpecialSignatureTable`] - members whose generic signature takes
//!   `Object` (or a wildcard collection) where the declaration takes the
//!   element type; the erased descriptor is not affected
//!
//! Members that override one of these builtins inherit the special treatment
//! through the override chain.

/// Platform names of builtin members.
pub const SPECIAL_NAMES: &[(&str, &str)] = &[
    ("kotlin.collections.Collection.size", "size"),
    ("kotlin.collections.Map.size", "size"),
    ("kotlin.collections.Map.keys", "keySet"),
    ("kotlin.collections.Map.values", "values"),
    ("kotlin.collections.Map.entries", "entrySet"),
    ("kotlin.collections.MutableList.removeAt", "remove"),
    ("kotlin.CharSequence.length", "length"),
    ("kotlin.CharSequence.get", "charAt"),
    ("kotlin.Number.toByte", "byteValue"),
    ("kotlin.Number.toShort", "shortValue"),
    ("kotlin.Number.toInt", "intValue"),
    ("kotlin.Number.toLong", "longValue"),
    ("kotlin.Number.toFloat", "floatValue"),
    ("kotlin.Number.toDouble", "doubleValue"),
];

/// Platform name of a builtin member, if it has one.
pub fn special_name(qualified_name: &str) -> Option<&'static str> {
    SPECIAL_NAMES
        .iter()
        .find(|(member, _)| *member == qualified_name)
        .map(|(_, name)| *name)
}

const OBJECT: &str = "Ljava/lang/Object;";
const ANY_COLLECTION: &str = "Ljava/util/Collection<+Ljava/lang/Object;>;";

/// One rewritten value parameter of a builtin member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialSignature {
    pub member: &'static str,
    pub parameter: usize,
    pub replacement: &'static str,
}

const fn entry(member: &'static str, parameter: usize, replacement: &'static str) -> SpecialSignature {
    SpecialSignature {
        member,
        parameter,
        replacement,
    }
}

/// Versioned table of rewritten generic signatures.
#[derive(Debug, Clone, Copy)]
pub struct SpecialSignatureTable {
    pub version: u32,
    entries: &'static [SpecialSignature],
}

impl SpecialSignatureTable {
    pub const CURRENT: SpecialSignatureTable = SpecialSignatureTable {
        version: 1,
        entries: &[
            entry("kotlin.collections.Collection.contains", 0, OBJECT),
            entry("kotlin.collections.Collection.containsAll", 0, ANY_COLLECTION),
            entry("kotlin.collections.MutableCollection.remove", 0, OBJECT),
            entry("kotlin.collections.MutableCollection.removeAll", 0, ANY_COLLECTION),
            entry("kotlin.collections.MutableCollection.retainAll", 0, ANY_COLLECTION),
            entry("kotlin.collections.List.indexOf", 0, OBJECT),
            entry("kotlin.collections.List.lastIndexOf", 0, OBJECT),
            entry("kotlin.collections.Map.get", 0, OBJECT),
            entry("kotlin.collections.Map.containsKey", 0, OBJECT),
            entry("kotlin.collections.Map.containsValue", 0, OBJECT),
            entry("kotlin.collections.MutableMap.remove", 0, OBJECT),
        ],
    };

    pub fn entries(&self) -> &'static [SpecialSignature] {
        self.entries
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.iter().any(|e| e.member == qualified_name)
    }

    /// Rewrite the value parameters of `signature` for `qualified_name`.
    ///
    /// Returns `None` when the member is not in the table or the signature
    /// has fewer parameters than an entry refers to.
    pub fn apply(&self, qualified_name: &str, signature: &str) -> Option<String> {
        let replacements: Vec<(usize, &str)> = self
            .entries
            .iter()
            .filter(|e| e.member == qualified_name)
            .map(|e| (e.parameter, e.replacement))
            .collect();
        if replacements.is_empty() {
            return None;
        }
        replace_value_parameters(signature, &replacements)
    }
}

/// Replace parameters of a method generic signature by index.
pub fn replace_value_parameters(signature: &str, replacements: &[(usize, &str)]) -> Option<String> {
    let open = signature.find('(')?;
    let mut ranges = Vec::new();
    let bytes = signature.as_bytes();
    let mut pos = open + 1;
    while bytes.get(pos) != Some(&b')') {
        let end = skip_type(bytes, pos)?;
        ranges.push((pos, end));
        pos = end;
    }

    let mut out = String::with_capacity(signature.len());
    out.push_str(&signature[..=open]);
    for (index, &(start, end)) in ranges.iter().enumerate() {
        match replacements.iter().find(|(i, _)| *i == index) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push_str(&signature[start..end]),
        }
    }
    if replacements.iter().any(|(i, _)| *i >= ranges.len()) {
        return None;
    }
    out.push_str(&signature[pos..]);
    Some(out)
}

/// End of the type signature starting at `pos`.
fn skip_type(bytes: &[u8], pos: usize) -> Option<usize> {
    match *bytes.get(pos)? {
        b'Z' | b'C' | b'B' | b'S' | b'I' | b'J' | b'F' | b'D' | b'V' => Some(pos + 1),
        b'[' => skip_type(bytes, pos + 1),
        b'T' => find_from(bytes, pos, b';').map(|end| end + 1),
        b'L' => {
            let mut depth = 0usize;
            let mut i = pos + 1;
            loop {
                match *bytes.get(i)? {
                    b'<' => depth += 1,
                    b'>' => depth = depth.checked_sub(1)?,
                    b';' if depth == 0 => return Some(i + 1),
                    _ => {}
                }
                i += 1;
            }
        }
        _ => None,
    }
}

fn find_from(bytes: &[u8], start: usize, needle: u8) -> Option<usize> {
    bytes[start..].iter().position(|&b| b == needle).map(|offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_names() {
        assert_eq!(special_name("kotlin.collections.Map.keys"), Some("keySet"));
        assert_eq!(special_name("kotlin.Number.toInt"), Some("intValue"));
        assert_eq!(special_name("kotlin.collections.List.get"), None);
    }

    #[test]
    fn replaces_indexed_parameter_only() {
        let signature = "(TE;ILjava/util/Map<TK;+TV;>;)Z";
        assert_eq!(
            replace_value_parameters(signature, &[(0, OBJECT)]).as_deref(),
            Some("(Ljava/lang/Object;ILjava/util/Map<TK;+TV;>;)Z")
        );
        assert_eq!(
            replace_value_parameters(signature, &[(2, OBJECT)]).as_deref(),
            Some("(TE;ILjava/lang/Object;)Z")
        );
    }

    #[test]
    fn keeps_formal_type_parameters() {
        let signature = "<T:Ljava/lang/Object;>([TT;)V";
        assert_eq!(
            replace_value_parameters(signature, &[(0, OBJECT)]).as_deref(),
            Some("<T:Ljava/lang/Object;>(Ljava/lang/Object;)V")
        );
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert_eq!(replace_value_parameters("()V", &[(0, OBJECT)]), None);
    }

    #[test]
    fn table_lookup() {
        let table = SpecialSignatureTable::CURRENT;
        assert!(table.contains("kotlin.collections.Map.get"));
        assert!(!table.contains("kotlin.collections.List.get"));
        assert_eq!(
            table.apply("kotlin.collections.Collection.containsAll", "(Ljava/util/Collection<+TE;>;)Z").as_deref(),
            Some("(Ljava/util/Collection<+Ljava/lang/Object;>;)Z")
        );
        assert_eq!(table.apply("kotlin.collections.List.get", "(I)TE;"), None);
    }
}
