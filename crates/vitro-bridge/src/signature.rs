//! Normalized method signatures and the naming rules they obey.
//!
//! Exported names are wire-visible and start with an uppercase letter;
//! script names lower exactly the first character (`FooBar` → `fooBar`).
//! Binding names become script globals, so they must be identifiers.

/// Normalized description of one exported method.
///
/// Built once at bind time from the target's capability table and read-only
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    exported: String,
    script: String,
    params: Vec<&'static str>,
}

impl MethodSignature {
    pub(crate) fn new(exported: &str, params: Vec<&'static str>) -> Self {
        Self {
            exported: exported.to_owned(),
            script: script_name(exported),
            params,
        }
    }

    /// Exported (wire-visible) method name, e.g. `FooBar`.
    pub fn exported(&self) -> &str {
        &self.exported
    }

    /// Script-side callable name, e.g. `fooBar`.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Rust type names of the declared parameters, in order.
    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Declared parameter count.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Lowers exactly the first character of an exported name.
pub fn script_name(exported: &str) -> String {
    let mut chars = exported.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether `name` follows the exported-method convention: non-empty with an
/// uppercase first letter.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Whether `name` can serve as the script-global identifier for a binding.
pub fn is_script_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
