//! Script-side stub rendering.
//!
//! One stub per binding: a guarded global declaration plus one proxy
//! function per exported method. Proxies are fire-and-forget; they
//! serialize an invoke envelope and post it through
//! `window.external.invoke`, and results come back only via the state
//! push.

use std::fmt::Write;

use crate::signature::MethodSignature;

/// Renders the stub declaring `name` on the script side.
///
/// The `typeof` guard keeps re-evaluation of the same stub from clobbering
/// an existing global; it is not a merge mechanism, since the registry
/// refuses second binds under a live name.
pub fn stub_script<'a>(
    name: &str,
    signatures: impl IntoIterator<Item = &'a MethodSignature>,
) -> String {
    let mut js = String::new();
    let _ = writeln!(js, "if (typeof {name} === 'undefined') {{");
    let _ = writeln!(js, "\t{name} = {{}};");
    let _ = writeln!(js, "}}");
    for sig in signatures {
        let args = positional_args(sig.arity());
        let _ = writeln!(js, "{name}.{} = function({args}) {{", sig.script());
        let _ = writeln!(
            js,
            "\twindow.external.invoke(JSON.stringify({{scope: \"{name}\", method: \"{}\", params: [{args}]}}));",
            sig.exported()
        );
        let _ = writeln!(js, "}};");
    }
    js
}

/// Positional parameter list `a0,a1,...` for the given arity.
fn positional_args(arity: usize) -> String {
    let mut out = String::new();
    for i in 0..arity {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "a{i}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signatures() -> Vec<MethodSignature> {
        vec![
            MethodSignature::new("Foo1", vec!["i64", "f32"]),
            MethodSignature::new("Reset", vec![]),
        ]
    }

    #[test]
    fn test_stub_guards_global_declaration() {
        let js = stub_script("counter", signatures().iter());
        assert!(js.starts_with("if (typeof counter === 'undefined') {"));
        assert!(js.contains("\tcounter = {};"));
    }

    #[test]
    fn test_stub_defines_one_proxy_per_method() {
        let js = stub_script("counter", signatures().iter());
        assert!(js.contains("counter.foo1 = function(a0,a1) {"));
        assert!(js.contains("counter.reset = function() {"));
    }

    #[test]
    fn test_proxy_posts_envelope_with_positional_params() {
        let js = stub_script("counter", signatures().iter());
        assert!(js.contains(
            "window.external.invoke(JSON.stringify({scope: \"counter\", \
             method: \"Foo1\", params: [a0,a1]}));"
        ));
        assert!(js.contains(
            "window.external.invoke(JSON.stringify({scope: \"counter\", \
             method: \"Reset\", params: []}));"
        ));
    }

    #[test]
    fn test_positional_args_layout() {
        assert_eq!(positional_args(0), "");
        assert_eq!(positional_args(1), "a0");
        assert_eq!(positional_args(3), "a0,a1,a2");
    }
}
