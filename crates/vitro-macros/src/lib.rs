// vitro-macros: proc-macros for deriving bindable method tables
//
// Provides #[bindable] - derives vitro_bridge::Bindable from an inherent
// impl block so the exported method table never drifts from the code.

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemImpl};

mod bindable;

/// Derives `vitro_bridge::Bindable` from an inherent `impl` block.
///
/// Every public method taking `&self` or `&mut self` is exported under its
/// PascalCased name (`foo_bar` becomes `FooBar`, script-callable as
/// `fooBar`), in declaration order, with up to 8 parameters. Associated
/// functions and non-public methods are skipped; generic, async, and
/// by-value-receiver methods are rejected with a compile error. Parameter
/// types must implement `Deserialize`, the type itself `Serialize`.
/// Return values are discarded by the generated table: results reach the
/// script side only through the state push.
///
/// # Example
///
/// ```ignore
/// use serde::Serialize;
/// use vitro_macros::bindable;
///
/// #[derive(Default, Serialize)]
/// struct Counter {
///     count: i64,
/// }
///
/// #[bindable]
/// impl Counter {
///     pub fn add(&mut self, n: i64) {
///         self.count += n;
///     }
///
///     fn helper(&self) {} // private: not exported
/// }
/// ```
///
/// expands to the impl block itself plus an `impl Bindable for Counter`
/// whose `exports()` lists `Add`.
#[proc_macro_attribute]
pub fn bindable(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    bindable::expand_bindable(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
