// #[bindable] proc-macro implementation
//
// Generates an `impl vitro_bridge::Bindable` from an inherent impl block.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ImplItem, ItemImpl, Result, Visibility};

/// Expands the #[bindable] attribute macro.
///
/// Input: an inherent impl block.
/// Output: the block unchanged, plus a Bindable impl whose exports() chains
/// one `.export(...)` per public instance method, in declaration order.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[bindable]
/// impl Counter {
///     pub fn add(&mut self, n: i64) { self.count += n; }
/// }
///
/// // Output:
/// impl Counter {
///     pub fn add(&mut self, n: i64) { self.count += n; }
/// }
///
/// impl ::vitro_bridge::Bindable for Counter {
///     fn exports() -> ::vitro_bridge::MethodSet<Self> {
///         ::vitro_bridge::MethodSet::new()
///             .export("Add", |__target: &mut Counter, a0: i64| {
///                 let _ = <Counter>::add(__target, a0);
///             })
///     }
/// }
/// ```
///
/// The closure shim lets `&self` methods and methods with return values
/// satisfy the `Fn(&mut T, ...)` handler shape without extra impls.
pub fn expand_bindable(block: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &block.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[bindable] goes on an inherent impl block, not a trait impl",
        ));
    }
    if !block.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &block.generics,
            "#[bindable] does not support generic impl blocks; implement Bindable by hand",
        ));
    }
    let self_ty = &block.self_ty;

    let mut exports = Vec::new();
    for item in &block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        if !matches!(method.vis, Visibility::Public(_)) {
            continue;
        }
        let sig = &method.sig;
        let Some(receiver) = sig.receiver() else {
            // Associated function: nothing to invoke a method on.
            continue;
        };
        if receiver.reference.is_none() {
            return Err(syn::Error::new_spanned(
                receiver,
                "#[bindable] methods must take &self or &mut self",
            ));
        }
        if sig.asyncness.is_some() {
            return Err(syn::Error::new_spanned(
                sig,
                "#[bindable] methods cannot be async; dispatch is synchronous",
            ));
        }
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "#[bindable] methods cannot be generic; wire parameters need fixed types",
            ));
        }

        let ident = &sig.ident;
        let exported = pascal_case(&ident.to_string());

        let mut arg_names = Vec::new();
        let mut arg_types = Vec::new();
        for arg in &sig.inputs {
            let FnArg::Typed(pat_type) = arg else {
                continue;
            };
            arg_names.push(format_ident!("a{}", arg_names.len()));
            arg_types.push((*pat_type.ty).clone());
        }

        exports.push(quote! {
            .export(#exported, |__target: &mut #self_ty #(, #arg_names: #arg_types)*| {
                let _ = <#self_ty>::#ident(__target #(, #arg_names)*);
            })
        });
    }

    let expanded = quote! {
        #block

        impl ::vitro_bridge::Bindable for #self_ty {
            fn exports() -> ::vitro_bridge::MethodSet<Self> {
                ::vitro_bridge::MethodSet::new()
                    #(#exports)*
            }
        }
    };
    Ok(expanded)
}

/// `foo_bar` → `FooBar`; raw-identifier prefixes are dropped.
fn pascal_case(ident: &str) -> String {
    let mut out = String::new();
    for part in ident.trim_start_matches("r#").split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::pascal_case;

    #[test]
    fn test_pascal_case_transform() {
        assert_eq!(pascal_case("foo1"), "Foo1");
        assert_eq!(pascal_case("foo_bar"), "FooBar");
        assert_eq!(pascal_case("set_label_text"), "SetLabelText");
        assert_eq!(pascal_case("r#type"), "Type");
        assert_eq!(pascal_case("__x"), "X");
    }
}
