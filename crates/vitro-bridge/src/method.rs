//! Capability interface: the method table a bindable type exports.
//!
//! Instead of runtime reflection, a bound type names its own externally
//! callable methods through [`Bindable::exports`]. Each entry pairs a
//! [`MethodSignature`] with a type-erased invoker that decodes positional
//! wire values into the declared Rust parameter types and applies them to
//! the target. The `#[bindable]` attribute in `vitro-macros` generates the
//! whole table from an inherent `impl` block.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ArgError, BindError};
use crate::signature::{is_exported_name, MethodSignature};

/// A host type whose methods can be exposed to script code.
///
/// The target is serialized for every state push, so `Serialize` is part of
/// the contract. Implement by hand:
///
/// ```rust,ignore
/// impl Bindable for Counter {
///     fn exports() -> MethodSet<Self> {
///         MethodSet::new()
///             .export("Add", Counter::add)
///             .export("Reset", Counter::reset)
///     }
/// }
/// ```
///
/// or derive it with `#[bindable]` on the inherent `impl` block.
pub trait Bindable: Serialize + Send + 'static {
    /// The method table this type exposes, in declaration order.
    fn exports() -> MethodSet<Self>
    where
        Self: Sized;
}

type Invoker<T> = Box<dyn Fn(&mut T, &[Value]) -> Result<(), ArgError> + Send + Sync>;

/// Ordered table of the methods a type exports.
pub struct MethodSet<T> {
    methods: Vec<MethodDef<T>>,
}

/// One exported method: its signature plus a type-erased invoker.
pub struct MethodDef<T> {
    signature: MethodSignature,
    invoker: Invoker<T>,
}

impl<T> MethodDef<T> {
    /// Signature of this method.
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub(crate) fn invoke(&self, target: &mut T, params: &[Value]) -> Result<(), ArgError> {
        (self.invoker)(target, params)
    }
}

impl<T: 'static> MethodSet<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
        }
    }

    /// Adds a method under its exported name.
    ///
    /// `handler` is anything callable as `Fn(&mut T, ...)` whose non-receiver
    /// parameters all implement `Deserialize`; inherent `&mut self` methods
    /// can be passed directly (`.export("Add", Counter::add)`), `&self`
    /// methods need a closure shim (`|t: &mut T, n: i64| t.peek(n)`). The
    /// handler's return value, if any, is discarded: results reach the
    /// script side only through the state push that follows a successful
    /// call.
    ///
    /// Name problems (non-uppercase start, script-name collisions) surface
    /// at bind time so the builder stays chainable.
    pub fn export<A, F>(mut self, exported: &'static str, handler: F) -> Self
    where
        A: MethodArgs,
        F: BridgeFn<T, A>,
    {
        let signature = MethodSignature::new(exported, A::param_types());
        let invoker: Invoker<T> = Box::new(move |target, params| {
            let args = A::decode(params)?;
            handler.call(target, args);
            Ok(())
        });
        self.methods.push(MethodDef { signature, invoker });
        self
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDef<T>> {
        self.methods.iter()
    }

    /// Number of exported methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub(crate) fn find(&self, exported: &str) -> Option<&MethodDef<T>> {
        self.methods
            .iter()
            .find(|def| def.signature.exported() == exported)
    }

    /// Checks naming rules over the whole table.
    pub(crate) fn validate(&self) -> Result<(), BindError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for def in &self.methods {
            let sig = &def.signature;
            if !is_exported_name(sig.exported()) {
                return Err(BindError::NotExported(sig.exported().to_owned()));
            }
            if let Some(first) = seen.insert(sig.script(), sig.exported()) {
                return Err(BindError::DuplicateMethod {
                    first: first.to_owned(),
                    second: sig.exported().to_owned(),
                    script: sig.script().to_owned(),
                });
            }
        }
        Ok(())
    }
}

impl<T: 'static> Default for MethodSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Positional parameter pack for one exported method.
///
/// Implemented for tuples of `Deserialize` types up to arity 8. Values
/// beyond the pack's arity are ignored, matching the positional indexing of
/// the wire protocol.
pub trait MethodArgs: Sized + 'static {
    /// Declared parameter count.
    const ARITY: usize;

    /// Rust type names of the parameters, in order.
    fn param_types() -> Vec<&'static str>;

    /// Decodes the first `ARITY` wire values into the pack.
    fn decode(params: &[Value]) -> Result<Self, ArgError>;
}

/// Callable that applies a decoded parameter pack to a target.
///
/// Blanket-implemented for closures and fn items of shape
/// `Fn(&mut T, A0, ..., An) -> R` for any `R`; the return value is
/// discarded.
pub trait BridgeFn<T, A>: Send + Sync + 'static {
    /// Invokes the handler against `target`.
    fn call(&self, target: &mut T, args: A);
}

macro_rules! impl_method_args {
    ($($ty:ident $idx:tt),*) => {
        impl<$($ty,)*> MethodArgs for ($($ty,)*)
        where
            $($ty: DeserializeOwned + 'static,)*
        {
            const ARITY: usize = impl_method_args!(@count $($ty)*);

            fn param_types() -> Vec<&'static str> {
                vec![$(std::any::type_name::<$ty>(),)*]
            }

            #[allow(unused_variables)]
            fn decode(params: &[Value]) -> Result<Self, ArgError> {
                if params.len() < Self::ARITY {
                    return Err(ArgError::Arity {
                        expected: Self::ARITY,
                        got: params.len(),
                    });
                }
                Ok(($(
                    serde_json::from_value::<$ty>(params[$idx].clone()).map_err(|source| {
                        ArgError::Decode {
                            index: $idx,
                            expected: std::any::type_name::<$ty>(),
                            source,
                        }
                    })?,
                )*))
            }
        }

        impl<T, F, R, $($ty,)*> BridgeFn<T, ($($ty,)*)> for F
        where
            F: Fn(&mut T, $($ty,)*) -> R + Send + Sync + 'static,
            $($ty: DeserializeOwned + 'static,)*
        {
            #[allow(non_snake_case)]
            fn call(&self, target: &mut T, ($($ty,)*): ($($ty,)*)) {
                let _ = self(target $(, $ty)*);
            }
        }
    };
    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + impl_method_args!(@count $($tail)*) };
}

impl_method_args!();
impl_method_args!(A0 0);
impl_method_args!(A0 0, A1 1);
impl_method_args!(A0 0, A1 1, A2 2);
impl_method_args!(A0 0, A1 1, A2 2, A3 3);
impl_method_args!(A0 0, A1 1, A2 2, A3 3, A4 4);
impl_method_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);
impl_method_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);
impl_method_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7);
