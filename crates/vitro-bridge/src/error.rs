//! Error taxonomy for the binding bridge.
//!
//! Bind-time failures propagate to the caller; dispatch-time failures stay
//! host-side and collapse to a boolean at the invoke channel; state-push
//! failures are logged and the push is dropped. No operation is retried.

use thiserror::Error;

/// Errors surfaced while establishing a binding.
#[derive(Debug, Error)]
pub enum BindError {
    /// The binding name cannot serve as a script-side identifier.
    #[error("binding name {0:?} is not a valid script identifier")]
    InvalidName(String),

    /// A live binding already occupies this name.
    #[error("binding name {0:?} is already in use")]
    NameInUse(String),

    /// An exported method name does not start with an uppercase letter.
    #[error("method name {0:?} is not exported; exported names start with an uppercase letter")]
    NotExported(String),

    /// Two exported methods collapse to the same script-side name.
    #[error("methods {first:?} and {second:?} collide on script name {script:?}")]
    DuplicateMethod {
        /// Exported name registered first.
        first: String,
        /// Exported name that collided with it.
        second: String,
        /// The script name both lower to.
        script: String,
    },
}

/// Errors produced while dispatching one invoke envelope.
///
/// None of these crosses the invoke channel; the channel reports a plain
/// "handled" boolean and the detail stays on the host side.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The envelope text is not a JSON `{scope, method, params}` object.
    #[error("malformed invoke envelope: {0}")]
    EnvelopeParse(#[from] serde_json::Error),

    /// No binding is registered under the envelope's scope.
    #[error("no binding named {scope:?}")]
    UnknownScope {
        /// The unmatched scope.
        scope: String,
    },

    /// The addressed binding exports no method with this name.
    #[error("binding {scope:?} has no method {method:?}")]
    UnknownMethod {
        /// The binding that was addressed.
        scope: String,
        /// The unmatched exported method name.
        method: String,
    },

    /// The envelope carries fewer parameters than the method declares.
    #[error("method {method:?} takes {expected} parameter(s), envelope has {got}")]
    ArityMismatch {
        /// Exported name of the addressed method.
        method: String,
        /// Declared parameter count.
        expected: usize,
        /// Parameters actually present.
        got: usize,
    },

    /// A positional parameter did not decode into its declared type.
    #[error("parameter {index} of {method:?} does not fit {expected}: {source}")]
    ParameterDecode {
        /// Exported name of the addressed method.
        method: String,
        /// Zero-based position of the offending parameter.
        index: usize,
        /// Rust type the parameter was declared as.
        expected: &'static str,
        /// The decoder's rejection.
        #[source]
        source: serde_json::Error,
    },
}

/// Failure inside a method's positional parameter decode.
///
/// Produced by [`MethodArgs::decode`](crate::method::MethodArgs::decode)
/// before the exported method name is known; the dispatcher attaches the
/// name via [`ArgError::into_dispatch`].
#[derive(Debug, Error)]
pub enum ArgError {
    /// Fewer parameters than the pack's arity.
    #[error("expected {expected} parameter(s), got {got}")]
    Arity {
        /// Declared parameter count.
        expected: usize,
        /// Parameters actually present.
        got: usize,
    },

    /// The value at `index` did not decode into `expected`.
    #[error("parameter {index} does not fit {expected}: {source}")]
    Decode {
        /// Zero-based position of the offending parameter.
        index: usize,
        /// Rust type the parameter was declared as.
        expected: &'static str,
        /// The decoder's rejection.
        #[source]
        source: serde_json::Error,
    },
}

impl ArgError {
    pub(crate) fn into_dispatch(self, method: &str) -> DispatchError {
        match self {
            ArgError::Arity { expected, got } => DispatchError::ArityMismatch {
                method: method.to_owned(),
                expected,
                got,
            },
            ArgError::Decode {
                index,
                expected,
                source,
            } => DispatchError::ParameterDecode {
                method: method.to_owned(),
                index,
                expected,
                source,
            },
        }
    }
}

/// The bound target could not be serialized for a state push.
#[derive(Debug, Error)]
#[error("state serialization for binding {name:?} failed: {source}")]
pub struct SyncError {
    /// Binding whose push was dropped.
    pub name: String,
    /// Underlying serializer failure.
    #[source]
    pub source: serde_json::Error,
}
