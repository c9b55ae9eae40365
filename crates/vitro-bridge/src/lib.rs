//! Vitro binding bridge - typed calls between script code and host objects
//!
//! This crate implements the engine-agnostic half of a webview binding
//! layer: a host object is bound under a name, its exported methods become
//! callable script functions, script calls arrive back as JSON envelopes
//! that are decoded into the declared Rust parameter types, and the host
//! value is re-serialized into the page after every successful call.
//!
//! # Example
//!
//! ```ignore
//! use serde::Serialize;
//! use vitro_bridge::{Bindable, Binding, BindingRegistry, MethodSet};
//!
//! #[derive(Default, Serialize)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! impl Counter {
//!     pub fn add(&mut self, n: i64) {
//!         self.count += n;
//!     }
//! }
//!
//! impl Bindable for Counter {
//!     fn exports() -> MethodSet<Self> {
//!         MethodSet::new().export("Add", Counter::add)
//!     }
//! }
//!
//! let registry = BindingRegistry::new();
//! let binding = Binding::new("counter", Counter::default())?;
//! // evaluate binding.stub_script() in the page, then:
//! registry.insert(std::sync::Arc::new(binding))?;
//! let push = registry.dispatch(r#"{"scope":"counter","method":"Add","params":[2]}"#)?;
//! // evaluate the returned push statement to refresh counter.data
//! ```
//!
//! Script proxies are fire-and-forget: they post
//! `{"scope","method","params"}` through `window.external.invoke` and get
//! results only via the state push that follows. Dispatch failures collapse
//! to a boolean at that channel; the full error detail stays host-side.

#![warn(missing_docs)]

pub mod binding;
pub mod envelope;
pub mod error;
pub mod method;
pub mod registry;
pub mod signature;
pub mod stub;
pub mod sync;

pub use binding::{Binding, BoundObject};
pub use envelope::Envelope;
pub use error::{ArgError, BindError, DispatchError, SyncError};
pub use method::{Bindable, BridgeFn, MethodArgs, MethodDef, MethodSet};
pub use registry::BindingRegistry;
pub use signature::MethodSignature;
