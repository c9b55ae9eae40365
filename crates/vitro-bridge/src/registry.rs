//! Per-webview table of live bindings.
//!
//! Registration is rare and takes the write lock; every invoke takes the
//! read lock just long enough to clone the binding handle, so concurrent
//! invokes against different bindings never serialize on each other. There
//! is no unbind: bindings live until the owning webview is torn down.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::binding::BoundObject;
use crate::envelope::Envelope;
use crate::error::{BindError, DispatchError};

/// Table mapping binding names to live bindings.
pub struct BindingRegistry {
    bindings: RwLock<HashMap<String, Arc<dyn BoundObject>>>,
}

impl BindingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `bound` under its name.
    ///
    /// A second bind under a live name is refused; the script side keeps
    /// whatever stub the first bind installed.
    pub fn insert(&self, bound: Arc<dyn BoundObject>) -> Result<(), BindError> {
        let mut bindings = self.bindings.write();
        match bindings.entry(bound.name().to_owned()) {
            Entry::Occupied(_) => Err(BindError::NameInUse(bound.name().to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(bound);
                Ok(())
            }
        }
    }

    /// Whether `name` is already bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.read().contains_key(name)
    }

    /// Binding registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<dyn BoundObject>> {
        self.bindings.read().get(name).cloned()
    }

    /// Names of all live bindings, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bindings.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Whether no binding is registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Dispatches one raw envelope against the registered bindings.
    ///
    /// On success returns the state-push statement the caller must
    /// evaluate; `Ok(None)` means the call was handled but its post-call
    /// snapshot could not be serialized (already logged). The read lock is
    /// dropped before the method runs.
    pub fn dispatch(&self, raw: &str) -> Result<Option<String>, DispatchError> {
        let envelope = Envelope::parse(raw)?;
        let bound = self
            .get(&envelope.scope)
            .ok_or_else(|| DispatchError::UnknownScope {
                scope: envelope.scope.clone(),
            })?;
        bound.dispatch(&envelope)
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
