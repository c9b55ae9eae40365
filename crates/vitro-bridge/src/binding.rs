//! A live binding: a named target plus its validated method table.

use std::fmt;

use parking_lot::Mutex;

use crate::envelope::Envelope;
use crate::error::{BindError, DispatchError, SyncError};
use crate::method::{Bindable, MethodSet};
use crate::signature::{is_script_ident, MethodSignature};
use crate::{stub, sync};

/// A named host object exposed to script code.
///
/// The binding owns the target for its whole life; the bridge never mutates
/// the target's structure, it only invokes exported methods and serializes
/// the current value. The method table is immutable after construction.
pub struct Binding<T> {
    name: String,
    target: Mutex<T>,
    methods: MethodSet<T>,
}

impl<T: Bindable> Binding<T> {
    /// Builds and validates a binding over `target`.
    ///
    /// Fails if `name` is not a script identifier, if an exported method
    /// name does not start uppercase, or if two methods collapse to the
    /// same script name.
    pub fn new(name: &str, target: T) -> Result<Self, BindError> {
        if !is_script_ident(name) {
            return Err(BindError::InvalidName(name.to_owned()));
        }
        let methods = T::exports();
        methods.validate()?;
        Ok(Self {
            name: name.to_owned(),
            target: Mutex::new(target),
            methods,
        })
    }

    /// Runs `f` with shared access to the target's current value.
    pub fn with_target<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.target.lock())
    }

    /// Runs `f` with exclusive access to the target.
    ///
    /// Host-side mutation path. The change is not pushed to script code;
    /// serialize the state afterwards to make it visible there.
    pub fn with_target_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.target.lock())
    }
}

// Name only: printing the target would require T: Debug.
impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Object-safe view of a binding, as the registry stores it.
pub trait BoundObject: Send + Sync {
    /// Binding name, which is also the script-side global.
    fn name(&self) -> &str;

    /// Signatures of the exported methods, in declaration order.
    fn signatures(&self) -> Vec<MethodSignature>;

    /// Script stub declaring the binding on the script side.
    fn stub_script(&self) -> String;

    /// Statement pushing the target's current serialized state.
    fn sync_script(&self) -> Result<String, SyncError>;

    /// Dispatches one parsed envelope against this binding.
    ///
    /// On success returns the state-push statement for the post-call value,
    /// or `None` if that snapshot could not be serialized (already logged;
    /// the call itself still counts as handled).
    fn dispatch(&self, envelope: &Envelope) -> Result<Option<String>, DispatchError>;
}

impl<T: Bindable> BoundObject for Binding<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn signatures(&self) -> Vec<MethodSignature> {
        self.methods
            .methods()
            .map(|def| def.signature().clone())
            .collect()
    }

    fn stub_script(&self) -> String {
        stub::stub_script(&self.name, self.methods.methods().map(|def| def.signature()))
    }

    fn sync_script(&self) -> Result<String, SyncError> {
        let target = self.target.lock();
        sync::sync_script(&self.name, &*target)
    }

    fn dispatch(&self, envelope: &Envelope) -> Result<Option<String>, DispatchError> {
        let def = self
            .methods
            .find(&envelope.method)
            .ok_or_else(|| DispatchError::UnknownMethod {
                scope: envelope.scope.clone(),
                method: envelope.method.clone(),
            })?;
        let mut target = self.target.lock();
        def.invoke(&mut target, &envelope.params)
            .map_err(|err| err.into_dispatch(&envelope.method))?;
        // Snapshot under the lock so the push carries exactly this call's
        // result even when invokes race on the same binding.
        match sync::sync_script(&self.name, &*target) {
            Ok(js) => Ok(Some(js)),
            Err(err) => {
                log::error!("{err}; push skipped");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::MethodSet;
    use serde::Serialize;

    #[derive(Default, Serialize)]
    struct Counter {
        count: i64,
    }

    impl Counter {
        pub fn add(&mut self, n: i64) {
            self.count += n;
        }
    }

    impl Bindable for Counter {
        fn exports() -> MethodSet<Self> {
            MethodSet::new().export("Add", Counter::add)
        }
    }

    fn envelope(raw: &str) -> Envelope {
        Envelope::parse(raw).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_binding_name() {
        let err = Binding::new("2fast", Counter::default()).unwrap_err();
        assert!(matches!(err, BindError::InvalidName(_)));
    }

    #[test]
    fn test_new_validates_method_table() {
        #[derive(Serialize)]
        struct Lower;
        impl Lower {
            pub fn go(&mut self) {}
        }
        impl Bindable for Lower {
            fn exports() -> MethodSet<Self> {
                MethodSet::new().export("go", Lower::go)
            }
        }
        let err = Binding::new("lower", Lower).unwrap_err();
        assert!(matches!(err, BindError::NotExported(_)));
    }

    #[test]
    fn test_dispatch_invokes_and_returns_push() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        let push = binding
            .dispatch(&envelope(
                r#"{"scope":"counter","method":"Add","params":[5]}"#,
            ))
            .unwrap()
            .unwrap();
        assert_eq!(
            push,
            "counter.data={\"count\":5};if(counter.render){counter.render({\"count\":5});}"
        );
        assert_eq!(binding.with_target(|c| c.count), 5);
    }

    #[test]
    fn test_dispatch_unknown_method() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        let err = binding
            .dispatch(&envelope(r#"{"scope":"counter","method":"Bar"}"#))
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownMethod { .. }));
    }

    #[test]
    fn test_dispatch_arity_mismatch_leaves_target_untouched() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        let err = binding
            .dispatch(&envelope(r#"{"scope":"counter","method":"Add","params":[]}"#))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ArityMismatch {
                expected: 1,
                got: 0,
                ..
            }
        ));
        assert_eq!(binding.with_target(|c| c.count), 0);
    }

    #[test]
    fn test_dispatch_decode_failure_leaves_target_untouched() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        let err = binding
            .dispatch(&envelope(
                r#"{"scope":"counter","method":"Add","params":["3"]}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, DispatchError::ParameterDecode { index: 0, .. }));
        assert_eq!(binding.with_target(|c| c.count), 0);
    }

    #[test]
    fn test_stub_and_sync_views() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        assert!(binding.stub_script().contains("counter.add = function(a0)"));
        assert_eq!(
            binding.sync_script().unwrap(),
            "counter.data={\"count\":0};if(counter.render){counter.render({\"count\":0});}"
        );
        let sigs = binding.signatures();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].exported(), "Add");
    }

    #[test]
    fn test_with_target_mut_changes_next_snapshot() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        binding.with_target_mut(|c| c.count = 9);
        assert!(binding.sync_script().unwrap().contains("{\"count\":9}"));
    }

    #[test]
    fn test_debug_shows_name_without_target() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        assert_eq!(
            format!("{binding:?}"),
            "Binding { name: \"counter\", .. }"
        );
    }

    #[test]
    fn test_dispatch_extra_params_ignored() {
        let binding = Binding::new("counter", Counter::default()).unwrap();
        binding
            .dispatch(&envelope(
                r#"{"scope":"counter","method":"Add","params":[2,"ignored"]}"#,
            ))
            .unwrap();
        assert_eq!(binding.with_target(|c| c.count), 2);
    }
}
