//! Webview facade tying an engine, the task queue, and the binding
//! registry together.

use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use crossbeam::channel::bounded;
use vitro_bridge::{Bindable, BindError, Binding, BindingRegistry, BoundObject};

use crate::engine::{Color, DialogFlags, DialogType, Engine};
use crate::error::{EvalError, ShellError};
use crate::page::css_inject_script;
use crate::queue::TaskQueue;

/// One webview window.
///
/// The facade may be shared across threads; anything that must run on the
/// event-loop thread is funneled through the task queue and executed when
/// the engine pumps. The thread that calls [`Webview::new`] is taken to be
/// the event-loop thread.
pub struct Webview<E: Engine> {
    engine: E,
    registry: BindingRegistry,
    queue: TaskQueue,
    main_thread: ThreadId,
}

impl<E: Engine> Webview<E> {
    /// Wraps an engine, recording the current thread as the event-loop
    /// thread.
    pub fn new(engine: E) -> Arc<Self> {
        Arc::new(Self {
            engine,
            registry: BindingRegistry::new(),
            queue: TaskQueue::new(),
            main_thread: thread::current().id(),
        })
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn on_main_thread(&self) -> bool {
        thread::current().id() == self.main_thread
    }

    /// Evaluates a script in the current page.
    ///
    /// Callable from any thread. Off the event-loop thread the call blocks
    /// until the loop picks the script up and reports its outcome; there is
    /// no timeout, so a stopped loop holds the caller indefinitely.
    pub fn eval(self: &Arc<Self>, js: &str) -> Result<(), EvalError> {
        if self.on_main_thread() {
            return self.engine.eval(js);
        }
        let (tx, rx) = bounded(1);
        let weak = Arc::downgrade(self);
        let js = js.to_owned();
        self.queue.push(Box::new(move || {
            let result = match weak.upgrade() {
                Some(webview) => webview.engine.eval(&js),
                None => Err(EvalError::Disconnected),
            };
            let _ = tx.send(result);
        }));
        self.engine.wake();
        rx.recv().unwrap_or(Err(EvalError::Disconnected))
    }

    /// Queues `task` to run on the event-loop thread and wakes the loop.
    ///
    /// Tasks queued after the webview is torn down are dropped unrun.
    pub fn dispatch(self: &Arc<Self>, task: impl FnOnce(&Arc<Webview<E>>) + Send + 'static) {
        let weak = Arc::downgrade(self);
        self.queue.push(Box::new(move || {
            if let Some(webview) = weak.upgrade() {
                task(&webview);
            }
        }));
        self.engine.wake();
    }

    /// Drains queued tasks, returning how many ran.
    ///
    /// Engines call this from their event loop whenever
    /// [`wake`](Engine::wake) fires.
    pub fn pump(&self) -> usize {
        debug_assert!(self.on_main_thread());
        self.queue.drain()
    }

    /// Injects a stylesheet into the current page.
    pub fn inject_css(self: &Arc<Self>, css: &str) -> Result<(), EvalError> {
        self.eval(&css_inject_script(css))
    }

    /// Updates the window title, from any thread.
    pub fn set_title(self: &Arc<Self>, title: &str) {
        if self.on_main_thread() {
            self.engine.set_title(title);
        } else {
            let title = title.to_owned();
            self.dispatch(move |webview| webview.engine.set_title(&title));
        }
    }

    /// Enters or leaves fullscreen, from any thread.
    pub fn set_fullscreen(self: &Arc<Self>, fullscreen: bool) {
        if self.on_main_thread() {
            self.engine.set_fullscreen(fullscreen);
        } else {
            self.dispatch(move |webview| webview.engine.set_fullscreen(fullscreen));
        }
    }

    /// Sets the window background color, from any thread.
    pub fn set_color(self: &Arc<Self>, color: Color) {
        if self.on_main_thread() {
            self.engine.set_color(color);
        } else {
            self.dispatch(move |webview| webview.engine.set_color(color));
        }
    }

    /// Shows a modal system dialog, from any thread.
    ///
    /// Off the event-loop thread the call blocks until the loop presents
    /// the dialog and the user dismisses it. Returns an empty string when
    /// the webview is torn down before the dialog could be shown.
    pub fn dialog(
        self: &Arc<Self>,
        kind: DialogType,
        flags: DialogFlags,
        title: &str,
        arg: &str,
    ) -> String {
        if self.on_main_thread() {
            return self.engine.dialog(kind, flags, title, arg);
        }
        let (tx, rx) = bounded(1);
        let weak = Arc::downgrade(self);
        let title = title.to_owned();
        let arg = arg.to_owned();
        self.queue.push(Box::new(move || {
            let result = match weak.upgrade() {
                Some(webview) => webview.engine.dialog(kind, flags, &title, &arg),
                None => String::new(),
            };
            let _ = tx.send(result);
        }));
        self.engine.wake();
        rx.recv().unwrap_or_default()
    }

    /// Asks the event loop to exit, from any thread.
    pub fn terminate(self: &Arc<Self>) {
        if self.on_main_thread() {
            self.engine.terminate();
        } else {
            self.dispatch(|webview| webview.engine.terminate());
        }
    }

    /// Exposes `target` to script code under `name`.
    ///
    /// Validates the binding, installs the script stub, registers the
    /// binding, and pushes the initial state. A name that is already bound
    /// is refused before anything reaches the page. If the stub fails to
    /// evaluate the name stays unbound.
    pub fn bind<T: Bindable>(
        self: &Arc<Self>,
        name: &str,
        target: T,
    ) -> Result<SyncHandle<T, E>, ShellError> {
        let binding = Arc::new(Binding::new(name, target)?);
        // Pre-check keeps the stub off the page in the common duplicate
        // case; insert still decides under the write lock.
        if self.registry.contains(name) {
            return Err(ShellError::Bind(BindError::NameInUse(name.to_owned())));
        }
        let bound: Arc<dyn BoundObject> = binding.clone();
        self.eval(&bound.stub_script())?;
        self.registry.insert(bound)?;
        self.push_state(binding.as_ref());
        Ok(SyncHandle {
            binding,
            webview: Arc::downgrade(self),
        })
    }

    /// Entry point for `window.external.invoke` payloads.
    ///
    /// Returns whether the payload was handled. A handled call pushes the
    /// target's post-call state back to the page. Rejected payloads are
    /// logged at debug level; the page is never notified, matching its
    /// fire-and-forget call model.
    pub fn handle_invoke(self: &Arc<Self>, raw: &str) -> bool {
        match self.registry.dispatch(raw) {
            Ok(Some(push)) => {
                if let Err(err) = self.eval(&push) {
                    log::error!("state push failed: {err}");
                }
                true
            }
            Ok(None) => true,
            Err(err) => {
                log::debug!("invoke rejected: {err}");
                false
            }
        }
    }

    fn push_state(self: &Arc<Self>, bound: &dyn BoundObject) {
        match bound.sync_script() {
            Ok(script) => {
                if let Err(err) = self.eval(&script) {
                    log::error!("state push for {:?} failed: {err}", bound.name());
                }
            }
            Err(err) => log::error!("{err}; push skipped"),
        }
    }
}

/// Handle returned by [`Webview::bind`] for host-side mutation and re-sync.
///
/// Clones share the same binding. Holding a handle does not keep the
/// webview alive; pushing after teardown is a no-op.
pub struct SyncHandle<T, E: Engine> {
    binding: Arc<Binding<T>>,
    webview: Weak<Webview<E>>,
}

impl<T: Bindable, E: Engine> SyncHandle<T, E> {
    /// Binding name.
    pub fn name(&self) -> &str {
        self.binding.name()
    }

    /// Runs `f` with shared access to the bound target.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.binding.with_target(f)
    }

    /// Runs `f` with exclusive access to the bound target.
    ///
    /// The change stays host-side until [`push`](Self::push) runs.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.binding.with_target_mut(f)
    }

    /// Pushes the target's current state to the page.
    ///
    /// Failures are logged, not returned, so periodic re-syncs need no
    /// handling at the call site.
    pub fn push(&self) {
        if let Some(webview) = self.webview.upgrade() {
            webview.push_state(self.binding.as_ref());
        }
    }
}

impl<T, E: Engine> Clone for SyncHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            binding: Arc::clone(&self.binding),
            webview: Weak::clone(&self.webview),
        }
    }
}

impl<T: Bindable, E: Engine> fmt::Debug for SyncHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHandle")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde::Serialize;
    use vitro_bridge::MethodSet;

    use super::*;
    use crate::error::ScriptError;

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

    #[derive(Default)]
    struct RecordingEngine {
        evals: Mutex<Vec<(String, ThreadId)>>,
        titles: Mutex<Vec<String>>,
        fullscreen: Mutex<Vec<bool>>,
        colors: Mutex<Vec<Color>>,
        dialogs: Mutex<Vec<(DialogType, DialogFlags, String, ThreadId)>>,
        terminated: AtomicBool,
        wakes: AtomicUsize,
    }

    impl RecordingEngine {
        fn eval_texts(&self) -> Vec<String> {
            self.evals.lock().iter().map(|(js, _)| js.clone()).collect()
        }
    }

    impl Engine for RecordingEngine {
        fn eval(&self, js: &str) -> Result<(), EvalError> {
            self.evals
                .lock()
                .push((js.to_owned(), thread::current().id()));
            Ok(())
        }

        fn set_title(&self, title: &str) {
            self.titles.lock().push(title.to_owned());
        }

        fn set_fullscreen(&self, fullscreen: bool) {
            self.fullscreen.lock().push(fullscreen);
        }

        fn set_color(&self, color: Color) {
            self.colors.lock().push(color);
        }

        fn dialog(&self, kind: DialogType, flags: DialogFlags, title: &str, _arg: &str) -> String {
            self.dialogs
                .lock()
                .push((kind, flags, title.to_owned(), thread::current().id()));
            "/picked/file".to_owned()
        }

        fn terminate(&self) {
            self.terminated.store(true, Ordering::SeqCst);
        }

        fn wake(&self) {
            self.wakes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingEngine;

    impl Engine for FailingEngine {
        fn eval(&self, _js: &str) -> Result<(), EvalError> {
            Err(EvalError::Script(ScriptError::new(
                "SyntaxError",
                "page refused the script",
            )))
        }

        fn set_title(&self, _title: &str) {}
        fn set_fullscreen(&self, _fullscreen: bool) {}
        fn set_color(&self, _color: Color) {}

        fn dialog(
            &self,
            _kind: DialogType,
            _flags: DialogFlags,
            _title: &str,
            _arg: &str,
        ) -> String {
            String::new()
        }

        fn terminate(&self) {}
        fn wake(&self) {}
    }

    #[test]
    fn test_eval_on_event_loop_thread_is_direct() {
        let webview = Webview::new(RecordingEngine::default());
        webview.eval("1+1").unwrap();
        assert_eq!(webview.engine().eval_texts(), vec!["1+1".to_owned()]);
        assert_eq!(webview.engine().wakes.load(Ordering::SeqCst), 0);
        assert!(webview.queue.is_empty());
    }

    #[test]
    fn test_eval_from_worker_runs_on_event_loop_thread() {
        let webview = Webview::new(RecordingEngine::default());
        let main_id = thread::current().id();

        let worker = {
            let webview = Arc::clone(&webview);
            thread::spawn(move || webview.eval("fromWorker()").unwrap())
        };
        while webview.pump() == 0 {
            thread::yield_now();
        }
        worker.join().unwrap();

        let evals = webview.engine().evals.lock();
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0], ("fromWorker()".to_owned(), main_id));
        assert!(webview.engine().wakes.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_dispatch_preserves_submission_order() {
        let webview = Webview::new(RecordingEngine::default());
        for i in 0..3 {
            webview.dispatch(move |webview| {
                let _ = webview.eval(&format!("task({i})"));
            });
        }
        assert_eq!(webview.pump(), 3);
        assert_eq!(
            webview.engine().eval_texts(),
            vec!["task(0)".to_owned(), "task(1)".to_owned(), "task(2)".to_owned()],
        );
    }

    #[test]
    fn test_bind_installs_stub_then_pushes_initial_state() {
        let webview = Webview::new(RecordingEngine::default());
        let handle = webview.bind("counter", Counter::default()).unwrap();

        let evals = webview.engine().eval_texts();
        assert_eq!(evals.len(), 2);
        assert!(evals[0].starts_with("if (typeof counter === 'undefined')"));
        assert!(evals[1].starts_with("counter.data={\"count\":0}"));
        assert_eq!(handle.name(), "counter");
    }

    #[test]
    fn test_bind_refuses_name_in_use() {
        let webview = Webview::new(RecordingEngine::default());
        webview.bind("counter", Counter::default()).unwrap();
        let err = webview.bind("counter", Counter::default()).unwrap_err();
        assert!(matches!(
            err,
            ShellError::Bind(BindError::NameInUse(name)) if name == "counter"
        ));
        // No stub or push beyond the first bind's pair.
        assert_eq!(webview.engine().eval_texts().len(), 2);
    }

    #[test]
    fn test_bind_failed_stub_leaves_name_unbound() {
        let webview = Webview::new(FailingEngine);
        let err = webview.bind("counter", Counter::default()).unwrap_err();
        assert!(matches!(err, ShellError::Eval(_)));
        let err = webview.bind("counter", Counter::default()).unwrap_err();
        assert!(matches!(err, ShellError::Eval(_)));
    }

    #[test]
    fn test_handle_invoke_runs_method_and_pushes_state() {
        let webview = Webview::new(RecordingEngine::default());
        let handle = webview.bind("counter", Counter::default()).unwrap();

        assert!(webview.handle_invoke(r#"{"scope":"counter","method":"Add","params":[5]}"#));
        let evals = webview.engine().eval_texts();
        assert_eq!(evals.len(), 3);
        assert!(evals[2].contains("{\"count\":5}"));
        assert_eq!(handle.with(|c| c.count), 5);
    }

    #[test]
    fn test_handle_invoke_rejects_bad_payloads_without_evals() {
        let webview = Webview::new(RecordingEngine::default());
        webview.bind("counter", Counter::default()).unwrap();

        assert!(!webview.handle_invoke("{not json"));
        assert!(!webview.handle_invoke(r#"{"scope":"ghost","method":"Add","params":[1]}"#));
        assert!(!webview.handle_invoke(r#"{"scope":"counter","method":"Missing"}"#));
        assert_eq!(webview.engine().eval_texts().len(), 2);
    }

    #[test]
    fn test_sync_handle_update_then_push() {
        let webview = Webview::new(RecordingEngine::default());
        let handle = webview.bind("counter", Counter::default()).unwrap();

        handle.update(|c| c.count = 41);
        assert_eq!(webview.engine().eval_texts().len(), 2);
        handle.push();
        let evals = webview.engine().eval_texts();
        assert!(evals[2].contains("{\"count\":41}"));
        assert_eq!(handle.with(|c| c.count), 41);
    }

    #[test]
    fn test_sync_handle_push_after_teardown_is_noop() {
        let webview = Webview::new(RecordingEngine::default());
        let handle = webview.bind("counter", Counter::default()).unwrap();
        drop(webview);
        handle.push();
        assert_eq!(handle.with(|c| c.count), 0);
    }

    #[test]
    fn test_chrome_ops_run_directly_on_event_loop_thread() {
        let webview = Webview::new(RecordingEngine::default());
        webview.set_title("Vitro");
        webview.set_fullscreen(true);
        webview.set_color(Color::rgb(1, 2, 3));
        webview.terminate();

        assert_eq!(*webview.engine().titles.lock(), vec!["Vitro".to_owned()]);
        assert_eq!(*webview.engine().fullscreen.lock(), vec![true]);
        assert_eq!(*webview.engine().colors.lock(), vec![Color::rgb(1, 2, 3)]);
        assert!(webview.engine().terminated.load(Ordering::SeqCst));
        assert!(webview.queue.is_empty());
    }

    #[test]
    fn test_dialog_on_event_loop_thread_is_direct() {
        let webview = Webview::new(RecordingEngine::default());
        let picked = webview.dialog(
            DialogType::Open,
            DialogFlags::DIRECTORY,
            "Choose a folder",
            "/home",
        );
        assert_eq!(picked, "/picked/file");
        let dialogs = webview.engine().dialogs.lock();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].0, DialogType::Open);
        assert_eq!(dialogs[0].1, DialogFlags::DIRECTORY);
        assert!(webview.queue.is_empty());
    }

    #[test]
    fn test_dialog_from_worker_runs_on_event_loop_thread() {
        let webview = Webview::new(RecordingEngine::default());
        let main_id = thread::current().id();

        let worker = {
            let webview = Arc::clone(&webview);
            thread::spawn(move || {
                webview.dialog(DialogType::Save, DialogFlags::FILE, "Save as", "draft.txt")
            })
        };
        while webview.pump() == 0 {
            thread::yield_now();
        }
        assert_eq!(worker.join().unwrap(), "/picked/file");

        let dialogs = webview.engine().dialogs.lock();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].3, main_id);
    }

    #[test]
    fn test_sync_handle_debug_names_binding() {
        let webview = Webview::new(RecordingEngine::default());
        let handle = webview.bind("counter", Counter::default()).unwrap();
        assert_eq!(
            format!("{handle:?}"),
            "SyncHandle { name: \"counter\", .. }"
        );
    }

    #[test]
    fn test_chrome_ops_from_worker_wait_for_pump() {
        let webview = Webview::new(RecordingEngine::default());
        let worker = {
            let webview = Arc::clone(&webview);
            thread::spawn(move || {
                webview.set_title("later");
                webview.terminate();
            })
        };
        worker.join().unwrap();

        assert!(webview.engine().titles.lock().is_empty());
        assert!(!webview.engine().terminated.load(Ordering::SeqCst));
        assert_eq!(webview.pump(), 2);
        assert_eq!(*webview.engine().titles.lock(), vec!["later".to_owned()]);
        assert!(webview.engine().terminated.load(Ordering::SeqCst));
    }

    #[test]
    fn test_inject_css_evaluates_injector_call() {
        let webview = Webview::new(RecordingEngine::default());
        webview.inject_css("body { margin: 0; }").unwrap();
        let evals = webview.engine().eval_texts();
        assert!(evals[0].starts_with("(function(e){"));
        assert!(evals[0].contains("body { margin: 0; }"));
    }
}
