//! Vitro webview shell.
//!
//! Wraps a platform toolkit behind the [`Engine`] trait and layers the
//! vitro-bridge binding model on top: script stubs, invoke dispatch, state
//! pushes, main-thread funneling, and custom scheme serving.
//!
//! ```ignore
//! use vitro_shell::Webview;
//!
//! let webview = Webview::new(engine);
//! let counter = webview.bind("counter", Counter::default())?;
//!
//! // Delivered by the engine when the page calls counter.add(2).
//! webview.handle_invoke(r#"{"scope":"counter","method":"Add","params":[2]}"#);
//!
//! counter.update(|c| c.count = 0);
//! counter.push();
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod page;
mod queue;
pub mod scheme;
pub mod webview;

pub use engine::{Color, DialogFlags, DialogType, Engine};
pub use error::{EvalError, ScriptError, ShellError};
pub use page::{css_inject_script, external_invoke_shim, js_string, Options, DEFAULT_URL};
pub use scheme::{
    RawRequest, Request, Response, SchemeError, SchemeHandler, SchemeTasks, TaskSink,
};
pub use webview::{SyncHandle, Webview};
