//! Custom URL scheme serving.
//!
//! Toolkits hand each in-flight scheme request to [`SchemeTasks::start`]
//! together with a [`TaskSink`] wrapping the native task object. The request
//! is served on a worker thread and the outcome is forwarded through the
//! sink, unless the toolkit stopped the task first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use dashmap::DashMap;
use thiserror::Error;
use url::Url;

/// Request as delivered by the toolkit, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    /// HTTP method name.
    pub method: String,
    /// Absolute request URL, unparsed.
    pub url: String,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Request body bytes.
    pub body: Vec<u8>,
}

/// Validated request handed to a [`SchemeHandler`].
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method name.
    pub method: String,
    /// Parsed request URL, guaranteed to carry the registered scheme.
    pub url: Url,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Request body bytes.
    pub body: Vec<u8>,
}

impl Request {
    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response produced by a [`SchemeHandler`].
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// Empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// 200 response carrying the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Application-side server for one custom scheme.
pub trait SchemeHandler: Send + Sync {
    /// Produces the response for a validated request.
    fn serve(&self, request: Request) -> Result<Response, SchemeError>;
}

impl<F> SchemeHandler for F
where
    F: Fn(Request) -> Result<Response, SchemeError> + Send + Sync,
{
    fn serve(&self, request: Request) -> Result<Response, SchemeError> {
        self(request)
    }
}

/// Toolkit-side receiver for one task's outcome.
///
/// A completed task sees exactly one of two shapes: `respond`, `write` for a
/// non-empty body, then `finish`; or a single `fail`. A cancelled task sees
/// nothing at all.
pub trait TaskSink: Send {
    /// Delivers the status line and headers.
    fn respond(&mut self, status: u16, headers: &[(String, String)]);

    /// Delivers a chunk of body bytes.
    fn write(&mut self, chunk: &[u8]);

    /// Marks the task complete.
    fn finish(&mut self);

    /// Marks the task failed with a reason.
    fn fail(&mut self, reason: &str);
}

struct TaskState {
    cancelled: Arc<AtomicBool>,
}

/// In-flight request tracking for one custom URL scheme.
pub struct SchemeTasks {
    scheme: String,
    handler: Arc<dyn SchemeHandler>,
    tasks: Arc<DashMap<u64, TaskState>>,
}

impl SchemeTasks {
    /// Registers a handler for the given scheme.
    pub fn new(scheme: impl Into<String>, handler: impl SchemeHandler + 'static) -> Self {
        Self {
            scheme: scheme.into(),
            handler: Arc::new(handler),
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// The scheme this instance serves.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Number of tasks currently being served.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Validates the request and serves it on a worker thread.
    ///
    /// A request that fails validation is rejected through `sink.fail`
    /// without ever being tracked. Otherwise the worker forwards the
    /// handler's outcome through the sink once it has checked that the task
    /// was not stopped in the meantime.
    pub fn start<S>(&self, task_id: u64, raw: RawRequest, mut sink: S)
    where
        S: TaskSink + 'static,
    {
        let request = match self.validate(raw) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("scheme {:?} task {task_id} rejected: {err}", self.scheme);
                sink.fail(&err.to_string());
                return;
            }
        };

        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks.insert(
            task_id,
            TaskState {
                cancelled: Arc::clone(&cancelled),
            },
        );

        let handler = Arc::clone(&self.handler);
        let tasks = Arc::clone(&self.tasks);
        let spawned = thread::Builder::new()
            .name(format!("vitro-scheme-{task_id}"))
            .spawn(move || {
                let served = handler.serve(request);
                tasks.remove(&task_id);
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                match served {
                    Ok(response) => {
                        sink.respond(response.status, &response.headers);
                        if !response.body.is_empty() {
                            sink.write(&response.body);
                        }
                        sink.finish();
                    }
                    Err(err) => sink.fail(&err.to_string()),
                }
            });
        if let Err(err) = spawned {
            self.tasks.remove(&task_id);
            log::warn!("scheme {:?} task {task_id} worker spawn failed: {err}", self.scheme);
        }
    }

    /// Marks a task cancelled so its outcome is discarded.
    ///
    /// Unknown or already completed task ids are ignored.
    pub fn stop(&self, task_id: u64) {
        if let Some(task) = self.tasks.get(&task_id) {
            task.cancelled.store(true, Ordering::Release);
        }
    }

    fn validate(&self, raw: RawRequest) -> Result<Request, SchemeError> {
        let url = Url::parse(&raw.url)?;
        if url.scheme() != self.scheme {
            return Err(SchemeError::SchemeMismatch {
                scheme: self.scheme.clone(),
                url: raw.url,
            });
        }
        Ok(Request {
            method: raw.method,
            url,
            headers: raw.headers,
            body: raw.body,
        })
    }
}

/// Failures while serving a scheme request.
#[derive(Debug, Error)]
pub enum SchemeError {
    /// The request URL does not carry the registered scheme.
    #[error("request URL {url:?} does not match scheme {scheme:?}")]
    SchemeMismatch {
        /// The registered scheme.
        scheme: String,
        /// The offending URL.
        url: String,
    },

    /// The request URL could not be parsed.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The handler reported an application failure.
    #[error("{0}")]
    Handler(String),
}
