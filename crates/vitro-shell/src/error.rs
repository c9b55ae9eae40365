//! Shell-side error taxonomy.

use std::fmt;

use thiserror::Error;
use vitro_bridge::BindError;

/// Structured script-exception report from the engine.
///
/// Line numbers are 1-based and columns 0-based, following the convention
/// of the toolkit error objects the engines translate from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptError {
    /// Toolkit description of the failure.
    pub description: String,
    /// Exception message from the script engine.
    pub message: String,
    /// URL of the script source, when the engine reports one.
    pub source_url: Option<String>,
    /// 1-based line within the submitted text.
    pub line: Option<u32>,
    /// 0-based column within that line.
    pub column: Option<u32>,
    /// The offending source line, when the submitted text was available.
    pub excerpt: Option<String>,
}

impl ScriptError {
    /// Creates a report from the toolkit description and exception message.
    pub fn new(description: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attaches the source position the engine reported.
    pub fn at(mut self, source_url: Option<String>, line: u32, column: u32) -> Self {
        self.source_url = source_url;
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Extracts the offending line from the submitted script so the
    /// rendered diagnostic can point at it.
    pub fn annotate(mut self, script: &str) -> Self {
        if let Some(line) = self.line {
            let index = (line as usize).saturating_sub(1);
            if let Some(text) = script.lines().nth(index) {
                self.excerpt = Some(text.to_owned());
            }
        }
        self
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source_url.as_deref().unwrap_or("script");
        write!(f, "{} (", self.message)?;
        if !self.description.is_empty() {
            write!(f, "{}, ", self.description)?;
        }
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{source}:{line}:{column})")?,
            (Some(line), None) => write!(f, "{source}:{line})")?,
            _ => write!(f, "{source})")?,
        }
        if let (Some(excerpt), Some(column)) = (&self.excerpt, self.column) {
            write!(f, "\n\t{excerpt}\n\t")?;
            for _ in 0..column {
                f.write_str(" ")?;
            }
            f.write_str("^")?;
        }
        Ok(())
    }
}

/// Errors from the evaluation channel.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The page reported a script exception.
    #[error("{0}")]
    Script(ScriptError),

    /// The webview was torn down while the evaluation waited in the queue.
    #[error("webview closed before evaluation completed")]
    Disconnected,
}

/// Failures crossing the webview facade.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Binding construction or registration failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Script evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
