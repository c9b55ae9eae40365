//! Embedding interface between the webview facade and a platform toolkit.

use std::ops::BitOr;

use crate::error::EvalError;

/// RGBA window background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from all four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(255, 255, 255)
    }
}

/// Kind of modal system dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogType {
    /// File or directory picker.
    Open,
    /// Save-file picker.
    Save,
    /// Message box.
    Alert,
}

/// Modifier flags for a system dialog, combinable with `|`.
///
/// [`FILE`](DialogFlags::FILE) and [`DIRECTORY`](DialogFlags::DIRECTORY)
/// select what an open dialog picks; the alert styles occupy the bits
/// covered by [`ALERT_MASK`](DialogFlags::ALERT_MASK).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogFlags(u32);

impl DialogFlags {
    /// Open dialog picks files.
    pub const FILE: Self = Self(0);
    /// Open dialog picks directories.
    pub const DIRECTORY: Self = Self(1);
    /// Alert styled as information.
    pub const INFO: Self = Self(1 << 1);
    /// Alert styled as a warning.
    pub const WARNING: Self = Self(2 << 1);
    /// Alert styled as an error.
    pub const ERROR: Self = Self(3 << 1);
    /// Bits carrying the alert style.
    pub const ALERT_MASK: Self = Self(3 << 1);

    /// Raw bits as the toolkit receives them.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DialogFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Platform toolkit adaptor driving one webview window.
///
/// Every method except [`wake`](Engine::wake) must only be called from the
/// thread that runs the toolkit event loop. The facade enforces this by
/// funneling work from other threads through its task queue.
pub trait Engine: Send + Sync + 'static {
    /// Evaluates a script in the current page, synchronously.
    fn eval(&self, js: &str) -> Result<(), EvalError>;

    /// Updates the window title.
    fn set_title(&self, title: &str);

    /// Enters or leaves fullscreen.
    fn set_fullscreen(&self, fullscreen: bool);

    /// Sets the window background color.
    fn set_color(&self, color: Color);

    /// Shows a modal system dialog and blocks until it closes.
    ///
    /// `arg` is the default path for pickers or the body text for alerts.
    /// Pickers return the chosen path; alerts and cancelled dialogs return
    /// an empty string.
    fn dialog(&self, kind: DialogType, flags: DialogFlags, title: &str, arg: &str) -> String;

    /// Asks the event loop to exit.
    fn terminate(&self);

    /// Interrupts the event loop so it drains the task queue.
    ///
    /// Unlike the other methods this is safe to call from any thread.
    fn wake(&self);
}
