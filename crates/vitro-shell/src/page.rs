//! Page bootstrap scripts and window options.

use std::fmt::Write as _;

/// Blank single-page document loaded when no URL is given.
///
/// Percent-encoded `data:` URL with an empty `#app` container and an empty
/// script element, ready for injected application code.
pub const DEFAULT_URL: &str = "data:text/\
    html,%3C%21DOCTYPE%20html%3E%0A%3Chtml%20lang=%22en%22%3E%0A%3Chead%3E%\
    3Cmeta%20charset=%22utf-8%22%3E%3Cmeta%20http-equiv=%22X-UA-Compatible%22%\
    20content=%22IE=edge%22%3E%3C%2Fhead%3E%0A%3Cbody%3E%3Cdiv%20id=%22app%22%\
    3E%3C%2Fdiv%3E%3Cscript%20type=%22text%2Fjavascript%22%3E%3C%2Fscript%3E%\
    3C%2Fbody%3E%0A%3C%2Fhtml%3E";

/// Script function that appends a `<style>` node carrying its argument,
/// falling back to `styleSheet.cssText` on legacy engines.
const CSS_INJECT_FUNCTION: &str = "(function(e){var \
    t=document.createElement('style'),d=document.head||document.\
    getElementsByTagName('head')[0];t.setAttribute('type','text/\
    css'),t.styleSheet?t.styleSheet.cssText=e:t.appendChild(document.\
    createTextNode(e)),d.appendChild(t)})";

/// Renders text as a JavaScript string literal.
///
/// Escapes everything that could terminate the literal or the surrounding
/// markup: quotes, backslashes, control characters, and the
/// `<`, `>`, `'` trio that would break scripts embedded in HTML. Non-ASCII
/// text passes through unchanged since engines take UTF-8 source.
pub fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '\'' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Builds the script that injects a stylesheet into the current page.
pub fn css_inject_script(css: &str) -> String {
    format!("{}({})", CSS_INJECT_FUNCTION, js_string(css))
}

/// Builds the document-start script that installs `window.external.invoke`.
///
/// `native_post` is a toolkit-specific expression evaluating to the native
/// message-post function, for example
/// `window.webkit.messageHandlers.external.postMessage.bind(window.webkit.messageHandlers.external)`.
/// The reference is captured before page scripts run and the `external`
/// global is frozen, so the invoke pathway stays stable for the lifetime of
/// the page.
pub fn external_invoke_shim(native_post: &str) -> String {
    format!(
        "(function(){{var _post={native_post};\
         Object.defineProperty(window,'external',{{value:Object.freeze(\
         {{invoke:function(s){{_post(s)}}}}),writable:false,configurable:false}})}})();"
    )
}

/// Window construction options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Window title.
    pub title: String,
    /// Initial page URL.
    pub url: String,
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Whether to enable the toolkit developer tools.
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            title: "Vitro".to_owned(),
            url: DEFAULT_URL.to_owned(),
            width: 640,
            height: 480,
            resizable: true,
            debug: false,
        }
    }
}
