//! State push statements.
//!
//! After a successful bind and after every successful dispatch, the host
//! pushes the target's serialized value into the page: an assignment to the
//! stub's `data` slot plus a conditional `render(data)` call for consumers
//! that installed the hook.

use serde::Serialize;

use crate::error::SyncError;

/// Renders the push statement for an already-serialized value.
///
/// The serialized literal appears twice so `render` receives exactly the
/// snapshot that was assigned.
pub fn sync_statement(name: &str, json: &str) -> String {
    format!("{name}.data={json};if({name}.render){{{name}.render({json});}}")
}

/// Serializes `target` and renders its push statement.
pub fn sync_script<T>(name: &str, target: &T) -> Result<String, SyncError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(target).map_err(|source| SyncError {
        name: name.to_owned(),
        source,
    })?;
    Ok(sync_statement(name, &json))
}
