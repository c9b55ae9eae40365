//! Wire envelope for script-to-host invocations.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DispatchError;

/// One script-to-host invocation request.
///
/// Missing members default to empty so a sparse envelope still parses;
/// the dispatcher then reports the lookup failure instead of the JSON
/// layer. An explicit `"params": null` also counts as no parameters.
/// Unknown members are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Binding name the call is addressed to.
    pub scope: String,
    /// Exported method name within that binding.
    pub method: String,
    /// Positional parameters as loosely-typed JSON values.
    #[serde(deserialize_with = "null_as_empty")]
    pub params: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let params = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(params.unwrap_or_default())
}

impl Envelope {
    /// Parses one raw envelope string.
    pub fn parse(raw: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_envelope() {
        let env = Envelope::parse(r#"{"scope":"test","method":"Foo1","params":[3,4.5]}"#).unwrap();
        assert_eq!(env.scope, "test");
        assert_eq!(env.method, "Foo1");
        assert_eq!(env.params, vec![json!(3), json!(4.5)]);
    }

    #[test]
    fn test_parse_defaults_missing_members() {
        let env = Envelope::parse(r#"{"scope":"test","method":"Bar"}"#).unwrap();
        assert_eq!(env.scope, "test");
        assert_eq!(env.method, "Bar");
        assert!(env.params.is_empty());

        let env = Envelope::parse("{}").unwrap();
        assert_eq!(env.scope, "");
        assert_eq!(env.method, "");
    }

    #[test]
    fn test_parse_null_params_as_empty() {
        let env = Envelope::parse(r#"{"scope":"test","method":"Bar","params":null}"#).unwrap();
        assert!(env.params.is_empty());
    }

    #[test]
    fn test_parse_ignores_unknown_members() {
        let env = Envelope::parse(r#"{"scope":"s","method":"M","params":[],"extra":1}"#).unwrap();
        assert_eq!(env.scope, "s");
    }

    #[test]
    fn test_parse_rejects_malformed_text() {
        let err = Envelope::parse("not json").unwrap_err();
        assert!(matches!(err, DispatchError::EnvelopeParse(_)));

        let err = Envelope::parse(r#"{"scope":1}"#).unwrap_err();
        assert!(matches!(err, DispatchError::EnvelopeParse(_)));
    }
}
