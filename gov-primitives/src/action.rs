//! The action payload submitted for policy evaluation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fallback action type reported when the action omits a `type` field.
pub const UNKNOWN_ACTION_TYPE: &str = "unknown";

/// Structured record describing what an agent did or intends to do.
///
/// An action is an arbitrary JSON object; the engine never imposes a schema
/// on it beyond the conventional `type` field used for audit categorization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentAction(Map<String, Value>);

impl AgentAction {
    /// Wraps an existing JSON object as an action.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the conventional action type, or [`UNKNOWN_ACTION_TYPE`] when
    /// the `type` field is absent or not a string.
    #[must_use]
    pub fn action_type(&self) -> &str {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ACTION_TYPE)
    }

    /// Returns the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Resolves a dotted field path (e.g. `context.user`) to a value.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current: Option<&Value> = None;
        for segment in path.split('.') {
            current = match current {
                None => self.0.get(segment),
                Some(Value::Object(map)) => map.get(segment),
                Some(_) => None,
            };
            current?;
        }
        current
    }

    /// Collects every string value in the action, recursively, together with
    /// its dotted (and `[index]`-suffixed for arrays) field path.
    #[must_use]
    pub fn string_fields(&self) -> Vec<(String, &str)> {
        let mut found = Vec::new();
        for (key, value) in &self.0 {
            collect_strings(key.clone(), value, &mut found);
        }
        found
    }
}

impl From<Map<String, Value>> for AgentAction {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn collect_strings<'a>(path: String, value: &'a Value, found: &mut Vec<(String, &'a str)>) {
    match value {
        Value::String(text) => found.push((path, text.as_str())),
        Value::Object(map) => {
            for (key, nested) in map {
                collect_strings(format!("{path}.{key}"), nested, found);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                collect_strings(format!("{path}[{index}]"), nested, found);
            }
        }
        _ => {}
    }
}
