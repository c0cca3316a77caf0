//! Action definitions, schemas, incoming invocations and results.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::error::{NeuroError, Result};

/// Keywords the peer's schema engine does not understand. Schemas may carry
/// them, but handlers must not rely on the peer enforcing them.
pub const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$ref",
    "$defs",
    "definitions",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "patternProperties",
    "dependentSchemas",
    "unevaluatedProperties",
];

/// JSON-schema-like object describing an action's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    /// Always `"object"` for schemas built through this type.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property name -> property schema.
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Names of required properties.
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ActionSchema {
    fn default() -> Self {
        Self {
            schema_type: "object".into(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }
}

impl ActionSchema {
    /// Wrap a properties map and required list into an object schema.
    pub fn object<I, S>(properties: Map<String, Value>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema_type: "object".into(),
            properties,
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Add (or replace) one property schema.
    pub fn property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark a property as required. Duplicates are ignored.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Composite/reference keywords found anywhere in the property tree,
    /// sorted and de-duplicated.
    pub fn unsupported_keywords(&self) -> Vec<&'static str> {
        let mut found = BTreeSet::new();
        for node in self.properties.values() {
            scan_node(node, &mut found);
        }
        found.into_iter().collect()
    }
}

fn scan_node(node: &Value, found: &mut BTreeSet<&'static str>) {
    let Value::Object(map) = node else { return };

    for kw in UNSUPPORTED_KEYWORDS {
        if map.contains_key(*kw) {
            found.insert(*kw);
        }
    }

    if let Some(Value::Object(props)) = map.get("properties") {
        for child in props.values() {
            scan_node(child, found);
        }
    }
    match map.get("items") {
        Some(Value::Array(items)) => items.iter().for_each(|i| scan_node(i, found)),
        Some(item) => scan_node(item, found),
        None => {}
    }
}

/// Advertised capability, built from a handler at registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ActionSchema>,
}

/// Peer-initiated invocation (`action` command payload).
#[derive(Debug, Serialize, Deserialize)]
pub struct IncomingAction {
    /// Correlation id assigned by the peer.
    pub id: String,
    /// Registered action name.
    pub name: String,
    /// Opaque, action-specific arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}

/// Outcome of validating an incoming action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Parse optional action data into a typed struct.
///
/// Absent data yields `T::default()`, so handlers with all-optional
/// parameters accept invocations that carry no payload.
pub fn parse_action_data<T>(data: Option<&RawValue>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match data {
        None => Ok(T::default()),
        Some(raw) => serde_json::from_str(raw.get())
            .map_err(|e| NeuroError::Decode(format!("invalid action data: {e}"))),
    }
}
