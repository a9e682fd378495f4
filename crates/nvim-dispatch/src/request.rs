//! Request validation.
//!
//! Every request enters through `validate_request`, which checks the raw
//! JSON object against the declared shape:
//!
//! ```json
//! { "action": "health" | "plugins" | "format" | "lsp",
//!   "subAction": "<string>",   // optional
//!   "target": "<string>" }     // optional
//! ```
//!
//! Values are passed through untouched; interpreting them is the
//! dispatcher's job.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DispatchError, Result};

const FIELD_ACTION: &str = "action";
const FIELD_SUB_ACTION: &str = "subAction";
const FIELD_TARGET: &str = "target";

/// Top-level operation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Health,
    Plugins,
    Format,
    Lsp,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Health, Action::Plugins, Action::Format, Action::Lsp];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Health => "health",
            Action::Plugins => "plugins",
            Action::Format => "format",
            Action::Lsp => "lsp",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DispatchError;

    fn from_str(value: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| DispatchError::UnknownAction(value.to_string()))
    }
}

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Request {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            sub_action: None,
            target: None,
        }
    }

    pub fn with_sub_action(mut self, sub_action: impl Into<String>) -> Self {
        self.sub_action = Some(sub_action.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Validate a raw JSON request.
pub fn validate_request(raw: &Value) -> Result<Request> {
    let Some(fields) = raw.as_object() else {
        return Err(DispatchError::schema("request", "expected a JSON object"));
    };

    if let Some(extra) = fields
        .keys()
        .find(|key| ![FIELD_ACTION, FIELD_SUB_ACTION, FIELD_TARGET].contains(&key.as_str()))
    {
        return Err(DispatchError::schema(
            extra.as_str(),
            "field is not allowed",
        ));
    }

    let action = match fields.get(FIELD_ACTION) {
        None => return Err(DispatchError::schema(FIELD_ACTION, "field is required")),
        Some(Value::String(name)) => name.parse::<Action>().map_err(|_| {
            DispatchError::schema(
                FIELD_ACTION,
                format!("expected one of health, plugins, format, lsp; got `{name}`"),
            )
        })?,
        Some(other) => {
            return Err(DispatchError::schema(
                FIELD_ACTION,
                format!("expected a string, got {}", json_type(other)),
            ))
        }
    };

    Ok(Request {
        action,
        sub_action: optional_string(fields.get(FIELD_SUB_ACTION), FIELD_SUB_ACTION)?,
        target: optional_string(fields.get(FIELD_TARGET), FIELD_TARGET)?,
    })
}

fn optional_string(value: Option<&Value>, field: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(DispatchError::schema(
            field,
            format!("expected a string, got {}", json_type(other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
