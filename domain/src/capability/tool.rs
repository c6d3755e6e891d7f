//! Tool adapter: a capability unit exposed as a callable action.

use super::unit::CapabilityUnit;
use crate::core::error::DomainError;
use std::sync::Arc;

/// Name of the single string argument every delegate tool accepts.
pub const TOOL_INPUT_PARAM: &str = "input";

/// A capability unit wrapped as a named, described tool (Value Object)
///
/// The adapter shares the unit; it never owns configuration of its own
/// beyond the name and description the supervising model sees.
#[derive(Debug, Clone)]
pub struct ToolAdapter {
    unit: Arc<CapabilityUnit>,
    name: String,
    description: String,
}

impl ToolAdapter {
    pub fn new(
        unit: Arc<CapabilityUnit>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidName(format!(
                "tool name '{}' must be non-empty and contain no whitespace",
                name
            )));
        }
        Ok(Self {
            unit,
            name,
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> &Arc<CapabilityUnit> {
        &self.unit
    }

    /// Provider-neutral JSON Schema for this tool.
    ///
    /// Format: `{"name", "description", "input_schema"}` with one required
    /// string parameter, [`TOOL_INPUT_PARAM`].
    pub fn to_api_tool(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": {
                "type": "object",
                "properties": {
                    TOOL_INPUT_PARAM: {
                        "type": "string",
                        "description": format!("The text for {} to work on", self.unit.name()),
                    }
                },
                "required": [TOOL_INPUT_PARAM],
            }
        })
    }

    /// Extract the delegate's input text from the raw JSON arguments of a call.
    ///
    /// Models occasionally send plain text or a differently named field;
    /// the raw arguments are then passed through unchanged.
    pub fn input_from_arguments(arguments: &str) -> String {
        match serde_json::from_str::<serde_json::Value>(arguments) {
            Ok(serde_json::Value::Object(map)) => match map.get(TOOL_INPUT_PARAM) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => arguments.to_string(),
            },
            _ => arguments.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Model;

    fn unit() -> Arc<CapabilityUnit> {
        Arc::new(CapabilityUnit::new("Rethinking Subagent", "Rethink.", Model::Gpt4o).unwrap())
    }

    #[test]
    fn test_schema_shape() {
        let tool = ToolAdapter::new(unit(), "rethink", "iterative rethinking subagent").unwrap();
        let schema = tool.to_api_tool();

        assert_eq!(schema["name"], "rethink");
        assert_eq!(schema["description"], "iterative rethinking subagent");
        assert_eq!(schema["input_schema"]["type"], "object");
        assert_eq!(schema["input_schema"]["properties"]["input"]["type"], "string");
        assert_eq!(schema["input_schema"]["required"][0], "input");
    }

    #[test]
    fn test_invalid_tool_names() {
        assert!(ToolAdapter::new(unit(), "", "x").is_err());
        assert!(ToolAdapter::new(unit(), "re think", "x").is_err());
    }

    #[test]
    fn test_input_from_arguments() {
        assert_eq!(
            ToolAdapter::input_from_arguments(r#"{"input":"Is remote work good?"}"#),
            "Is remote work good?"
        );
        assert_eq!(ToolAdapter::input_from_arguments("plain text"), "plain text");
        assert_eq!(
            ToolAdapter::input_from_arguments(r#"{"message":"x"}"#),
            r#"{"message":"x"}"#
        );
    }
}
