//! Capability unit entity

use super::tool::ToolAdapter;
use crate::core::error::DomainError;
use crate::core::model::Model;
use std::collections::HashSet;
use std::sync::Arc;

/// A configured language-model invocation target (Entity)
///
/// Immutable once built. Tool names are unique within one unit.
#[derive(Debug, Clone)]
pub struct CapabilityUnit {
    name: String,
    instructions: String,
    model: Model,
    tools: Vec<ToolAdapter>,
}

impl CapabilityUnit {
    /// Construct a unit without tools.
    ///
    /// Fails with a configuration error if the name or the instructions are blank.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: Model,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let instructions = instructions.into();

        if name.trim().is_empty() {
            return Err(DomainError::InvalidName(
                "capability unit name cannot be empty".to_string(),
            ));
        }
        if instructions.trim().is_empty() {
            return Err(DomainError::MalformedInstructions(name));
        }

        Ok(Self {
            name,
            instructions,
            model,
            tools: Vec::new(),
        })
    }

    /// Attach the tools this unit may call. Order is preserved.
    pub fn with_tools(mut self, tools: Vec<ToolAdapter>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for tool in self.tools.iter().chain(tools.iter()) {
            if !seen.insert(tool.name()) {
                return Err(DomainError::DuplicateToolName {
                    unit: self.name.clone(),
                    tool: tool.name().to_string(),
                });
            }
        }
        self.tools.extend(tools);
        Ok(self)
    }

    /// Expose this unit as a tool for a supervising unit.
    pub fn as_tool(
        self: &Arc<Self>,
        tool_name: impl Into<String>,
        tool_description: impl Into<String>,
    ) -> Result<ToolAdapter, DomainError> {
        ToolAdapter::new(Arc::clone(self), tool_name, tool_description)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tools(&self) -> &[ToolAdapter] {
        &self.tools
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    pub fn find_tool(&self, tool_name: &str) -> Option<&ToolAdapter> {
        self.tools.iter().find(|t| t.name() == tool_name)
    }

    /// Provider-neutral JSON Schema for every tool, in declaration order.
    pub fn tools_schema(&self) -> Vec<serde_json::Value> {
        self.tools.iter().map(ToolAdapter::to_api_tool).collect()
    }
}
