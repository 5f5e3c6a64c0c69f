//! Tool definition and result types for the memory tools exposed to an LLM harness.

use crate::memory::MemoryType;
use serde::{Deserialize, Serialize};

/// Name of the tool that stores a memory.
pub const STORE_MEMORY_TOOL: &str = "store_memory";

/// Name of the tool that retrieves memories.
pub const RETRIEVE_MEMORIES_TOOL: &str = "retrieve_memories";

/// Definition of a tool that an agent can use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool identifier.
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool use instance.
    pub id: String,
    /// Which tool to call.
    pub name: String,
    /// The input parameters.
    pub input: serde_json::Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The tool_use ID this result corresponds to.
    pub tool_use_id: String,
    /// The output content (JSON text).
    pub content: String,
    /// Whether the tool execution resulted in an error.
    pub is_error: bool,
}

/// The memory tools, in the order they should be offered to the model.
pub fn memory_tool_definitions() -> Vec<ToolDefinition> {
    let type_tags: Vec<&str> = MemoryType::ALL.iter().map(|t| t.as_str()).collect();
    vec![
        ToolDefinition {
            name: STORE_MEMORY_TOOL.to_string(),
            description: "Store a memory for a user".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "userId": { "type": "string", "description": "ID of the user the memory is about" },
                    "type": {
                        "type": "string",
                        "enum": type_tags,
                        "description": "Kind of memory"
                    },
                    "content": { "type": "string", "description": "The fact to remember" }
                },
                "required": ["userId", "type", "content"]
            }),
        },
        ToolDefinition {
            name: RETRIEVE_MEMORIES_TOOL.to_string(),
            description: "Retrieve memories for a user based on a query".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "userId": { "type": "string", "description": "ID of the user whose memories to search" },
                    "query": { "type": "string", "description": "What to look for" }
                },
                "required": ["userId", "query"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tool_definitions() {
        let tools = memory_tool_definitions();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "store_memory");
        assert_eq!(tools[1].name, "retrieve_memories");

        let enum_values = tools[0].input_schema["properties"]["type"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(enum_values.len(), 4);
        assert!(enum_values.contains(&serde_json::json!("key_point")));
    }

    #[test]
    fn test_tool_definition_serialization() {
        let json = serde_json::to_string(&memory_tool_definitions()[1]).unwrap();
        assert!(json.contains("retrieve_memories"));
        assert!(json.contains("userId"));
    }
}
