use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::types::{McpError, SchemaMeta, Tool};

/// Load tool definitions from a JSON file on disk.
pub fn load_tools(path: impl AsRef<Path>) -> Result<Vec<Tool>, McpError> {
    let data = std::fs::read(path)?;
    parse_tools(&data)
}

/// Parse tool definitions from raw JSON bytes.
pub fn parse_tools(data: &[u8]) -> Result<Vec<Tool>, McpError> {
    let raw: Vec<Value> = serde_json::from_slice(data)?;
    let mut tools = Vec::with_capacity(raw.len());

    for val in raw {
        let name = val["name"].as_str().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(McpError::Validation("tool definition without a name".into()));
        }
        let description = val["description"].as_str().unwrap_or_default().to_string();
        let input_schema = match &val["inputSchema"] {
            Value::Null => serde_json::json!({"type": "object", "properties": {}}),
            schema => schema.clone(),
        };

        // Parse schema metadata for validation.
        let schema_meta = parse_schema_meta(&input_schema);

        tools.push(Tool {
            name,
            description,
            input_schema,
            schema_meta,
        });
    }

    Ok(tools)
}

/// Extract validation metadata from a JSON Schema object.
fn parse_schema_meta(schema: &Value) -> SchemaMeta {
    let mut meta = SchemaMeta::default();

    if let Some(arr) = schema.get("required").and_then(|v| v.as_array()) {
        meta.required = arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
    }

    if let Some(obj) = schema.get("properties").and_then(|v| v.as_object()) {
        let mut types = HashMap::new();
        for (key, prop) in obj {
            if let Some(ty) = prop.get("type").and_then(|t| t.as_str()) {
                types.insert(key.clone(), ty.to_string());
            }
        }
        meta.property_types = types;
    }

    meta
}
