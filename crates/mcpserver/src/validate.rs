use serde_json::Value;
use crate::types::Tool;

impl Tool {
    /// Validate arguments against the tool's input schema metadata.
    ///
    /// Arguments must be an object, every required field must be present and
    /// every present field with a declared type must match it. Fields the
    /// schema does not mention are ignored.
    pub fn validate_arguments(&self, args: &Value) -> Result<(), String> {
        let obj = match args {
            Value::Object(obj) => obj,
            other => {
                return Err(format!(
                    "expected object, received {}",
                    json_type_name(other)
                ))
            }
        };
        let meta = &self.schema_meta;

        // Check required fields.
        for field in &meta.required {
            if !obj.contains_key(field) {
                return Err(format!("missing required field \"{}\"", field));
            }
        }

        // Check declared types of the fields that were supplied.
        let mut fields: Vec<&String> = obj.keys().collect();
        fields.sort();
        for field in fields {
            let Some(expected) = meta.property_types.get(field) else {
                continue;
            };
            let value = &obj[field];
            if !type_matches(expected, value) {
                return Err(format!(
                    "field \"{}\": expected {}, received {}",
                    field,
                    expected,
                    json_type_name(value)
                ));
            }
        }

        Ok(())
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        // Unknown type keywords are not enforced.
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_tools;

    fn make_tool(schema_json: &str) -> Tool {
        let json = format!(
            r#"[{{"name":"test","description":"test","inputSchema":{}}}]"#,
            schema_json
        );
        let tools = parse_tools(json.as_bytes()).unwrap();
        tools.into_iter().next().unwrap()
    }

    const VIDEO_SCHEMA: &str = r#"{"type":"object","properties":{"videoId":{"type":"string"},"title":{"type":"string"}},"required":["videoId"]}"#;

    #[test]
    fn test_validate_required_present() {
        let tool = make_tool(VIDEO_SCHEMA);
        let args = serde_json::json!({"videoId": "abc"});
        assert!(tool.validate_arguments(&args).is_ok());
    }

    #[test]
    fn test_validate_required_missing() {
        let tool = make_tool(VIDEO_SCHEMA);
        let args = serde_json::json!({});
        let err = tool.validate_arguments(&args).unwrap_err();
        assert!(err.contains("missing required field \"videoId\""));
    }

    #[test]
    fn test_validate_wrong_type() {
        let tool = make_tool(VIDEO_SCHEMA);
        let args = serde_json::json!({"videoId": 42});
        let err = tool.validate_arguments(&args).unwrap_err();
        assert_eq!(err, "field \"videoId\": expected string, received number");
    }

    #[test]
    fn test_validate_optional_wrong_type() {
        let tool = make_tool(VIDEO_SCHEMA);
        let args = serde_json::json!({"videoId": "abc", "title": ["x"]});
        assert!(tool.validate_arguments(&args).is_err());
    }

    #[test]
    fn test_validate_ignores_unknown_fields() {
        let tool = make_tool(VIDEO_SCHEMA);
        let args = serde_json::json!({"videoId": "abc", "autoplay": true});
        assert!(tool.validate_arguments(&args).is_ok());
    }

    #[test]
    fn test_validate_non_object() {
        let tool = make_tool(VIDEO_SCHEMA);
        let err = tool.validate_arguments(&serde_json::json!("abc")).unwrap_err();
        assert_eq!(err, "expected object, received string");
    }

    #[test]
    fn test_validate_integer() {
        let tool = make_tool(r#"{"type":"object","properties":{"n":{"type":"integer"}}}"#);
        assert!(tool.validate_arguments(&serde_json::json!({"n": 3})).is_ok());
        assert!(tool.validate_arguments(&serde_json::json!({"n": 3.5})).is_err());
    }
}
