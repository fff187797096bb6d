//! JSON schema generation for the configuration file.

use super::WmConfig;

/// Generates a JSON Schema for the Trellis configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(WmConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!(
                "https://raw.githubusercontent.com/trellis-wm/trellis/main/trellis.schema.json"
            ),
        );
    }

    schema
}

/// Generates a pretty-printed JSON Schema string for the configuration.
#[must_use]
pub fn generate_schema_json() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_schema_produces_valid_json() {
        let schema_json = generate_schema_json();
        let parsed: serde_json::Value = serde_json::from_str(&schema_json).unwrap();

        assert!(parsed["$id"].as_str().unwrap().ends_with("trellis.schema.json"));
        assert_eq!(parsed["title"], "WmConfig");
        assert!(parsed["properties"]["gaps"].is_object());
        assert!(parsed["properties"]["workspaces"].is_object());
    }

    #[test]
    fn test_schema_contains_window_rule() {
        let parsed: serde_json::Value = serde_json::from_str(&generate_schema_json()).unwrap();
        assert!(parsed["$defs"]["WindowRule"].is_object());
    }
}
