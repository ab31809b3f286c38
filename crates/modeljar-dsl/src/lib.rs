// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request Type Definitions - Single Source of Truth
//!
//! This crate defines the compile request types used throughout the codebase:
//! - Runtime deserialization of request JSON sent by the rule editor
//! - Compiler type-safe access to models and fields
//! - JSON Schema export via schemars (see [`spec`])

mod schema_types;

pub use schema_types::*;

// Specification generation (request JSON Schema)
pub mod spec;

// ============================================================================
// Parsing Functions
// ============================================================================

/// Parse a compile request from a JSON Value
pub fn parse_compile_request(json: &serde_json::Value) -> Result<CompileRequest, String> {
    serde_json::from_value(json.clone())
        .map_err(|e| format!("Failed to parse compile request: {}", e))
}

/// Parse a single data model from a JSON Value
pub fn parse_data_model(json: &serde_json::Value) -> Result<DataModel, String> {
    serde_json::from_value(json.clone()).map_err(|e| format!("Failed to parse data model: {}", e))
}

// ============================================================================
// DataModel Methods
// ============================================================================

impl DataModel {
    /// Fully qualified class name: `packageName.name`, or just `name` for the
    /// default package.
    pub fn qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }

    /// Fields flagged as required, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &DataModelField> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Returns true if at least one field is required.
    pub fn has_required_fields(&self) -> bool {
        self.required_fields().next().is_some()
    }
}

// ============================================================================
// DataModelField Methods
// ============================================================================

impl DataModelField {
    /// Create a field with the given name and type and no other attributes.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            name: name.into(),
            field_type,
            required: false,
            default_value: None,
            description: None,
            enum_values: Vec::new(),
            items_type: None,
            object_type: None,
        }
    }

    /// The declared default value, ignoring JSON `null`.
    pub fn default_value(&self) -> Option<&serde_json::Value> {
        self.default_value.as_ref().filter(|v| !v.is_null())
    }

    /// The field description, ignoring empty strings.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

// ============================================================================
// FieldType Helper Methods
// ============================================================================

impl FieldType {
    /// Get as string representation (the wire tag)
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Enum => "enum",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Other(tag) => tag,
        }
    }

    /// Parse from a wire tag. Unknown tags are preserved in `Other`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "enum" => FieldType::Enum,
            "object" => FieldType::Object,
            "array" => FieldType::Array,
            other => FieldType::Other(other.to_string()),
        }
    }

    /// Types compared structurally (`Objects.equals`) rather than with `==`.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Array | FieldType::Object
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        FieldType::parse(&tag)
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::parse(tag)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_compile_request_camel_case() {
        let request = parse_compile_request(&json!({
            "dataModels": [{
                "id": "m1",
                "name": "Person",
                "packageName": "com.example",
                "fields": [
                    {"name": "age", "type": "number", "required": true},
                    {"name": "tags", "type": "array", "itemsType": "string"},
                    {"name": "address", "type": "object", "objectType": "com.example.Address"}
                ]
            }],
            "ruleName": "My Rule",
            "version": "2.0",
            "includeDrools": true,
            "droolsContent": "rule \"x\" end"
        }))
        .unwrap();

        assert_eq!(request.rule_name.as_deref(), Some("My Rule"));
        assert!(request.include_drools);
        let model = &request.data_models[0];
        assert_eq!(model.qualified_name(), "com.example.Person");
        assert_eq!(model.fields[0].field_type, FieldType::Number);
        assert!(model.fields[0].required);
        assert_eq!(model.fields[1].items_type.as_deref(), Some("string"));
        assert_eq!(
            model.fields[2].object_type.as_deref(),
            Some("com.example.Address")
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let request = parse_compile_request(&json!({
            "dataModels": [],
            "ruleName": null
        }))
        .unwrap();
        assert!(request.data_models.is_empty());
        assert!(request.rule_name.is_none());
        assert!(!request.include_drools);
    }

    #[test]
    fn test_unknown_field_type_is_preserved() {
        let model = parse_data_model(&json!({
            "name": "Thing",
            "packageName": "a.b",
            "fields": [{"name": "x", "type": "integer"}]
        }))
        .unwrap();
        assert_eq!(
            model.fields[0].field_type,
            FieldType::Other("integer".to_string())
        );

        let round_trip = serde_json::to_value(&model.fields[0]).unwrap();
        assert_eq!(round_trip["type"], "integer");
    }

    #[test]
    fn test_null_default_is_absent() {
        let model = parse_data_model(&json!({
            "name": "Thing",
            "packageName": "a.b",
            "fields": [
                {"name": "x", "type": "string", "defaultValue": null},
                {"name": "y", "type": "string", "defaultValue": ""}
            ]
        }))
        .unwrap();
        assert!(model.fields[0].default_value().is_none());
        assert_eq!(model.fields[1].default_value(), Some(&json!("")));
    }

    #[test]
    fn test_qualified_name_default_package() {
        let model = DataModel {
            name: "Loose".to_string(),
            ..Default::default()
        };
        assert_eq!(model.qualified_name(), "Loose");
    }

    #[test]
    fn test_required_fields_keep_declaration_order() {
        let model = parse_data_model(&json!({
            "name": "Person",
            "packageName": "a.b",
            "fields": [
                {"name": "name", "type": "string", "required": true},
                {"name": "nick", "type": "string"},
                {"name": "age", "type": "number", "required": true}
            ]
        }))
        .unwrap();
        let names: Vec<&str> = model.required_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert!(model.has_required_fields());

        let optional = DataModel {
            fields: vec![DataModelField::new("nick", FieldType::String)],
            ..Default::default()
        };
        assert!(!optional.has_required_fields());
    }

    #[test]
    fn test_reference_types() {
        assert!(FieldType::String.is_reference());
        assert!(FieldType::Array.is_reference());
        assert!(FieldType::Object.is_reference());
        assert!(!FieldType::Enum.is_reference());
        assert!(!FieldType::Date.is_reference());
        assert!(!FieldType::Other("integer".into()).is_reference());
    }
}
