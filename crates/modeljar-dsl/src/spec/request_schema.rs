// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request Schema Generation
//!
//! Generates JSON Schema for the compile request from the Rust type definitions.

use schemars::schema_for;
use serde_json::{Value, json};

use crate::{CompileRequest, SCHEMA_VERSION};

/// Field type tags with a dedicated mapping. Any other tag compiles to the
/// fallback type.
pub const FIELD_TYPE_TAGS: &[&str] = &[
    "string", "number", "boolean", "date", "enum", "object", "array",
];

/// Generate the complete request schema with field type metadata
pub fn generate_request_schema() -> Value {
    let schema = schema_for!(CompileRequest);
    let mut schema_json = serde_json::to_value(&schema).unwrap_or_else(|_| json!({}));

    if let Value::Object(ref mut map) = schema_json {
        map.insert("x-field-types".to_string(), json!(FIELD_TYPE_TAGS));
        map.insert(
            "x-schema-version".to_string(),
            Value::String(SCHEMA_VERSION.to_string()),
        );
    }

    schema_json
}
