// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request Type Definitions
//!
//! These types describe the compile request payload sent by the rule editor:
//! 1. Runtime - deserializing request JSON
//! 2. Compiler - typed access to models and fields
//! 3. Spec - JSON Schema export via schemars

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request schema version - bump when making breaking changes
pub const SCHEMA_VERSION: &str = "1.0.0";

// ============================================================================
// Root Types
// ============================================================================

/// A request to compile a set of data models into a JAR.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    /// Data models to generate and compile, in schema order
    #[serde(default)]
    pub data_models: Vec<DataModel>,

    /// Display name of the rule set. Seeds the archive title and file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,

    /// Package of the rule set. Accepted for compatibility, not used by the compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_package: Option<String>,

    /// Archive version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Whether to bundle the DRL payload and a kmodule descriptor
    #[serde(default)]
    pub include_drools: bool,

    /// DRL text to bundle when `include_drools` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drools_content: Option<String>,
}

// ============================================================================
// Data Models
// ============================================================================

/// A data model definition. Compiles to one Java class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    /// Editor-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Simple class name
    #[serde(default)]
    pub name: String,

    /// Java package of the generated class
    #[serde(default)]
    pub package_name: String,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<DataModelField>,

    /// Human-readable description, emitted as class Javadoc
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A single field of a data model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataModelField {
    /// Editor-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Field name, used verbatim as the Java field name
    pub name: String,

    /// Abstract field type tag
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub field_type: FieldType,

    /// Whether the field is a parameter of the required-fields constructor
    #[serde(default)]
    pub required: bool,

    /// Default value applied by the generated constructors.
    /// JSON `null` is treated the same as an absent value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    /// Human-readable description, emitted as field Javadoc
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Allowed values of an `enum` field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Element type tag of an `array` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_type: Option<String>,

    /// Class name of an `object` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

// ============================================================================
// Field Types
// ============================================================================

/// Abstract field type vocabulary.
///
/// Tags outside the known vocabulary are kept verbatim in `Other` so the
/// compiler can map them to its fallback type instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    Object,
    Array,
    Other(String),
}
