// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Compile request validation.
//!
//! This module validates requests before any source is generated to ensure:
//! - At least one data model is present
//! - Class, package and field names are legal Java identifiers
//! - Class and field names do not shadow names the generated code relies on
//! - Field names are unique within a model
//!
//! Incomplete or unknown field types are reported as warnings; the generator
//! falls back to `Object` for them.

use std::collections::HashSet;

use modeljar_dsl::{CompileRequest, DataModel, DataModelField, FieldType, spec::FIELD_TYPE_TAGS};

// ============================================================================
// Validation Result Types
// ============================================================================

/// Result of request validation containing errors and warnings.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Hard errors that prevent compilation.
    pub errors: Vec<ValidationError>,
    /// Soft warnings that don't prevent compilation but indicate potential issues.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are allowed).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// Errors that can occur during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)] // Fields are self-documenting from variant docs
pub enum ValidationError {
    /// The request contains no data models.
    NoDataModels,
    /// A model has an empty name.
    EmptyModelName { model_index: usize },
    /// A model name is not a legal Java class name.
    InvalidClassName { model: String, reason: String },
    /// A package name is not a legal dotted Java package.
    InvalidPackageName { model: String, package_name: String },
    /// A field has an empty name.
    EmptyFieldName { model: String, field_index: usize },
    /// A field name is not a legal Java identifier.
    InvalidFieldName {
        model: String,
        field: String,
        reason: String,
    },
    /// Two fields of one model share a name.
    DuplicateFieldName { model: String, field: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoDataModels => {
                write!(f, "[E001] Request contains no data models")
            }
            ValidationError::EmptyModelName { model_index } => {
                write!(f, "[E002] Data model at index {} has no name", model_index)
            }
            ValidationError::InvalidClassName { model, reason } => {
                write!(
                    f,
                    "[E003] Data model '{}' is not a valid Java class name: {}",
                    model, reason
                )
            }
            ValidationError::InvalidPackageName {
                model,
                package_name,
            } => {
                write!(
                    f,
                    "[E004] Data model '{}' has invalid package name '{}'",
                    model, package_name
                )
            }
            ValidationError::EmptyFieldName { model, field_index } => {
                write!(
                    f,
                    "[E005] Field at index {} of data model '{}' has no name",
                    field_index, model
                )
            }
            ValidationError::InvalidFieldName {
                model,
                field,
                reason,
            } => {
                write!(
                    f,
                    "[E006] Field '{}' of data model '{}' is not a valid Java identifier: {}",
                    field, model, reason
                )
            }
            ValidationError::DuplicateFieldName { model, field } => {
                write!(
                    f,
                    "[E007] Data model '{}' declares field '{}' more than once",
                    model, field
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// Validation Warnings
// ============================================================================

/// Warnings that don't prevent compilation but indicate potential issues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ValidationWarning {
    /// An `array` field has no `itemsType`.
    ArrayWithoutItemsType { model: String, field: String },
    /// An `object` field has no `objectType`.
    ObjectWithoutObjectType { model: String, field: String },
    /// A field type tag is not recognized.
    UnknownFieldType {
        model: String,
        field: String,
        field_type: String,
        suggestion: Option<String>,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::ArrayWithoutItemsType { model, field } => {
                write!(
                    f,
                    "[W001] Array field '{}.{}' has no itemsType; elements will be Object",
                    model, field
                )
            }
            ValidationWarning::ObjectWithoutObjectType { model, field } => {
                write!(
                    f,
                    "[W002] Object field '{}.{}' has no objectType; it will be Object",
                    model, field
                )
            }
            ValidationWarning::UnknownFieldType {
                model,
                field,
                field_type,
                suggestion,
            } => {
                write!(
                    f,
                    "[W003] Field '{}.{}' has unknown type '{}'; it will be Object",
                    model, field, field_type
                )?;
                if let Some(suggestion) = suggestion {
                    write!(f, ". Did you mean '{}'?", suggestion)?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Main Validation Function
// ============================================================================

/// Validate a compile request.
///
/// Returns a `ValidationResult` containing errors and warnings.
/// Compilation should fail if there are any errors.
pub fn validate_request(request: &CompileRequest) -> ValidationResult {
    let mut result = ValidationResult::default();

    if request.data_models.is_empty() {
        result.errors.push(ValidationError::NoDataModels);
        return result;
    }

    for (model_index, model) in request.data_models.iter().enumerate() {
        validate_model(model_index, model, &mut result);
    }

    result
}

fn validate_model(model_index: usize, model: &DataModel, result: &mut ValidationResult) {
    if model.name.trim().is_empty() {
        result
            .errors
            .push(ValidationError::EmptyModelName { model_index });
        return;
    }

    let label = model.qualified_name();

    if let Err(reason) = check_class_name(&model.name) {
        result.errors.push(ValidationError::InvalidClassName {
            model: label.clone(),
            reason,
        });
    }

    if !model.package_name.is_empty()
        && model
            .package_name
            .split('.')
            .any(|segment| check_identifier(segment).is_err())
    {
        result.errors.push(ValidationError::InvalidPackageName {
            model: model.name.clone(),
            package_name: model.package_name.clone(),
        });
    }

    let mut seen = HashSet::new();
    for (field_index, field) in model.fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            result.errors.push(ValidationError::EmptyFieldName {
                model: label.clone(),
                field_index,
            });
            continue;
        }

        if let Err(reason) = check_field_name(&field.name) {
            result.errors.push(ValidationError::InvalidFieldName {
                model: label.clone(),
                field: field.name.clone(),
                reason,
            });
        }

        if !seen.insert(field.name.as_str()) {
            result.errors.push(ValidationError::DuplicateFieldName {
                model: label.clone(),
                field: field.name.clone(),
            });
        }

        check_field_type(&label, field, result);
    }
}

fn check_field_type(model: &str, field: &DataModelField, result: &mut ValidationResult) {
    let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());

    match &field.field_type {
        FieldType::Array if blank(&field.items_type) => {
            result.warnings.push(ValidationWarning::ArrayWithoutItemsType {
                model: model.to_string(),
                field: field.name.clone(),
            });
        }
        FieldType::Object if blank(&field.object_type) => {
            result
                .warnings
                .push(ValidationWarning::ObjectWithoutObjectType {
                    model: model.to_string(),
                    field: field.name.clone(),
                });
        }
        FieldType::Other(tag) => {
            let known: Vec<String> = FIELD_TYPE_TAGS.iter().map(|t| t.to_string()).collect();
            result.warnings.push(ValidationWarning::UnknownFieldType {
                model: model.to_string(),
                field: field.name.clone(),
                field_type: tag.clone(),
                suggestion: find_similar_name(tag, &known),
            });
        }
        _ => {}
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "_",
];

/// Contextual keywords that cannot name a type.
const RESTRICTED_TYPE_NAMES: &[&str] = &["var", "yield", "record", "sealed", "permits"];

/// Simple names every generated class refers to unqualified. A model class
/// with one of these names would shadow it.
const GENERATED_CLASS_REFERENCES: &[&str] = &["java", "Object", "String", "Override"];

/// Check that `name` can name a generated class.
fn check_class_name(name: &str) -> Result<(), String> {
    check_identifier(name)?;
    if RESTRICTED_TYPE_NAMES.contains(&name) {
        return Err(format!("'{}' is a restricted identifier and cannot name a class", name));
    }
    if GENERATED_CLASS_REFERENCES.contains(&name) {
        return Err(format!(
            "'{}' would shadow a name the generated class depends on",
            name
        ));
    }
    Ok(())
}

/// Check that `name` can name a field of a generated class.
///
/// `equals` and `hashCode` call `java.util.Objects`, which a field named
/// `java` would obscure.
fn check_field_name(name: &str) -> Result<(), String> {
    check_identifier(name)?;
    if name == "java" {
        return Err("'java' would hide the java package used by equals and hashCode".to_string());
    }
    Ok(())
}

/// Check that `name` is a legal Java identifier.
fn check_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("name is empty".to_string());
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err(format!("must not start with '{}'", first));
    }
    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '$')) {
        return Err(format!("contains illegal character '{}'", bad));
    }
    if JAVA_KEYWORDS.contains(&name) {
        return Err(format!("'{}' is a reserved word", name));
    }
    Ok(())
}

/// Find the most similar name using Levenshtein distance.
fn find_similar_name(target: &str, candidates: &[String]) -> Option<String> {
    let target_lower = target.to_lowercase();

    candidates
        .iter()
        .filter_map(|candidate| {
            let distance = levenshtein_distance(&target_lower, &candidate.to_lowercase());
            // Only suggest if distance is reasonable (less than half the target length + 2)
            if distance <= target.len() / 2 + 2 {
                Some((candidate.clone(), distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, d)| *d)
        .map(|(name, _)| name)
}

/// Simple Levenshtein distance implementation.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            curr[j] = (prev[j] + 1).min((curr[j - 1] + 1).min(prev[j - 1] + cost));
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
