// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Code generation modules for model compilation.
//!
//! Translates data model definitions into Java source text. Each model becomes
//! one compilation unit keyed by its qualified class name.

pub mod class;
pub mod type_mapper;
pub mod writer;

use std::collections::HashSet;

use modeljar_dsl::DataModel;
use thiserror::Error;

use crate::toolchain::CompilationUnit;

pub use class::ClassEmitter;
pub use type_mapper::{ResolvedType, TypeTable};

// ============================================================================
// Codegen Error Types
// ============================================================================

/// Errors that can occur during code generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Two models resolve to the same qualified class name.
    #[error("Duplicate class '{qualified_name}': every model needs a unique package and name")]
    DuplicateQualifiedName {
        /// The qualified name that appears more than once.
        qualified_name: String,
    },

    /// A model has no class name.
    #[error("Model at index {model_index} has no class name")]
    MissingClassName {
        /// Position of the model in the request.
        model_index: usize,
    },
}

/// Generate the Java source of a single model.
pub fn generate_source(model: &DataModel, table: &TypeTable) -> String {
    ClassEmitter::new(model, table).emit()
}

/// Generate one compilation unit per model, in schema order.
///
/// # Errors
///
/// Returns `GenerationError` if a model has no name or two models share a
/// qualified name.
pub fn generate_units(
    models: &[DataModel],
    table: &TypeTable,
) -> Result<Vec<CompilationUnit>, GenerationError> {
    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(models.len());

    for (model_index, model) in models.iter().enumerate() {
        if model.name.trim().is_empty() {
            return Err(GenerationError::MissingClassName { model_index });
        }

        let qualified_name = model.qualified_name();
        if !seen.insert(qualified_name.clone()) {
            return Err(GenerationError::DuplicateQualifiedName { qualified_name });
        }

        let source = generate_source(model, table);
        tracing::debug!(
            qualified_name = %qualified_name,
            source_bytes = source.len(),
            "Generated Java source"
        );
        units.push(CompilationUnit::new(qualified_name, source));
    }

    Ok(units)
}
