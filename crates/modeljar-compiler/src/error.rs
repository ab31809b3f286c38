// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for model compilation.

use thiserror::Error;

use crate::archive::PackagingError;
use crate::codegen::GenerationError;
use crate::toolchain::{Diagnostic, ToolchainError};
use crate::validation::ValidationError;

/// Errors that can occur anywhere in the compile pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The request was rejected before any source was generated.
    #[error("{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Source generation failed.
    #[error("Code generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The toolchain reported at least one error diagnostic.
    #[error("Compilation failed:\n{message}")]
    Compilation {
        /// All diagnostics reported for the failing batch, warnings included.
        diagnostics: Vec<Diagnostic>,
        /// Aggregated, human-readable description of the failure.
        message: String,
    },

    /// The toolchain could not be found or could not run.
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// Archive assembly failed.
    #[error("Packaging failed: {0}")]
    Packaging(#[from] PackagingError),

    /// Compilation produced no class files.
    #[error("No classes were compiled successfully")]
    NoClassesCompiled,
}

impl CompileError {
    /// Returns true if the failure was caused by the request contents rather
    /// than by the compiler environment.
    ///
    /// Request handlers map client errors to a 4xx response and everything
    /// else to a processing failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CompileError::Validation(_) | CompileError::NoClassesCompiled
        )
    }

    /// Returns true if no compiler toolchain is installed.
    pub fn is_toolchain_unavailable(&self) -> bool {
        matches!(self, CompileError::Toolchain(ToolchainError::Unavailable(_)))
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!(
        "Schema validation failed with {} error(s):\n\n{}",
        errors.len(),
        messages.join("\n")
    )
}

/// Result type for compile pipeline operations.
pub type Result<T> = std::result::Result<T, CompileError>;
