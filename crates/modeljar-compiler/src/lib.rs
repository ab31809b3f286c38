// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Modeljar Compiler - Data Models to Java Archives
//!
//! This crate turns data model definitions sent by the rule editor into Java
//! value classes, compiles them, and packages the class files into a JAR,
//! optionally bundling a Drools rule file and its module descriptor.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Model Compilation Pipeline                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//!     ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//!     │  Compile    │      │    Java     │      │   Class     │
//!     │  Request    │─────▶│   Sources   │─────▶│   Files     │
//!     │  (JSON)     │      │  (codegen)  │      │ (toolchain) │
//!     └─────────────┘      └─────────────┘      └─────────────┘
//!           │                                         │
//!           ▼                                         ▼
//!     ┌─────────────┐                          ┌─────────────┐
//!     │ Validation  │                          │     JAR     │
//!     │             │                          │  (archive)  │
//!     └─────────────┘                          └─────────────┘
//! ```
//!
//! # Compilation Pipeline
//!
//! 1. **Validate**: Reject empty requests and illegal Java names
//! 2. **Generate**: Emit one Java class per model using `codegen`
//! 3. **Compile**: Run the sources through a [`Toolchain`] in a fresh
//!    in-memory sandbox per batch
//! 4. **Package**: Write the manifest, the classes and the optional rules into
//!    a JAR held in memory
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use modeljar_compiler::{ModelCompiler, MockToolchain};
//!
//! let request = modeljar_dsl::parse_compile_request(&json)?;
//! let compiler = ModelCompiler::new(Arc::new(MockToolchain::new()));
//!
//! let jar = compiler.compile_request(&request)?;
//! std::fs::write(&jar.filename, &jar.bytes)?;
//! ```
//!
//! # Important Notes
//!
//! - The pipeline keeps sources and classes in memory. Only the `javac`
//!   backend touches disk, inside a private scratch directory.
//! - Compilation with [`JavacToolchain`] requires a JDK; see [`ToolchainConfig`].
//! - A request either produces a complete archive or an error.
//!
//! # Modules
//!
//! - [`archive`]: JAR assembly and manifest rendering
//! - [`codegen`]: Java source generation from data models
//! - [`compile`]: Pipeline orchestration
//! - [`config`]: Toolchain configuration from the environment
//! - [`engine`]: Batch compilation and failure aggregation
//! - [`toolchain`]: Compiler backends and the compilation sandbox
//! - [`validation`]: Request validation

#![deny(missing_docs)]

/// JAR assembly and manifest rendering.
pub mod archive;

/// Java source generation from data models.
pub mod codegen;

/// Pipeline orchestration.
pub mod compile;

/// Toolchain configuration from the environment.
pub mod config;

/// Batch compilation and failure aggregation.
pub mod engine;

/// Error types for the compile pipeline.
pub mod error;

/// Compiler backends and the compilation sandbox.
pub mod toolchain;

/// Request validation.
pub mod validation;

// Re-export main types
pub use archive::{ArchiveEntry, ArchiveMetadata, PackagingError, RulesPayload, read_archive};
pub use codegen::{GenerationError, TypeTable};
pub use compile::{
    BatchMode, CompiledJar, CompilerOptions, ModelCompiler, archive_filename,
};
pub use config::{ConfigError, ToolchainConfig};
pub use engine::CompiledArtifacts;
pub use error::{CompileError, Result};
pub use toolchain::{
    CompilationSandbox, CompilationUnit, CompileOptions, Diagnostic, JavacToolchain,
    MemorySandbox, MockToolchain, Severity, Toolchain, ToolchainError,
};
pub use validation::{ValidationError, ValidationResult, ValidationWarning, validate_request};

// Re-export DSL types for convenience
pub use modeljar_dsl::{CompileRequest, DataModel, DataModelField, FieldType};
