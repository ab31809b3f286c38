// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request-to-JAR compilation.
//!
//! [`ModelCompiler`] holds only immutable configuration and a shared
//! toolchain, so one instance can serve concurrent requests. Every batch is
//! compiled in its own sandbox and a request either yields a complete archive
//! or an error; partial results are never returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use modeljar_dsl::{CompileRequest, DataModel};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::archive::{ArchiveMetadata, RulesPayload, build_archive};
use crate::codegen::{TypeTable, generate_units};
use crate::config::ToolchainConfig;
use crate::engine::{CompiledArtifacts, compile_units};
use crate::error::{CompileError, Result};
use crate::toolchain::{CompilationUnit, CompileOptions, JavacToolchain, Toolchain};
use crate::validation::validate_request;

/// Rule name used when the request has none.
pub const DEFAULT_RULE_NAME: &str = "compiled-models";
/// Archive version used when the request has none.
pub const DEFAULT_VERSION: &str = "1.0.0";
/// `Implementation-Vendor` of produced archives.
pub const DEFAULT_VENDOR: &str = "Web Rules";
/// `Implementation-Description` of produced archives.
pub const DEFAULT_DESCRIPTION: &str = "Compiled data models from Web Rules Editor";

/// How models are grouped into toolchain invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// One invocation per model. Models cannot reference each other.
    #[default]
    PerModel,
    /// All models in one invocation. Cross-model references resolve.
    SingleBatch,
}

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Batch grouping.
    pub batch_mode: BatchMode,
    /// Options passed to every toolchain call.
    pub compile: CompileOptions,
    /// `Implementation-Vendor` manifest value.
    pub vendor: String,
    /// `Implementation-Description` manifest value.
    pub description: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            batch_mode: BatchMode::default(),
            compile: CompileOptions::default(),
            vendor: DEFAULT_VENDOR.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// A packaged archive.
#[derive(Debug, Clone)]
pub struct CompiledJar {
    /// Suggested attachment name, e.g. `my-rule-2.0.jar`.
    pub filename: String,
    /// Archive bytes.
    pub bytes: Vec<u8>,
    /// Number of class entries.
    pub class_count: usize,
    /// SHA-256 of `bytes`, lowercase hex.
    pub checksum: String,
}

/// Compiles data models and packages them into a JAR.
#[derive(Clone)]
pub struct ModelCompiler {
    type_table: TypeTable,
    toolchain: Arc<dyn Toolchain>,
    options: CompilerOptions,
}

impl std::fmt::Debug for ModelCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCompiler")
            .field("toolchain", &self.toolchain.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ModelCompiler {
    /// Create a compiler with the standard type table and default options.
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            type_table: TypeTable::java(),
            toolchain,
            options: CompilerOptions::default(),
        }
    }

    /// Create a compiler backed by the `javac` found from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Toolchain` if no compiler is installed.
    pub fn from_config(config: &ToolchainConfig) -> Result<Self> {
        let javac = JavacToolchain::discover(config)?;
        info!(javac = %javac.path().display(), "Using javac toolchain");
        Ok(Self::new(Arc::new(javac)).with_options(CompilerOptions {
            compile: config.compile_options(),
            ..CompilerOptions::default()
        }))
    }

    /// Replace the type table.
    pub fn with_type_table(mut self, type_table: TypeTable) -> Self {
        self.type_table = type_table;
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the batch mode.
    pub fn with_batch_mode(mut self, batch_mode: BatchMode) -> Self {
        self.options.batch_mode = batch_mode;
        self
    }

    /// The type table in use.
    pub fn type_table(&self) -> &TypeTable {
        &self.type_table
    }

    /// The options in use.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Validate the request and generate one source unit per model, in
    /// request order, without compiling.
    pub fn generate_sources(&self, request: &CompileRequest) -> Result<Vec<CompilationUnit>> {
        check_request(request)?;
        Ok(generate_units(&request.data_models, &self.type_table)?)
    }

    /// Generate and compile `models`.
    ///
    /// All sources are generated before anything is compiled. The first failing
    /// batch aborts the call and no artifacts are returned.
    pub fn compile_models(&self, models: &[DataModel]) -> Result<CompiledArtifacts> {
        let units = generate_units(models, &self.type_table)?;
        let mut artifacts = CompiledArtifacts::default();

        match self.options.batch_mode {
            BatchMode::PerModel => {
                for unit in units {
                    info!(class = %unit.qualified_name(), "Compiling class");
                    let batch = compile_units(
                        self.toolchain.as_ref(),
                        vec![unit],
                        &self.options.compile,
                    )?;
                    artifacts.extend(batch);
                }
            }
            BatchMode::SingleBatch => {
                info!(unit_count = units.len(), "Compiling all classes in one batch");
                let batch =
                    compile_units(self.toolchain.as_ref(), units, &self.options.compile)?;
                artifacts.extend(batch);
            }
        }

        Ok(artifacts)
    }

    /// Run the full pipeline, stamping the archive with the current local time.
    pub fn compile_request(&self, request: &CompileRequest) -> Result<CompiledJar> {
        self.compile_request_at(request, Local::now().naive_local())
    }

    /// Run the full pipeline with an explicit build time.
    ///
    /// The same request, toolchain and build time always give the same bytes.
    pub fn compile_request_at(
        &self,
        request: &CompileRequest,
        build_time: NaiveDateTime,
    ) -> Result<CompiledJar> {
        let started = Instant::now();
        check_request(request)?;

        let rule_name = non_blank(request.rule_name.as_deref()).unwrap_or(DEFAULT_RULE_NAME);
        let version = non_blank(request.version.as_deref()).unwrap_or(DEFAULT_VERSION);

        info!(
            rule_name = %rule_name,
            version = %version,
            model_count = request.data_models.len(),
            toolchain = self.toolchain.name(),
            "Compiling data models"
        );

        let artifacts = self.compile_models(&request.data_models)?;
        if artifacts.is_empty() {
            return Err(CompileError::NoClassesCompiled);
        }

        let metadata = ArchiveMetadata {
            title: rule_name.to_string(),
            version: version.to_string(),
            vendor: self.options.vendor.clone(),
            description: self.options.description.clone(),
        };
        let rules = RulesPayload {
            name: Some(rule_name.to_string()),
            content: request.drools_content.clone(),
            include: request.include_drools,
        };
        let bytes = build_archive(&artifacts, &metadata, Some(&rules), build_time)?;
        let checksum = format!("{:x}", Sha256::digest(&bytes));

        let jar = CompiledJar {
            filename: archive_filename(rule_name, version),
            class_count: artifacts.len(),
            checksum,
            bytes,
        };
        info!(
            filename = %jar.filename,
            class_count = jar.class_count,
            size_bytes = jar.bytes.len(),
            checksum = %jar.checksum,
            duration_ms = started.elapsed().as_millis() as u64,
            "Successfully compiled JAR"
        );
        Ok(jar)
    }
}

fn check_request(request: &CompileRequest) -> Result<()> {
    let result = validate_request(request);
    for warning in &result.warnings {
        warn!(warning = %warning, "Request validation warning");
    }
    if result.has_errors() {
        return Err(CompileError::Validation(result.errors));
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Attachment file name: lowercase rule name, each whitespace run replaced by
/// `-`, then `-<version>.jar`.
pub fn archive_filename(rule_name: &str, version: &str) -> String {
    let mut slug = String::with_capacity(rule_name.len());
    let mut in_whitespace = false;
    for c in rule_name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    format!("{}-{}.jar", slug, version)
}
