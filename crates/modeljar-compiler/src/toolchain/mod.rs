// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Compiler toolchain backends.
//!
//! A [`Toolchain`] turns the source units registered in a
//! [`CompilationSandbox`] into class files written back into the same sandbox.
//! Backends are injected into the compiler, so the pipeline does not care
//! whether classes come from a `javac` process or an in-process stand-in.

pub mod javac;
pub mod mock;
pub mod sandbox;

use serde::Serialize;
use thiserror::Error;

pub use javac::JavacToolchain;
pub use mock::MockToolchain;
pub use sandbox::{CompilationSandbox, MemorySandbox};

/// Errors from toolchain backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolchainError {
    /// No compiler is installed in the hosting environment.
    #[error("No Java compiler available: {0}")]
    Unavailable(String),

    /// The compiler process could not be started.
    #[error("Failed to launch {tool}: {source}")]
    Launch {
        /// Compiler executable that failed to start.
        tool: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Staging sources or collecting outputs failed.
    #[error("Toolchain IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One named source text submitted to the toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    qualified_name: String,
    source: String,
}

impl CompilationUnit {
    /// Create a unit for the class `qualified_name`.
    pub fn new(qualified_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            source: source.into(),
        }
    }

    /// Fully qualified class name, e.g. `com.example.Person`.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Java source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Package part of the qualified name, empty for the default package.
    pub fn package(&self) -> &str {
        self.qualified_name
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or("")
    }

    /// Class name without the package.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.qualified_name)
    }

    /// Relative source path, e.g. `com/example/Person.java`.
    pub fn source_path(&self) -> String {
        format!("{}.java", self.qualified_name.replace('.', "/"))
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Compilation cannot succeed.
    Error,
    /// Reported but not fatal.
    Warning,
    /// Informational.
    Note,
}

impl Severity {
    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

/// A message reported by the toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Qualified name of the unit the message is about, if any.
    pub unit: Option<String>,
    /// 1-based line number.
    pub line: Option<u32>,
    /// 1-based column number.
    pub column: Option<u32>,
    /// Message text.
    pub message: String,
}

impl Diagnostic {
    /// An error not tied to a source location.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            unit: None,
            line: None,
            column: None,
            message: message.into(),
        }
    }

    /// Attach a source location.
    pub fn at(mut self, unit: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        self.unit = Some(unit.into());
        self.line = Some(line);
        self.column = column;
        self
    }

    /// Returns true for error-level diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(unit) = &self.unit {
            write!(f, "{}", unit)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
                if let Some(column) = self.column {
                    write!(f, ":{}", column)?;
                }
            }
            write!(f, ": ")?;
        }
        write!(f, "{}: {}", self.severity.as_str(), self.message)
    }
}

/// Options passed to every toolchain invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Target Java release (`--release`).
    pub release: String,
    /// Additional backend-specific arguments.
    pub extra_args: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            release: "21".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Trait for compiler backends.
///
/// Implementations read every source unit from the sandbox and write one
/// output sink per emitted class, keyed by binary class name (nested classes
/// use `Outer$Inner`). They report diagnostics instead of failing when the
/// sources are wrong; `Err` is reserved for environment problems.
///
/// Backends must be safe to call concurrently: each call gets its own sandbox.
///
/// The sandbox is the whole contract: a backend should not need a file
/// system. [`JavacToolchain`] is the exception, since `javac` only reads
/// sources from disk; it stages each batch in a private scratch directory
/// removed when the call returns. An in-process compiler backend working
/// straight from the sandbox would remove that last use of temporary files.
pub trait Toolchain: Send + Sync {
    /// Backend identifier (e.g., "javac", "mock")
    fn name(&self) -> &'static str;

    /// Compile every unit in `sandbox`.
    fn compile(
        &self,
        sandbox: &mut dyn CompilationSandbox,
        options: &CompileOptions,
    ) -> Result<Vec<Diagnostic>, ToolchainError>;
}
