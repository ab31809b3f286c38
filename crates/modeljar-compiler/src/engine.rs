// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Batch compilation on top of a [`Toolchain`].

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{CompileError, Result};
use crate::toolchain::{
    CompilationSandbox, CompilationUnit, CompileOptions, Diagnostic, MemorySandbox, Toolchain,
};

/// Compiled class bytes keyed by binary class name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledArtifacts {
    classes: BTreeMap<String, Vec<u8>>,
}

impl CompiledArtifacts {
    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no class was compiled.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Bytes of one class.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.classes.get(name).map(Vec::as_slice)
    }

    /// Iterate classes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Class names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Total class bytes.
    pub fn total_bytes(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub(crate) fn extend(&mut self, other: CompiledArtifacts) {
        self.classes.extend(other.classes);
    }
}

impl From<BTreeMap<String, Vec<u8>>> for CompiledArtifacts {
    fn from(classes: BTreeMap<String, Vec<u8>>) -> Self {
        Self { classes }
    }
}

/// Compile one batch of units in a fresh sandbox.
///
/// The batch fails as a whole if the toolchain reports any error, or if a
/// unit is left without a class file. Warnings are logged and dropped.
pub fn compile_units(
    toolchain: &dyn Toolchain,
    units: Vec<CompilationUnit>,
    options: &CompileOptions,
) -> Result<CompiledArtifacts> {
    let names: Vec<String> = units.iter().map(|u| u.qualified_name().to_string()).collect();
    let mut sandbox = MemorySandbox::with_units(units);

    debug!(
        toolchain = toolchain.name(),
        units = ?names,
        "Compiling batch"
    );
    let started = Instant::now();
    let diagnostics = toolchain.compile(&mut sandbox, options)?;

    for diagnostic in diagnostics.iter().filter(|d| !d.is_error()) {
        warn!(diagnostic = %diagnostic, "Compiler diagnostic");
    }

    let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
    if error_count > 0 {
        let message = format_failure(&names, &diagnostics, error_count);
        warn!(
            toolchain = toolchain.name(),
            error_count = error_count,
            "Batch compilation failed"
        );
        return Err(CompileError::Compilation {
            diagnostics,
            message,
        });
    }

    if let Some(missing) = names.iter().find(|n| sandbox.output(n).is_none()) {
        return Err(CompileError::Compilation {
            message: format!("Compiler produced no class file for {}", missing),
            diagnostics,
        });
    }

    let artifacts = CompiledArtifacts::from(sandbox.into_outputs());
    for (name, bytes) in artifacts.iter() {
        info!(class = %name, size_bytes = bytes.len(), "Compiled class");
    }
    debug!(
        class_count = artifacts.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Batch compiled"
    );
    Ok(artifacts)
}

fn format_failure(names: &[String], diagnostics: &[Diagnostic], error_count: usize) -> String {
    let mut message = format!(
        "{} error(s) compiling {}",
        error_count,
        names.join(", ")
    );
    for diagnostic in diagnostics {
        message.push('\n');
        message.push_str(&diagnostic.to_string());
    }
    message
}
