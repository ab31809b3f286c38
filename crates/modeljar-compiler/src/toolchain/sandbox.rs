// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-compilation source and output store.

use std::collections::BTreeMap;
use std::io::Write;

use super::CompilationUnit;

/// Storage a toolchain reads sources from and writes class files into.
///
/// A sandbox lives for exactly one compilation batch; nothing in it is shared
/// between requests.
pub trait CompilationSandbox {
    /// Register a source unit, replacing any unit with the same name.
    fn add_source(&mut self, unit: CompilationUnit);

    /// Qualified names of all registered units, in sorted order.
    fn source_names(&self) -> Vec<String>;

    /// Look up a registered unit.
    fn source(&self, qualified_name: &str) -> Option<&CompilationUnit>;

    /// Open a fresh output sink for the binary class name `name`.
    ///
    /// Opening an existing name truncates it.
    fn open_output(&mut self, name: &str) -> &mut dyn Write;

    /// Bytes written to the sink `name`, if it was opened.
    fn output(&self, name: &str) -> Option<&[u8]>;

    /// Names of all opened sinks, in sorted order.
    fn output_names(&self) -> Vec<String>;
}

/// In-memory [`CompilationSandbox`].
#[derive(Debug, Default)]
pub struct MemorySandbox {
    sources: BTreeMap<String, CompilationUnit>,
    outputs: BTreeMap<String, Vec<u8>>,
}

impl MemorySandbox {
    /// Create an empty sandbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sandbox holding `units`.
    pub fn with_units(units: impl IntoIterator<Item = CompilationUnit>) -> Self {
        let mut sandbox = Self::new();
        for unit in units {
            sandbox.add_source(unit);
        }
        sandbox
    }

    /// Consume the sandbox and return the class bytes keyed by binary name.
    pub fn into_outputs(self) -> BTreeMap<String, Vec<u8>> {
        self.outputs
    }
}

impl CompilationSandbox for MemorySandbox {
    fn add_source(&mut self, unit: CompilationUnit) {
        self.sources.insert(unit.qualified_name().to_string(), unit);
    }

    fn source_names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    fn source(&self, qualified_name: &str) -> Option<&CompilationUnit> {
        self.sources.get(qualified_name)
    }

    fn open_output(&mut self, name: &str) -> &mut dyn Write {
        let sink = self.outputs.entry(name.to_string()).or_default();
        sink.clear();
        sink
    }

    fn output(&self, name: &str) -> Option<&[u8]> {
        self.outputs.get(name).map(Vec::as_slice)
    }

    fn output_names(&self) -> Vec<String> {
        self.outputs.keys().cloned().collect()
    }
}
