// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-process toolchain for tests and dry runs.
//!
//! Checks the type of every `private <Type> <name>;` declaration against the
//! standard Java types and the units of the same batch, and emits a stable
//! pseudo class file per unit when the batch is clean. Class bytes depend only
//! on the unit's name and source.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use super::{CompilationSandbox, CompileOptions, Diagnostic, Toolchain, ToolchainError};

/// Class file magic followed by minor 0, major 65 (Java 21).
const CLASS_HEADER: [u8; 8] = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x41];

const BUILTIN_TYPES: &[&str] = &[
    "boolean",
    "byte",
    "char",
    "short",
    "int",
    "long",
    "float",
    "double",
    "Boolean",
    "Byte",
    "Character",
    "Short",
    "Integer",
    "Long",
    "Float",
    "Double",
    "Number",
    "String",
    "Object",
    "java.lang.String",
    "java.lang.Object",
    "List",
    "ArrayList",
    "java.util.List",
    "java.util.ArrayList",
    "java.util.Map",
    "java.util.Set",
    "java.math.BigDecimal",
    "java.time.LocalDate",
    "java.time.LocalDateTime",
    "LocalDateTime",
];

/// Deterministic stand-in for a Java compiler.
#[derive(Debug, Clone, Default)]
pub struct MockToolchain {
    extra_types: HashSet<String>,
    failing_units: HashSet<String>,
    unavailable: bool,
}

impl MockToolchain {
    /// Create a mock that knows the standard Java types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `types` as resolvable in every batch.
    pub fn with_known_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Report an error for the unit `qualified_name` whatever its source.
    pub fn with_failing_unit(mut self, qualified_name: impl Into<String>) -> Self {
        self.failing_units.insert(qualified_name.into());
        self
    }

    /// A mock that behaves like a host without a compiler.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn is_known(&self, ty: &str, visible: &HashSet<String>) -> bool {
        BUILTIN_TYPES.contains(&ty) || self.extra_types.contains(ty) || visible.contains(ty)
    }
}

impl Toolchain for MockToolchain {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn compile(
        &self,
        sandbox: &mut dyn CompilationSandbox,
        _options: &CompileOptions,
    ) -> Result<Vec<Diagnostic>, ToolchainError> {
        if self.unavailable {
            return Err(ToolchainError::Unavailable(
                "mock toolchain configured as unavailable".to_string(),
            ));
        }

        let names = sandbox.source_names();
        let mut diagnostics = Vec::new();
        let mut outputs = Vec::with_capacity(names.len());

        for name in &names {
            let Some(unit) = sandbox.source(name) else {
                continue;
            };

            // Fully qualified names of the batch, plus simple names of units in
            // the same package.
            let mut visible: HashSet<String> = names.iter().cloned().collect();
            for other in &names {
                if let Some(other) = sandbox.source(other)
                    && other.package() == unit.package()
                {
                    visible.insert(other.simple_name().to_string());
                }
            }

            if self.failing_units.contains(name) {
                diagnostics.push(Diagnostic::error("forced failure").at(name.as_str(), 1, None));
            }

            for (index, line) in unit.source().lines().enumerate() {
                let Some((ty, column)) = declared_type(line) else {
                    continue;
                };
                for primitive in primitive_type_arguments(ty) {
                    diagnostics.push(
                        Diagnostic::error(format!(
                            "unexpected type (required: reference, found: {})",
                            primitive
                        ))
                        .at(name.as_str(), index as u32 + 1, Some(column)),
                    );
                }
                for symbol in type_symbols(ty) {
                    if !self.is_known(symbol, &visible) {
                        diagnostics.push(
                            Diagnostic::error(format!("cannot find symbol (symbol: class {})", symbol))
                                .at(name.as_str(), index as u32 + 1, Some(column)),
                        );
                    }
                }
            }

            outputs.push((name.clone(), pseudo_class(name, unit.source())));
        }

        if diagnostics.iter().any(Diagnostic::is_error) {
            return Ok(diagnostics);
        }

        for (name, bytes) in outputs {
            sandbox.open_output(&name).write_all(&bytes)?;
        }
        Ok(diagnostics)
    }
}

/// Type and 1-based column of a `private <Type> <name>[ = ...];` declaration.
fn declared_type(line: &str) -> Option<(&str, u32)> {
    let indent = line.len() - line.trim_start().len();
    let declaration = line.trim().strip_prefix("private ")?;
    let declaration = declaration.strip_suffix(';')?;
    let declaration = declaration
        .split_once(" = ")
        .map(|(head, _)| head)
        .unwrap_or(declaration);
    let (ty, _name) = declaration.rsplit_once(' ')?;
    let column = indent + "private ".len() + 1;
    Some((ty.trim(), column as u32))
}

/// Class names referenced by a type, e.g. `List<com.a.B>` -> `List`, `com.a.B`.
fn type_symbols(ty: &str) -> impl Iterator<Item = &str> {
    ty.split(['<', '>', ',', '[', ']', ' '])
        .filter(|s| !s.is_empty() && *s != "?")
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// Primitive types used as generic arguments, e.g. `double` in `List<double>`.
fn primitive_type_arguments(ty: &str) -> Vec<&str> {
    let (Some(open), Some(close)) = (ty.find('<'), ty.rfind('>')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    ty[open + 1..close]
        .split([',', '<', '>'])
        .map(str::trim)
        .filter(|arg| PRIMITIVES.contains(arg))
        .collect()
}

fn pseudo_class(qualified_name: &str, source: &str) -> Vec<u8> {
    let digest = Sha256::digest(source.as_bytes());
    let mut bytes = Vec::with_capacity(CLASS_HEADER.len() + digest.len() + qualified_name.len());
    bytes.extend_from_slice(&CLASS_HEADER);
    bytes.extend_from_slice(&digest);
    bytes.extend_from_slice(qualified_name.as_bytes());
    bytes
}
