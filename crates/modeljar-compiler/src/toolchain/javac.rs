// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! `javac` process backend.
//!
//! javac only reads sources from disk, so each call stages the sandbox into a
//! private scratch directory that is removed when the call returns. Nothing
//! outside that directory is touched.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{CompilationSandbox, CompileOptions, Diagnostic, Severity, Toolchain, ToolchainError};
use crate::config::ToolchainConfig;

#[cfg(windows)]
const JAVAC_BINARY: &str = "javac.exe";
#[cfg(not(windows))]
const JAVAC_BINARY: &str = "javac";

/// Toolchain that runs an installed `javac`.
#[derive(Debug, Clone)]
pub struct JavacToolchain {
    javac: PathBuf,
}

impl JavacToolchain {
    /// Use the compiler at `javac` without checking that it exists.
    pub fn new(javac: impl Into<PathBuf>) -> Self {
        Self {
            javac: javac.into(),
        }
    }

    /// Locate `javac`: the configured path, then `$JAVA_HOME/bin`, then `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `ToolchainError::Unavailable` if no executable is found.
    pub fn discover(config: &ToolchainConfig) -> Result<Self, ToolchainError> {
        if let Some(path) = &config.javac_path {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return Err(ToolchainError::Unavailable(format!(
                "configured compiler {} does not exist",
                path.display()
            )));
        }

        if let Some(home) = &config.java_home {
            let candidate = home.join("bin").join(JAVAC_BINARY);
            if candidate.is_file() {
                return Ok(Self::new(candidate));
            }
            debug!(java_home = %home.display(), "JAVA_HOME has no javac, searching PATH");
        }

        search_path(JAVAC_BINARY).map(Self::new).ok_or_else(|| {
            ToolchainError::Unavailable(
                "javac not found; install a JDK or set JAVA_HOME or MODELJAR_JAVAC".to_string(),
            )
        })
    }

    /// Path of the compiler executable.
    pub fn path(&self) -> &Path {
        &self.javac
    }
}

fn search_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

impl Toolchain for JavacToolchain {
    fn name(&self) -> &'static str {
        "javac"
    }

    fn compile(
        &self,
        sandbox: &mut dyn CompilationSandbox,
        options: &CompileOptions,
    ) -> Result<Vec<Diagnostic>, ToolchainError> {
        let scratch = tempfile::Builder::new().prefix("modeljar-").tempdir()?;
        let src_dir = scratch.path().join("src");
        let out_dir = scratch.path().join("classes");
        fs::create_dir_all(&src_dir)?;
        fs::create_dir_all(&out_dir)?;

        // Staged file path -> qualified name, for mapping diagnostics back.
        let mut staged: HashMap<PathBuf, String> = HashMap::new();
        for name in sandbox.source_names() {
            let Some(unit) = sandbox.source(&name) else {
                continue;
            };
            let path = src_dir.join(unit.source_path());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, unit.source())?;
            staged.insert(path, name);
        }

        let mut files: Vec<&PathBuf> = staged.keys().collect();
        files.sort();

        let mut cmd = Command::new(&self.javac);
        cmd.arg("--release")
            .arg(&options.release)
            .arg("-encoding")
            .arg("UTF-8")
            .arg("-d")
            .arg(&out_dir)
            .args(&options.extra_args)
            .args(files);

        debug!(
            javac = %self.javac.display(),
            unit_count = staged.len(),
            release = %options.release,
            "Invoking javac"
        );
        let started = Instant::now();
        let output = cmd.output().map_err(|source| ToolchainError::Launch {
            tool: self.javac.display().to_string(),
            source,
        })?;
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            success = output.status.success(),
            "javac finished"
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut diagnostics = parse_diagnostics(&stderr, |path| {
            staged.get(Path::new(path)).cloned()
        });

        if !output.status.success() {
            if !diagnostics.iter().any(Diagnostic::is_error) {
                let text = stderr.trim();
                warn!(status = %output.status, "javac failed without a parsable diagnostic");
                diagnostics.push(Diagnostic::error(if text.is_empty() {
                    format!("javac exited with {}", output.status)
                } else {
                    text.to_string()
                }));
            }
            return Ok(diagnostics);
        }

        collect_classes(&out_dir, &out_dir, sandbox)?;
        Ok(diagnostics)
    }
}

/// Load every `.class` file under `dir` into the sandbox, keyed by binary name.
fn collect_classes(
    root: &Path,
    dir: &Path,
    sandbox: &mut dyn CompilationSandbox,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_classes(root, &path, sandbox)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("class") {
            continue;
        }
        let Some(name) = binary_name(root, &path) else {
            continue;
        };
        let bytes = fs::read(&path)?;
        debug!(class = %name, size_bytes = bytes.len(), "Collected class file");
        sandbox.open_output(&name).write_all(&bytes)?;
    }
    Ok(())
}

/// `root/com/example/Person$1.class` -> `com.example.Person$1`.
fn binary_name(root: &Path, class_file: &Path) -> Option<String> {
    let relative = class_file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("."))
}

/// Parse javac's stderr.
///
/// Recognized headers are `path:line: error|warning: message`, plus bare
/// `error: ...`, `warning: ...` and `Note: ...` lines. A caret line sets the
/// column of the preceding diagnostic, and `symbol:`/`location:` detail lines
/// are appended to its message. `resolve` maps a source path to a unit name.
pub fn parse_diagnostics<F>(stderr: &str, resolve: F) -> Vec<Diagnostic>
where
    F: Fn(&str) -> Option<String>,
{
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in stderr.lines() {
        if let Some(diagnostic) = parse_header(line, &resolve) {
            diagnostics.push(diagnostic);
            continue;
        }

        let Some(last) = diagnostics.last_mut() else {
            continue;
        };
        let trimmed = line.trim();
        if trimmed == "^" {
            if last.column.is_none() {
                last.column = line.find('^').map(|i| i as u32 + 1);
            }
        } else if trimmed.starts_with("symbol:") || trimmed.starts_with("location:") {
            let detail = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
            last.message.push_str(" (");
            last.message.push_str(&detail);
            last.message.push(')');
        }
    }

    diagnostics
}

fn parse_header<F>(line: &str, resolve: &F) -> Option<Diagnostic>
where
    F: Fn(&str) -> Option<String>,
{
    for (prefix, severity) in [
        ("error: ", Severity::Error),
        ("warning: ", Severity::Warning),
        ("Note: ", Severity::Note),
    ] {
        if let Some(message) = line.strip_prefix(prefix) {
            return Some(Diagnostic {
                severity,
                unit: None,
                line: None,
                column: None,
                message: message.to_string(),
            });
        }
    }

    let split = line.find(".java:")? + ".java".len();
    let (path, rest) = line.split_at(split);
    let rest = rest.strip_prefix(':')?;
    let (line_no, rest) = rest.split_once(": ")?;
    let line_no: u32 = line_no.parse().ok()?;

    let (severity, message) = if let Some(m) = rest.strip_prefix("error: ") {
        (Severity::Error, m)
    } else if let Some(m) = rest.strip_prefix("warning: ") {
        (Severity::Warning, m)
    } else {
        return None;
    };

    let unit = resolve(path).unwrap_or_else(|| path.to_string());
    Some(Diagnostic {
        severity,
        unit: None,
        line: None,
        column: None,
        message: message.to_string(),
    }
    .at(unit, line_no, None))
}
