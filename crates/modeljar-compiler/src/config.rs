// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::path::PathBuf;

use crate::toolchain::CompileOptions;

/// Default target Java release.
pub const DEFAULT_JAVA_RELEASE: &str = "21";

/// Oldest release accepted by `javac --release`.
const MIN_JAVA_RELEASE: u32 = 8;

/// Compiler toolchain configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Explicit path to the `javac` executable
    pub javac_path: Option<PathBuf>,
    /// JDK installation directory
    pub java_home: Option<PathBuf>,
    /// Target Java release passed to the compiler
    pub release: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            javac_path: None,
            java_home: None,
            release: DEFAULT_JAVA_RELEASE.to_string(),
        }
    }
}

impl ToolchainConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `MODELJAR_JAVAC`: path to the `javac` executable (default: discovered)
    /// - `JAVA_HOME`: JDK directory searched for `bin/javac`
    /// - `MODELJAR_JAVA_RELEASE`: target release (default: 21)
    pub fn from_env() -> Result<Self, ConfigError> {
        let javac_path = non_empty_var("MODELJAR_JAVAC").map(PathBuf::from);
        let java_home = non_empty_var("JAVA_HOME").map(PathBuf::from);

        let release = non_empty_var("MODELJAR_JAVA_RELEASE")
            .unwrap_or_else(|| DEFAULT_JAVA_RELEASE.to_string());
        let parsed: u32 = release.trim().parse().map_err(|_| {
            ConfigError::Invalid("MODELJAR_JAVA_RELEASE", "must be a Java release number")
        })?;
        if parsed < MIN_JAVA_RELEASE {
            return Err(ConfigError::Invalid(
                "MODELJAR_JAVA_RELEASE",
                "must be 8 or newer",
            ));
        }

        Ok(Self {
            javac_path,
            java_home,
            release: parsed.to_string(),
        })
    }

    /// Options for toolchain invocations built from this configuration.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            release: self.release.clone(),
            ..CompileOptions::default()
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
