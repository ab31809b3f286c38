// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Model compiler CLI
//!
//! Compiles a compile request JSON file to a JAR.
//!
//! Usage:
//!
//! ```text
//! modeljar-compile --request <path> [--output <path>] [--toolchain javac|mock] [--single-batch] [--sources <dir>] [--list] [--schema]
//! ```
//!
//! Example:
//!
//! ```text
//! modeljar-compile --request models.json --output ./models.jar
//! ```

use modeljar_compiler::{
    BatchMode, CompileRequest, MockToolchain, ModelCompiler, ToolchainConfig, read_archive,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

fn print_usage() {
    eprintln!(
        r#"Usage: modeljar-compile [OPTIONS]

Compile data models from a compile request JSON file into a JAR.

OPTIONS:
    --request <path>      Path to compile request JSON file (required)
    --output <path>       Output JAR path (default: <rule-name>-<version>.jar)
    --toolchain <name>    Compiler backend: javac or mock (default: javac)
    --single-batch        Compile all models together so they can reference each other
    --sources <dir>       Write generated Java sources to <dir> instead of compiling
    --list                Print the JAR entries after building
    --schema              Print the compile request JSON Schema and exit
    --help                Show this help message

ENVIRONMENT:
    MODELJAR_JAVAC          Path to javac (default: $JAVA_HOME/bin/javac, then PATH)
    JAVA_HOME               JDK installation directory
    MODELJAR_JAVA_RELEASE   Target Java release (default: 21)
    RUST_LOG                Log filter (default: warn)

EXAMPLES:
    # Compile with the installed JDK
    modeljar-compile --request models.json --output ./models.jar

    # Inspect generated sources
    modeljar-compile --request models.json --sources ./generated
"#
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolchainKind {
    Javac,
    Mock,
}

struct Args {
    request_path: PathBuf,
    output_path: Option<PathBuf>,
    toolchain: ToolchainKind,
    single_batch: bool,
    sources_dir: Option<PathBuf>,
    list: bool,
}

enum Command {
    Compile(Args),
    Schema,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();

    let mut request_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut toolchain = ToolchainKind::Javac;
    let mut single_batch = false;
    let mut sources_dir: Option<PathBuf> = None;
    let mut list = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--schema" => return Ok(Command::Schema),
            "--request" => {
                i += 1;
                if i >= args.len() {
                    return Err("--request requires a path".to_string());
                }
                request_path = Some(PathBuf::from(&args[i]));
            }
            "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a path".to_string());
                }
                output_path = Some(PathBuf::from(&args[i]));
            }
            "--toolchain" => {
                i += 1;
                if i >= args.len() {
                    return Err("--toolchain requires a name".to_string());
                }
                toolchain = match args[i].as_str() {
                    "javac" => ToolchainKind::Javac,
                    "mock" => ToolchainKind::Mock,
                    other => return Err(format!("Unknown toolchain: {}", other)),
                };
            }
            "--single-batch" => {
                single_batch = true;
            }
            "--sources" => {
                i += 1;
                if i >= args.len() {
                    return Err("--sources requires a directory".to_string());
                }
                sources_dir = Some(PathBuf::from(&args[i]));
            }
            "--list" => {
                list = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    let request_path = request_path.ok_or("--request is required")?;

    Ok(Command::Compile(Args {
        request_path,
        output_path,
        toolchain,
        single_batch,
        sources_dir,
        list,
    }))
}

fn build_compiler(args: &Args) -> Result<ModelCompiler, String> {
    let compiler = match args.toolchain {
        ToolchainKind::Mock => ModelCompiler::new(Arc::new(MockToolchain::new())),
        ToolchainKind::Javac => {
            let config = ToolchainConfig::from_env().map_err(|e| e.to_string())?;
            ModelCompiler::from_config(&config).map_err(|e| e.to_string())?
        }
    };
    let batch_mode = if args.single_batch {
        BatchMode::SingleBatch
    } else {
        BatchMode::PerModel
    };
    Ok(compiler.with_batch_mode(batch_mode))
}

fn write_sources(compiler: &ModelCompiler, request: &CompileRequest, dir: &Path) -> ExitCode {
    let units = match compiler.generate_sources(request) {
        Ok(units) => units,
        Err(e) => {
            eprintln!("Source generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for unit in &units {
        let path = dir.join(unit.source_path());
        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::write(&path, unit.source()));
        if let Err(e) = written {
            eprintln!("Error writing {:?}: {}", path, e);
            return ExitCode::FAILURE;
        }
        eprintln!("  {}", path.display());
    }

    eprintln!("Generated {} source file(s)", units.len());
    println!("{}", dir.display());
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    // Initialize minimal logging (default to warn if RUST_LOG not set)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(Command::Compile(args)) => args,
        Ok(Command::Schema) => {
            let schema = modeljar_dsl::spec::generate_request_schema();
            match serde_json::to_string_pretty(&schema) {
                Ok(text) => {
                    println!("{}", text);
                    return ExitCode::SUCCESS;
                }
                Err(e) => {
                    eprintln!("Error serializing schema: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    // Read request JSON
    let request_json = match fs::read_to_string(&args.request_path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error reading request file {:?}: {}", args.request_path, e);
            return ExitCode::FAILURE;
        }
    };

    // Parse request
    let request: CompileRequest = match serde_json::from_str(&request_json) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error parsing request JSON: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let compiler = match build_compiler(&args) {
        Ok(compiler) => compiler,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &args.sources_dir {
        return write_sources(&compiler, &request, dir);
    }

    eprintln!(
        "Compiling {} data model(s) with {:?} toolchain",
        request.data_models.len(),
        args.toolchain
    );

    let jar = match compiler.compile_request(&request) {
        Ok(jar) => jar,
        Err(e) => {
            eprintln!("Compilation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Compilation successful:");
    eprintln!("  Classes: {}", jar.class_count);
    eprintln!("  JAR size: {} bytes", jar.bytes.len());
    eprintln!("  Checksum: {}", jar.checksum);

    if args.list {
        match read_archive(&jar.bytes) {
            Ok(entries) => {
                for entry in entries {
                    eprintln!("  {:>8}  {}", entry.size, entry.path);
                }
            }
            Err(e) => {
                eprintln!("Error reading back JAR: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let output_path = args
        .output_path
        .unwrap_or_else(|| PathBuf::from(&jar.filename));
    if let Err(e) = fs::write(&output_path, &jar.bytes) {
        eprintln!("Error writing JAR to {:?}: {}", output_path, e);
        return ExitCode::FAILURE;
    }

    // Print final path to stdout for scripts to capture
    println!("{}", output_path.display());

    ExitCode::SUCCESS
}
