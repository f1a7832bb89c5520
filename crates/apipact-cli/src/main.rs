//! apipact CLI - compile OpenAPI contracts into executable test suites

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use apipact_compiler::validator::ContractCheck;
use apipact_compiler::{build_plan, check_response, compile, load_spec};
use apipact_core::model::{CompiledSuite, RequestModel, generate_schema};
use apipact_core::{Config, Diagnostics, to_http_file};

#[derive(Parser)]
#[command(name = "apipact")]
#[command(about = "Compile OpenAPI contracts into executable test suites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the spec into a request suite
    Compile {
        /// Config file (default: .apipact.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Spec path (overrides config)
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Max requests per operation (bounds combination explosion)
        #[arg(long)]
        limit: Option<u32>,

        /// Write the suite as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the suite as an editor-runnable .http file
        #[arg(long)]
        http: Option<PathBuf>,
    },

    /// Show what compilation would emit, without building the suite
    Plan {
        /// Config file (default: .apipact.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Spec path (overrides config)
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },

    /// Validate a captured response body against one operation's contract
    Check {
        /// Operation label, e.g. "GET /items/{id}"
        #[arg(long)]
        operation: String,

        /// Observed status code
        #[arg(long)]
        status: u16,

        /// File containing the response body JSON
        #[arg(long)]
        body: PathBuf,

        /// Config file (default: .apipact.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Spec path (overrides config)
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the compiled-suite format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Compile {
            config,
            spec,
            limit,
            out,
            http,
        } => {
            let cfg = load_config(config.as_deref())?;
            let spec_path = spec.unwrap_or_else(|| cfg.spec.clone());
            let doc = load_spec(&spec_path)
                .with_context(|| format!("loading spec {}", spec_path.display()))?;

            let mut diags = Diagnostics::new();
            let mut requests = compile(&doc, &mut diags);
            requests = apply_limit(requests, limit);
            apply_headers(&mut requests, &cfg.headers);

            for entry in diags.entries() {
                eprintln!("{entry}");
            }

            if let Some(path) = &out {
                let suite = CompiledSuite {
                    requests: requests.clone(),
                    diagnostics: diags.entries().to_vec(),
                };
                std::fs::write(path, serde_json::to_string_pretty(&suite)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("Suite written: {}", path.display());
            }

            if let Some(path) = &http {
                std::fs::write(path, to_http_file(&requests, "base_url"))
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("Requests written: {}", path.display());
            }

            match cli.output {
                OutputFormat::Terminal => {
                    let operations: std::collections::BTreeSet<&str> =
                        requests.iter().map(|r| r.operation.as_str()).collect();
                    println!(
                        "Compiled {} requests from {} operations",
                        requests.len(),
                        operations.len()
                    );
                    for operation in operations {
                        let count = requests
                            .iter()
                            .filter(|r| r.operation == operation)
                            .count();
                        println!("  {operation}: {count}");
                    }
                }
                OutputFormat::Json => {
                    let suite = CompiledSuite {
                        requests,
                        diagnostics: diags.entries().to_vec(),
                    };
                    println!("{}", serde_json::to_string_pretty(&suite)?);
                }
            }

            Ok(i32::from(diags.has_errors()))
        }

        Commands::Plan { config, spec } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(spec) = spec {
                cfg.spec = spec;
            }
            let doc = load_spec(&cfg.spec)
                .with_context(|| format!("loading spec {}", cfg.spec.display()))?;

            let plan = build_plan(&doc, &cfg);
            match cli.output {
                OutputFormat::Terminal => println!("{}", plan.to_terminal()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
            Ok(i32::from(plan.has_errors()))
        }

        Commands::Check {
            operation,
            status,
            body,
            config,
            spec,
        } => {
            let cfg = load_config(config.as_deref())?;
            let spec_path = spec.unwrap_or_else(|| cfg.spec.clone());
            let doc = load_spec(&spec_path)
                .with_context(|| format!("loading spec {}", spec_path.display()))?;

            let mut diags = Diagnostics::new();
            let requests = compile(&doc, &mut diags);
            // The contract table is shared by every request of an operation,
            // so the first match carries it.
            let Some(request) = requests.iter().find(|r| r.operation == operation) else {
                bail!("operation not found in spec: {operation}");
            };

            let body_text = std::fs::read_to_string(&body)
                .with_context(|| format!("reading {}", body.display()))?;
            let body_value: serde_json::Value =
                serde_json::from_str(&body_text).context("response body is not valid JSON")?;

            match check_response(&request.expected_responses, status, &body_value) {
                ContractCheck::Validated(report) => {
                    match cli.output {
                        OutputFormat::Terminal => {
                            if report.valid {
                                println!("PASS: {operation} {status} matches its contract");
                            } else {
                                println!("FAIL: {operation} {status} violates its contract");
                                for violation in &report.violations {
                                    let path = if violation.path.is_empty() {
                                        "/"
                                    } else {
                                        violation.path.as_str()
                                    };
                                    println!(
                                        "  [{}] {path}: {}",
                                        violation.keyword, violation.message
                                    );
                                }
                            }
                        }
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&report)?);
                        }
                    }
                    Ok(i32::from(!report.valid))
                }
                ContractCheck::Undocumented { status } => {
                    println!("GAP: no documented contract for status {status} on {operation}");
                    Ok(1)
                }
            }
        }

        Commands::Init => {
            let config_path = ".apipact.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - spec: path to your OpenAPI spec");
            println!("  - base_url: server the suite targets");
            println!("  - headers: auth tokens, API keys");
            Ok(0)
        }

        Commands::Schema => {
            println!("{}", generate_schema());
            Ok(0)
        }
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let cfg = match path {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::load_default()?,
    };
    Ok(cfg)
}

/// Cap emitted requests per operation. Combination products can explode;
/// the compiler leaves bounding to its caller.
fn apply_limit(requests: Vec<RequestModel>, limit: Option<u32>) -> Vec<RequestModel> {
    let Some(limit) = limit else {
        return requests;
    };
    let mut counts: HashMap<String, u32> = HashMap::new();
    requests
        .into_iter()
        .filter(|request| {
            let count = counts.entry(request.operation.clone()).or_insert(0);
            *count += 1;
            *count <= limit
        })
        .collect()
}

/// Configured headers apply to every request, without overriding
/// spec-declared header parameters.
fn apply_headers(requests: &mut [RequestModel], headers: &HashMap<String, String>) {
    for request in requests.iter_mut() {
        for (key, value) in headers {
            request
                .headers
                .entry(key.clone())
                .or_insert_with(|| serde_json::Value::String(value.clone()));
        }
    }
}
