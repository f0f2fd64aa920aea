//! CLI for generating a lesson package.
//!
//! # Usage
//!
//! ```bash
//! # Development: call the provider directly with OPENAI_API_KEY
//! cargo run -p ef-generator --bin ef-generate -- --topic Photosynthesis --standards NGSS
//!
//! # Production: relay through a running ef-proxy
//! cargo run -p ef-generator --bin ef-generate -- --topic Fractions --production
//!
//! # Write fragments and an export file
//! cargo run -p ef-generator --bin ef-generate -- --topic "Water Cycle" \
//!     --output-dir out --export-json out/water.json --sub-pack
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ef_core::{AudienceType, ContentKind, GenerationRequest};
use ef_gateway::{DeploymentMode, GatewayConfig, ModelGateway};
use ef_generator::{
    format_elapsed, ContentGenerator, DirectorySink, ElapsedTicker, ExportDocument,
    GenerationOutcome, GeneratorConfig, JoinPolicy, MemorySink, Orchestrator,
};
use tracing_subscriber::EnvFilter;

/// Generate a lesson plan, activities and quiz for one topic.
#[derive(Debug, Parser)]
#[command(name = "ef-generate", version, about)]
struct Args {
    /// Topic or learning objective
    #[arg(short, long)]
    topic: String,

    /// teacher, coach, therapist or tutor
    #[arg(short, long, default_value = "teacher")]
    audience: AudienceType,

    #[arg(short, long, default_value = "5th grade")]
    grade_level: String,

    /// Session length in minutes
    #[arg(short, long, default_value_t = 45)]
    duration: u32,

    /// Standards framework, e.g. NGSS or "Common Core"
    #[arg(long)]
    standards: Option<String>,

    /// Additional free-text constraints
    #[arg(long)]
    constraints: Option<String>,

    /// Option tag to include (repeatable)
    #[arg(long = "option", value_name = "TAG")]
    options: Vec<String>,

    /// Relay through the proxy instead of calling the provider
    #[arg(long)]
    production: bool,

    /// Proxy endpoint used in production mode
    #[arg(long)]
    proxy_url: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write lesson.html, activities.html and quiz.html here
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write the JSON export of a complete run to this file
    #[arg(long, value_name = "FILE")]
    export_json: Option<PathBuf>,

    /// Also generate the substitute pack after a complete run
    #[arg(long)]
    sub_pack: bool,

    /// Keep whatever succeeded instead of failing fast
    #[arg(long)]
    all_settled: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Build config
    let mut gateway_config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if args.production {
        gateway_config.mode = DeploymentMode::Production;
    }
    if let Some(url) = args.proxy_url.clone() {
        gateway_config.proxy_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        gateway_config = match gateway_config.with_call_timeout_secs(secs) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: --timeout-secs: {}", e);
                return ExitCode::FAILURE;
            }
        };
    }

    let mut generator_config = GeneratorConfig::from_env();
    if let Some(model) = args.model.clone() {
        generator_config.model = model;
    }

    let gateway = match ModelGateway::from_config(&gateway_config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Error creating gateway: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !gateway.is_configured() {
        eprintln!("Error: API key not configured");
        eprintln!();
        eprintln!("Set OPENAI_API_KEY for development, or run with --production");
        eprintln!("against a running ef-proxy:");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        return ExitCode::FAILURE;
    }

    let request = build_request(&args);
    let generator = Arc::new(ContentGenerator::new(gateway, generator_config.clone()));
    let policy = if args.all_settled {
        JoinPolicy::AllSettled
    } else {
        JoinPolicy::FailFast
    };
    let orchestrator = Orchestrator::new(generator.clone()).with_policy(policy);

    if !args.quiet {
        println!("EduForge Lesson Generator");
        println!("=========================");
        println!();
        println!("Topic: {}", request.topic);
        println!("Audience: {} ({})", request.audience_type, request.grade_level);
        println!("Duration: {} minutes", request.duration_minutes);
        println!("Model: {} via {}", generator_config.model, generator.gateway().strategy_name());
        println!();
    }

    let ticker = (!args.quiet).then(|| {
        ElapsedTicker::spawn(Duration::from_secs(1), |elapsed| {
            eprint!("\rGenerating... {}", format_elapsed(elapsed));
            let _ = std::io::stderr().flush();
        })
    });

    // Generate
    let mut memory = MemorySink::new();
    let result = match &args.output_dir {
        Some(dir) => match DirectorySink::create(dir) {
            Ok(mut sink) => orchestrator.run_into(request.clone(), &mut sink).await,
            Err(e) => {
                eprintln!("Failed to create {}: {}", dir.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => orchestrator.run_into(request.clone(), &mut memory).await,
    };

    if let Some(ticker) = ticker {
        ticker.stop();
        eprintln!();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !args.quiet {
        for (kind, html) in memory.iter() {
            println!();
            println!("--- {} ---", kind);
            println!("{}", html);
        }
    }

    println!();
    println!("{}", outcome.format_summary());

    if !outcome.is_complete() {
        if let Some(message) = outcome.message() {
            eprintln!("{}", message);
        }
        return ExitCode::FAILURE;
    }

    if let Some(path) = &args.export_json {
        if let Err(code) = export(&request, &outcome, path) {
            return code;
        }
    }

    if args.sub_pack {
        match generator.sub_pack(&request).await {
            Ok(html) => {
                if let Err(code) = write_sub_pack(&args, &html) {
                    return code;
                }
            }
            Err(e) => {
                eprintln!("Error generating substitute pack: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn build_request(args: &Args) -> GenerationRequest {
    let mut request = GenerationRequest::new(args.topic.clone())
        .with_audience(args.audience)
        .with_grade_level(args.grade_level.clone())
        .with_duration_minutes(args.duration);
    if let Some(standards) = &args.standards {
        request = request.with_standards(standards.clone());
    }
    if let Some(constraints) = &args.constraints {
        request = request.with_constraints(constraints.clone());
    }
    for tag in &args.options {
        request = request.with_option(tag.clone());
    }
    request
}

fn export(
    request: &GenerationRequest,
    outcome: &GenerationOutcome,
    path: &Path,
) -> Result<(), ExitCode> {
    let written = ExportDocument::from_outcome(request, outcome).and_then(|doc| doc.write_to(path));
    match written {
        Ok(()) => {
            println!("Export written to: {}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to write export: {}", e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn write_sub_pack(args: &Args, html: &str) -> Result<(), ExitCode> {
    match &args.output_dir {
        Some(dir) => {
            let path = dir.join(format!("{}.html", ContentKind::SubPack.name()));
            match std::fs::write(&path, html) {
                Ok(()) => {
                    println!("Substitute pack written to: {}", path.display());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Failed to write substitute pack: {}", e);
                    Err(ExitCode::FAILURE)
                }
            }
        }
        None => {
            println!();
            println!("--- {} ---", ContentKind::SubPack);
            println!("{}", html);
            Ok(())
        }
    }
}
