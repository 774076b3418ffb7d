use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use sdkgen_core::config::{self, CONFIG_FILE_NAME, SdkgenConfig};
use sdkgen_core::model::Document;
use sdkgen_core::transform::{PropertyPolicy, ValidationCompiler};
use sdkgen_core::{ArtifactSink, DirectorySink, Emitter, Normalized, Orchestrator};
use sdkgen_typescript::TypescriptEmitter;

#[derive(Parser)]
#[command(name = "sdkgen", about = "Swagger 2.0 SDK generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an SDK from a Swagger document
    Generate {
        /// Target language file extension, e.g. `ts` or `.ts`
        #[arg(short, long)]
        extension: Option<String>,

        /// Path to the Swagger document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of generation workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Report fields whose shape did not match the schema
        #[arg(long)]
        diagnostics: bool,
    },

    /// Print a summary of the normalized document
    Inspect {
        /// Path to the Swagger document
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new sdkgen configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            extension,
            input,
            output,
            workers,
            diagnostics,
        } => cmd_generate(GenerateArgs {
            extension,
            input,
            output,
            workers,
            diagnostics,
        }),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<SdkgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Read and normalize the document at `path`.
fn load_document(path: &PathBuf, cfg: &SdkgenConfig, diagnostics: bool) -> Result<Normalized> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let normalized = sdkgen_core::normalize(&content, &cfg.tables, diagnostics)
        .with_context(|| format!("failed to normalize {}", path.display()))?;
    if !normalized.diagnostics.is_empty() {
        eprintln!(
            "{} fields did not match the expected shape and were left empty",
            normalized.diagnostics.len()
        );
    }
    Ok(normalized)
}

struct GenerateArgs {
    extension: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    diagnostics: bool,
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    log::debug!("loaded config: {cfg:?}");
    let extension = args
        .extension
        .or_else(|| cfg.extension.clone())
        .context("no target extension given; pass --extension or set `extension` in the config")?;
    let input = args.input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = args.output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let orchestrator = Orchestrator::new(args.workers.unwrap_or(cfg.workers), cfg.queue_capacity);

    if !TypescriptEmitter::handles(&extension) {
        anyhow::bail!("unsupported extension '{extension}'; supported: ts");
    }
    let emitter = TypescriptEmitter::new().context("failed to load templates")?;

    let document = load_document(&input, &cfg, args.diagnostics || cfg.diagnostics)?.document;
    eprintln!(
        "Generating .{} SDK from {} with {} workers",
        emitter.extension(),
        input.display(),
        orchestrator.workers()
    );
    let artifacts = sdkgen_core::generate(&document, &cfg.tables, &emitter, &orchestrator)
        .context("generation failed, nothing was written")?;

    let mut sink = DirectorySink::new(&output);
    sink.persist(&artifacts)?;
    eprintln!("Generated {} files in {}", artifacts.len(), output.display());
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let document = load_document(&input, &cfg, false)?.document;

    let summary = build_inspect_summary(&document, &cfg);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(document: &Document, cfg: &SdkgenConfig) -> serde_json::Value {
    let definitions: Vec<serde_json::Value> = document
        .sorted_definitions()
        .iter()
        .map(|d| {
            serde_json::json!({
                "name": d.key,
                "kind": d.kind,
                "properties": d.properties.len(),
                "dynamic_query": d.dynamic_query.as_ref().map(|q| &q.characteristics),
            })
        })
        .collect();

    let responses: Vec<serde_json::Value> = document
        .sorted_responses()
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.key,
                "extends": r.extends,
                "returns": r.returns.as_ref().map(ToString::to_string),
            })
        })
        .collect();

    let paths: Vec<serde_json::Value> = document
        .sorted_paths()
        .iter()
        .map(|p| {
            serde_json::json!({
                "route": p.key,
                "method": p.verb.as_str(),
                "operation": p.operation,
                "parameters": p.parameters.len(),
            })
        })
        .collect();

    let policy = PropertyPolicy::new(&cfg.tables.policy);
    let validation = ValidationCompiler::new(&cfg.tables.validation, &policy).compile(document);

    serde_json::json!({
        "info": {
            "title": document.meta.title,
            "version": document.meta.version,
        },
        "host": document.host,
        "base_path": document.base_path,
        "definitions": definitions,
        "responses": responses,
        "paths": paths,
        "validation": validation.keys().collect::<Vec<_>>(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
