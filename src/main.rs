//! cle-assistant - Command line entry point
//!
//! Exports a scene snapshot to code, lists the operation catalog and writes
//! the default configuration.

use anyhow::Context;
use clap::{Parser, Subcommand};
use cle_assistant::catalog::{OperationCatalog, OutputKind, StaticCatalog};
use cle_assistant::config::AppConfig;
use cle_assistant::pipeline::{
    CommandRunner, GeneratorKind, NamingScheme, Pipeline, RenderOptions,
};
use cle_assistant::Scene;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cle-assistant")]
#[command(version, about = "Export image-processing pipelines as code", long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene snapshot
    Export {
        /// Scene snapshot (JSON)
        #[arg(long, value_name = "FILE")]
        scene: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        target: Option<GeneratorKind>,

        /// Output path; printed to stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Leave out display calls
        #[arg(long)]
        no_show: bool,

        /// How step outputs are named
        #[arg(long, value_enum)]
        naming: Option<NamingScheme>,

        /// Execute the written notebook
        #[arg(long)]
        execute: bool,

        /// Operation catalog (TOML) replacing the built-in one
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// List known operations
    Operations {
        /// Operation catalog (TOML) replacing the built-in one
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Write the default configuration
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load_or_default(),
    };

    match cli.command {
        Commands::Export {
            scene,
            target,
            output,
            no_show,
            naming,
            execute,
            catalog,
        } => {
            let scene = Scene::load(&scene)
                .with_context(|| format!("Failed to load scene {}", scene.display()))?;
            let catalog = load_catalog(catalog.as_ref().or(config.catalog.as_ref()))?;
            let kind = target.unwrap_or(config.export.default_target);
            let naming = naming.unwrap_or(config.export.naming);

            let pipeline = Pipeline::from_scene_with(&scene, &catalog, naming)?
                .with_show_results(config.export.show_results && !no_show);

            let options = RenderOptions {
                settings: config.generator.clone(),
                output,
                expand_home: config.export.expand_home,
                execute: execute || config.runner.execute_notebooks,
            };
            let runner = CommandRunner::from_settings(&config.runner);
            let rendered = pipeline.render_with(kind, &options, &runner)?;

            for warning in &rendered.warnings {
                eprintln!("warning: {}", warning);
            }

            match rendered.path {
                Some(path) => eprintln!("{} written to {}", kind, path.display()),
                None => {
                    let text = rendered.artifact.to_text()?;
                    std::io::stdout().write_all(text.as_bytes())?;
                }
            }
        }
        Commands::Operations { catalog } => {
            let catalog = load_catalog(catalog.as_ref().or(config.catalog.as_ref()))?;
            for spec in catalog.operations() {
                let params: Vec<String> = spec
                    .params
                    .iter()
                    .map(|p| format!("{}: {} = {}", p.name, p.kind, p.default))
                    .collect();
                let output = match spec.output {
                    OutputKind::Image => "image",
                    OutputKind::Labels => "labels",
                };
                println!(
                    "{:<40} {:<28} inputs={} -> {:<6} ({})",
                    spec.name,
                    spec.category.as_deref().unwrap_or("-"),
                    spec.image_inputs,
                    output,
                    params.join(", ")
                );
            }
        }
        Commands::InitConfig { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => cle_assistant::config::default_config_path()
                    .context("Could not determine config directory")?,
            };
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            AppConfig::default().save(&path)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&PathBuf>) -> anyhow::Result<StaticCatalog> {
    match path {
        Some(path) => StaticCatalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(StaticCatalog::builtin()),
    }
}

fn init_logging(
    log_file: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cle_assistant=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
