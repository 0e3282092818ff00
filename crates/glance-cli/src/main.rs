//! Glance CLI - Command-line interface for glTF validation reports

mod commands;
mod config;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{registry, report, validate};
use config::GlanceConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glance")]
#[command(about = "Validate glTF assets and present the validator report", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a glTF/GLB file, optionally from a directory or zip bundle
    Validate {
        /// Root file path or URL; with --bundle, a key inside the bundle or "-" to pick the first scene
        root: String,

        /// Directory or zip archive holding the root file and its resources
        #[arg(long)]
        bundle: Option<PathBuf>,

        #[command(flatten)]
        output: commands::OutputArgs,
    },

    /// Normalize and present an existing validator report (JSON)
    Report {
        /// Path to the raw report
        raw_json: PathBuf,

        #[command(flatten)]
        output: commands::OutputArgs,
    },

    /// List generator registry entries or resolve a generator string
    Registry {
        /// Registry file (TOML or JSON)
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Generator string to resolve
        #[arg(long = "match")]
        generator: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GlanceConfig::load()?;

    match cli.command {
        Commands::Validate {
            root,
            bundle,
            output,
        } => {
            validate::run(
                validate::ValidateArgs {
                    root,
                    bundle,
                    output,
                },
                &config,
            )
            .await
        }
        Commands::Report { raw_json, output } => {
            report::run(report::ReportArgs { raw_json, output }, &config)
        }
        Commands::Registry {
            registry: registry_file,
            generator,
        } => registry::run(
            registry::RegistryArgs {
                registry: registry_file,
                generator,
            },
            &config,
        ),
    }
}
