use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clientgen::{CONFIG_FILE, Config, Pipeline, Writer};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(about = "Generate a typed TypeScript client from an ASP.NET Core backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the backend and write the client package
    Generate {
        /// Path to clientgen.toml
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
        /// Fail on warnings
        #[arg(long)]
        strict: bool,
        /// Show what would be written without writing it
        #[arg(long)]
        dry_run: bool,
        /// Remove previously generated output first
        #[arg(long)]
        clean: bool,
    },
    /// Print the extracted IR as JSON
    Inspect {
        /// Path to clientgen.toml
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clientgen=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            config,
            strict,
            dry_run,
            clean,
        } => generate(config, strict, dry_run, clean),
        Commands::Inspect { config } => inspect(config),
    }
}

fn load(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("loading {}", path.display()))
}

fn generate(config: PathBuf, strict: bool, dry_run: bool, clean: bool) -> Result<()> {
    let mut config = load(&config)?;
    config.strict |= strict;
    let output_path = config.output_path.clone();
    tracing::info!("generating {} into {}", config.package_name, output_path.display());

    let output = Pipeline::new(config).run()?;
    output.report.log();
    if output.report.is_failure() {
        bail!(
            "generation failed: {} errors, {} warnings{}",
            output.report.errors(),
            output.report.warnings(),
            if output.report.strict { " (strict)" } else { "" }
        );
    }

    let summary = Writer::new(output_path)
        .dry_run(dry_run)
        .clean(clean)
        .write(&output.artifacts)?;
    if dry_run {
        for (path, action) in &summary.files {
            println!("{:?} {}", action, path.display());
        }
    }
    Ok(())
}

fn inspect(config: PathBuf) -> Result<()> {
    let config = load(&config)?;
    let (ir, report) = Pipeline::new(config).extract()?;
    report.log();
    println!("{}", serde_json::to_string_pretty(&ir)?);
    Ok(())
}
