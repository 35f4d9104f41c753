//! Point d'entrée CLI pour icsm-transformer

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use icsm_transformer::Settings;

mod cli;

use cli::Commands;

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Transformer des données entre datums australiens avec les grilles NTv2 de l'ICSM
#[derive(Parser)]
#[command(name = "icsm-transformer")]
#[command(author, version)]
#[command(about = "Transform datasets between AGD66, AGD84, GDA94 and GDA2020 using the official ICSM NTv2 grids")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Fichier de configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let settings = Settings::resolve(cli.config.as_deref())?;
    debug!(settings = ?settings, "Settings loaded");

    match cli.command {
        Commands::Catalog { source, json } => cli::cmd_catalog(&settings, source.as_deref(), json),
        Commands::Describe { crs, index } => cli::cmd_describe(&settings, &crs, index),
        Commands::FetchGrids { grid } => cli::cmd_fetch_grids(&settings, grid.as_deref()),
        Commands::Transform {
            input,
            output,
            index,
            no_load,
        } => cli::cmd_transform(&settings, &input, output, index, no_load),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
