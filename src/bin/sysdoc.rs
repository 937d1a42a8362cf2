use clap::{command, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sysdoc::{
    analyzer::parsers::pmlogger, analyzer::prelude::EolPolicy, config::ParserConfig, Document,
    Error, InternalResult, ResultSet,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a pmlogger configuration and print one document per log specification
    Pmlogger {
        file: PathBuf,

        /// Path to parser config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the end-of-line policy (newline_only, allow_end_of_input)
        #[arg(long)]
        eol: Option<EolPolicy>,
    },

    /// Load a JSON file and print its document tree
    Document { file: PathBuf },
}

fn read_text(path: &Path) -> InternalResult<String> {
    debug!("Reading {:?}", path);
    Ok(std::fs::read_to_string(path)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> InternalResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::internal(format!("Failed to render output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn run_pmlogger(
    file: &Path,
    config: Option<&Path>,
    eol: Option<EolPolicy>,
) -> InternalResult<()> {
    let mut config = match config {
        Some(path) => ParserConfig::from_file(path)?,
        None => ParserConfig::default(),
    };
    if let Some(eol) = eol {
        config.eol = eol;
    }
    info!("config loaded.");
    debug!("config: {:?}", config);

    let text = read_text(file)?;
    debug!("Parsing pmlogger file: {:?}", file);
    let specs: Vec<Arc<pmlogger::LogSpec>> = pmlogger::parse_with(&text, &config)?
        .into_iter()
        .map(Arc::new)
        .collect();
    info!(count = specs.len(), "parsed log specifications");

    let result = ResultSet::collect(&specs, Document::from_serialize)?;
    print_json(&result)
}

fn run_document(file: &Path) -> InternalResult<()> {
    let text = read_text(file)?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| Error::internal(format!("Failed to parse {}: {}", file.display(), e)))?;
    let document = Document::from_value(value);
    debug!(kind = %document.kind(), len = document.len(), "document built");
    print_json(&document)
}

fn run(cli: &Cli) -> InternalResult<()> {
    match &cli.command {
        Commands::Pmlogger { file, config, eol } => run_pmlogger(file, config.as_deref(), *eol),
        Commands::Document { file } => run_document(file),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
