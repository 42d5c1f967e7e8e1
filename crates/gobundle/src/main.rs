use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use gobundle::{BundleOrchestrator, Config};
use log::{LevelFilter, info};

/// Bundle the source files of a Go package into a single file
#[derive(Parser, Debug)]
#[command(name = "gobundle", version, about, long_about = None)]
struct Cli {
    /// Package name written into the bundle
    #[arg(short, long)]
    package: Option<String>,

    /// Delete the bundled source files after a successful run
    #[arg(short, long)]
    delete_sources: bool,

    /// Write the bundle to this file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file to use instead of ./gobundle.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Files or glob patterns to bundle, in order
    patterns: Vec<String>,
}

impl Cli {
    /// Command-line values override everything loaded before them
    fn apply(self, config: &mut Config) {
        if let Some(package) = self.package {
            config.package = package;
        }
        if self.delete_sources {
            config.delete_sources = true;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if !self.patterns.is_empty() {
            config.files = self.patterns;
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let orchestrator = BundleOrchestrator::new(&config);
    match &config.output {
        Some(path) => {
            // Build first so a failed run leaves an existing output file alone.
            let bundle = orchestrator.build()?;
            fs::write(path, &bundle.content)
                .with_context(|| format!("Failed to write bundle to {}", path.display()))?;
            info!("Wrote bundle to {}", path.display());
            orchestrator.delete_sources(&bundle.files);
        }
        None => {
            let mut stdout = io::stdout().lock();
            orchestrator.bundle(&mut stdout)?;
            stdout.flush().context("Failed to flush standard output")?;
        }
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
