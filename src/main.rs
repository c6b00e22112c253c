//! smbchk CLI
//!
//! Records and checks the exported API symbols of a built library.

use anyhow::{Context, Result};
use clap::Parser;
use smbchk::{check, diff, logging, nm, tag, SmbchkConfig, SymbolDatabase, VersionRecord};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "smbchk")]
#[command(about = "Checks symbol (API) compatibility between releases", long_about = None)]
struct Cli {
    /// Install prefix containing the built libraries
    #[arg(long, default_value = "build")]
    prefix: PathBuf,

    /// Symbol database file
    #[arg(short, long, default_value = "symbols.json")]
    filename: PathBuf,

    /// Print the symbols of the current build
    #[arg(long)]
    dump: bool,

    /// Record the symbols of the current build as a new version
    #[arg(long)]
    update: bool,

    /// Version tag for --update; defaults to `git describe --tags --always`
    #[arg(short, long)]
    tag: Option<String>,

    /// Do not write the database after --update
    #[arg(long = "no-save")]
    no_save: bool,

    /// Check that the latest version only adds to the API
    #[arg(long)]
    check: bool,

    /// Print the symbol difference between entries I and J (negative counts from the end)
    #[arg(long, num_args = 2, value_names = ["I", "J"], allow_negative_numbers = true)]
    diff: Option<Vec<isize>>,

    /// JSON configuration overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn has_action(&self) -> bool {
        self.dump || self.update || self.check || self.diff.is_some()
    }
}

fn run(cli: Cli) -> Result<bool> {
    let cfg = match &cli.config {
        Some(path) => SmbchkConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SmbchkConfig::default(),
    };

    // One scan serves both --dump and --update.
    let mut current = if cli.dump || cli.update {
        Some(nm(&cli.prefix, &cfg.nm, &cfg.io)?)
    } else {
        None
    };

    if cli.dump {
        for s in current.iter().flatten() {
            println!("{s}");
        }
    }

    let needs_db = cli.update || cli.check || cli.diff.is_some();
    if !needs_db {
        return Ok(true);
    }

    let mut db = if cli.filename.exists() {
        SymbolDatabase::load(&cli.filename)
            .with_context(|| format!("loading {}", cli.filename.display()))?
    } else if cli.update {
        info!(path = %cli.filename.display(), "starting a new symbol database");
        SymbolDatabase::new()
    } else {
        anyhow::bail!("symbol database {} does not exist", cli.filename.display());
    };

    if cli.update {
        let version = match &cli.tag {
            Some(t) => tag::normalize(t)?,
            None => tag::git_describe(".")?,
        };
        let syms = current.take().unwrap_or_default();
        db.push(VersionRecord::today(syms, version));
        if !cli.no_save {
            db.save(&cli.filename)?;
        }
    }

    if let Some(idx) = &cli.diff {
        let d = diff(&db, idx[0], idx[1])?;
        print!("{d}");
    }

    if cli.check {
        let report = check(&db);
        for b in &report.breaks {
            println!("Symbols removed since {} ({}):", b.version, b.date);
            for s in &b.removed {
                println!("  {s}");
            }
        }
        return Ok(report.is_compatible());
    }
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.json_logs {
        logging::init_tracing_json();
    } else {
        logging::init_tracing();
    }

    if !cli.has_action() {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
