//! Command-line wrapper around [`manifest_rehash::run`].
//!
//! Options are read from `rehash.config.json` in the working directory (or the file
//! passed with `--config`) and then overridden by flags.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use manifest_rehash::models::{EntryOutcome, FailedStep};
use manifest_rehash::{RehashOptions, run};

/// Move `?id=` cache-busting tokens from an asset manifest into the filenames on disk.
#[derive(Parser, Debug)]
#[command(name = "manifest-rehash")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Directory the assets listed in the manifest live under
  #[arg(long, value_name = "DIR")]
  public_path: Option<PathBuf>,

  /// Manifest JSON file to rewrite
  #[arg(long = "manifest", value_name = "FILE")]
  manifest_file_path: Option<PathBuf>,

  /// Glob excluding matching manifest keys from rehashing (repeatable)
  #[arg(long, value_name = "GLOB")]
  blacklist: Vec<String>,

  /// Keep blacklisted entries in the manifest with their original value
  #[arg(long)]
  keep_blacklisted: bool,

  /// Allow deleting files outside the working directory
  #[arg(long)]
  force: bool,

  /// Report deletions without removing anything
  #[arg(long)]
  dry_run: bool,

  /// Options file to read instead of ./rehash.config.json
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Log every copy and delete decision
  #[arg(long)]
  debug: bool,

  /// Set log level (error, warn, info, debug, trace)
  #[arg(long, value_name = "LEVEL", default_value = "info")]
  log_level: String,
}

impl Cli {
  fn options(&self) -> Result<RehashOptions> {
    let mut options = match &self.config {
      Some(path) => RehashOptions::from_path(path)?,
      None => {
        let cwd = std::env::current_dir().context("failed to resolve working directory")?;
        RehashOptions::discover(&cwd)
      }
    };

    if let Some(public_path) = &self.public_path {
      options.public_path = Some(public_path.clone());
    }
    if let Some(manifest) = &self.manifest_file_path {
      options.manifest_file_path = Some(manifest.clone());
    }
    if !self.blacklist.is_empty() {
      options.blacklist = self.blacklist.clone();
    }
    options.keep_blacklisted_entries |= self.keep_blacklisted;
    options.delete_options.force |= self.force;
    options.delete_options.dry_run |= self.dry_run;
    options.debug |= self.debug;
    Ok(options)
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
    .format_timestamp(None)
    .init();

  match execute(&cli) {
    Ok(code) => code,
    Err(err) => {
      error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

fn execute(cli: &Cli) -> Result<ExitCode> {
  let options = cli.options()?;
  let report = run(&options)?;

  for entry in report.failed_entries() {
    if let EntryOutcome::Failed { step, .. } = &entry.outcome {
      let step = match step {
        FailedStep::Resolve => "resolve",
        FailedStep::Copy => "copy",
        FailedStep::Delete => "delete",
      };
      warn!("{} left inconsistent: {step} failed", entry.key);
    }
  }

  info!(
    "rehashed {} of {} entries, removed {} stale files",
    report.rehashed_count(),
    report.entries.len(),
    report.stale_removed.len()
  );

  Ok(if report.is_clean() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}
