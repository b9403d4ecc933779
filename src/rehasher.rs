//! Rehash orchestrator: reads the manifest, reconciles the public directory and writes
//! the rewritten manifest back.

use std::collections::BTreeSet;
use std::path::PathBuf;

use log::{Level, log, warn};
use rayon::prelude::*;

use crate::asset_paths::{VersionedName, physical_glob, physical_path, rewrite_filename};
use crate::config::{RehashOptions, ResolvedPaths};
use crate::error::Result;
use crate::manifest::{Manifest, load_manifest, save_manifest};
use crate::models::{CleanupFailure, EntryOutcome, EntryReport, FailedStep, RehashReport};
use crate::reconcile::{copy_asset, delete_glob, delete_path};
use crate::selection::{Blacklist, EntryExclusion};

/// Rehash the manifest described by `options`.
///
/// Configuration, read and parse errors abort before the filesystem is touched. Copy and
/// delete failures are recorded per entry in the returned report.
pub fn run(options: &RehashOptions) -> Result<RehashReport> {
  ManifestRehasher::new(options)?.run()
}

/// Validated rehash run ready to execute.
#[derive(Debug)]
pub struct ManifestRehasher<'a> {
  options: &'a RehashOptions,
  paths: ResolvedPaths<'a>,
  blacklist: Blacklist,
}

impl<'a> ManifestRehasher<'a> {
  /// Validate the options and compile the blacklist without touching the filesystem.
  pub fn new(options: &'a RehashOptions) -> Result<Self> {
    let paths = options.resolve_paths()?;
    let blacklist = Blacklist::new(&options.blacklist)?;
    Ok(Self {
      options,
      paths,
      blacklist,
    })
  }

  /// Execute the run.
  pub fn run(&self) -> Result<RehashReport> {
    let original = load_manifest(self.paths.manifest_file_path)?;
    self.trace(format_args!(
      "loaded {} entries from {}",
      original.len(),
      self.paths.manifest_file_path.display()
    ));

    let (stale_removed, cleanup_failures) = self.remove_stale_files(&original);

    let pairs: Vec<(&str, &str)> = original.iter().collect();
    let entries: Vec<EntryReport> = pairs
      .par_iter()
      .map(|&(key, value)| EntryReport {
        key: key.to_string(),
        outcome: self.process_entry(key, value),
      })
      .collect();

    let manifest = self.assemble_manifest(&original);
    save_manifest(self.paths.manifest_file_path, &manifest)?;
    self.trace(format_args!(
      "wrote {} entries to {}",
      manifest.len(),
      self.paths.manifest_file_path.display()
    ));

    Ok(RehashReport {
      manifest,
      entries,
      stale_removed,
      cleanup_failures,
    })
  }

  /// Delete previous hashed generations for every versioned entry, blacklisted or not.
  ///
  /// Files that are themselves manifest sources are never treated as stale, so
  /// `/app.*.css` cannot take `/app.min.css` with it.
  fn remove_stale_files(&self, original: &Manifest) -> (Vec<PathBuf>, Vec<CleanupFailure>) {
    let mut removed = Vec::new();
    let mut failures = Vec::new();
    let sources: BTreeSet<PathBuf> = original
      .keys()
      .filter_map(|key| physical_path(self.paths.public_path, key).ok())
      .collect();

    for (key, value) in original.iter() {
      let Some(versioned) = VersionedName::parse(value) else {
        continue;
      };
      let logical = versioned.stale_glob();
      let cleanup = physical_glob(self.paths.public_path, &logical).and_then(|pattern| {
        delete_glob(
          &pattern,
          self.paths.public_path,
          &self.options.delete_options,
          &sources,
        )
        .map(|outcome| (pattern, outcome))
      });
      let (pattern, outcome) = match cleanup {
        Ok(cleanup) => cleanup,
        Err(error) => {
          warn!("stale cleanup for {key} failed: {error}");
          failures.push(CleanupFailure {
            key: key.to_string(),
            pattern: logical,
            error,
          });
          continue;
        }
      };

      for path in &outcome.removed {
        self.trace(format_args!("removed stale file {}", path.display()));
      }
      removed.extend(outcome.removed);
      for error in outcome.failures {
        warn!("stale cleanup for {key} failed: {error}");
        failures.push(CleanupFailure {
          key: key.to_string(),
          pattern: pattern.clone(),
          error,
        });
      }
    }

    (removed, failures)
  }

  fn process_entry(&self, key: &str, value: &str) -> EntryOutcome {
    if let Some(rule) = self.blacklist.matching_rule(key) {
      let kept = self.options.keep_blacklisted_entries;
      self.trace(format_args!(
        "skipping {key}: matches blacklist rule `{rule}`{}",
        if kept { ", kept verbatim" } else { ", dropped" }
      ));
      return EntryOutcome::Blacklisted {
        rule: rule.to_string(),
        kept,
      };
    }

    let Some(versioned) = VersionedName::parse(value) else {
      self.trace(format_args!("leaving {key} untouched: `{value}` has no version token"));
      return EntryOutcome::Unversioned;
    };

    let hashed = versioned.hashed();
    let resolved = physical_path(self.paths.public_path, key).and_then(|source| {
      physical_path(self.paths.public_path, &hashed).map(|destination| (source, destination))
    });
    let (source, destination) = match resolved {
      Ok(paths) => paths,
      Err(error) => {
        warn!("{error}");
        return EntryOutcome::Failed {
          hashed,
          step: FailedStep::Resolve,
          error,
        };
      }
    };

    if let Err(error) = copy_asset(&source, &destination) {
      warn!("{error}");
      return EntryOutcome::Failed {
        hashed,
        step: FailedStep::Copy,
        error,
      };
    }
    self.trace(format_args!(
      "copied {} to {}",
      source.display(),
      destination.display()
    ));

    match delete_path(&source, self.paths.public_path, &self.options.delete_options) {
      Ok(removed) => {
        if let Some(path) = removed {
          self.trace(format_args!("removed {}", path.display()));
        }
        EntryOutcome::Rehashed { hashed }
      }
      Err(error) => {
        warn!("{error}");
        EntryOutcome::Failed {
          hashed,
          step: FailedStep::Delete,
          error,
        }
      }
    }
  }

  /// Build the output manifest in the original key order.
  fn assemble_manifest(&self, original: &Manifest) -> Manifest {
    let mut manifest = Manifest::new();
    for (key, value) in original.iter() {
      if self.blacklist.is_excluded(key) {
        if self.options.keep_blacklisted_entries {
          manifest.insert(key, value);
        }
      } else {
        manifest.insert(key, rewrite_filename(value));
      }
    }
    manifest
  }

  fn trace(&self, message: std::fmt::Arguments<'_>) {
    let level = if self.options.debug {
      Level::Info
    } else {
      Level::Debug
    };
    log!(level, "{message}");
  }
}
