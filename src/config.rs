//! Options record describing one rehash run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RehashError, Result};

/// File name searched for by [`RehashOptions::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "rehash.config.json";

/// Options accepted by [`crate::run`].
///
/// Field names deserialise from camelCase so existing build configuration can be reused.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RehashOptions {
  /// Directory the physical assets live under. Required.
  pub public_path: Option<PathBuf>,
  /// Path to the manifest JSON file. Required.
  pub manifest_file_path: Option<PathBuf>,
  /// Glob patterns excluding manifest keys from rehashing.
  #[serde(alias = "fileTypesBlacklist")]
  pub blacklist: Vec<String>,
  /// Keep blacklisted entries in the output manifest with their original value.
  pub keep_blacklisted_entries: bool,
  /// Options forwarded to the delete helpers.
  pub delete_options: DeleteOptions,
  /// Raise the trace of every copy and delete decision to `info`.
  pub debug: bool,
}

/// Safety switches for file deletion.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteOptions {
  /// Allow deleting paths outside `cwd`, and `cwd` itself.
  pub force: bool,
  /// Report what would be deleted without touching the filesystem.
  pub dry_run: bool,
  /// Skip directories matched by a pattern.
  pub only_files: bool,
  /// Directory deletions are confined to. Defaults to the process working directory.
  pub cwd: Option<PathBuf>,
}

impl Default for DeleteOptions {
  fn default() -> Self {
    Self {
      force: false,
      dry_run: false,
      only_files: true,
      cwd: None,
    }
  }
}

impl DeleteOptions {
  /// Directory deletions are confined to when not forced.
  pub fn root(&self) -> std::io::Result<PathBuf> {
    match &self.cwd {
      Some(cwd) => Ok(cwd.clone()),
      None => std::env::current_dir(),
    }
  }
}

/// Validated view of [`RehashOptions`] with the required paths present.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPaths<'a> {
  /// Directory the physical assets live under.
  pub public_path: &'a Path,
  /// Manifest JSON file.
  pub manifest_file_path: &'a Path,
}

impl RehashOptions {
  /// Attempt to load options from `rehash.config.json` in the provided directory.
  ///
  /// A missing or malformed file yields default options, leaving required paths unset.
  pub fn discover(dir: &Path) -> Self {
    Self::from_path(&dir.join(DEFAULT_CONFIG_FILE)).unwrap_or_default()
  }

  /// Read options from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|err| RehashError::Config {
      path: path.to_path_buf(),
      message: err.to_string(),
    })?;
    serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|err| {
      RehashError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
      }
    })
  }

  /// Check that the required paths were supplied.
  pub fn resolve_paths(&self) -> Result<ResolvedPaths<'_>> {
    let public_path = self
      .public_path
      .as_deref()
      .filter(|path| !path.as_os_str().is_empty())
      .ok_or(RehashError::MissingOption("publicPath"))?;
    let manifest_file_path = self
      .manifest_file_path
      .as_deref()
      .filter(|path| !path.as_os_str().is_empty())
      .ok_or(RehashError::MissingOption("manifestFilePath"))?;
    Ok(ResolvedPaths {
      public_path,
      manifest_file_path,
    })
  }
}
