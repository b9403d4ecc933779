//! Error taxonomy shared by the rehash pipeline.
//!
//! Configuration, read and parse errors abort a run before any file is touched.
//! Unsafe path, copy and delete errors are produced per entry and collected into the
//! run report instead of aborting sibling entries. A write error leaves the manifest on
//! disk untouched while the physical files may already carry their new names.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RehashError>;

/// Errors reported while rehashing a manifest.
#[derive(Error, Debug)]
pub enum RehashError {
  /// A required option was not supplied.
  #[error("missing required option `{0}`")]
  MissingOption(&'static str),

  /// A blacklist or stale-file glob could not be compiled.
  #[error("invalid glob pattern `{pattern}`: {source}")]
  InvalidPattern {
    /// Pattern as supplied.
    pattern: String,
    /// Underlying glob error.
    #[source]
    source: glob::PatternError,
  },

  /// A manifest path climbs out of the public directory with `..`.
  #[error("manifest path `{0}` escapes the public directory")]
  UnsafePath(String),

  /// An options file exists but could not be read or parsed.
  #[error("failed to load options from {}: {message}", path.display())]
  Config {
    /// Options file path.
    path: PathBuf,
    /// Human readable reason.
    message: String,
  },

  /// The manifest file could not be read.
  #[error("failed to read manifest {}: {source}", path.display())]
  Read {
    /// Manifest path.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },

  /// The manifest file is not a flat JSON object of strings.
  #[error("failed to parse manifest {}: {message}", path.display())]
  Parse {
    /// Manifest path.
    path: PathBuf,
    /// Human readable reason.
    message: String,
  },

  /// The rewritten manifest could not be persisted.
  #[error("failed to write manifest {}: {source}", path.display())]
  Write {
    /// Manifest path.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },

  /// Copying an asset to its hashed name failed.
  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    /// Source path.
    from: PathBuf,
    /// Destination path.
    to: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },

  /// Source and destination of a copy resolve to the same physical file.
  #[error("{} and {} are the same file", from.display(), to.display())]
  SameFile {
    /// Source path.
    from: PathBuf,
    /// Destination path.
    to: PathBuf,
  },

  /// Removing a file failed, or the delete safety rules refused it.
  #[error("failed to delete {}: {message}", path.display())]
  Delete {
    /// Path that could not be removed.
    path: PathBuf,
    /// Human readable reason.
    message: String,
  },
}

impl RehashError {
  pub(crate) fn delete(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
    Self::Delete {
      path: path.into(),
      message: message.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_option_names_the_field() {
    let err = RehashError::MissingOption("publicPath");
    assert_eq!(err.to_string(), "missing required option `publicPath`");
  }

  #[test]
  fn delete_error_includes_path_and_reason() {
    let err = RehashError::delete("/tmp/app.css", "outside of working directory");
    assert_eq!(
      err.to_string(),
      "failed to delete /tmp/app.css: outside of working directory"
    );
  }
}
