//! Data structures describing the outcome of a rehash run.

use std::path::PathBuf;

use crate::error::RehashError;
use crate::manifest::Manifest;

/// Step of the per-entry pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
  /// Mapping the entry onto the public directory.
  Resolve,
  /// Copying the asset to its hashed name.
  Copy,
  /// Removing the unhashed original after a successful copy.
  Delete,
}

/// What happened to a single manifest entry.
#[derive(Debug)]
pub enum EntryOutcome {
  /// The asset was copied to its hashed name and the original removed.
  Rehashed {
    /// New manifest value.
    hashed: String,
  },
  /// The value carries no `?id=` token and was passed through untouched.
  Unversioned,
  /// The key matched a blacklist rule.
  Blacklisted {
    /// Rule that matched.
    rule: String,
    /// Whether the entry was kept in the output manifest.
    kept: bool,
  },
  /// Resolving, copying or deleting failed; the entry is left in whatever state the filesystem reached.
  Failed {
    /// Manifest value the entry was rewritten to.
    hashed: String,
    /// Step that failed.
    step: FailedStep,
    /// Underlying error.
    error: RehashError,
  },
}

/// Outcome for one manifest key.
#[derive(Debug)]
pub struct EntryReport {
  /// Logical manifest key.
  pub key: String,
  /// What happened to the entry.
  pub outcome: EntryOutcome,
}

/// A stale-file cleanup that could not complete.
#[derive(Debug)]
pub struct CleanupFailure {
  /// Logical manifest key whose glob family was being cleaned.
  pub key: String,
  /// Filesystem glob that was expanded, or the manifest glob when it could not be mapped.
  pub pattern: String,
  /// Underlying error.
  pub error: RehashError,
}

/// Summary returned by [`crate::run`].
#[derive(Debug)]
pub struct RehashReport {
  /// Manifest as written back to disk.
  pub manifest: Manifest,
  /// Per-entry outcomes in manifest order.
  pub entries: Vec<EntryReport>,
  /// Previous-generation files removed (or that would be removed on a dry run).
  pub stale_removed: Vec<PathBuf>,
  /// Stale cleanups that failed.
  pub cleanup_failures: Vec<CleanupFailure>,
}

impl RehashReport {
  /// Number of entries moved to their hashed name.
  pub fn rehashed_count(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|entry| matches!(entry.outcome, EntryOutcome::Rehashed { .. }))
      .count()
  }

  /// Entries that could not be resolved, copied or deleted.
  pub fn failed_entries(&self) -> impl Iterator<Item = &EntryReport> {
    self
      .entries
      .iter()
      .filter(|entry| matches!(entry.outcome, EntryOutcome::Failed { .. }))
  }

  /// Returns true when every copy, delete and cleanup succeeded.
  pub fn is_clean(&self) -> bool {
    self.cleanup_failures.is_empty() && self.failed_entries().next().is_none()
  }

  /// Outcome recorded for `key`.
  pub fn outcome(&self, key: &str) -> Option<&EntryOutcome> {
    self
      .entries
      .iter()
      .find(|entry| entry.key == key)
      .map(|entry| &entry.outcome)
  }
}
