use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::DeleteOptions;
use crate::error::{RehashError, Result};

/// Paths a glob delete removed, plus the matches it could not remove.
#[derive(Debug, Default)]
pub struct GlobDeletion {
  /// Paths removed, or that would have been removed on a dry run.
  pub removed: Vec<PathBuf>,
  /// One error per match that was refused or failed to delete.
  pub failures: Vec<RehashError>,
}

/// Delete every path matching `pattern`, confined to `confine_to`.
///
/// Matches listed in `protected` are left alone. A match that cannot be removed is
/// recorded in [`GlobDeletion::failures`] and the remaining matches are still visited.
/// Only an invalid pattern or unusable roots fail the whole call.
pub fn delete_glob(
  pattern: &str,
  confine_to: &Path,
  options: &DeleteOptions,
  protected: &BTreeSet<PathBuf>,
) -> Result<GlobDeletion> {
  let matches = glob::glob(pattern).map_err(|source| RehashError::InvalidPattern {
    pattern: pattern.to_string(),
    source,
  })?;
  let guard = DeleteGuard::new(confine_to, options)?;

  let mut outcome = GlobDeletion::default();
  for entry in matches {
    let path = match entry {
      Ok(path) => path,
      Err(err) => {
        outcome
          .failures
          .push(RehashError::delete(err.path(), err.error().to_string()));
        continue;
      }
    };
    if protected.contains(&path) {
      continue;
    }
    match guard.remove(&path) {
      Ok(Some(path)) => outcome.removed.push(path),
      Ok(None) => {}
      Err(error) => outcome.failures.push(error),
    }
  }
  Ok(outcome)
}

/// Delete a single path if it exists, confined to `confine_to`.
pub fn delete_path(
  path: &Path,
  confine_to: &Path,
  options: &DeleteOptions,
) -> Result<Option<PathBuf>> {
  match fs::symlink_metadata(path) {
    Ok(_) => {}
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
    Err(err) => return Err(RehashError::delete(path, err.to_string())),
  }
  DeleteGuard::new(confine_to, options)?.remove(path)
}

/// Resolved roots deletions are checked against.
struct DeleteGuard<'a> {
  confine_to: PathBuf,
  cwd: PathBuf,
  options: &'a DeleteOptions,
}

impl<'a> DeleteGuard<'a> {
  fn new(confine_to: &Path, options: &'a DeleteOptions) -> Result<Self> {
    let confine_to = fs::canonicalize(confine_to)
      .map_err(|err| RehashError::delete(confine_to, err.to_string()))?;
    let cwd = options
      .root()
      .and_then(fs::canonicalize)
      .map_err(|err| {
        RehashError::delete(options.cwd.clone().unwrap_or_default(), err.to_string())
      })?;
    Ok(Self {
      confine_to,
      cwd,
      options,
    })
  }

  fn remove(&self, path: &Path) -> Result<Option<PathBuf>> {
    let resolved = resolve_entry(path)?;

    if !resolved.starts_with(&self.confine_to) || resolved == self.confine_to {
      return Err(RehashError::delete(path, "outside of the public directory"));
    }
    if !self.options.force {
      if resolved == self.cwd {
        return Err(RehashError::delete(
          path,
          "refusing to delete the working directory; set force to allow it",
        ));
      }
      if !resolved.starts_with(&self.cwd) {
        return Err(RehashError::delete(
          path,
          "outside of the working directory; set force to allow it",
        ));
      }
    }

    let metadata =
      fs::symlink_metadata(path).map_err(|err| RehashError::delete(path, err.to_string()))?;
    let is_dir = metadata.is_dir();
    if is_dir && self.options.only_files {
      return Ok(None);
    }
    if self.options.dry_run {
      return Ok(Some(path.to_path_buf()));
    }

    let removal = if is_dir {
      fs::remove_dir_all(path)
    } else {
      fs::remove_file(path)
    };
    match removal {
      Ok(()) => Ok(Some(path.to_path_buf())),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
      Err(err) => Err(RehashError::delete(path, err.to_string())),
    }
  }
}

/// Canonicalise the parent directory but keep the final component, so symlinks are
/// judged by where they live rather than where they point.
fn resolve_entry(path: &Path) -> Result<PathBuf> {
  let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
    return fs::canonicalize(path).map_err(|err| RehashError::delete(path, err.to_string()));
  };
  let parent = if parent.as_os_str().is_empty() {
    Path::new(".")
  } else {
    parent
  };
  let parent = fs::canonicalize(parent).map_err(|err| RehashError::delete(path, err.to_string()))?;
  Ok(parent.join(name))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn options_in(cwd: &Path) -> DeleteOptions {
    DeleteOptions {
      cwd: Some(cwd.to_path_buf()),
      ..DeleteOptions::default()
    }
  }

  #[test]
  fn deletes_matching_files_only() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    fs::create_dir_all(public.join("css"))?;
    fs::write(public.join("css/app.old.css"), "old")?;
    fs::write(public.join("css/app.older.css"), "older")?;
    fs::write(public.join("css/app.css"), "current")?;
    fs::write(public.join("css/admin.old.css"), "other")?;

    let pattern = format!("{}/css/app.*.css", public.display());
    let mut removed = delete_glob(&pattern, &public, &options_in(temp.path()), &BTreeSet::new())
      .unwrap()
      .removed;
    removed.sort();

    assert_eq!(removed.len(), 2);
    assert!(!public.join("css/app.old.css").exists());
    assert!(!public.join("css/app.older.css").exists());
    assert!(public.join("css/app.css").exists());
    assert!(public.join("css/admin.old.css").exists());
    Ok(())
  }

  #[test]
  fn leaves_protected_matches_alone() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    fs::create_dir_all(&public)?;
    fs::write(public.join("app.min.css"), "live source")?;
    fs::write(public.join("app.old.css"), "stale")?;

    let protected = BTreeSet::from([public.join("app.min.css")]);
    let pattern = format!("{}/app.*.css", public.display());
    let removed = delete_glob(&pattern, &public, &options_in(temp.path()), &protected)
      .unwrap()
      .removed;

    assert_eq!(removed, vec![public.join("app.old.css")]);
    assert!(public.join("app.min.css").exists());
    Ok(())
  }

  #[test]
  fn skips_directories_by_default() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    fs::create_dir_all(public.join("app.v1.d"))?;

    let pattern = format!("{}/app.*.d", public.display());
    let outcome =
      delete_glob(&pattern, &public, &options_in(temp.path()), &BTreeSet::new()).unwrap();

    assert!(outcome.removed.is_empty());
    assert!(outcome.failures.is_empty());
    assert!(public.join("app.v1.d").is_dir());
    Ok(())
  }

  #[test]
  fn dry_run_reports_without_deleting() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    fs::create_dir_all(&public)?;
    fs::write(public.join("app.old.js"), "old")?;

    let options = DeleteOptions {
      dry_run: true,
      ..options_in(temp.path())
    };
    let removed = delete_glob(
      &format!("{}/app.*.js", public.display()),
      &public,
      &options,
      &BTreeSet::new(),
    )
    .unwrap()
    .removed;

    assert_eq!(removed, vec![public.join("app.old.js")]);
    assert!(public.join("app.old.js").exists());
    Ok(())
  }

  #[test]
  fn refuses_paths_outside_working_directory_unless_forced() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    let cwd = temp.path().join("project");
    fs::create_dir_all(&public)?;
    fs::create_dir_all(&cwd)?;
    let target = public.join("app.css");
    fs::write(&target, "body {}")?;

    let err = delete_path(&target, &public, &options_in(&cwd)).unwrap_err();
    assert!(err.to_string().contains("working directory"));
    assert!(target.exists());

    let forced = DeleteOptions {
      force: true,
      ..options_in(&cwd)
    };
    assert_eq!(delete_path(&target, &public, &forced).unwrap(), Some(target.clone()));
    assert!(!target.exists());
    Ok(())
  }

  #[test]
  fn never_deletes_outside_public_directory() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    fs::create_dir_all(&public)?;
    let outside = temp.path().join("app.old.css");
    fs::write(&outside, "keep")?;

    let forced = DeleteOptions {
      force: true,
      ..options_in(temp.path())
    };
    let pattern = format!("{}/app.*.css", temp.path().display());
    let outcome = delete_glob(&pattern, &public, &forced, &BTreeSet::new()).unwrap();

    assert!(outcome.removed.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].to_string().contains("public directory"));
    assert!(outside.exists());
    Ok(())
  }

  #[test]
  fn keeps_deleting_after_a_refused_match() -> std::io::Result<()> {
    let temp = tempdir()?;
    let public = temp.path().join("public");
    let sibling = temp.path().join("other");
    fs::create_dir_all(&public)?;
    fs::create_dir_all(&sibling)?;
    fs::write(sibling.join("app.a.css"), "not ours")?;
    fs::write(public.join("app.b.css"), "stale")?;
    fs::write(public.join("app.c.css"), "stale")?;

    // `other/` sorts before `public/`, so the refused match comes first.
    let pattern = format!("{}/*/app.*.css", temp.path().display());
    let mut outcome =
      delete_glob(&pattern, &public, &options_in(temp.path()), &BTreeSet::new()).unwrap();
    outcome.removed.sort();

    assert_eq!(outcome.removed, vec![public.join("app.b.css"), public.join("app.c.css")]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
      &outcome.failures[0],
      RehashError::Delete { path, .. } if path == &sibling.join("app.a.css")
    ));
    assert!(sibling.join("app.a.css").exists());
    assert!(!public.join("app.b.css").exists());
    Ok(())
  }

  #[test]
  fn missing_paths_are_a_no_op() -> std::io::Result<()> {
    let temp = tempdir()?;
    let removed = delete_path(&temp.path().join("gone.css"), temp.path(), &options_in(temp.path()));
    assert!(matches!(removed, Ok(None)));
    Ok(())
  }
}
