use std::fs;
use std::path::Path;

use same_file::is_same_file;

use crate::error::{RehashError, Result};

/// Copy an asset to its hashed name, creating parent directories as needed.
///
/// Refuses to copy a file onto itself, so callers never delete a source that is also
/// the destination.
pub fn copy_asset(source: &Path, destination: &Path) -> Result<u64> {
  let copy_error = |source_err: std::io::Error| RehashError::Copy {
    from: source.to_path_buf(),
    to: destination.to_path_buf(),
    source: source_err,
  };

  if destination.exists() && is_same_file(source, destination).map_err(copy_error)? {
    return Err(RehashError::SameFile {
      from: source.to_path_buf(),
      to: destination.to_path_buf(),
    });
  }

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).map_err(copy_error)?;
  }
  fs::copy(source, destination).map_err(copy_error)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn copies_into_new_directories() -> std::io::Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("app.css");
    fs::write(&source, "body {}")?;
    let destination = temp.path().join("css/app.abc.css");

    copy_asset(&source, &destination).unwrap();

    assert_eq!(fs::read_to_string(&destination)?, "body {}");
    assert!(source.exists());
    Ok(())
  }

  #[test]
  fn overwrites_previous_copy() -> std::io::Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("app.js");
    let destination = temp.path().join("app.abc.js");
    fs::write(&source, "new")?;
    fs::write(&destination, "old")?;

    copy_asset(&source, &destination).unwrap();

    assert_eq!(fs::read_to_string(&destination)?, "new");
    Ok(())
  }

  #[test]
  fn rejects_copying_a_file_onto_itself() -> std::io::Result<()> {
    let temp = tempdir()?;
    let source = temp.path().join("app.js");
    fs::write(&source, "content")?;

    let err = copy_asset(&source, &temp.path().join("./app.js")).unwrap_err();
    assert!(matches!(err, RehashError::SameFile { .. }));
    assert!(source.exists());
    Ok(())
  }

  #[test]
  fn reports_missing_sources() -> std::io::Result<()> {
    let temp = tempdir()?;
    let err = copy_asset(&temp.path().join("missing.css"), &temp.path().join("missing.1.css"))
      .unwrap_err();
    assert!(matches!(err, RehashError::Copy { .. }));
    Ok(())
  }
}
