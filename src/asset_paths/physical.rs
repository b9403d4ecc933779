use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::{RehashError, Result};

/// Resolve a logical manifest path onto the directory the assets live in.
///
/// Manifest paths are rooted (`/css/app.css`) and always use forward slashes, so the
/// leading separator is dropped and any backslashes are normalised before joining.
/// Paths with `..` segments are rejected.
pub fn physical_path(public_path: &Path, logical: &str) -> Result<PathBuf> {
  Ok(
    relative_segments(logical)?
      .into_iter()
      .fold(public_path.to_path_buf(), |path, segment| path.join(segment)),
  )
}

/// Build a filesystem glob rooted at the public directory.
///
/// The public directory itself is escaped, so only wildcards from `logical_glob` are live.
pub fn physical_glob(public_path: &Path, logical_glob: &str) -> Result<String> {
  let root = Pattern::escape(&public_path.to_string_lossy());
  let relative = relative_segments(logical_glob)?.join("/");
  if relative.is_empty() {
    return Ok(root);
  }
  Ok(format!("{}/{}", root.trim_end_matches(['/', '\\']), relative))
}

fn relative_segments(logical: &str) -> Result<Vec<String>> {
  let normalised = logical.replace('\\', "/");
  let mut segments = Vec::new();
  for segment in normalised.split('/') {
    match segment {
      "" | "." => {}
      ".." => return Err(RehashError::UnsafePath(logical.to_string())),
      _ => segments.push(segment.to_string()),
    }
  }
  Ok(segments)
}
