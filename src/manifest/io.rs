use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;

use crate::error::{RehashError, Result};
use crate::manifest::Manifest;

const BYTE_ORDER_MARK: char = '\u{feff}';
const INDENT: &[u8] = b"    ";

/// Load a manifest from disk.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
  let content = fs::read_to_string(path).map_err(|source| RehashError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_manifest(&content, path)
}

/// Parse manifest JSON, tolerating a leading byte-order mark.
///
/// The document must be a flat object whose values are all strings.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Manifest> {
  let parse_error = |message: String| RehashError::Parse {
    path: path.to_path_buf(),
    message,
  };

  let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
  let value: Value = serde_json::from_str(content).map_err(|err| parse_error(err.to_string()))?;
  let Value::Object(entries) = value else {
    return Err(parse_error("expected a JSON object at the top level".into()));
  };

  if let Some((key, _)) = entries.iter().find(|(_, value)| !value.is_string()) {
    return Err(parse_error(format!("value for `{key}` is not a string")));
  }

  Ok(Manifest::from_map(entries))
}

/// Serialise a manifest with four-space indentation and a trailing newline.
pub fn render_manifest(manifest: &Manifest) -> serde_json::Result<String> {
  let mut buffer = Vec::new();
  let mut serializer =
    serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
  manifest.serialize(&mut serializer)?;

  let mut text = String::from_utf8_lossy(&buffer).replace("\r\n", "\n");
  text.push('\n');
  Ok(text)
}

/// Write the manifest next to its final location, then rename it into place.
///
/// An existing manifest keeps its permissions.
pub fn save_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
  let write_error = |source: std::io::Error| RehashError::Write {
    path: path.to_path_buf(),
    source,
  };

  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let rendered = render_manifest(manifest).map_err(|err| write_error(err.into()))?;
  let mut staged = NamedTempFile::new_in(parent).map_err(write_error)?;
  staged
    .write_all(rendered.as_bytes())
    .map_err(write_error)?;
  staged.flush().map_err(write_error)?;
  match fs::metadata(path) {
    Ok(existing) => staged
      .as_file()
      .set_permissions(existing.permissions())
      .map_err(write_error)?,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
    Err(err) => return Err(write_error(err)),
  }
  staged.persist(path).map_err(|err| write_error(err.error))?;
  Ok(())
}
