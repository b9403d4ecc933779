use serde::Serialize;
use serde_json::Map;

/// Ordered mapping from logical asset paths to their versioned filenames.
///
/// Insertion order is preserved so the rewritten file diffs cleanly against the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
  entries: Map<String, serde_json::Value>,
}

impl Manifest {
  /// Create an empty manifest.
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace an entry, keeping the position of an existing key.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self
      .entries
      .insert(key.into(), serde_json::Value::String(value.into()));
  }

  /// Value stored for `key`.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).and_then(|value| value.as_str())
  }

  /// Returns true when `key` is present.
  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns true when the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate over `(key, value)` pairs in manifest order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .filter_map(|(key, value)| value.as_str().map(|value| (key.as_str(), value)))
  }

  /// Keys in manifest order.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  pub(crate) fn from_map(entries: Map<String, serde_json::Value>) -> Self {
    Self { entries }
  }
}

impl<K, V> FromIterator<(K, V)> for Manifest
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut manifest = Self::new();
    for (key, value) in iter {
      manifest.insert(key, value);
    }
    manifest
  }
}
