use glob::Pattern;

/// Query-string marker carrying the cache-busting token.
pub const VERSION_MARKER: &str = "?id=";

/// A manifest value split into `<name>.<ext>?id=<token>`.
///
/// The name keeps any leading directories and may itself contain dots; the
/// extension is whatever follows the last dot of the final path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedName<'a> {
  /// Everything before the extension dot, e.g. `/css/app.min`.
  pub name: &'a str,
  /// Extension without the leading dot, e.g. `css`.
  pub extension: &'a str,
  /// Cache-busting token taken from the query string.
  pub token: &'a str,
}

impl<'a> VersionedName<'a> {
  /// Split a manifest value, returning `None` when it does not carry an `?id=` token.
  pub fn parse(value: &'a str) -> Option<Self> {
    let query_start = value.find('?')?;
    let (head, query) = value.split_at(query_start);
    let token = query.strip_prefix(VERSION_MARKER)?;
    if token.is_empty() || token.contains('/') {
      return None;
    }

    let (name, extension) = head.rsplit_once('.')?;
    if name.is_empty() || extension.is_empty() || extension.contains('/') {
      return None;
    }

    Some(Self {
      name,
      extension,
      token,
    })
  }

  /// Filename with the token moved in front of the extension.
  pub fn hashed(&self) -> String {
    format!("{}.{}.{}", self.name, self.token, self.extension)
  }

  /// Glob matching every hashed generation of this asset.
  pub fn stale_glob(&self) -> String {
    format!(
      "{}.*.{}",
      Pattern::escape(self.name),
      Pattern::escape(self.extension)
    )
  }
}

/// Move the `?id=` token of a manifest value into its filename.
///
/// Values without a token are returned unchanged.
pub fn rewrite_filename(value: &str) -> String {
  match VersionedName::parse(value) {
    Some(parsed) => parsed.hashed(),
    None => value.to_string(),
  }
}

/// Glob for previous hashed generations of a manifest value, if it is versioned.
pub fn stale_glob(value: &str) -> Option<String> {
  VersionedName::parse(value).map(|parsed| parsed.stale_glob())
}
