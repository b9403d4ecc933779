//! Blacklist filtering deciding which manifest entries are rehashed.

use glob::Pattern;

use crate::error::{RehashError, Result};

/// Trait describing which manifest keys are left out of rehashing.
pub trait EntryExclusion {
  /// Returns `true` when the entry for `key` must not be rehashed.
  fn is_excluded(&self, key: &str) -> bool;
}

/// Compiled set of blacklist globs tested against manifest keys.
///
/// Matching is containment based: a rule excludes a key when it matches any part of it,
/// so `*.map` excludes `/js/app.js.map` and `vendor` excludes `/js/vendor/lib.js`.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
  rules: Vec<(String, Pattern)>,
}

impl Blacklist {
  /// Compile the raw patterns, ignoring blank entries.
  pub fn new<I, S>(patterns: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut rules = Vec::new();
    for raw in patterns {
      let raw = raw.as_ref().trim();
      if raw.is_empty() {
        continue;
      }
      let compiled =
        Pattern::new(&containment_pattern(raw)).map_err(|source| RehashError::InvalidPattern {
          pattern: raw.to_string(),
          source,
        })?;
      rules.push((raw.to_string(), compiled));
    }
    Ok(Self { rules })
  }

  /// Returns true when no rules are configured.
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// First rule excluding `key`, if any.
  pub fn matching_rule(&self, key: &str) -> Option<&str> {
    self
      .rules
      .iter()
      .find(|(_, pattern)| pattern.matches(key))
      .map(|(raw, _)| raw.as_str())
  }
}

impl EntryExclusion for Blacklist {
  fn is_excluded(&self, key: &str) -> bool {
    self.matching_rule(key).is_some()
  }
}

/// Widen a rule so it matches anywhere inside a key.
///
/// Wildcards are only added where the rule does not already start or end with one,
/// since the glob syntax rejects `**` glued to other characters.
fn containment_pattern(rule: &str) -> String {
  let prefix = if rule.starts_with('*') { "" } else { "*" };
  let suffix = if rule.ends_with('*') { "" } else { "*" };
  format!("{prefix}{rule}{suffix}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_blacklist_excludes_nothing() {
    let blacklist = Blacklist::default();
    assert!(blacklist.is_empty());
    assert!(!blacklist.is_excluded("/app.js"));
  }

  #[test]
  fn excludes_source_maps() {
    let blacklist = Blacklist::new(["*.map"]).unwrap();
    assert!(blacklist.is_excluded("/app.js.map"));
    assert!(blacklist.is_excluded("/css/app.css.map"));
    assert!(!blacklist.is_excluded("/app.js"));
  }

  #[test]
  fn matches_fragments_anywhere_in_the_key() {
    let blacklist = Blacklist::new(["vendor", "/img/*"]).unwrap();
    assert!(blacklist.is_excluded("/js/vendor/lib.js"));
    assert!(blacklist.is_excluded("/img/logo.png"));
    assert!(!blacklist.is_excluded("/js/app.js"));
  }

  #[test]
  fn reports_the_matching_rule() {
    let blacklist = Blacklist::new(["*.map", "*.svg"]).unwrap();
    assert_eq!(blacklist.matching_rule("/icons/a.svg"), Some("*.svg"));
    assert_eq!(blacklist.matching_rule("/app.css"), None);
  }

  #[test]
  fn ignores_blank_rules() {
    let blacklist = Blacklist::new(["", "   "]).unwrap();
    assert!(blacklist.is_empty());
  }

  #[test]
  fn rejects_invalid_patterns() {
    let err = Blacklist::new(["[abc"]).unwrap_err();
    assert!(matches!(err, RehashError::InvalidPattern { ref pattern, .. } if pattern == "[abc"));
  }

  #[test]
  fn containment_does_not_double_wildcards() {
    assert_eq!(containment_pattern("*.map"), "*.map*");
    assert_eq!(containment_pattern("/img/*"), "*/img/*");
    assert_eq!(containment_pattern("vendor"), "*vendor*");
  }
}
