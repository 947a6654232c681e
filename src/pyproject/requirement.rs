//! PEP 508 dependency strings
//!
//! Only the pieces needed for workspace bookkeeping are parsed: the distribution name,
//! the extras, and the environment marker. Everything between the extras and the
//! marker (version specifiers or a URL) is kept verbatim but never interpreted.

use crate::core::error::{RailError, RailResult};
use regex::Regex;
use std::sync::LazyLock;

static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[([^\]]*)\])?\s*([^;]*?)\s*(?:;\s*(.*?))?\s*$")
    .expect("requirement regex is valid")
});

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator regex is valid"));

/// Normalize a distribution name (PEP 503): lowercase, `-_.` runs become one `-`
pub fn canonical_package_name(name: &str) -> String {
  SEPARATORS.replace_all(name.trim(), "-").to_lowercase()
}

/// A parsed dependency string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
  /// Name as written
  pub name: String,
  /// Extras, sorted
  pub extras: Vec<String>,
  /// Version specifier or URL part, verbatim (may be empty)
  pub specifier: String,
  /// Environment marker without the leading `;`
  pub marker: Option<String>,
}

impl Requirement {
  /// Parse a PEP 508 dependency string
  pub fn parse(dep: &str) -> RailResult<Self> {
    let caps = REQUIREMENT
      .captures(dep)
      .ok_or_else(|| RailError::message(format!("Invalid dependency string: '{}'", dep)))?;

    let name = caps[1].to_string();
    let mut extras: Vec<String> = caps
      .get(2)
      .map(|m| {
        m.as_str()
          .split(',')
          .map(str::trim)
          .filter(|e| !e.is_empty())
          .map(str::to_string)
          .collect()
      })
      .unwrap_or_default();
    extras.sort();
    extras.dedup();

    let specifier = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();
    let marker = caps
      .get(4)
      .map(|m| m.as_str().to_string())
      .filter(|m| !m.is_empty());

    Ok(Self {
      name,
      extras,
      specifier,
      marker,
    })
  }

  /// Canonical (normalized) name
  pub fn canonical_name(&self) -> String {
    canonical_package_name(&self.name)
  }

  /// Same requirement pinned to an exact version, extras sorted, marker kept
  pub fn pin(&self, version: &str) -> String {
    let mut out = self.name.clone();
    if !self.extras.is_empty() {
      out.push('[');
      out.push_str(&self.extras.join(","));
      out.push(']');
    }
    out.push_str("==");
    out.push_str(version);
    if let Some(marker) = &self.marker {
      out.push_str("; ");
      out.push_str(marker);
    }
    out
  }
}
