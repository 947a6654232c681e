//! Version parsing and patch bumps

use crate::core::error::{RailError, RailResult};
use serde::Serialize;

/// Parse a 1-3 component numeric version, padding missing components with zero.
///
/// Components past the third are ignored. Pre-release or local suffixes are not
/// supported.
pub fn parse_version(version: &str) -> RailResult<semver::Version> {
  let mut parts = [0u64; 3];
  let components: Vec<&str> = version.trim().split('.').collect();

  for (slot, component) in parts.iter_mut().zip(&components) {
    *slot = component
      .parse()
      .map_err(|_| RailError::message(format!("Invalid version '{}': '{}' is not a number", version, component)))?;
  }

  Ok(semver::Version::new(parts[0], parts[1], parts[2]))
}

/// Next patch version as a string: "1.2.3" → "1.2.4", "1" → "1.0.1"
pub fn bump_patch(version: &str) -> RailResult<String> {
  let v = parse_version(version)?;
  Ok(semver::Version::new(v.major, v.minor, v.patch + 1).to_string())
}

/// Old and new version of a rebuilt package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionBump {
  pub old: String,
  pub new: String,
}

impl VersionBump {
  /// Patch bump of `old`
  pub fn patch(old: &str) -> RailResult<Self> {
    Ok(Self {
      old: old.to_string(),
      new: bump_patch(old)?,
    })
  }
}
