//! Release markers (git tags)
//!
//! - package markers: `{name}/v{version}`, one per released package version
//! - workspace release tags: `r1`, `r2`, ...

use crate::core::error::RailResult;
use crate::core::vcs::Vcs;
use crate::workspace::PackageRegistry;
use std::collections::BTreeMap;

/// Last marker per package; `None` means never released
pub type LastTags = BTreeMap<String, Option<String>>;

/// Marker tag for a package version
pub fn package_tag(name: &str, version: &str) -> String {
  format!("{}/v{}", name, version)
}

/// Most recent marker of every package
pub fn find_last_tags(registry: &PackageRegistry, vcs: &dyn Vcs) -> RailResult<LastTags> {
  let mut last_tags = LastTags::new();
  for package in registry.iter() {
    let tags = vcs.list_tags(&format!("{}/v*", package.name))?;
    last_tags.insert(package.name.clone(), tags.into_iter().next());
  }
  Ok(last_tags)
}

/// `r{N+1}` for the highest existing `r{N}`, or `r1`
pub fn next_release_tag(vcs: &dyn Vcs) -> RailResult<String> {
  let highest = vcs
    .list_tags("r*")?
    .iter()
    .filter_map(|t| t.strip_prefix('r'))
    .filter_map(|n| n.parse::<u64>().ok())
    .max();

  Ok(format!("r{}", highest.map_or(1, |n| n + 1)))
}
