//! Reconciling the dirty set against published wheels
//!
//! Two jobs share one artifact index:
//! - refuse to publish a changed package whose version already has a wheel
//! - find wheels of unchanged packages in past releases and copy them to dist

use crate::core::error::{DuplicateArtifact, RailResult, ReleaseError, ResultExt};
use crate::core::host::{PublishedRelease, ReleaseHost};
use crate::pyproject::canonical_package_name;
use crate::workspace::Package;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const WHEEL_PATTERN: &str = "*.whl";

/// Wheel filename prefix for a package version: `my_pkg-1.2.3-`
pub fn artifact_prefix(name: &str, version: &str) -> String {
  format!("{}-{}-", canonical_package_name(name).replace('-', "_"), version)
}

/// Wheels attached to past releases, most recent release first
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
  releases: Vec<PublishedRelease>,
}

impl ArtifactIndex {
  /// Enumerate up to `limit` releases from the host
  pub fn fetch(host: &dyn ReleaseHost, limit: usize) -> RailResult<Self> {
    Ok(Self::from_releases(host.list_releases(limit)?))
  }

  /// Keep `.whl` assets only; releases without wheels are dropped
  pub fn from_releases(releases: Vec<PublishedRelease>) -> Self {
    let releases = releases
      .into_iter()
      .map(|r| PublishedRelease {
        tag: r.tag,
        assets: r.assets.into_iter().filter(|a| a.ends_with(".whl")).collect(),
      })
      .filter(|r| !r.assets.is_empty())
      .collect();
    Self { releases }
  }

  pub fn is_empty(&self) -> bool {
    self.releases.is_empty()
  }

  pub fn releases(&self) -> &[PublishedRelease] {
    &self.releases
  }

  /// Number of distinct wheel names
  pub fn wheel_count(&self) -> usize {
    let mut names: Vec<&str> = self
      .releases
      .iter()
      .flat_map(|r| r.assets.iter().map(String::as_str))
      .collect();
    names.sort_unstable();
    names.dedup();
    names.len()
  }

  /// First wheel (most recent release first) starting with `prefix`
  pub fn find(&self, prefix: &str) -> Option<&str> {
    self
      .releases
      .iter()
      .flat_map(|r| r.assets.iter())
      .find(|a| a.starts_with(prefix))
      .map(String::as_str)
  }
}

/// Fail with `DuplicateVersion` listing every changed package already published
pub fn check_duplicates(changed: &[Package], index: &ArtifactIndex) -> RailResult<()> {
  let duplicates: Vec<DuplicateArtifact> = changed
    .iter()
    .filter_map(|pkg| {
      index
        .find(&artifact_prefix(&pkg.name, &pkg.version))
        .map(|artifact| DuplicateArtifact {
          package: pkg.name.clone(),
          version: pkg.version.clone(),
          artifact: artifact.to_string(),
        })
    })
    .collect();

  if duplicates.is_empty() {
    Ok(())
  } else {
    Err(ReleaseError::DuplicateVersion { duplicates }.into())
  }
}

/// Outcome of artifact reuse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReuseReport {
  /// Package → every wheel copied into the dist directory
  pub reused: BTreeMap<String, Vec<PathBuf>>,
  /// Packages with no wheel in the index, in input order
  pub missing: Vec<String>,
}

/// Copy published wheels of unchanged packages into `dist_dir`.
///
/// Releases are scanned newest first. A release is downloaded only when it holds
/// a wheel still being looked for, and scanning stops once every package is
/// found. All wheels of a package in that release are copied, one per platform. Download failures are logged and the package stays missing.
pub fn resolve_reusable(
  unchanged: &[Package],
  index: &ArtifactIndex,
  host: &dyn ReleaseHost,
  staging_dir: &Path,
  dist_dir: &Path,
) -> RailResult<ReuseReport> {
  let mut wanted: Vec<(String, &Package)> = unchanged
    .iter()
    .map(|pkg| (artifact_prefix(&pkg.name, &pkg.version), pkg))
    .collect();
  let mut report = ReuseReport::default();

  for release in index.releases() {
    if wanted.is_empty() {
      break;
    }

    // Every platform wheel of a package ships from the release it is first found in
    let matches: Vec<(String, Vec<&String>)> = wanted
      .iter()
      .map(|(prefix, pkg)| {
        let assets: Vec<&String> = release.assets.iter().filter(|a| a.starts_with(prefix.as_str())).collect();
        (pkg.name.clone(), assets)
      })
      .filter(|(_, assets)| !assets.is_empty())
      .collect();
    if matches.is_empty() {
      continue;
    }

    fs::create_dir_all(staging_dir)
      .with_context(|| format!("Failed to create staging directory {}", staging_dir.display()))?;
    if let Err(e) = host.download_artifacts(&release.tag, WHEEL_PATTERN, staging_dir) {
      tracing::warn!("Could not download wheels from {}: {}", release.tag, e);
      continue;
    }

    fs::create_dir_all(dist_dir).with_context(|| format!("Failed to create {}", dist_dir.display()))?;
    for (name, assets) in matches {
      let mut copied = Vec::with_capacity(assets.len());
      for asset in assets {
        let source = staging_dir.join(asset);
        if !source.is_file() {
          tracing::warn!("{} was not downloaded from {}", asset, release.tag);
          continue;
        }
        let target = dist_dir.join(asset);
        fs::copy(&source, &target).with_context(|| format!("Failed to copy {} to {}", asset, dist_dir.display()))?;
        tracing::debug!("reusing {} from {}", asset, release.tag);
        copied.push(target);
      }
      if !copied.is_empty() {
        wanted.retain(|(_, pkg)| pkg.name != name);
        report.reused.insert(name, copied);
      }
    }
  }

  report.missing = wanted.into_iter().map(|(_, pkg)| pkg.name.clone()).collect();
  Ok(report)
}
