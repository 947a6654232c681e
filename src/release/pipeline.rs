//! The release pipeline
//!
//! ```text
//! Discover → FindMarkers → DetectChanges → CheckDuplicates → FetchReusable
//!   → Build → Tag → BumpVersions → Commit → Publish → Push → Done
//! ```
//!
//! Phases run strictly in sequence, packages in build order. Any failure stops
//! the run. A failure at CheckDuplicates or Build happens before anything is
//! tagged or published. Nothing is rolled back after that point.

use super::markers::{next_release_tag, package_tag};
use super::plan::ReleasePlan;
use super::reconcile::{ArtifactIndex, ReuseReport, check_duplicates, resolve_reusable};
use super::version::VersionBump;
use crate::core::builder::Builder;
use crate::core::context::WorkspaceContext;
use crate::core::error::{RailError, RailResult, ReleaseError, ResultExt};
use crate::core::host::ReleaseHost;
use crate::core::vcs::Vcs;
use crate::pyproject::rewrite_manifest;
use crate::ui::{progress::BuildProgress, step};
use crate::workspace::Package;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const COMMIT_SUBJECT: &str = "chore: prepare next release";

/// Pipeline phases in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Discover,
  FindMarkers,
  DetectChanges,
  CheckDuplicates,
  FetchReusable,
  Build,
  Tag,
  BumpVersions,
  Commit,
  Publish,
  Push,
  Done,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let title = match self {
      Phase::Discover => "Discovering workspace packages",
      Phase::FindMarkers => "Finding last release tags",
      Phase::DetectChanges => "Detecting changes",
      Phase::CheckDuplicates => "Checking for duplicate versions",
      Phase::FetchReusable => "Fetching unchanged wheels from releases",
      Phase::Build => "Building packages",
      Phase::Tag => "Creating package tags",
      Phase::BumpVersions => "Bumping versions for next release",
      Phase::Commit => "Committing version bumps",
      Phase::Publish => "Creating release",
      Phase::Push => "Pushing commits and tags",
      Phase::Done => "Done",
    };
    write!(f, "{}", title)
  }
}

/// Inputs of one release run
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
  pub force_all: bool,
  /// Explicit release tag; next `r{N}` when absent
  pub release_tag: Option<String>,
}

/// What a completed release did
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
  pub release_tag: String,
  pub plan: ReleasePlan,
  pub reuse: ReuseReport,
  pub bumps: Vec<(String, VersionBump)>,
  pub artifacts: Vec<PathBuf>,
}

/// Release pipeline over a discovered workspace and its collaborators
pub struct Pipeline<'a> {
  ctx: &'a WorkspaceContext,
  vcs: &'a dyn Vcs,
  host: &'a dyn ReleaseHost,
  builder: &'a dyn Builder,
}

impl<'a> Pipeline<'a> {
  pub fn new(ctx: &'a WorkspaceContext, vcs: &'a dyn Vcs, host: &'a dyn ReleaseHost, builder: &'a dyn Builder) -> Self {
    Self {
      ctx,
      vcs,
      host,
      builder,
    }
  }

  /// Run every phase.
  ///
  /// An empty dirty set without `force_all` ends with `NothingChanged` before the
  /// host or the builder is touched.
  pub fn run(&self, options: &ReleaseOptions) -> RailResult<ReleaseOutcome> {
    step(&Phase::Discover.to_string());
    print_packages(self.ctx);

    let release_tag = match &options.release_tag {
      Some(tag) => tag.clone(),
      None => {
        let tag = next_release_tag(self.vcs)?;
        println!("  Release tag: {}", tag);
        tag
      }
    };

    step(&format!("{} / {}", Phase::FindMarkers, Phase::DetectChanges));
    let plan = ReleasePlan::analyze(self.ctx, self.vcs, options.force_all)?;
    print_changes(&plan);
    if plan.is_empty() {
      return Err(ReleaseError::NothingChanged.into());
    }

    step(&Phase::CheckDuplicates.to_string());
    let index = ArtifactIndex::fetch(self.host, self.ctx.config.release_limit)?;
    self.check_duplicates(&plan.changed, &index)?;

    let reuse = self.fetch_reusable(&plan.unchanged, &index)?;

    self.build_all(&plan.changed)?;
    self.tag(&plan.changed)?;
    let bumps = self.bump_versions(&plan.changed, &plan.unchanged)?;
    self.commit(&bumps)?;
    let artifacts = self.publish(&release_tag, &plan.changed, &plan.unchanged)?;
    self.push()?;

    step(&Phase::Done.to_string());
    println!(
      "✅ Released {} ({} built, {} reused)",
      release_tag,
      plan.changed.len(),
      reuse.reused.len()
    );

    Ok(ReleaseOutcome {
      release_tag,
      plan,
      reuse,
      bumps,
      artifacts,
    })
  }

  /// CheckDuplicates: refuse versions that are already published
  pub fn check_duplicates(&self, changed: &[Package], index: &ArtifactIndex) -> RailResult<()> {
    if index.is_empty() {
      println!("  No existing releases found");
      return Ok(());
    }
    check_duplicates(changed, index)?;
    println!("  No duplicates found ({} published wheels checked)", index.wheel_count());
    Ok(())
  }

  /// FetchReusable: copy published wheels of unchanged packages into dist.
  ///
  /// Missing wheels are warnings unless `strict_reuse` is set.
  pub fn fetch_reusable(&self, unchanged: &[Package], index: &ArtifactIndex) -> RailResult<ReuseReport> {
    if unchanged.is_empty() {
      return Ok(ReuseReport::default());
    }

    step(&Phase::FetchReusable.to_string());
    let report = resolve_reusable(
      unchanged,
      index,
      self.host,
      &self.ctx.staging_dir(),
      &self.ctx.dist_dir(),
    )?;

    for (name, wheels) in &report.reused {
      for wheel in wheels {
        let file = wheel.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
        println!("  Reusing {}: {}", name, file);
      }
    }
    for name in &report.missing {
      tracing::warn!("no published wheel found for unchanged package {}", name);
    }

    if self.ctx.config.strict_reuse && !report.missing.is_empty() {
      return Err(
        ReleaseError::MissingReusableArtifact {
          packages: report.missing.clone(),
        }
        .into(),
      );
    }

    Ok(report)
  }

  /// Build: every changed package, in order; the first failure stops the run
  pub fn build_all(&self, changed: &[Package]) -> RailResult<()> {
    step(&format!("{} ({})", Phase::Build, changed.len()));
    let dist_dir = self.ctx.dist_dir();
    fs::create_dir_all(&dist_dir).with_context(|| format!("Failed to create {}", dist_dir.display()))?;

    let mut progress = BuildProgress::new(changed.len(), "Building wheels");
    for package in changed {
      self.build_one(package, &dist_dir)?;
      progress.inc();
    }
    Ok(())
  }

  /// Build a single package into `dist_dir`
  pub fn build_one(&self, package: &Package, dist_dir: &Path) -> RailResult<()> {
    println!("\n  {} ({})", package.name, package.path.display());
    if !self.builder.build(package, dist_dir)? {
      return Err(
        ReleaseError::BuildFailed {
          package: package.name.clone(),
        }
        .into(),
      );
    }
    Ok(())
  }

  /// Tag: `{name}/v{version}` for every changed package
  pub fn tag(&self, changed: &[Package]) -> RailResult<Vec<String>> {
    step(&Phase::Tag.to_string());
    let mut tags = Vec::with_capacity(changed.len());
    for package in changed {
      let tag = package_tag(&package.name, &package.version);
      self.vcs.create_tag(&tag)?;
      println!("  {}", tag);
      tags.push(tag);
    }
    Ok(tags)
  }

  /// BumpVersions: patch-bump changed packages and pin their internal deps.
  ///
  /// Deps that were rebuilt are pinned to their new version, the others to their
  /// current one.
  pub fn bump_versions(&self, changed: &[Package], unchanged: &[Package]) -> RailResult<Vec<(String, VersionBump)>> {
    step(&Phase::BumpVersions.to_string());

    let mut bumps = Vec::with_capacity(changed.len());
    for package in changed {
      bumps.push((package.name.clone(), VersionBump::patch(&package.version)?));
    }

    let mut versions: BTreeMap<&str, &str> = unchanged.iter().map(|p| (p.name.as_str(), p.version.as_str())).collect();
    for (name, bump) in &bumps {
      versions.insert(name.as_str(), bump.new.as_str());
    }

    for (package, (_, bump)) in changed.iter().zip(&bumps) {
      let pins: BTreeMap<String, String> = package
        .deps
        .iter()
        .filter_map(|dep| versions.get(dep.as_str()).map(|v| (dep.clone(), v.to_string())))
        .collect();
      rewrite_manifest(&self.ctx.manifest_path(package), &bump.new, &pins)?;
      println!("  {}: {} → {}", package.name, bump.old, bump.new);
    }

    Ok(bumps)
  }

  /// Commit: stage rewritten manifests and commit them
  pub fn commit(&self, bumps: &[(String, VersionBump)]) -> RailResult<()> {
    step(&Phase::Commit.to_string());

    let paths: Vec<PathBuf> = bumps
      .iter()
      .filter_map(|(name, _)| self.ctx.registry.get(name))
      .map(|p| p.path.join("pyproject.toml"))
      .collect();
    self.vcs.stage(&paths)?;

    if self.vcs.staged_paths()?.is_empty() {
      return Err(RailError::message("No changes to commit"));
    }

    self.vcs.commit(COMMIT_SUBJECT, &commit_body(bumps))?;
    println!("  Committed");
    Ok(())
  }

  /// Publish: attach every wheel in dist to a new release
  pub fn publish(&self, release_tag: &str, changed: &[Package], unchanged: &[Package]) -> RailResult<Vec<PathBuf>> {
    step(&Phase::Publish.to_string());

    let dist_dir = self.ctx.dist_dir();
    let wheels = collect_wheels(&dist_dir)?;
    if wheels.is_empty() {
      return Err(ReleaseError::NoArtifactsProduced { dist_dir }.into());
    }

    println!("  {} with {} wheels", release_tag, wheels.len());
    self.host.create_release(
      release_tag,
      &wheels,
      &format!("Release {}", release_tag),
      &release_notes(changed, unchanged),
    )?;
    Ok(wheels)
  }

  /// Push: commits and tags
  pub fn push(&self) -> RailResult<()> {
    step(&Phase::Push.to_string());
    self.vcs.push()
  }
}

/// Print every discovered package in build order
pub fn print_packages(ctx: &WorkspaceContext) {
  for package in ctx.packages_in_order() {
    let deps = if package.deps.is_empty() {
      String::new()
    } else {
      format!(" → [{}]", package.deps.join(", "))
    };
    println!("  {} {} ({}){}", package.name, package.version, package.path.display(), deps);
  }
}

/// Print why each package is dirty
pub fn print_changes(plan: &ReleasePlan) {
  if plan.force_all {
    println!("  Force rebuild: all packages marked dirty");
    return;
  }
  for (name, reason) in &plan.reasons {
    println!("  {}: {}", name, reason);
  }
  if plan.is_empty() {
    println!("  No changes");
  }
}

/// `  name: old → new` per bump
pub fn commit_body(bumps: &[(String, VersionBump)]) -> String {
  bumps
    .iter()
    .map(|(name, bump)| format!("  {}: {} → {}", name, bump.old, bump.new))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Release notes listing released and unchanged packages
pub fn release_notes(changed: &[Package], unchanged: &[Package]) -> String {
  let mut lines = Vec::new();
  if !changed.is_empty() {
    lines.push("**Released:**".to_string());
    for package in changed {
      lines.push(format!("- {} {}", package.name, package.version));
    }
  }
  if !unchanged.is_empty() {
    lines.push(String::new());
    let names: Vec<&str> = unchanged.iter().map(|p| p.name.as_str()).collect();
    lines.push(format!("**Unchanged:** {}", names.join(", ")));
  }
  lines.join("\n")
}

/// `*.whl` files directly in `dir`, sorted
pub fn collect_wheels(dir: &Path) -> RailResult<Vec<PathBuf>> {
  if !dir.is_dir() {
    return Ok(Vec::new());
  }
  let mut wheels = Vec::new();
  for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
    let path = entry?.path();
    if path.is_file() && path.extension().is_some_and(|e| e == "whl") {
      wheels.push(path);
    }
  }
  wheels.sort();
  Ok(wheels)
}
