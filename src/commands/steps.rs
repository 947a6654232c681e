//! `wheel-rail steps`: the release pipeline split into CI jobs
//!
//! ```text
//! discover (1 job)  → changed / unchanged / last_tags / release outputs
//! build    (matrix) → one job per (package, runner), skips unchanged packages
//! release  (1 job)  → FetchReusable, Tag, BumpVersions, Commit, Publish, Push
//! ```
//!
//! Jobs share nothing but the step outputs and the wheels uploaded by the build
//! jobs, so every step rediscovers the workspace from the checkout.

use crate::core::builder::CommandBuilder;
use crate::core::context::WorkspaceContext;
use crate::core::error::{RailError, RailResult, ResultExt};
use crate::core::host::github::GhCli;
use crate::core::vcs::SystemGit;
use crate::release::markers::next_release_tag;
use crate::release::pipeline::{Phase, print_changes};
use crate::release::reconcile::ArtifactIndex;
use crate::release::{Pipeline, ReleasePlan};
use crate::ui::step;
use crate::workspace::Package;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Plan the release and append it to the GitHub step output file.
///
/// Duplicate versions are rejected here so no build job starts for them. An
/// empty plan still writes its outputs (`changed=[]`) and succeeds; the
/// workflow skips the build and release jobs on it.
pub fn run_step_discover(
  ctx: &WorkspaceContext,
  github_output: &Path,
  release_tag: Option<String>,
  force_all: bool,
) -> RailResult<()> {
  let vcs = SystemGit::open(&ctx.root)?;
  let release_tag = match release_tag {
    Some(tag) => tag,
    None => next_release_tag(&vcs)?,
  };

  step(&format!("{} / {}", Phase::FindMarkers, Phase::DetectChanges));
  let plan = ReleasePlan::analyze(ctx, &vcs, force_all)?;
  print_changes(&plan);

  if !plan.is_empty() {
    step(&Phase::CheckDuplicates.to_string());
    let host = GhCli::new(&ctx.root);
    let builder = CommandBuilder::new(&ctx.config.build_command, &ctx.root);
    let index = ArtifactIndex::fetch(&host, ctx.config.release_limit)?;
    Pipeline::new(ctx, &vcs, &host, &builder).check_duplicates(&plan.changed, &index)?;
  }

  let outputs = [
    ("changed", serde_json::to_string(&plan.changed_names())?),
    ("unchanged", serde_json::to_string(&plan.unchanged_names())?),
    ("last_tags", serde_json::to_string(&plan.last_tags)?),
    ("release", release_tag.clone()),
  ];
  write_outputs(github_output, &outputs)?;

  if plan.is_empty() {
    println!("\nNothing changed since last release.");
  } else {
    println!("\n{}: {} to build", release_tag, plan.changed.len());
  }
  Ok(())
}

/// Build one package into the dist directory if it is in `changed_json`
pub fn run_step_build(ctx: &WorkspaceContext, package: &str, changed_json: &str) -> RailResult<()> {
  let changed = parse_names(changed_json, "--changed")?;
  let package = select(ctx, &[package.to_string()])?.remove(0);
  if !changed.contains(&package.name) {
    println!("{} unchanged, nothing to build", package.name);
    return Ok(());
  }

  let vcs = SystemGit::open(&ctx.root)?;
  let host = GhCli::new(&ctx.root);
  let builder = CommandBuilder::new(&ctx.config.build_command, &ctx.root);
  Pipeline::new(ctx, &vcs, &host, &builder).build_all(&[package])
}

/// Reuse unchanged wheels, then tag, bump, commit, publish and push
pub fn run_step_release(
  ctx: &WorkspaceContext,
  changed_json: &str,
  unchanged_json: &str,
  release_tag: &str,
) -> RailResult<()> {
  let changed = select(ctx, &parse_names(changed_json, "--changed")?)?;
  let unchanged = select(ctx, &parse_names(unchanged_json, "--unchanged")?)?;

  let vcs = SystemGit::open(&ctx.root)?;
  let host = GhCli::new(&ctx.root);
  let builder = CommandBuilder::new(&ctx.config.build_command, &ctx.root);
  let pipeline = Pipeline::new(ctx, &vcs, &host, &builder);

  let index = ArtifactIndex::fetch(&host, ctx.config.release_limit)?;
  pipeline.fetch_reusable(&unchanged, &index)?;
  pipeline.tag(&changed)?;
  let bumps = pipeline.bump_versions(&changed, &unchanged)?;
  pipeline.commit(&bumps)?;
  pipeline.publish(release_tag, &changed, &unchanged)?;
  pipeline.push()?;

  step(&Phase::Done.to_string());
  println!("✅ Released {}", release_tag);
  Ok(())
}

/// Parse a JSON array of package names passed by the workflow
fn parse_names(json: &str, arg: &str) -> RailResult<Vec<String>> {
  serde_json::from_str(json).with_context(|| format!("Invalid JSON for {}", arg))
}

/// Look packages up by name, returned in build order
fn select(ctx: &WorkspaceContext, names: &[String]) -> RailResult<Vec<Package>> {
  let unknown: Vec<&str> = names
    .iter()
    .filter(|name| !ctx.registry.contains(name))
    .map(String::as_str)
    .collect();
  if !unknown.is_empty() {
    return Err(RailError::with_help(
      format!("Unknown package(s): {}", unknown.join(", ")),
      "Package names must match the ones written by `wheel-rail steps discover`.",
    ));
  }

  Ok(
    ctx
      .order
      .iter()
      .filter(|name| names.contains(name))
      .filter_map(|name| ctx.registry.get(name).cloned())
      .collect(),
  )
}

/// Append `name=value` lines; the file is created if missing
fn write_outputs(path: &Path, outputs: &[(&str, String)]) -> RailResult<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)?;
  }
  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("Failed to open {}", path.display()))?;
  for (name, value) in outputs {
    writeln!(file, "{}={}", name, value)?;
  }
  Ok(())
}
