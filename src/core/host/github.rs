//! GitHub Releases through the `gh` CLI

use super::{PublishedRelease, ReleaseHost};
use crate::core::error::{GitError, RailError, RailResult, ResultExt};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[derive(Debug, Deserialize)]
struct ReleaseEntry {
  #[serde(rename = "tagName", default)]
  tag_name: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseAssets {
  #[serde(default)]
  assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
  name: String,
}

/// `gh`-backed release host, run from the workspace root
pub struct GhCli {
  root: PathBuf,
}

impl GhCli {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }

  fn gh_cmd(&self) -> Command {
    let mut cmd = Command::new("gh");
    cmd.current_dir(&self.root);
    cmd
  }

  /// Run gh capturing output, failing on non-zero exit
  fn run(&self, args: &[String]) -> RailResult<Output> {
    let command = format!("gh {}", args.join(" "));
    let output = self
      .gh_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      return Err(RailError::Git(GitError::CommandFailed {
        command,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }
    Ok(output)
  }

  fn release_assets(&self, tag: &str) -> RailResult<Vec<String>> {
    let output = self.run(&args(&["release", "view", tag, "--json", "assets"]))?;
    parse_assets(&String::from_utf8_lossy(&output.stdout))
  }
}

impl ReleaseHost for GhCli {
  fn list_releases(&self, limit: usize) -> RailResult<Vec<PublishedRelease>> {
    let limit = limit.to_string();
    let tags = match self
      .run(&args(&["release", "list", "--json", "tagName", "--limit", &limit]))
      .and_then(|out| parse_release_list(&String::from_utf8_lossy(&out.stdout)))
    {
      Ok(tags) => tags,
      Err(e) => {
        tracing::warn!("Could not list releases, assuming none exist: {}", e);
        return Ok(Vec::new());
      }
    };

    let mut releases = Vec::with_capacity(tags.len());
    for tag in tags {
      match self.release_assets(&tag) {
        Ok(assets) => releases.push(PublishedRelease { tag, assets }),
        Err(e) => tracing::warn!("Skipping release {}: {}", tag, e),
      }
    }
    Ok(releases)
  }

  fn download_artifacts(&self, tag: &str, pattern: &str, dest: &Path) -> RailResult<()> {
    let dest = dest.to_string_lossy();
    self.run(&args(&[
      "release", "download", tag, "--dir", &dest, "--pattern", pattern, "--clobber",
    ]))?;
    Ok(())
  }

  fn create_release(&self, tag: &str, files: &[PathBuf], title: &str, notes: &str) -> RailResult<()> {
    let mut argv = args(&["release", "create", tag]);
    argv.extend(files.iter().map(|f| f.to_string_lossy().to_string()));
    argv.extend(args(&["--title", title, "--notes", notes]));

    // Stream gh output so upload progress is visible
    let status = self
      .gh_cmd()
      .args(&argv)
      .status()
      .context("Failed to execute gh release create")?;

    if !status.success() {
      return Err(RailError::Git(GitError::CommandFailed {
        command: format!("gh release create {}", tag),
        stderr: format!("exited with {}", status),
      }));
    }
    Ok(())
  }
}

fn args(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Tags from `gh release list --json tagName`, entries without a tag dropped
fn parse_release_list(json: &str) -> RailResult<Vec<String>> {
  let entries: Vec<ReleaseEntry> = serde_json::from_str(json)?;
  Ok(
    entries
      .into_iter()
      .map(|e| e.tag_name)
      .filter(|t| !t.is_empty())
      .collect(),
  )
}

/// Asset names from `gh release view --json assets`
fn parse_assets(json: &str) -> RailResult<Vec<String>> {
  let parsed: ReleaseAssets = serde_json::from_str(json)?;
  Ok(parsed.assets.into_iter().map(|a| a.name).collect())
}
