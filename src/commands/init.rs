//! `wheel-rail init`: scaffold the GitHub Actions workflow

use crate::core::context::WorkspaceContext;
use crate::core::error::{ConfigError, GitError, RailError, RailResult, ReleaseError, ResultExt};
use crate::pyproject::PyProject;
use std::fs;
use std::path::Path;

const SINGLE_JOB_TEMPLATE: &str = include_str!("../../templates/release.yml");
const MATRIX_TEMPLATE: &str = include_str!("../../templates/release-matrix.yml");
const MATRIX_PLACEHOLDER: &str = "__MATRIX_INCLUDE__";

/// Write `{workflow_dir}/release.yml` under `root`.
///
/// `root` must be a git repository root holding a uv workspace manifest.
pub fn run_init(root: &Path, workflow_dir: &Path, matrix: bool) -> RailResult<()> {
  if !root.join(".git").exists() {
    return Err(RailError::Git(GitError::RepoNotFound {
      path: root.to_path_buf(),
    }));
  }

  let manifest = root.join("pyproject.toml");
  if !manifest.exists() {
    return Err(RailError::Config(ConfigError::ManifestNotFound { path: manifest }));
  }
  if PyProject::load(&manifest)?.workspace_members.is_empty() {
    return Err(ReleaseError::NoWorkspaceMembers.into());
  }

  let rendered = if matrix {
    let ctx = WorkspaceContext::build(root)?;
    let packages: Vec<(String, Vec<String>)> = ctx
      .registry
      .names()
      .into_iter()
      .map(|name| {
        let runners = ctx.config.runners_for(&name);
        (name, runners)
      })
      .collect();
    render_matrix(&packages)
  } else {
    SINGLE_JOB_TEMPLATE.to_string()
  };

  let dest_dir = root.join(workflow_dir);
  fs::create_dir_all(&dest_dir).with_context(|| format!("Failed to create {}", dest_dir.display()))?;
  let dest = dest_dir.join("release.yml");
  if dest.exists() {
    tracing::warn!("overwriting existing {}", dest.display());
  }
  fs::write(&dest, rendered).with_context(|| format!("Failed to write {}", dest.display()))?;

  println!("✅ Wrote workflow to {}", workflow_dir.join("release.yml").display());
  println!();
  println!("Next steps:");
  println!("  1. Commit and push the workflow file");
  println!("  2. Preview the next release:");
  println!("       wheel-rail plan");
  println!("  3. Trigger the workflow from the Actions tab, or release locally:");
  println!("       wheel-rail release");
  println!("       wheel-rail release -r r1");
  println!("       wheel-rail release --force-all");
  Ok(())
}

/// Matrix template with one include entry per (package, runner)
pub fn render_matrix(packages: &[(String, Vec<String>)]) -> String {
  MATRIX_TEMPLATE.replace(MATRIX_PLACEHOLDER, &matrix_include_lines(packages))
}

fn matrix_include_lines(packages: &[(String, Vec<String>)]) -> String {
  let mut lines = Vec::new();
  for (package, runners) in packages {
    for runner in runners {
      lines.push(format!("          - package: \"{}\"", package));
      lines.push(format!("            runner: \"{}\"", runner));
    }
  }
  lines.join("\n")
}
