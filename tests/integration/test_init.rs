//! Integration tests for `wheel-rail init`

use crate::helpers::{TestWorkspace, run_wheel_rail, wheel_rail};
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_init_writes_single_job_workflow() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "0.1.0", &[])?;
  ws.commit("Add core")?;

  let output = run_wheel_rail(&ws.path, &["init"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Wrote workflow"), "got: {}", stdout);

  let workflow = ws.read_file(".github/workflows/release.yml")?;
  assert!(workflow.contains("wheel-rail release"));
  assert!(!workflow.contains("steps discover"));

  Ok(())
}

#[test]
fn test_init_matrix_uses_configured_runners() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "0.1.0", &[])?;
  ws.add_package("native-ext", "0.1.0", &["core"])?;
  ws.commit("Add packages")?;
  ws.write_file(
    "wheel-rail.toml",
    "[runners]\nnative-ext = [\"ubuntu-latest\", \"macos-latest\"]\n",
  )?;

  run_wheel_rail(&ws.path, &["init", "--matrix", "--workflow-dir", "ci"])?;

  assert!(!ws.file_exists(".github/workflows/release.yml"));
  let workflow = ws.read_file("ci/release.yml")?;
  assert!(!workflow.contains("__MATRIX_INCLUDE__"));
  assert_eq!(workflow.matches("- package: \"native-ext\"").count(), 2);
  assert_eq!(workflow.matches("- package: \"core\"").count(), 1);
  assert!(workflow.contains("runner: \"macos-latest\""));
  assert!(workflow.contains("wheel-rail steps discover"));

  Ok(())
}

#[test]
fn test_init_outside_git_repo() -> Result<()> {
  let dir = TempDir::new()?;
  std::fs::write(
    dir.path().join("pyproject.toml"),
    "[tool.uv.workspace]\nmembers = [\"packages/*\"]\n",
  )?;

  let output = wheel_rail(dir.path(), &["init"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(!dir.path().join(".github").exists());

  Ok(())
}

#[test]
fn test_init_without_workspace_members() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("pyproject.toml", "[project]\nname = \"solo\"\n")?;

  let output = wheel_rail(&ws.path, &["init"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("members"), "got: {}", stderr);
  assert!(!ws.file_exists(".github/workflows/release.yml"));

  Ok(())
}
