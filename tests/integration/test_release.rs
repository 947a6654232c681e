//! Integration tests for `wheel-rail release` that stop before the release host is written to

use crate::helpers::{TestWorkspace, git, wheel_rail};
use anyhow::Result;

fn tags(ws: &TestWorkspace) -> Result<Vec<String>> {
  let output = git(&ws.path, &["tag", "--list"])?;
  Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
}

#[test]
fn test_release_nothing_changed_exit_code() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;
  ws.tag("core/v1.0.0")?;
  ws.tag("r1")?;

  let output = wheel_rail(&ws.path, &["release"])?;
  assert_eq!(output.status.code(), Some(4));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Nothing changed since last release"), "got: {}", stderr);
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Release tag: r2"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_release_build_failure_creates_no_tags() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.add_package("app", "1.0.0", &["core"])?;
  ws.commit("Add packages")?;
  ws.write_file("wheel-rail.toml", "build_command = [\"false\"]\n")?;
  let head_before = git(&ws.path, &["rev-parse", "HEAD"])?.stdout;

  let output = wheel_rail(&ws.path, &["release", "-r", "r1"])?;
  assert_eq!(output.status.code(), Some(3));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Failed to build core"), "got: {}", stderr);
  assert!(tags(&ws)?.is_empty());
  assert_eq!(git(&ws.path, &["rev-parse", "HEAD"])?.stdout, head_before);
  assert!(ws.read_file("packages/core/pyproject.toml")?.contains("version = \"1.0.0\""));

  Ok(())
}

#[test]
fn test_release_invalid_config() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;
  ws.write_file(".wheel-rail.toml", "release_limit = 0\n")?;

  let output = wheel_rail(&ws.path, &["release"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("release_limit"), "got: {}", stderr);
  assert!(stderr.contains("Invalid config in"), "got: {}", stderr);

  Ok(())
}
