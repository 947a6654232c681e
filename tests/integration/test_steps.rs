//! Integration tests for the `wheel-rail steps` CI commands

use crate::helpers::{TestWorkspace, run_wheel_rail, wheel_rail};
use anyhow::Result;
use std::collections::HashMap;

fn read_outputs(ws: &TestWorkspace, file: &str) -> Result<HashMap<String, String>> {
  Ok(
    ws.read_file(file)?
      .lines()
      .filter_map(|line| line.split_once('='))
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect(),
  )
}

#[test]
fn test_discover_nothing_changed_writes_empty_outputs() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.add_package("app", "1.0.0", &["core"])?;
  ws.commit("Add packages")?;
  ws.tag("core/v1.0.0")?;
  ws.tag("app/v1.0.0")?;
  ws.tag("r4")?;

  let output = run_wheel_rail(&ws.path, &["steps", "discover", "--github-output", "gh-output.txt"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Nothing changed"), "got: {}", stdout);

  let outputs = read_outputs(&ws, "gh-output.txt")?;
  assert_eq!(outputs["changed"], "[]");
  assert_eq!(outputs["unchanged"], r#"["core","app"]"#);
  assert_eq!(outputs["last_tags"], r#"{"app":"app/v1.0.0","core":"core/v1.0.0"}"#);
  assert_eq!(outputs["release"], "r5");

  Ok(())
}

#[test]
fn test_discover_appends_to_existing_output() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;
  ws.tag("core/v1.0.0")?;
  ws.write_file("out/gh-output.txt", "previous=1\n")?;

  run_wheel_rail(
    &ws.path,
    &["steps", "discover", "--github-output", "out/gh-output.txt", "-r", "r9"],
  )?;

  let content = ws.read_file("out/gh-output.txt")?;
  assert!(content.starts_with("previous=1\n"));
  let outputs = read_outputs(&ws, "out/gh-output.txt")?;
  assert_eq!(outputs["release"], "r9");

  Ok(())
}

#[test]
fn test_build_skips_unchanged_package() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.add_package("app", "1.0.0", &["core"])?;
  ws.commit("Add packages")?;
  ws.write_file("wheel-rail.toml", "build_command = [\"false\"]\n")?;

  let output = run_wheel_rail(&ws.path, &["steps", "build", "--package", "core", "--changed", r#"["app"]"#])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("nothing to build"), "got: {}", stdout);
  assert!(!ws.file_exists("dist"));

  Ok(())
}

#[test]
fn test_build_changed_package_into_dist() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;
  ws.write_file(
    "wheel-rail.toml",
    "build_command = [\"sh\", \"-c\", \"touch {out_dir}/{name}-1.0.0-py3-none-any.whl\"]\n",
  )?;

  run_wheel_rail(&ws.path, &["steps", "build", "--package", "core", "--changed", r#"["core"]"#])?;
  assert!(ws.file_exists("dist/core-1.0.0-py3-none-any.whl"));

  Ok(())
}

#[test]
fn test_build_failure_exit_code() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;
  ws.write_file("wheel-rail.toml", "build_command = [\"false\"]\n")?;

  let output = wheel_rail(&ws.path, &["steps", "build", "--package", "core", "--changed", r#"["core"]"#])?;
  assert_eq!(output.status.code(), Some(3));

  Ok(())
}

#[test]
fn test_build_rejects_invalid_json() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;

  let output = wheel_rail(&ws.path, &["steps", "build", "--package", "core", "--changed", "core"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("--changed"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_release_rejects_unknown_package() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.commit("Add core")?;

  let output = wheel_rail(
    &ws.path,
    &["steps", "release", "--changed", r#"["ghost"]"#, "--unchanged", "[]", "--release-tag", "r1"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("ghost"), "got: {}", stderr);

  Ok(())
}
