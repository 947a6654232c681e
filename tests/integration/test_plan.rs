//! Integration tests for `wheel-rail plan`

use crate::helpers::{TestWorkspace, run_wheel_rail, wheel_rail};
use anyhow::Result;
use serde_json::Value;

/// core ← app, util standalone; every package released at 1.0.0
fn released_workspace() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.add_package("app", "1.0.0", &["core"])?;
  ws.add_package("util", "1.0.0", &[])?;
  ws.commit("Add packages")?;
  for name in ["core", "app", "util"] {
    ws.tag(&format!("{}/v1.0.0", name))?;
  }
  ws.tag("r1")?;
  Ok(ws)
}

fn plan_json(ws: &TestWorkspace, extra: &[&str]) -> Result<Value> {
  let mut args = vec!["plan", "--json"];
  args.extend_from_slice(extra);
  let output = run_wheel_rail(&ws.path, &args)?;
  Ok(serde_json::from_slice(&output.stdout)?)
}

fn names(plan: &Value, key: &str) -> Vec<String> {
  plan[key]
    .as_array()
    .map(|arr| arr.iter().filter_map(|p| p["name"].as_str()).map(String::from).collect())
    .unwrap_or_default()
}

#[test]
fn test_plan_new_packages() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "0.1.0", &[])?;
  ws.add_package("app", "0.1.0", &["core"])?;
  ws.commit("Add packages")?;

  let plan = plan_json(&ws, &[])?;
  assert_eq!(names(&plan, "changed"), vec!["core", "app"]);
  assert!(names(&plan, "unchanged").is_empty());
  assert_eq!(plan["reasons"]["core"]["kind"], "new_package");
  assert_eq!(plan["release_tag"], "r1");
  assert_eq!(plan["plan_id"].as_str().map(str::len), Some(64));

  Ok(())
}

#[test]
fn test_plan_nothing_changed() -> Result<()> {
  let ws = released_workspace()?;

  let output = run_wheel_rail(&ws.path, &["plan"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Nothing to release"), "got: {}", stdout);
  assert!(stdout.contains("Changed (0)"), "got: {}", stdout);

  let plan = plan_json(&ws, &[])?;
  assert!(names(&plan, "changed").is_empty());
  assert_eq!(names(&plan, "unchanged"), vec!["core", "app", "util"]);
  assert_eq!(plan["last_tags"]["util"], "util/v1.0.0");
  assert_eq!(plan["release_tag"], "r2");

  Ok(())
}

#[test]
fn test_plan_change_propagates_to_dependents() -> Result<()> {
  let ws = released_workspace()?;
  ws.write_file("packages/core/src/core/__init__.py", "def hello():\n    return 'changed'\n")?;
  ws.commit("Change core")?;

  let plan = plan_json(&ws, &[])?;
  assert_eq!(names(&plan, "changed"), vec!["core", "app"]);
  assert_eq!(names(&plan, "unchanged"), vec!["util"]);
  assert_eq!(plan["reasons"]["core"]["kind"], "changed");
  assert_eq!(plan["reasons"]["core"]["since"], "core/v1.0.0");
  assert_eq!(plan["reasons"]["app"]["kind"], "dependency");
  assert_eq!(plan["reasons"]["app"]["on"], "core");

  let output = run_wheel_rail(&ws.path, &["plan"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("dirty (depends on core)"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_plan_dependent_change_leaves_dependency_clean() -> Result<()> {
  let ws = released_workspace()?;
  ws.write_file("packages/app/README.md", "# app\n")?;
  ws.commit("Document app")?;

  let plan = plan_json(&ws, &[])?;
  assert_eq!(names(&plan, "changed"), vec!["app"]);
  assert_eq!(names(&plan, "unchanged"), vec!["core", "util"]);

  Ok(())
}

#[test]
fn test_plan_root_config_dirties_released_packages() -> Result<()> {
  let ws = released_workspace()?;
  ws.write_file("uv.lock", "version = 1\n")?;
  ws.commit("Lock")?;

  let plan = plan_json(&ws, &[])?;
  assert_eq!(names(&plan, "changed").len(), 3);
  assert_eq!(plan["reasons"]["util"]["kind"], "root_config");
  assert_eq!(plan["reasons"]["util"]["file"], "uv.lock");

  Ok(())
}

#[test]
fn test_plan_similar_directory_names_do_not_match() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("core", "1.0.0", &[])?;
  ws.add_package("core-extras", "1.0.0", &[])?;
  ws.commit("Add packages")?;
  ws.tag("core/v1.0.0")?;
  ws.tag("core-extras/v1.0.0")?;

  ws.write_file("packages/core-extras/NOTES.md", "notes\n")?;
  ws.commit("Touch core-extras")?;

  let plan = plan_json(&ws, &[])?;
  assert_eq!(names(&plan, "changed"), vec!["core-extras"]);
  assert_eq!(names(&plan, "unchanged"), vec!["core"]);

  Ok(())
}

#[test]
fn test_plan_force_all() -> Result<()> {
  let ws = released_workspace()?;

  let plan = plan_json(&ws, &["--force-all"])?;
  assert_eq!(names(&plan, "changed"), vec!["core", "app", "util"]);
  assert_eq!(plan["force_all"], true);
  assert_eq!(plan["reasons"]["app"]["kind"], "forced");

  Ok(())
}

#[test]
fn test_plan_cycle_is_rejected() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("alpha", "1.0.0", &["beta"])?;
  ws.add_package("beta", "1.0.0", &["alpha"])?;
  ws.commit("Add cyclic packages")?;

  let output = wheel_rail(&ws.path, &["plan"])?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("alpha") && stderr.contains("beta"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_plan_requires_workspace_members() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("pyproject.toml", "[project]\nname = \"solo\"\nversion = \"1.0.0\"\n")?;
  ws.commit("Not a workspace")?;

  let output = wheel_rail(&ws.path, &["plan"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
