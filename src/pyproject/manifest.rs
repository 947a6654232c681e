//! Typed pyproject.toml reader
//!
//! Reads through `toml_edit` so section and group order is the order written in the
//! document. Every optional section defaults to empty instead of being looked up
//! dynamically by callers.

use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use std::fs;
use std::path::Path;
use toml_edit::{DocumentMut, Item, TableLike};

/// Parsed pyproject.toml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyProject {
  /// `[project].name` as written (not normalized)
  pub name: Option<String>,
  /// `[project].version`
  pub version: Option<String>,
  /// `[project].dependencies`
  pub dependencies: Vec<String>,
  /// `[project.optional-dependencies]`, group name → requirements
  pub optional_dependencies: Vec<(String, Vec<String>)>,
  /// `[dependency-groups]` (PEP 735), group name → requirements
  pub dependency_groups: Vec<(String, Vec<String>)>,
  /// `[tool.uv.workspace].members`
  pub workspace_members: Vec<String>,
}

impl PyProject {
  /// Load and parse a pyproject.toml file
  pub fn load(path: &Path) -> RailResult<Self> {
    if !path.exists() {
      return Err(RailError::Config(ConfigError::ManifestNotFound {
        path: path.to_path_buf(),
      }));
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
  }

  /// Parse pyproject.toml text
  pub fn parse(content: &str) -> RailResult<Self> {
    let doc: DocumentMut = content.parse()?;

    let project = doc.get("project").and_then(Item::as_table_like);

    let name = project
      .and_then(|p| p.get("name"))
      .and_then(Item::as_str)
      .map(str::to_string);
    let version = project
      .and_then(|p| p.get("version"))
      .and_then(Item::as_str)
      .map(str::to_string);
    let dependencies = project
      .and_then(|p| p.get("dependencies"))
      .map(string_array)
      .unwrap_or_default();
    let optional_dependencies = project
      .and_then(|p| p.get("optional-dependencies"))
      .and_then(Item::as_table_like)
      .map(groups)
      .unwrap_or_default();
    let dependency_groups = doc
      .get("dependency-groups")
      .and_then(Item::as_table_like)
      .map(groups)
      .unwrap_or_default();

    let workspace_members = doc
      .get("tool")
      .and_then(Item::as_table_like)
      .and_then(|t| t.get("uv"))
      .and_then(Item::as_table_like)
      .and_then(|t| t.get("workspace"))
      .and_then(Item::as_table_like)
      .and_then(|t| t.get("members"))
      .map(string_array)
      .unwrap_or_default();

    Ok(Self {
      name,
      version,
      dependencies,
      optional_dependencies,
      dependency_groups,
      workspace_members,
    })
  }

  /// Version, defaulting to "0.0.0"
  pub fn version_or_default(&self) -> String {
    self.version.clone().unwrap_or_else(|| "0.0.0".to_string())
  }

  /// All dependency strings from the three sections, flattened in document order
  pub fn all_dependency_strings(&self) -> Vec<String> {
    let mut deps = self.dependencies.clone();
    for (_, group) in &self.optional_dependencies {
      deps.extend(group.iter().cloned());
    }
    for (_, group) in &self.dependency_groups {
      deps.extend(group.iter().cloned());
    }
    deps
  }
}

/// String entries of an array item; non-string entries (e.g. `{include-group = ...}`) are skipped
fn string_array(item: &Item) -> Vec<String> {
  item
    .as_array()
    .map(|arr| arr.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
    .unwrap_or_default()
}

fn groups(table: &dyn TableLike) -> Vec<(String, Vec<String>)> {
  table
    .iter()
    .map(|(name, item)| (name.to_string(), string_array(item)))
    .collect()
}
