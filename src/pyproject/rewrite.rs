//! Lossless pyproject.toml rewriting
//!
//! Sets `[project].version` and pins internal dependencies to exact versions in all
//! three dependency sections. Uses `toml_edit` so comments, ordering and whitespace
//! outside the touched values survive.

use super::requirement::Requirement;
use crate::core::error::{RailError, RailResult, ResultExt};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use toml_edit::{Array, DocumentMut, Item};

/// Rewrite a manifest file in place
pub fn rewrite_manifest(path: &Path, new_version: &str, pins: &BTreeMap<String, String>) -> RailResult<()> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let updated = rewrite_manifest_str(&content, new_version, pins).with_context(|| format!("In {}", path.display()))?;
  fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

/// Rewrite manifest text, returning the new document text
pub fn rewrite_manifest_str(content: &str, new_version: &str, pins: &BTreeMap<String, String>) -> RailResult<String> {
  let mut doc: DocumentMut = content.parse()?;

  let Some(project) = doc.get_mut("project").and_then(|p| p.as_table_mut()) else {
    return Err(RailError::message("No [project] section in pyproject.toml"));
  };
  project["version"] = toml_edit::value(new_version);

  if !pins.is_empty() {
    if let Some(deps) = project.get_mut("dependencies").and_then(Item::as_array_mut) {
      pin_array(deps, pins);
    }

    if let Some(groups) = project
      .get_mut("optional-dependencies")
      .and_then(Item::as_table_like_mut)
    {
      for (_, group) in groups.iter_mut() {
        if let Some(arr) = group.as_array_mut() {
          pin_array(arr, pins);
        }
      }
    }

    if let Some(groups) = doc.get_mut("dependency-groups").and_then(Item::as_table_like_mut) {
      for (_, group) in groups.iter_mut() {
        if let Some(arr) = group.as_array_mut() {
          pin_array(arr, pins);
        }
      }
    }
  }

  Ok(doc.to_string())
}

/// Replace internal entries of one dependency array with exact pins.
///
/// The replacement list is computed first, then swapped in entry by entry so each
/// value keeps its own decor (indentation, trailing comments).
fn pin_array(deps: &mut Array, pins: &BTreeMap<String, String>) {
  let replacements: Vec<(usize, String)> = deps
    .iter()
    .enumerate()
    .filter_map(|(idx, value)| {
      let req = Requirement::parse(value.as_str()?).ok()?;
      let version = pins.get(&req.canonical_name())?;
      Some((idx, req.pin(version)))
    })
    .collect();

  for (idx, pinned) in replacements {
    deps.replace(idx, pinned);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MANIFEST: &str = r#"# top comment
[project]
name = "test-package"
version = "1.0.0"
dependencies = [
    "requests>=2.0",
    "internal-dep>=1.0",  # keep me
]

[project.optional-dependencies]
dev = ["pytest>=8.0", "Another_Internal[b,a]>=0.5"]

[dependency-groups]
test = ["pytest>=8.0", "group-internal>=0.1"]

[tool.custom]
keep = true
"#;

  fn pins() -> BTreeMap<String, String> {
    BTreeMap::from([
      ("internal-dep".to_string(), "1.2.0".to_string()),
      ("another-internal".to_string(), "0.6.0".to_string()),
      ("group-internal".to_string(), "0.2.0".to_string()),
    ])
  }

  #[test]
  fn test_sets_version() {
    let out = rewrite_manifest_str(MANIFEST, "1.0.1", &BTreeMap::new()).unwrap();
    assert!(out.contains("version = \"1.0.1\""));
    assert!(out.contains("\"internal-dep>=1.0\""));
  }

  #[test]
  fn test_pins_all_sections() {
    let out = rewrite_manifest_str(MANIFEST, "1.0.1", &pins()).unwrap();
    assert!(out.contains("\"internal-dep==1.2.0\""));
    assert!(out.contains("\"Another_Internal[a,b]==0.6.0\""));
    assert!(out.contains("\"group-internal==0.2.0\""));
    assert!(out.contains("\"requests>=2.0\""));
    assert!(out.contains("\"pytest>=8.0\""));
  }

  #[test]
  fn test_preserves_unrelated_content() {
    let out = rewrite_manifest_str(MANIFEST, "1.0.1", &pins()).unwrap();
    assert!(out.starts_with("# top comment"));
    assert!(out.contains("# keep me"));
    assert!(out.contains("[tool.custom]\nkeep = true"));
  }

  #[test]
  fn test_requires_project_table() {
    assert!(rewrite_manifest_str("[tool.x]\na = 1\n", "1.0.0", &BTreeMap::new()).is_err());
  }

  #[test]
  fn test_rewrite_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pyproject.toml");
    fs::write(&path, MANIFEST).unwrap();
    rewrite_manifest(&path, "3.0.0", &pins()).unwrap();
    let doc = crate::pyproject::PyProject::load(&path).unwrap();
    assert_eq!(doc.version.as_deref(), Some("3.0.0"));
    assert_eq!(doc.dependencies[1], "internal-dep==1.2.0");
  }
}
