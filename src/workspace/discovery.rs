//! Package discovery from `[tool.uv.workspace].members`

use super::{Package, PackageRegistry};
use crate::core::error::{RailError, RailResult, ReleaseError, ResultExt};
use crate::pyproject::{PyProject, Requirement, canonical_package_name};
use glob::glob;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const MANIFEST: &str = "pyproject.toml";

/// Discover every workspace package under `root`.
///
/// Member patterns are expanded in declaration order, matches within one pattern
/// sorted. Dependency strings from all three manifest sections are resolved to
/// canonical names and kept only when they name another discovered package.
pub fn discover(root: &Path) -> RailResult<PackageRegistry> {
  let root_doc = PyProject::load(&root.join(MANIFEST))?;
  if root_doc.workspace_members.is_empty() {
    return Err(ReleaseError::NoWorkspaceMembers.into());
  }

  let member_dirs = expand_members(root, &root_doc.workspace_members)?;
  if member_dirs.is_empty() {
    return Err(
      ReleaseError::NoPackagesFound {
        patterns: root_doc.workspace_members.clone(),
      }
      .into(),
    );
  }

  // First pass: identity of every package
  let mut found: Vec<(Package, Vec<String>)> = Vec::with_capacity(member_dirs.len());
  let mut names = HashSet::new();
  for dir in &member_dirs {
    let doc = PyProject::load(&dir.join(MANIFEST))?;
    let fallback = dir
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();
    let name = canonical_package_name(doc.name.as_deref().unwrap_or(&fallback));
    let rel = dir
      .strip_prefix(root)
      .with_context(|| format!("Member {} is outside the workspace", dir.display()))?
      .to_path_buf();

    if !names.insert(name.clone()) {
      return Err(RailError::with_help(
        format!("Duplicate package name '{}' at {}", name, rel.display()),
        "Every workspace member needs a distinct [project].name.",
      ));
    }

    found.push((
      Package {
        name,
        path: rel,
        version: doc.version_or_default(),
        deps: Vec::new(),
      },
      doc.all_dependency_strings(),
    ));
  }

  // Second pass: keep internal deps only
  let mut registry = PackageRegistry::new();
  for (mut package, raw_deps) in found {
    let mut seen = HashSet::new();
    for dep in raw_deps {
      let dep_name = match Requirement::parse(&dep) {
        Ok(req) => req.canonical_name(),
        Err(_) => {
          tracing::warn!("{}: ignoring unparseable dependency '{}'", package.name, dep);
          continue;
        }
      };
      if names.contains(&dep_name) && seen.insert(dep_name.clone()) {
        package.deps.push(dep_name);
      }
    }
    tracing::debug!(
      "discovered {} {} ({}) deps=[{}]",
      package.name,
      package.version,
      package.path.display(),
      package.deps.join(", ")
    );
    registry.insert(package);
  }

  Ok(registry)
}

/// Expand member globs to directories holding a manifest
fn expand_members(root: &Path, patterns: &[String]) -> RailResult<Vec<PathBuf>> {
  let base = glob::Pattern::escape(&root.to_string_lossy());
  let mut dirs = Vec::new();
  let mut seen = HashSet::new();

  for pattern in patterns {
    let full = format!("{}/{}", base, pattern.trim_end_matches('/'));
    let mut matches = Vec::new();
    for entry in glob(&full)? {
      match entry {
        Ok(path) => {
          if path.is_dir() && path.join(MANIFEST).is_file() {
            matches.push(path);
          }
        }
        Err(e) => tracing::warn!("glob error: {}", e),
      }
    }
    matches.sort();
    for path in matches {
      if seen.insert(path.clone()) {
        dirs.push(path);
      }
    }
  }

  Ok(dirs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }

  fn workspace(members: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
      dir.path(),
      "pyproject.toml",
      &format!("[project]\nname = \"root\"\n\n[tool.uv.workspace]\nmembers = {}\n", members),
    );
    dir
  }

  #[test]
  fn test_discovers_internal_deps_only() {
    let ws = workspace(r#"["packages/*"]"#);
    write(
      ws.path(),
      "packages/pkg-a/pyproject.toml",
      "[project]\nname = \"pkg-a\"\nversion = \"1.0.0\"\ndependencies = [\"requests>=2\"]\n",
    );
    write(
      ws.path(),
      "packages/pkg-b/pyproject.toml",
      r#"[project]
name = "Pkg_B"
version = "2.1"
dependencies = ["pkg-a>=1.0", "click"]

[project.optional-dependencies]
extra = ["PKG.A[x]"]

[dependency-groups]
dev = ["pkg-c"]
"#,
    );
    write(ws.path(), "packages/pkg-c/pyproject.toml", "[project]\nname = \"pkg-c\"\n");

    let registry = discover(ws.path()).unwrap();
    assert_eq!(registry.names(), vec!["pkg-a", "pkg-b", "pkg-c"]);

    let b = registry.get("pkg-b").unwrap();
    assert_eq!(b.version, "2.1");
    assert_eq!(b.deps, vec!["pkg-a", "pkg-c"]);
    assert_eq!(b.path, PathBuf::from("packages/pkg-b"));

    assert!(registry.get("pkg-a").unwrap().deps.is_empty());
    assert_eq!(registry.get("pkg-c").unwrap().version, "0.0.0");
  }

  #[test]
  fn test_name_falls_back_to_directory() {
    let ws = workspace(r#"["libs/*"]"#);
    write(ws.path(), "libs/My_Lib/pyproject.toml", "[project]\nversion = \"0.1.0\"\n");
    let registry = discover(ws.path()).unwrap();
    assert_eq!(registry.names(), vec!["my-lib"]);
  }

  #[test]
  fn test_directories_without_manifest_skipped() {
    let ws = workspace(r#"["packages/*"]"#);
    write(ws.path(), "packages/real/pyproject.toml", "[project]\nname = \"real\"\n");
    fs::create_dir_all(ws.path().join("packages/empty")).unwrap();
    write(ws.path(), "packages/file.txt", "not a package");
    assert_eq!(discover(ws.path()).unwrap().names(), vec!["real"]);
  }

  #[test]
  fn test_no_members() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pyproject.toml", "[project]\nname = \"root\"\n");
    let err = discover(dir.path()).unwrap_err();
    assert!(matches!(err, RailError::Release(ReleaseError::NoWorkspaceMembers)));
  }

  #[test]
  fn test_no_packages_found() {
    let ws = workspace(r#"["packages/*"]"#);
    let err = discover(ws.path()).unwrap_err();
    assert!(matches!(err, RailError::Release(ReleaseError::NoPackagesFound { .. })));
  }

  #[test]
  fn test_duplicate_names_rejected() {
    let ws = workspace(r#"["a/*", "b/*"]"#);
    write(ws.path(), "a/one/pyproject.toml", "[project]\nname = \"same\"\n");
    write(ws.path(), "b/two/pyproject.toml", "[project]\nname = \"Same\"\n");
    assert!(discover(ws.path()).is_err());
  }

  #[test]
  fn test_missing_root_manifest() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(discover(dir.path()).unwrap_err(), RailError::Config(_)));
  }
}
