//! Change detection with per-package markers
//!
//! Each package is compared against its own last release tag:
//! - no tag: never released, directly dirty
//! - a changed path under the package directory: directly dirty
//! - a changed root config file (`pyproject.toml`, `uv.lock`): directly dirty
//!
//! Dirtiness then flows along reverse-dependency edges until closure.

use super::workspace_graph::WorkspaceGraph;
use crate::core::error::RailResult;
use crate::core::vcs::Vcs;
use crate::release::markers::LastTags;
use crate::utils::git_dir_prefix;
use crate::workspace::PackageRegistry;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Why a package needs a rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeReason {
  /// `--force-all`
  Forced,
  /// No release tag yet
  NewPackage,
  /// Files under the package directory changed since `since`
  Changed { since: String },
  /// A root config file changed since `since`
  RootConfig { since: String, file: String },
  /// Depends on the dirty package `on`
  Dependency { on: String },
}

impl std::fmt::Display for ChangeReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ChangeReason::Forced => write!(f, "forced rebuild"),
      ChangeReason::NewPackage => write!(f, "new package"),
      ChangeReason::Changed { since } => write!(f, "changed since {}", since),
      ChangeReason::RootConfig { since, file } => write!(f, "root config ({}) changed since {}", file, since),
      ChangeReason::Dependency { on } => write!(f, "dirty (depends on {})", on),
    }
  }
}

/// The dirty set with the reason each member is in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
  pub reasons: BTreeMap<String, ChangeReason>,
}

impl ChangeSet {
  pub fn contains(&self, name: &str) -> bool {
    self.reasons.contains_key(name)
  }
}

/// Compute the dirty set.
///
/// With `force_all` every package is dirty and the VCS is never consulted.
/// An empty result is a valid outcome; deciding whether that stops a release is
/// the caller's business.
pub fn detect_changes(
  registry: &PackageRegistry,
  graph: &WorkspaceGraph,
  last_tags: &LastTags,
  vcs: &dyn Vcs,
  root_config_files: &[String],
  force_all: bool,
) -> RailResult<ChangeSet> {
  let mut changes = ChangeSet::default();

  if force_all {
    for package in registry.iter() {
      changes.reasons.insert(package.name.clone(), ChangeReason::Forced);
    }
    return Ok(changes);
  }

  for package in registry.iter() {
    let Some(tag) = last_tags.get(&package.name).and_then(|t| t.as_deref()) else {
      changes.reasons.insert(package.name.clone(), ChangeReason::NewPackage);
      continue;
    };

    let changed_files: HashSet<String> = vcs.diff_paths(tag, "HEAD")?.into_iter().collect();
    let prefix = git_dir_prefix(&package.path);

    if changed_files.iter().any(|f| f.starts_with(&prefix)) {
      changes
        .reasons
        .insert(package.name.clone(), ChangeReason::Changed { since: tag.to_string() });
    } else if let Some(file) = root_config_files.iter().find(|f| changed_files.contains(*f)) {
      changes.reasons.insert(
        package.name.clone(),
        ChangeReason::RootConfig {
          since: tag.to_string(),
          file: file.clone(),
        },
      );
    }
  }

  propagate(graph, &mut changes)?;
  Ok(changes)
}

/// Breadth-first walk over reverse-dependency edges from every directly dirty package
fn propagate(graph: &WorkspaceGraph, changes: &mut ChangeSet) -> RailResult<()> {
  let mut queue: VecDeque<String> = changes.reasons.keys().cloned().collect();

  while let Some(node) = queue.pop_front() {
    for dependent in graph.direct_dependents(&node)? {
      if !changes.contains(&dependent) {
        tracing::debug!("{} is dirty through {}", dependent, node);
        changes
          .reasons
          .insert(dependent.clone(), ChangeReason::Dependency { on: node.clone() });
        queue.push_back(dependent);
      }
    }
  }

  Ok(())
}
