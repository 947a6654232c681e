//! Workspace dependency graph over petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: canonical package names
//! - **Edges**: internal dependencies only; edges to names outside the node set are dropped
//! - **Ordering**: Kahn's algorithm with a min-ordered ready set, so the output is
//!   fully deterministic and unconstrained nodes come out in lexicographic order

use crate::core::error::{RailError, RailResult, ReleaseError};
use crate::workspace::PackageRegistry;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Workspace dependency graph.
pub struct WorkspaceGraph {
  graph: DiGraph<String, ()>,

  /// Index: package name → node index
  name_to_node: HashMap<String, NodeIndex>,
}

impl WorkspaceGraph {
  /// Build the graph from `(name, dependencies)` pairs.
  ///
  /// Dependencies naming a node outside the input are ignored, which lets callers
  /// sort a subset of the workspace (e.g. only the changed packages).
  pub fn from_nodes<'a, I, D>(nodes: I) -> Self
  where
    I: IntoIterator<Item = (&'a str, D)>,
    D: IntoIterator<Item = &'a String>,
  {
    let nodes: Vec<(&str, Vec<&String>)> = nodes.into_iter().map(|(n, d)| (n, d.into_iter().collect())).collect();

    let mut graph = DiGraph::new();
    let mut name_to_node = HashMap::new();
    for (name, _) in &nodes {
      if !name_to_node.contains_key(*name) {
        let idx = graph.add_node(name.to_string());
        name_to_node.insert(name.to_string(), idx);
      }
    }

    for (name, deps) in &nodes {
      let from = name_to_node[*name];
      for dep in deps {
        if let Some(&to) = name_to_node.get(dep.as_str()) {
          graph.update_edge(from, to, ());
        }
      }
    }

    Self { graph, name_to_node }
  }

  /// Graph of every package in the registry
  pub fn from_registry(registry: &PackageRegistry) -> Self {
    Self::from_nodes(registry.iter().map(|p| (p.name.as_str(), &p.deps)))
  }

  /// Graph induced by `names` (edges leaving the subset are dropped)
  pub fn subset(&self, names: &[String]) -> Self {
    let keep: HashSet<&str> = names.iter().map(String::as_str).collect();
    let deps: Vec<(&str, Vec<&String>)> = names
      .iter()
      .filter(|n| self.name_to_node.contains_key(n.as_str()))
      .map(|n| {
        let idx = self.name_to_node[n.as_str()];
        let deps = self
          .graph
          .neighbors_directed(idx, Direction::Outgoing)
          .map(|d| &self.graph[d])
          .filter(|d| keep.contains(d.as_str()))
          .collect();
        (n.as_str(), deps)
      })
      .collect();
    Self::from_nodes(deps)
  }

  /// All node names, sorted
  pub fn members(&self) -> Vec<String> {
    let mut names: Vec<String> = self.name_to_node.keys().cloned().collect();
    names.sort();
    names
  }

  /// Direct dependents of a package (what uses it), sorted
  pub fn direct_dependents(&self, name: &str) -> RailResult<Vec<String>> {
    Ok(self.neighbors(self.find_node(name)?, Direction::Incoming))
  }

  /// Build order: dependencies before dependents.
  ///
  /// Kahn's algorithm. The ready set is ordered, and the smallest ready name is
  /// always taken next.
  ///
  /// # Errors
  /// `CycleDetected` naming every node that could not be ordered.
  pub fn topological_order(&self) -> RailResult<Vec<String>> {
    let mut pending: HashMap<NodeIndex, usize> = self
      .graph
      .node_indices()
      .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Outgoing).count()))
      .collect();

    let mut ready: BTreeSet<(&str, NodeIndex)> = pending
      .iter()
      .filter(|(_, count)| **count == 0)
      .map(|(idx, _)| (self.graph[*idx].as_str(), *idx))
      .collect();

    let mut order = Vec::with_capacity(self.graph.node_count());
    while let Some((name, idx)) = ready.pop_first() {
      order.push(name.to_string());
      pending.remove(&idx);

      for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
        if let Some(count) = pending.get_mut(&dependent) {
          *count -= 1;
          if *count == 0 {
            ready.insert((self.graph[dependent].as_str(), dependent));
          }
        }
      }
    }

    if order.len() < self.graph.node_count() {
      let mut remaining: Vec<String> = pending.keys().map(|idx| self.graph[*idx].clone()).collect();
      remaining.sort();
      return Err(ReleaseError::CycleDetected { remaining }.into());
    }

    Ok(order)
  }

  fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<String> {
    let mut names: Vec<String> = self
      .graph
      .neighbors_directed(idx, direction)
      .map(|n| self.graph[n].clone())
      .collect();
    names.sort();
    names.dedup();
    names
  }

  /// Find node index by package name.
  fn find_node(&self, name: &str) -> RailResult<NodeIndex> {
    self.name_to_node.get(name).copied().ok_or_else(|| {
      RailError::message(format!(
        "Package '{}' not found. Available workspace packages: {}",
        name,
        self.members().join(", ")
      ))
    })
  }
}
