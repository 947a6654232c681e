//! Graph-aware workspace analysis
//!
//! Built on petgraph: the internal dependency graph, its build order, and
//! change detection with reverse-dependency propagation.

pub mod affected;
pub mod workspace_graph;

pub use workspace_graph::WorkspaceGraph;
