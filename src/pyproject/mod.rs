//! pyproject.toml integration
//!
//! - **manifest**: Typed view over a pyproject.toml (name, version, dependency sections, workspace members)
//! - **requirement**: PEP 508 dependency string parsing, name canonicalization, exact pinning
//! - **rewrite**: Lossless version bump + internal dependency pinning (preserves formatting)

pub mod manifest;
pub mod requirement;
pub mod rewrite;

pub use manifest::PyProject;
pub use requirement::{Requirement, canonical_package_name};
pub use rewrite::rewrite_manifest;
