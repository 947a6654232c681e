//! Release orchestration
//!
//! - **markers**: per-package `{name}/v{version}` tags and `r{N}` release tags
//! - **version**: version parsing and patch bumps
//! - **plan**: changed/unchanged partition of one run
//! - **reconcile**: duplicate-version check and reuse of published wheels
//! - **pipeline**: the phase-by-phase release run

pub mod markers;
pub mod pipeline;
pub mod plan;
pub mod reconcile;
pub mod version;

pub use pipeline::{Pipeline, ReleaseOptions};
pub use plan::ReleasePlan;
