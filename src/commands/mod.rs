//! CLI commands for wheel-rail
//!
//! - **release**: run the whole pipeline locally (build, tag, bump, publish, push)
//! - **plan**: show what a release would build and reuse, without side effects
//! - **init**: write a GitHub Actions workflow for the workspace
//! - **steps**: the pipeline split into CI-sized steps for the matrix workflow
//!
//! Commands that operate on packages take `&WorkspaceContext` so discovery runs once.

pub mod init;
pub mod plan;
pub mod release;
pub mod steps;

pub use init::run_init;
pub use plan::run_plan;
pub use release::run_release;
pub use steps::{run_step_build, run_step_discover, run_step_release};
