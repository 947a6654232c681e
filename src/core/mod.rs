//! Core building blocks shared by every command
//!
//! - **builder**: external build invocation per package
//! - **config**: wheel-rail.toml parsing and validation
//! - **context**: discovered workspace, built once per run
//! - **error**: error types with contextual help and exit codes
//! - **host**: release host interface (GitHub Releases via `gh`)
//! - **vcs**: version control interface (system git)

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod vcs;
