use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for wheel-rail
/// Searched in order: wheel-rail.toml, .wheel-rail.toml, .config/wheel-rail.toml
///
/// Every field has a default, so a workspace without a config file behaves
/// exactly like one with an empty file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
  /// Where built and reused wheels are collected before publishing
  pub dist_dir: PathBuf,

  /// Scratch directory for wheels downloaded from previous releases
  pub staging_dir: PathBuf,

  /// Build command; `{path}` and `{out_dir}` are substituted per package
  pub build_command: Vec<String>,

  /// Root files whose change dirties every package released before the change
  pub root_config_files: Vec<String>,

  /// How many past releases are enumerated for the artifact index
  pub release_limit: usize,

  /// Fail instead of warn when an unchanged package has no reusable wheel
  pub strict_reuse: bool,

  /// Per-package CI runners for the matrix workflow (default: ubuntu-latest)
  pub runners: BTreeMap<String, Vec<String>>,
}

fn default_build_command() -> Vec<String> {
  ["uv", "build", "{path}", "--out-dir", "{out_dir}"]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_root_config_files() -> Vec<String> {
  vec!["pyproject.toml".to_string(), "uv.lock".to_string()]
}

impl Default for RailConfig {
  fn default() -> Self {
    Self {
      dist_dir: PathBuf::from("dist"),
      staging_dir: std::env::temp_dir().join("wheel-rail-prev"),
      build_command: default_build_command(),
      root_config_files: default_root_config_files(),
      release_limit: 100,
      strict_reuse: false,
      runners: BTreeMap::new(),
    }
  }
}

impl RailConfig {
  /// Find config file in search order
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("wheel-rail.toml"),
      path.join(".wheel-rail.toml"),
      path.join(".config").join("wheel-rail.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> RailResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!("No wheel-rail.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::debug!("Loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> RailResult<Self> {
    let config: RailConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate configuration
  pub fn validate(&self) -> RailResult<()> {
    if self.build_command.is_empty() || self.build_command[0].trim().is_empty() {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "build_command".to_string(),
        reason: "must name a program to run".to_string(),
      }));
    }

    if self.release_limit == 0 {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "release_limit".to_string(),
        reason: "must be at least 1".to_string(),
      }));
    }

    Ok(())
  }

  /// Runners configured for a package (default: ubuntu-latest)
  pub fn runners_for(&self, package: &str) -> Vec<String> {
    match self.runners.get(package) {
      Some(runners) if !runners.is_empty() => runners.clone(),
      _ => vec!["ubuntu-latest".to_string()],
    }
  }
}
