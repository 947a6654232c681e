//! Error types for wheel-rail with contextual messages and exit codes
//!
//! One error type for the whole binary. Release pipeline failures get their own
//! variant group (`ReleaseError`) so the orchestrator and CI can tell a real
//! failure apart from "nothing to release".

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for wheel-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, gh, I/O)
  System = 2,
  /// Validation failure (cycles, duplicate versions, failed builds)
  Validation = 3,
  /// Nothing changed since the last release (clean stop)
  NothingChanged = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for wheel-rail
#[derive(Debug)]
pub enum RailError {
  /// Configuration errors
  Config(ConfigError),

  /// Git and gh invocation errors
  Git(GitError),

  /// Release pipeline failures
  Release(ReleaseError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },

  /// A typed error with context lines added on the way up
  Context { context: String, source: Box<RailError> },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context, help } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RailError::Context { context, source } => RailError::Context {
        context: format!("{}\n{}", ctx_str, context),
        source,
      },
      other => RailError::Context {
        context: ctx_str,
        source: Box::new(other),
      },
    }
  }

  /// True for the "nothing to release" stop
  pub fn is_nothing_changed(&self) -> bool {
    match self {
      RailError::Release(ReleaseError::NothingChanged) => true,
      RailError::Context { source, .. } => source.is_nothing_changed(),
      _ => false,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RailError::Config(_) => ExitCode::User,
      RailError::Git(_) => ExitCode::System,
      RailError::Release(e) => e.exit_code(),
      RailError::Io(_) => ExitCode::System,
      RailError::Message { .. } => ExitCode::User,
      RailError::Context { source, .. } => source.exit_code(),
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::Config(e) => e.help_message(),
      RailError::Git(e) => e.help_message(),
      RailError::Release(e) => e.help_message(),
      RailError::Message { help, .. } => help.clone(),
      RailError::Io(_) => None,
      RailError::Context { source, .. } => source.help_message(),
    }
  }
}

impl fmt::Display for RailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RailError::Config(e) => write!(f, "{}", e),
      RailError::Git(e) => write!(f, "{}", e),
      RailError::Release(e) => write!(f, "{}", e),
      RailError::Io(e) => write!(f, "I/O error: {}", e),
      RailError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
      RailError::Context { context, source } => write!(f, "{}\n{}", source, context),
    }
  }
}

impl std::error::Error for RailError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RailError::Io(e) => Some(e),
      RailError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for RailError {
  fn from(err: io::Error) -> Self {
    RailError::Io(err)
  }
}

impl From<ReleaseError> for RailError {
  fn from(err: ReleaseError) -> Self {
    RailError::Release(err)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

impl From<toml_edit::TomlError> for RailError {
  fn from(err: toml_edit::TomlError) -> Self {
    RailError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for RailError {
  fn from(err: toml_edit::de::Error) -> Self {
    RailError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RailError {
  fn from(err: serde_json::Error) -> Self {
    RailError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for RailError {
  fn from(err: glob::PatternError) -> Self {
    RailError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<std::path::StripPrefixError> for RailError {
  fn from(err: std::path::StripPrefixError) -> Self {
    RailError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Root pyproject.toml missing
  ManifestNotFound { path: PathBuf },

  /// Config value rejected by validation
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ManifestNotFound { .. } => {
        Some("Run wheel-rail from the workspace root (the directory holding the root pyproject.toml).".to_string())
      }
      ConfigError::Invalid { .. } => Some("Fix the value in wheel-rail.toml or remove it to use the default.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::ManifestNotFound { path } => {
        write!(f, "No pyproject.toml found at {}", path.display())
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
    }
  }
}

/// Git and gh invocation errors
#[derive(Debug)]
pub enum GitError {
  /// Command exited non-zero
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull, then re-run the release.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check that the CI token is allowed to push commits and tags.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { reason } => {
        write!(f, "Push failed: {}", reason)
      }
    }
  }
}

/// A changed package whose version is already published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateArtifact {
  pub package: String,
  pub version: String,
  pub artifact: String,
}

/// Release pipeline failures
#[derive(Debug)]
pub enum ReleaseError {
  /// Root manifest declares no member patterns
  NoWorkspaceMembers,

  /// Member patterns matched no manifest-bearing directory
  NoPackagesFound { patterns: Vec<String> },

  /// Dependency cycle among the remaining (unsortable) packages
  CycleDetected { remaining: Vec<String> },

  /// External build returned non-zero
  BuildFailed { package: String },

  /// Changed packages whose version already has a published artifact
  DuplicateVersion { duplicates: Vec<DuplicateArtifact> },

  /// Dirty set is empty and force-all was not requested
  NothingChanged,

  /// Dist directory empty at publish time
  NoArtifactsProduced { dist_dir: PathBuf },

  /// Unchanged packages without a reusable artifact (fatal only in strict mode)
  MissingReusableArtifact { packages: Vec<String> },
}

impl ReleaseError {
  fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::NoWorkspaceMembers | ReleaseError::NoPackagesFound { .. } => ExitCode::User,
      ReleaseError::NothingChanged => ExitCode::NothingChanged,
      _ => ExitCode::Validation,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::NoWorkspaceMembers => Some(
        "wheel-rail requires a uv workspace. Example:\n\n  [tool.uv.workspace]\n  members = [\"packages/*\"]".to_string(),
      ),
      ReleaseError::NoPackagesFound { .. } => {
        Some("Each member directory needs its own pyproject.toml.".to_string())
      }
      ReleaseError::CycleDetected { .. } => {
        Some("Remove the circular dependency between these packages.".to_string())
      }
      ReleaseError::DuplicateVersion { .. } => Some("Bump the version in pyproject.toml before releasing.".to_string()),
      ReleaseError::MissingReusableArtifact { .. } => Some(
        "Re-run with --force-all to rebuild everything, or set strict_reuse = false to continue without them."
          .to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::NoWorkspaceMembers => {
        write!(f, "No [tool.uv.workspace] members defined in root pyproject.toml")
      }
      ReleaseError::NoPackagesFound { patterns } => {
        write!(f, "No packages found matching workspace members: {}", patterns.join(", "))
      }
      ReleaseError::CycleDetected { remaining } => {
        write!(f, "Dependency cycle detected involving: {}", remaining.join(", "))
      }
      ReleaseError::BuildFailed { package } => write!(f, "Failed to build {}", package),
      ReleaseError::DuplicateVersion { duplicates } => {
        writeln!(f, "The following package versions already exist in releases:")?;
        for dup in duplicates {
          writeln!(f, "  - {} {} (found: {})", dup.package, dup.version, dup.artifact)?;
        }
        Ok(())
      }
      ReleaseError::NothingChanged => write!(f, "Nothing changed since last release."),
      ReleaseError::NoArtifactsProduced { dist_dir } => {
        write!(f, "No wheels found in {}", dist_dir.display())
      }
      ReleaseError::MissingReusableArtifact { packages } => {
        write!(f, "No published wheel found for unchanged packages: {}", packages.join(", "))
      }
    }
  }
}

/// Result type alias for wheel-rail
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RailResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn context(self, ctx: impl Into<String>) -> RailResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RailError) {
  if error.is_nothing_changed() {
    eprintln!("\nℹ️  {}\n", error);
    return;
  }

  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
