use crate::core::error::{AffectedError, AffectedResult, ConfigError, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for affected-packages
/// Searched in order: affected.toml, .affected.toml, .config/affected.toml
///
/// Every field has a default, so a project without a config file behaves the
/// same as one with an empty file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffectedConfig {
  #[serde(default)]
  pub analysis: AnalysisConfig,
  #[serde(default)]
  pub go: GoConfig,
}

/// Defaults for the revision range and package selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
  /// Ref used by `--since` when no range is given (default: "origin/main")
  #[serde(default = "default_base_ref")]
  pub base_ref: String,

  /// Package patterns handed to `go list` when none are given on the command line
  #[serde(default = "default_packages")]
  pub packages: Vec<String>,
}

fn default_base_ref() -> String {
  "origin/main".to_string()
}

fn default_packages() -> Vec<String> {
  vec!["./...".to_string()]
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      base_ref: default_base_ref(),
      packages: default_packages(),
    }
  }
}

/// Go toolchain and input format settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoConfig {
  /// Go binary to invoke (default: "go")
  #[serde(default = "default_binary")]
  pub binary: String,

  /// Suffix of source files that mark a package as changed (default: ".go")
  #[serde(default = "default_source_suffix")]
  pub source_suffix: String,

  /// Top-level directory holding vendored code (default: "vendor")
  #[serde(default = "default_vendor_dir")]
  pub vendor_dir: String,

  /// Lock manifest diffed for module changes, relative to the root (default: "go.sum")
  #[serde(default = "default_lock_manifest")]
  pub lock_manifest: PathBuf,

  /// Separator between a package and its dependency list (default: "|")
  #[serde(default = "default_record_separator")]
  pub record_separator: String,

  /// Separator between dependencies (default: ":")
  #[serde(default = "default_item_separator")]
  pub item_separator: String,
}

fn default_binary() -> String {
  "go".to_string()
}

fn default_source_suffix() -> String {
  ".go".to_string()
}

fn default_vendor_dir() -> String {
  "vendor".to_string()
}

fn default_lock_manifest() -> PathBuf {
  PathBuf::from("go.sum")
}

fn default_record_separator() -> String {
  "|".to_string()
}

fn default_item_separator() -> String {
  ":".to_string()
}

impl Default for GoConfig {
  fn default() -> Self {
    Self {
      binary: default_binary(),
      source_suffix: default_source_suffix(),
      vendor_dir: default_vendor_dir(),
      lock_manifest: default_lock_manifest(),
      record_separator: default_record_separator(),
      item_separator: default_item_separator(),
    }
  }
}

impl GoConfig {
  /// Validate go configuration
  pub fn validate(&self) -> AffectedResult<()> {
    if self.binary.trim().is_empty() {
      return Err(invalid("go.binary", "must not be empty"));
    }

    if self.source_suffix.is_empty() {
      return Err(invalid("go.source_suffix", "must not be empty"));
    }

    if self.vendor_dir.contains('/') {
      return Err(invalid(
        "go.vendor_dir",
        format!("'{}' must be a single top-level directory name", self.vendor_dir),
      ));
    }

    if self.lock_manifest.as_os_str().is_empty() {
      return Err(invalid("go.lock_manifest", "must not be empty"));
    }

    if self.record_separator.is_empty() {
      return Err(invalid("go.record_separator", "must not be empty"));
    }

    if self.item_separator.is_empty() {
      return Err(invalid("go.item_separator", "must not be empty"));
    }

    if self.record_separator == self.item_separator {
      return Err(invalid(
        "go.item_separator",
        format!("must differ from go.record_separator ('{}')", self.record_separator),
      ));
    }

    Ok(())
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> AffectedError {
  AffectedError::Config(ConfigError::InvalidField {
    field: field.to_string(),
    reason: reason.into(),
  })
}

impl AffectedConfig {
  /// Find config file in search order: affected.toml, .affected.toml, .config/affected.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("affected.toml"),
      path.join(".affected.toml"),
      path.join(".config").join("affected.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the project root, falling back to defaults when no file exists
  pub fn load(path: &Path) -> AffectedResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!(root = %path.display(), "no affected.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> AffectedResult<Self> {
    let config: AffectedConfig = toml_edit::de::from_str(content)?;
    config.go.validate()?;
    Ok(config)
  }
}
