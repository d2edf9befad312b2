//! Project context - build once, pass to commands
//!
//! ```text
//! main.rs:
//!   ProjectContext::build() -> &ProjectContext
//!   |
//!   v
//! commands/affected.rs:
//!   fn run_affected(ctx: &ProjectContext, ...)
//! ```
//!
//! Only cheap, always-needed state lives here. The git and go collaborators
//! are started by the command, after it has decided which inputs it needs.

use crate::changes::SourceFilter;
use crate::core::config::AffectedConfig;
use crate::core::error::{AffectedError, AffectedResult};
use crate::graph::ReportFormat;
use std::path::{Path, PathBuf};

/// Project root and its configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
  /// Module root directory (absolute path)
  pub root: PathBuf,

  /// affected.toml, or defaults when absent
  pub config: AffectedConfig,
}

impl ProjectContext {
  /// Build context from a root directory.
  pub fn build(root: &Path) -> AffectedResult<Self> {
    let root = root
      .canonicalize()
      .map_err(|e| AffectedError::message(format!("Project directory not found: {} ({})", root.display(), e)))?;
    let config = AffectedConfig::load(&root)?;

    Ok(Self { root, config })
  }

  /// Get project root as Path reference (convenience)
  pub fn project_root(&self) -> &Path {
    &self.root
  }

  /// Delimiters of the dependency report
  pub fn report_format(&self) -> ReportFormat {
    ReportFormat {
      record_separator: self.config.go.record_separator.clone(),
      item_separator: self.config.go.item_separator.clone(),
    }
  }

  /// Which changed files mark a package as changed
  pub fn source_filter(&self) -> SourceFilter {
    SourceFilter {
      source_suffix: self.config.go.source_suffix.clone(),
      vendor_dir: self.config.go.vendor_dir.clone(),
    }
  }

  /// Absolute path of the lock manifest
  pub fn lock_manifest_path(&self) -> PathBuf {
    self.root.join(&self.config.go.lock_manifest)
  }
}
