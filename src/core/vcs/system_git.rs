//! System git backend
//!
//! Runs git plumbing in a subprocess and hands back raw stdout. Parsing of the
//! output lives in `crate::changes`.

use super::RevisionRange;
use crate::core::error::{AffectedError, AffectedResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> AffectedResult<Self> {
    let git = Self {
      repo_path: path.to_path_buf(),
    };

    let output = git
      .git_cmd()
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(AffectedError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(AffectedError::Git(GitError::CommandFailed {
        command: "git rev-parse --show-toplevel".to_string(),
        stderr: stderr.trim().to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    tracing::debug!(work_tree = stdout.trim(), "opened git repository");

    Ok(git)
  }

  /// `git diff --name-only <range>`: changed paths, one per line
  ///
  /// `--relative` makes paths relative to the directory the repo was opened
  /// at, so a Go module nested inside a larger repository gets paths rooted at
  /// the module directory.
  pub fn changed_file_names(&self, range: &RevisionRange) -> AffectedResult<String> {
    let range = range.to_git_arg();
    self.run(&["diff", "--no-ext-diff", "--name-only", "--relative", &range])
  }

  /// `git diff <range> -- <path>`: unified diff of one file
  pub fn diff_file(&self, range: &RevisionRange, path: &Path) -> AffectedResult<String> {
    let range = range.to_git_arg();
    let path = path.to_string_lossy();
    self.run(&["diff", "--no-ext-diff", "--no-color", "--relative", &range, "--", &path])
  }

  fn run(&self, args: &[&str]) -> AffectedResult<String> {
    let command = format!("git {}", args.join(" "));
    tracing::info!(command = %command, "running");

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(AffectedError::Git(GitError::CommandFailed {
        command,
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(String::from_utf8(output.stdout)?)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("diff.noprefix=false"); // Keep the a/ b/ header shape
    cmd.arg("--no-pager");

    cmd
  }
}
