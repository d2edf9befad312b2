pub mod system_git;

pub use system_git::SystemGit;

/// A git revision range to diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionRange {
  /// `<base>..HEAD`
  Since(String),
  /// `<from>..<to>`
  Between { from: String, to: String },
  /// Passed to git verbatim (e.g. `main...feature`)
  Raw(String),
}

impl RevisionRange {
  /// Range argument for `git diff`
  pub fn to_git_arg(&self) -> String {
    match self {
      RevisionRange::Since(base) => format!("{}..HEAD", base),
      RevisionRange::Between { from, to } => format!("{}..{}", from, to),
      RevisionRange::Raw(range) => range.clone(),
    }
  }
}
