//! Changed local packages from a `git diff --name-only` listing

use std::collections::BTreeSet;

/// Which changed files count as package changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
  /// Only files ending with this suffix mark a package as changed
  pub source_suffix: String,
  /// Files under this top-level directory are never local changes
  pub vendor_dir: String,
}

impl Default for SourceFilter {
  fn default() -> Self {
    Self {
      source_suffix: ".go".to_string(),
      vendor_dir: "vendor".to_string(),
    }
  }
}

/// Map changed file paths to the packages containing them.
///
/// A package is `<module_root>/<directory of the file>`; files at the repository
/// root belong to the module root package. Paths are repository-relative and
/// `/`-separated, as git prints them. `.`, `..` and repeated slashes are
/// resolved before mapping, so `./widget/a.go` and `widget//b.go` both land in
/// `<module_root>/widget`.
pub fn changed_local_packages(listing: &str, module_root: &str, filter: &SourceFilter) -> BTreeSet<String> {
  let module_root = module_root.trim();
  let mut packages = BTreeSet::new();

  for file in listing.lines().map(str::trim) {
    if file.is_empty() {
      continue;
    }

    if !file.ends_with(filter.source_suffix.as_str()) {
      tracing::trace!(file, "skipping non-source file");
      continue;
    }

    let segments = clean_segments(file.split('/'));
    let Some((_, dir)) = segments.split_last() else {
      continue;
    };

    if segments.first().is_some_and(|first| *first == filter.vendor_dir) {
      tracing::trace!(file, "skipping vendored file");
      continue;
    }

    packages.insert(package_for_dir(module_root, dir));
  }

  tracing::debug!(packages = packages.len(), "extracted changed local packages");
  packages
}

/// Lexically resolve path segments: drop empty and `.` segments, let `..`
/// remove its parent.
fn clean_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
  let mut cleaned: Vec<&str> = Vec::new();

  for segment in segments {
    match segment {
      "" | "." => {}
      ".." if cleaned.last().is_some_and(|last| *last != "..") => {
        cleaned.pop();
      }
      _ => cleaned.push(segment),
    }
  }

  cleaned
}

fn package_for_dir(module_root: &str, dir: &[&str]) -> String {
  clean_segments(module_root.split('/').chain(dir.iter().copied())).join("/")
}
