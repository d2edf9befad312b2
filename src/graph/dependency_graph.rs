//! Package dependency graph parsed from a `go list` report
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: every identifier seen in the report, local packages and
//!   dependencies alike. A node is local when it was the subject of a report line.
//! - **Edges**: one per (package, dependency) pair. The report already lists the
//!   full transitive closure, so edges are not followed further than one hop.
//! - **Index**: identifier → node index
//!
//! Only local packages have outgoing edges, so every incoming neighbor of a node
//! is a local package that lists it as a dependency.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// Delimiters of the dependency report.
///
/// Must match the template given to the producer, which by default is
/// `{{.ImportPath}}|{{join .Deps ":"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormat {
  /// Between the package identifier and its dependency list
  pub record_separator: String,
  /// Between two dependencies
  pub item_separator: String,
}

impl Default for ReportFormat {
  fn default() -> Self {
    Self {
      record_separator: "|".to_string(),
      item_separator: ":".to_string(),
    }
  }
}

impl ReportFormat {
  /// `go list -f` template producing lines in this format
  pub fn go_list_template(&self) -> String {
    format!(
      "{{{{.ImportPath}}}}{}{{{{join .Deps \"{}\"}}}}",
      self.record_separator, self.item_separator
    )
  }
}

/// A node in the dependency graph.
#[derive(Debug, Clone)]
pub struct PackageNode {
  pub id: String,
  /// Appeared as the subject of a report line
  pub is_local: bool,
}

/// Local package → dependency set mapping, stored as a petgraph digraph.
#[derive(Debug, Default)]
pub struct DependencyGraph {
  graph: DiGraph<PackageNode, ()>,
  id_to_node: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a dependency report, one package per line.
  ///
  /// Line format: `<id><record-sep><dep1><item-sep><dep2>...`
  ///
  /// - Lines without the record separator are dropped.
  /// - `<id><record-sep>` with nothing after it yields a package with no dependencies.
  /// - Blank lines, empty identifiers and empty dependency items are skipped.
  /// - Identifiers and items are trimmed.
  pub fn parse(report: &str, format: &ReportFormat) -> Self {
    let mut graph = Self::new();
    let mut skipped = 0usize;

    for line in report.lines() {
      let Some((id, deps)) = line.split_once(format.record_separator.as_str()) else {
        if !line.trim().is_empty() {
          skipped += 1;
        }
        continue;
      };

      let id = id.trim();
      if id.is_empty() {
        skipped += 1;
        continue;
      }

      let deps = deps
        .split(format.item_separator.as_str())
        .map(str::trim)
        .filter(|dep| !dep.is_empty());
      graph.add_package(id, deps);
    }

    tracing::debug!(
      packages = graph.len(),
      nodes = graph.graph.node_count(),
      edges = graph.graph.edge_count(),
      skipped,
      "parsed dependency report"
    );

    graph
  }

  /// Add a local package and its dependency set.
  ///
  /// Adding the same package twice merges the dependency sets.
  pub fn add_package<'a>(&mut self, id: &str, deps: impl IntoIterator<Item = &'a str>) {
    let from = self.node(id);
    self.graph[from].is_local = true;

    for dep in deps {
      let to = self.node(dep);
      self.graph.update_edge(from, to, ());
    }
  }

  fn node(&mut self, id: &str) -> NodeIndex {
    if let Some(&idx) = self.id_to_node.get(id) {
      return idx;
    }

    let idx = self.graph.add_node(PackageNode {
      id: id.to_string(),
      is_local: false,
    });
    self.id_to_node.insert(id.to_string(), idx);
    idx
  }

  /// Whether `id` is a key of the graph (a local package).
  pub fn contains(&self, id: &str) -> bool {
    self
      .id_to_node
      .get(id)
      .is_some_and(|&idx| self.graph[idx].is_local)
  }

  /// Number of local packages.
  pub fn len(&self) -> usize {
    self.graph.node_weights().filter(|node| node.is_local).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// All local packages, sorted.
  #[allow(dead_code)] // Inspection API, exercised by tests
  pub fn local_packages(&self) -> BTreeSet<String> {
    self
      .graph
      .node_weights()
      .filter(|node| node.is_local)
      .map(|node| node.id.clone())
      .collect()
  }

  /// Dependency set of a local package, or `None` if it isn't one.
  #[allow(dead_code)] // Inspection API, exercised by tests
  pub fn dependencies(&self, id: &str) -> Option<BTreeSet<String>> {
    let &idx = self.id_to_node.get(id)?;
    if !self.graph[idx].is_local {
      return None;
    }

    Some(
      self
        .graph
        .neighbors_directed(idx, Direction::Outgoing)
        .map(|dep| self.graph[dep].id.clone())
        .collect(),
    )
  }

  /// Local packages whose dependency set contains `id` verbatim.
  pub fn dependents_of(&self, id: &str) -> BTreeSet<String> {
    match self.id_to_node.get(id) {
      Some(&idx) => self.local_dependents(idx).collect(),
      None => BTreeSet::new(),
    }
  }

  /// Local packages depending on `module` itself or on any identifier under `module/`.
  pub fn dependents_of_module(&self, module: &str) -> BTreeSet<String> {
    let prefix = format!("{}/", module);

    self
      .graph
      .node_indices()
      .filter(|&idx| {
        let id = self.graph[idx].id.as_str();
        id == module || id.starts_with(&prefix)
      })
      .flat_map(|idx| self.local_dependents(idx))
      .collect()
  }

  fn local_dependents(&self, idx: NodeIndex) -> impl Iterator<Item = String> + '_ {
    self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .filter(|&dependent| self.graph[dependent].is_local)
      .map(|dependent| self.graph[dependent].id.clone())
  }
}
