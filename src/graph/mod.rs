//! Package dependency graph and affected analysis
//!
//! Built on petgraph from the flat `go list` dependency report. The graph knows
//! nothing about how the report was produced.

pub mod affected;
pub mod dependency_graph;

pub use affected::AffectedAnalysis;
pub use dependency_graph::{DependencyGraph, ReportFormat};
