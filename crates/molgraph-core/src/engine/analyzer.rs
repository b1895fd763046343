use super::config::AnalysisConfig;
use super::error::AnalysisError;
use super::groups::{annotate_groups, classify_groups};
use super::rings::{annotate_rings, find_rings};
use crate::core::models::graph::MolecularGraph;
use tracing::{info, instrument};

/// What an analysis run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub rings: usize,
    pub groups: usize,
    /// Whether ring detection ran.
    pub ring_detection: bool,
}

/// Annotates `graph` with rings (when `detect_rings` is set) and functional
/// groups, using the default rule set.
///
/// # Errors
///
/// Returns [`AnalysisError::InvariantViolation`] if the graph's adjacency and
/// bond set disagree.
pub fn analyze(graph: &mut MolecularGraph, detect_rings: bool) -> Result<AnalysisSummary, AnalysisError> {
    analyze_with(graph, &AnalysisConfig::new(detect_rings))
}

/// Annotates `graph` as described by `config`.
///
/// Previous annotations are cleared first, so running the analysis twice on an
/// unchanged graph yields identical tags.
///
/// # Errors
///
/// Returns [`AnalysisError::InvariantViolation`] if the graph's adjacency and
/// bond set disagree. The graph is left untouched in that case.
#[instrument(skip_all, name = "analyze", fields(atoms = graph.atom_count(), detect_rings = config.detect_rings))]
pub fn analyze_with(
    graph: &mut MolecularGraph,
    config: &AnalysisConfig,
) -> Result<AnalysisSummary, AnalysisError> {
    graph
        .verify_consistency()
        .map_err(AnalysisError::InvariantViolation)?;
    graph.clear_annotations();

    if config.detect_rings {
        let rings = find_rings(graph);
        annotate_rings(graph, rings);
    }
    if config.classify_groups {
        let groups = classify_groups(graph, config);
        annotate_groups(graph, groups);
    }

    let summary = AnalysisSummary {
        rings: graph.rings().len(),
        groups: graph.groups().len(),
        ring_detection: config.detect_rings,
    };
    info!(
        rings = summary.rings,
        groups = summary.groups,
        "Analysis complete."
    );
    Ok(summary)
}
