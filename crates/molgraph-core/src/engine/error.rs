use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The graph's adjacency and bond set disagree. This is a bug in whatever
    /// mutated the graph, never a property of the input file.
    #[error("Graph invariant violated: {0}")]
    InvariantViolation(String),
}
