use crate::core::elements::registry::ElementRegistry;
use crate::core::io::{self, error::ParseError, format::StructureFormat};
use crate::core::models::graph::MolecularGraph;
use crate::engine::config::Settings;
use crate::engine::error::AnalysisError;
use crate::engine::progress::{Outcome, Progress, ProgressReporter};
use crate::engine::analyze_with;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// One structure file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureJob {
    pub path: PathBuf,
    pub format: StructureFormat,
}

impl StructureJob {
    pub fn new(path: impl Into<PathBuf>, format: StructureFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Creates a job whose format follows the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        Ok(Self::new(path, StructureFormat::from_path(path)?))
    }
}

/// Parses and analyzes one structure file.
///
/// # Errors
///
/// Returns [`WorkflowError::Parse`] if the file cannot be read or is invalid,
/// and [`WorkflowError::Analysis`] if the parsed graph fails its consistency
/// check.
#[instrument(skip_all, name = "analysis_workflow", fields(path = %job.path.display()))]
pub fn run(
    job: &StructureJob,
    registry: &ElementRegistry,
    settings: &Settings,
) -> Result<MolecularGraph, WorkflowError> {
    let mut graph = io::parse_with(&job.path, job.format, registry, &settings.parse_options())?;
    analyze_with(&mut graph, &settings.analysis_config())?;
    Ok(graph)
}

/// Processes independent files. Results come back in job order.
pub fn run_batch(
    jobs: &[StructureJob],
    registry: &ElementRegistry,
    settings: &Settings,
) -> Vec<Result<MolecularGraph, WorkflowError>> {
    run_batch_with_progress(jobs, registry, settings, &ProgressReporter::new())
}

/// Like [`run_batch`], reporting a [`Progress::StructureFinished`] event as
/// each file completes.
#[instrument(skip_all, name = "batch_workflow", fields(jobs = jobs.len()))]
pub fn run_batch_with_progress(
    jobs: &[StructureJob],
    registry: &ElementRegistry,
    settings: &Settings,
    reporter: &ProgressReporter,
) -> Vec<Result<MolecularGraph, WorkflowError>> {
    reporter.report(Progress::BatchStarted { jobs: jobs.len() });

    let process = |(index, job): (usize, &StructureJob)| {
        let result = run(job, registry, settings);
        if let Err(e) = &result {
            warn!(path = %job.path.display(), error = %e, "Structure failed.");
        }
        if !reporter.is_silent() {
            reporter.report(Progress::StructureFinished {
                index,
                outcome: outcome_of(job, &result),
            });
        }
        result
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = jobs.iter().enumerate().map(process).collect();

    #[cfg(feature = "parallel")]
    let results: Vec<_> = jobs.par_iter().enumerate().map(process).collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let failed = results.len() - succeeded;
    reporter.report(Progress::BatchFinished { succeeded, failed });
    info!(succeeded, failed, "Batch complete.");
    results
}

fn outcome_of(job: &StructureJob, result: &Result<MolecularGraph, WorkflowError>) -> Outcome {
    match result {
        Ok(graph) => Outcome::Analyzed {
            atoms: graph.atom_count(),
            bonds: graph.bond_count(),
            rings: graph.rings().len(),
            groups: graph.groups().len(),
        },
        Err(e) => Outcome::Failed(format!("{}: {e}", job.path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotations::GroupKind;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const PHENOL_PDB: &str = "\
HETATM    1  C1  PHN     1       1.390   0.000   0.000  1.00  0.00           C
HETATM    2  C2  PHN     1       0.695   1.204   0.000  1.00  0.00           C
HETATM    3  C3  PHN     1      -0.695   1.204   0.000  1.00  0.00           C
HETATM    4  C4  PHN     1      -1.390   0.000   0.000  1.00  0.00           C
HETATM    5  C5  PHN     1      -0.695  -1.204   0.000  1.00  0.00           C
HETATM    6  C6  PHN     1       0.695  -1.204   0.000  1.00  0.00           C
HETATM    7  O1  PHN     1       2.750   0.000   0.000  1.00  0.00           O
HETATM    8  HO  PHN     1       3.070   0.900   0.000  1.00  0.00           H
CONECT    1    2    2    6    7
CONECT    2    1    1    3
CONECT    3    2    4    4
CONECT    4    3    3    5
CONECT    5    4    6    6
CONECT    6    5    5    1
CONECT    7    1    8
CONECT    8    7
END
";

    const WATER_XYZ: &str = "3\nwater\nO 0.000 0.000 0.000\nH 0.957 0.000 0.000\nH -0.240 0.927 0.000\n";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    #[test]
    fn run_parses_and_annotates() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = write(&dir, "phenol.pdb", PHENOL_PDB);
        let registry = ElementRegistry::bundled().unwrap();

        let graph = run(&StructureJob::from_path(&path).unwrap(), &registry, &Settings::default()).unwrap();

        assert_eq!(graph.atom_count(), 8);
        assert_eq!(graph.bond_count(), 8);
        assert_eq!(graph.rings().len(), 1);
        let kinds: Vec<GroupKind> = graph.groups().iter().map(|g| g.kind).collect();
        assert_eq!(kinds, [GroupKind::Arene, GroupKind::Phenol]);
    }

    #[test]
    fn settings_reach_parser_and_analyzer() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = write(&dir, "phenol.pdb", PHENOL_PDB);
        let registry = ElementRegistry::bundled().unwrap();
        let mut settings = Settings::default();
        settings.analysis.detect_rings = false;

        let graph = run(&StructureJob::new(&path, StructureFormat::Pdb), &registry, &settings).unwrap();

        assert!(graph.rings().is_empty());
        assert_eq!(graph.groups()[0].kind, GroupKind::Hydroxyl);
    }

    #[test]
    fn batch_keeps_job_order_and_isolates_failures() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let registry = ElementRegistry::bundled().unwrap();
        let jobs = vec![
            StructureJob::from_path(write(&dir, "phenol.pdb", PHENOL_PDB)).unwrap(),
            StructureJob::new(dir.path().join("missing.pdb"), StructureFormat::Pdb),
            StructureJob::from_path(write(&dir, "water.xyz", WATER_XYZ)).unwrap(),
        ];
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            events.lock().unwrap().push(event);
        }));

        let results = run_batch_with_progress(&jobs, &registry, &Settings::default(), &reporter);
        drop(reporter);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().atom_count(), 8);
        assert!(matches!(
            results[1],
            Err(WorkflowError::Parse(ParseError::Io { .. }))
        ));
        let water = results[2].as_ref().unwrap();
        assert_eq!(water.groups()[0].kind, GroupKind::Water);

        let events = events.into_inner().unwrap();
        assert_eq!(events.first(), Some(&Progress::BatchStarted { jobs: 3 }));
        assert_eq!(
            events.last(),
            Some(&Progress::BatchFinished { succeeded: 2, failed: 1 })
        );
        let mut finished: Vec<(usize, &Outcome)> = events
            .iter()
            .filter_map(|e| match e {
                Progress::StructureFinished { index, outcome } => Some((*index, outcome)),
                _ => None,
            })
            .collect();
        finished.sort_by_key(|(index, _)| *index);
        assert_eq!(finished.len(), 3);
        assert_eq!(
            finished[0].1,
            &Outcome::Analyzed { atoms: 8, bonds: 8, rings: 1, groups: 2 }
        );
        assert!(matches!(finished[1].1, Outcome::Failed(text) if text.contains("missing.pdb")));
        assert!(finished[2].1.is_success());
    }

    #[test]
    fn unknown_extension_is_rejected_when_building_a_job() {
        let err = StructureJob::from_path("ligand.mol2").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }
}
