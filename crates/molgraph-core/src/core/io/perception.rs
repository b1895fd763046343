use crate::core::elements::registry::{ElementRegistry, UnknownElementError};
use crate::core::models::graph::{GraphError, MolecularGraph};
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use kiddo::{KdTree, SquaredEuclidean};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// When a reader infers bonds from interatomic distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondPerception {
    /// Only when the file carries no connectivity records at all.
    #[default]
    Auto,
    /// Always, adding any pair the file did not already bond.
    Always,
    /// Never. Files without connectivity yield bond-free graphs.
    Never,
}

/// Distance criteria for bond perception.
///
/// Two atoms are bonded when their distance `d` satisfies
/// `min_distance < d <= tolerance * (r_cov(a) + r_cov(b))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionConfig {
    pub tolerance: f64,
    pub min_distance: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.2,
            min_distance: 0.4,
        }
    }
}

#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error(transparent)]
    UnknownElement(#[from] UnknownElementError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Adds single bonds between every pair of atoms within bonding distance.
///
/// Pairs that are already bonded are left alone. New bonds are added in
/// ascending `(i, j)` atom order, so the result does not depend on the spatial
/// index layout.
///
/// # Return
///
/// The number of bonds added.
pub fn perceive_bonds(
    graph: &mut MolecularGraph,
    registry: &ElementRegistry,
    config: &PerceptionConfig,
) -> Result<usize, PerceptionError> {
    if graph.atom_count() < 2 {
        return Ok(0);
    }

    let radii: Vec<f64> = graph
        .atoms()
        .map(|atom| registry.lookup(&atom.element).map(|r| r.covalent_radius))
        .collect::<Result<_, _>>()?;
    let positions: Vec<[f64; 3]> = graph
        .atoms()
        .map(|atom| [atom.position.x, atom.position.y, atom.position.z])
        .collect();

    let max_radius = radii.iter().copied().fold(0.0_f64, f64::max);
    let search_radius = 2.0 * max_radius * config.tolerance;
    let search_radius_sq = search_radius * search_radius;
    let min_distance_sq = config.min_distance * config.min_distance;

    let tree: KdTree<f64, 3> = (&positions).into();

    let mut added = 0;
    for i in 0..positions.len() {
        let mut candidates: Vec<usize> = tree
            .within::<SquaredEuclidean>(&positions[i], search_radius_sq)
            .into_iter()
            .map(|neighbour| neighbour.item as usize)
            .filter(|&j| j > i)
            .collect();
        candidates.sort_unstable();

        for j in candidates {
            let cutoff = config.tolerance * (radii[i] + radii[j]);
            let distance_sq = squared_distance(&positions[i], &positions[j]);
            if distance_sq <= min_distance_sq || distance_sq > cutoff * cutoff {
                continue;
            }
            let (a, b) = (AtomId::from(i), AtomId::from(j));
            if graph.bond_between(a, b).is_none() {
                graph.add_bond(a, b, BondOrder::Single)?;
                added += 1;
            }
        }
    }

    debug!(atoms = positions.len(), bonds_added = added, "Perceived bonds from distances.");
    Ok(added)
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(p, q)| (p - q).powi(2)).sum()
}
