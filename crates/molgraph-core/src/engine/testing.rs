//! Small graph constructors shared by the engine tests.

use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;

pub(crate) use BondOrder::{Aromatic as Ar, Double as D, Single as S, Triple as T};

/// Builds a graph from element symbols and `(i, j, order)` bonds. Positions
/// are spread along x so that nothing depends on geometry.
pub(crate) fn molecule(elements: &[&str], bonds: &[(usize, usize, BondOrder)]) -> MolecularGraph {
    let mut graph = MolecularGraph::new();
    for (i, element) in elements.iter().enumerate() {
        graph.add_atom(element, Point3::new(i as f64, 0.0, 0.0), None);
    }
    for &(a, b, order) in bonds {
        graph
            .add_bond(AtomId(a), AtomId(b), order)
            .expect("test bonds must be valid");
    }
    graph
}

/// A ring of `n` carbons, `0-1-...-(n-1)-0`.
pub(crate) fn carbon_ring(n: usize) -> MolecularGraph {
    let elements = vec!["C"; n];
    let bonds: Vec<_> = (0..n).map(|i| (i, (i + 1) % n, S)).collect();
    molecule(&elements, &bonds)
}

/// Kekulé benzene with explicit hydrogens: carbons 0..6, hydrogens 6..12.
pub(crate) fn benzene() -> MolecularGraph {
    let mut elements = vec!["C"; 6];
    elements.extend(["H"; 6]);
    let mut bonds = vec![(0, 1, D), (1, 2, S), (2, 3, D), (3, 4, S), (4, 5, D), (5, 0, S)];
    bonds.extend((0..6).map(|i| (i, i + 6, S)));
    molecule(&elements, &bonds)
}

pub(crate) fn ids(indices: &[usize]) -> Vec<AtomId> {
    indices.iter().map(|&i| AtomId(i)).collect()
}
