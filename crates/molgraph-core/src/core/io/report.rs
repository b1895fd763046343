use crate::core::models::graph::MolecularGraph;
use itertools::Itertools;
use std::io::{self, Write};

/// Writes a human-readable listing of an analyzed graph.
///
/// Atoms come first in insertion order, followed by bonds, rings and groups.
/// The output depends only on the graph, so two runs over the same input are
/// byte-identical.
pub fn write_listing(graph: &MolecularGraph, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "# atoms={} bonds={} rings={} groups={}",
        graph.atom_count(),
        graph.bond_count(),
        graph.rings().len(),
        graph.groups().len()
    )?;

    for atom in graph.atoms() {
        let charge = atom
            .charge
            .map_or_else(|| "-".to_string(), |c| format!("{:.4}", c));
        writeln!(
            writer,
            "ATOM  {:<6} {:<2} {:<5} {:>5} {:>10.4} {:>10.4} {:>10.4} {:>8}  [{}]",
            atom.id().to_string(),
            atom.element,
            atom.name,
            atom.serial,
            atom.position.x,
            atom.position.y,
            atom.position.z,
            charge,
            atom.tags().labels().iter().join(",")
        )?;
    }

    for bond_id in graph.sorted_bond_ids() {
        let Some(bond) = graph.bond(bond_id) else {
            continue;
        };
        writeln!(
            writer,
            "BOND  {:<6} {:<6} {:<8}  [{}]",
            bond.atom1_id.to_string(),
            bond.atom2_id.to_string(),
            bond.order.to_string(),
            bond.tags().labels().iter().join(",")
        )?;
    }

    for ring in graph.rings() {
        writeln!(
            writer,
            "RING  {:<6} {:<15} {}",
            ring.id.to_string(),
            ring.kind.to_string(),
            ring.atoms.iter().join("-")
        )?;
    }

    for group in graph.groups() {
        writeln!(
            writer,
            "GROUP {:<6} {:<15} anchor={} atoms={}",
            group.id.to_string(),
            group.kind.to_string(),
            group.anchor,
            group.atoms.iter().join(",")
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::BondOrder;
    use nalgebra::Point3;

    fn listing(graph: &MolecularGraph) -> String {
        let mut buffer = Vec::new();
        write_listing(graph, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn lists_atoms_then_bonds() {
        let mut graph = MolecularGraph::new();
        let c = graph.add_atom("C", Point3::new(0.0, 0.0, 0.0), None);
        let o = graph.add_atom("O", Point3::new(1.43, 0.0, 0.0), Some(-0.5));
        graph.add_bond(c, o, BondOrder::Single).unwrap();

        let text = listing(&graph);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# atoms=2 bonds=1 rings=0 groups=0");
        assert!(lines[1].starts_with("ATOM  a0     C  C"));
        assert!(lines[1].ends_with("-  []"));
        assert!(lines[2].contains("-0.5000"));
        assert!(lines[3].starts_with("BOND  a0     a1     Single"));
    }

    #[test]
    fn listing_is_deterministic() {
        let mut graph = MolecularGraph::new();
        let ids: Vec<_> = (0..4)
            .map(|i| graph.add_atom("C", Point3::new(i as f64 * 1.5, 0.0, 0.0), None))
            .collect();
        for pair in ids.windows(2) {
            graph.add_bond(pair[0], pair[1], BondOrder::Single).unwrap();
        }

        assert_eq!(listing(&graph), listing(&graph.clone()));
    }
}
