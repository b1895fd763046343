use super::error::{ParseError, RecordContext, RecordErrorKind};
use super::perception;
use super::traits::ParseOptions;
use super::perception::BondPerception;
use crate::core::elements::registry::ElementRegistry;
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct PendingBond {
    serials: (usize, usize),
    order: BondOrder,
    line: usize,
}

/// Accumulates atoms and connectivity records while a file is read, then
/// resolves serial numbers into a [`MolecularGraph`].
///
/// Connectivity is kept in first-seen order and deduplicated by unordered
/// serial pair, so the symmetric listings most formats use produce one bond.
pub(crate) struct GraphBuilder<'a> {
    ctx: RecordContext<'a>,
    graph: MolecularGraph,
    serials: HashMap<usize, AtomId>,
    pending: Vec<PendingBond>,
    pending_index: HashMap<(usize, usize), usize>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(ctx: RecordContext<'a>) -> Self {
        Self {
            ctx,
            graph: MolecularGraph::new(),
            serials: HashMap::new(),
            pending: Vec::new(),
            pending_index: HashMap::new(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.graph.atom_count()
    }

    pub fn add_atom(&mut self, line: usize, atom: Atom) -> Result<AtomId, ParseError> {
        let serial = atom.serial;
        if self.serials.contains_key(&serial) {
            return Err(self
                .ctx
                .malformed(line, RecordErrorKind::DuplicateSerial(serial)));
        }
        let id = self.graph.insert_atom(atom);
        self.serials.insert(serial, id);
        Ok(id)
    }

    /// Records a bond. A repeated pair keeps the higher of the two orders.
    pub fn connect(
        &mut self,
        line: usize,
        a: usize,
        b: usize,
        order: BondOrder,
    ) -> Result<(), ParseError> {
        let index = self.pending_slot(line, a, b, order)?;
        let pending = &mut self.pending[index];
        if order.value() > pending.order.value() {
            pending.order = order;
        }
        Ok(())
    }

    /// Records a bond whose order is stated explicitly, replacing any earlier one.
    pub fn set_order(
        &mut self,
        line: usize,
        a: usize,
        b: usize,
        order: BondOrder,
    ) -> Result<(), ParseError> {
        let index = self.pending_slot(line, a, b, order)?;
        self.pending[index].order = order;
        Ok(())
    }

    fn pending_slot(
        &mut self,
        line: usize,
        a: usize,
        b: usize,
        order: BondOrder,
    ) -> Result<usize, ParseError> {
        if a == b {
            return Err(self.ctx.malformed(line, RecordErrorKind::SelfBond(a)));
        }
        let key = (a.min(b), a.max(b));
        if let Some(&index) = self.pending_index.get(&key) {
            return Ok(index);
        }
        let index = self.pending.len();
        self.pending.push(PendingBond {
            serials: key,
            order,
            line,
        });
        self.pending_index.insert(key, index);
        Ok(index)
    }

    fn resolve(&self, line: usize, serial: usize) -> Result<AtomId, ParseError> {
        self.serials
            .get(&serial)
            .copied()
            .ok_or_else(|| self.ctx.malformed(line, RecordErrorKind::UnknownAtomSerial(serial)))
    }

    /// Resolves the recorded connectivity and runs bond perception if asked to.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingAtoms`] for an empty structure, and a
    /// malformed-record error pointing at the connectivity line for bonds to
    /// serials that were never defined.
    pub fn finish(
        self,
        registry: &ElementRegistry,
        options: &ParseOptions,
    ) -> Result<MolecularGraph, ParseError> {
        if self.graph.is_empty() {
            return Err(ParseError::MissingAtoms {
                path: self.ctx.path.to_string(),
            });
        }

        let mut bonds = Vec::with_capacity(self.pending.len());
        for pending in &self.pending {
            let a = self.resolve(pending.line, pending.serials.0)?;
            let b = self.resolve(pending.line, pending.serials.1)?;
            bonds.push((a, b, pending.order, pending.line));
        }

        let has_connectivity = !bonds.is_empty();
        let ctx = self.ctx;
        let mut graph = self.graph;
        for (a, b, order, line) in bonds {
            graph.add_bond(a, b, order).map_err(|source| ParseError::Graph {
                path: ctx.path.to_string(),
                line,
                source,
            })?;
        }

        let perceive = match options.bond_perception {
            BondPerception::Always => true,
            BondPerception::Never => false,
            BondPerception::Auto => !has_connectivity,
        };
        if perceive {
            perception::perceive_bonds(&mut graph, registry, &options.perception).map_err(
                |source| ParseError::Perception {
                    path: ctx.path.to_string(),
                    source,
                },
            )?;
        }

        debug!(
            path = ctx.path,
            atoms = graph.atom_count(),
            bonds = graph.bond_count(),
            "Assembled molecular graph."
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(element: &str, serial: usize, x: f64) -> Atom {
        Atom::new(element, Point3::new(x, 0.0, 0.0)).with_serial(serial)
    }

    fn no_perception() -> ParseOptions {
        ParseOptions {
            bond_perception: BondPerception::Never,
            ..ParseOptions::default()
        }
    }

    #[test]
    fn symmetric_records_produce_one_bond_with_highest_order() {
        let registry = ElementRegistry::bundled().unwrap();
        let mut builder = GraphBuilder::new(RecordContext::new("test"));
        builder.add_atom(1, atom("C", 10, 0.0)).unwrap();
        builder.add_atom(2, atom("O", 20, 1.2)).unwrap();
        builder.connect(3, 10, 20, BondOrder::Single).unwrap();
        builder.connect(4, 20, 10, BondOrder::Double).unwrap();

        let graph = builder.finish(&registry, &no_perception()).unwrap();

        assert_eq!(graph.bond_count(), 1);
        assert_eq!(
            graph.bond_order_between(AtomId(0), AtomId(1)),
            Some(BondOrder::Double)
        );
    }

    #[test]
    fn set_order_overrides_recorded_order() {
        let registry = ElementRegistry::bundled().unwrap();
        let mut builder = GraphBuilder::new(RecordContext::new("test"));
        builder.add_atom(1, atom("C", 1, 0.0)).unwrap();
        builder.add_atom(2, atom("C", 2, 1.4)).unwrap();
        builder.connect(3, 1, 2, BondOrder::Double).unwrap();
        builder.set_order(4, 1, 2, BondOrder::Aromatic).unwrap();

        let graph = builder.finish(&registry, &no_perception()).unwrap();

        assert_eq!(
            graph.bond_order_between(AtomId(0), AtomId(1)),
            Some(BondOrder::Aromatic)
        );
    }

    #[test]
    fn duplicate_serial_and_self_bond_are_rejected() {
        let mut builder = GraphBuilder::new(RecordContext::new("test"));
        builder.add_atom(1, atom("C", 1, 0.0)).unwrap();

        let err = builder.add_atom(2, atom("C", 1, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed { line: 2, kind: RecordErrorKind::DuplicateSerial(1), .. }
        ));

        let err = builder.connect(5, 1, 1, BondOrder::Single).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed { line: 5, kind: RecordErrorKind::SelfBond(1), .. }
        ));
    }

    #[test]
    fn unknown_serial_reports_connectivity_line() {
        let registry = ElementRegistry::bundled().unwrap();
        let mut builder = GraphBuilder::new(RecordContext::new("test"));
        builder.add_atom(1, atom("C", 1, 0.0)).unwrap();
        builder.connect(7, 1, 99, BondOrder::Single).unwrap();

        let err = builder.finish(&registry, &no_perception()).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Malformed { line: 7, kind: RecordErrorKind::UnknownAtomSerial(99), .. }
        ));
    }

    #[test]
    fn empty_structure_is_missing_atoms() {
        let registry = ElementRegistry::bundled().unwrap();
        let builder = GraphBuilder::new(RecordContext::new("empty.pdb"));

        let err = builder.finish(&registry, &ParseOptions::default()).unwrap_err();

        assert!(matches!(err, ParseError::MissingAtoms { path } if path == "empty.pdb"));
    }

    #[test]
    fn auto_perception_runs_only_without_connectivity() {
        let registry = ElementRegistry::bundled().unwrap();

        let mut builder = GraphBuilder::new(RecordContext::new("test"));
        builder.add_atom(1, atom("C", 1, 0.0)).unwrap();
        builder.add_atom(2, atom("C", 2, 1.54)).unwrap();
        let graph = builder.finish(&registry, &ParseOptions::default()).unwrap();
        assert_eq!(graph.bond_count(), 1);

        let mut builder = GraphBuilder::new(RecordContext::new("test"));
        builder.add_atom(1, atom("C", 1, 0.0)).unwrap();
        builder.add_atom(2, atom("C", 2, 1.54)).unwrap();
        builder.add_atom(3, atom("C", 3, 3.08)).unwrap();
        builder.connect(4, 1, 2, BondOrder::Single).unwrap();
        let graph = builder.finish(&registry, &ParseOptions::default()).unwrap();
        assert_eq!(graph.bond_count(), 1);
    }
}
