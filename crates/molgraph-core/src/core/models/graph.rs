use super::annotations::{FunctionalGroup, Ring};
use super::atom::{Atom, AtomTags};
use super::ids::{AtomId, BondId};
use super::topology::{Bond, BondOrder, BondTags};
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Why a bond could not be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidBondReason {
    SelfBond,
    UnknownAtom(AtomId),
    Duplicate,
}

impl fmt::Display for InvalidBondReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfBond => write!(f, "an atom cannot be bonded to itself"),
            Self::UnknownAtom(id) => write!(f, "atom {} does not exist", id),
            Self::Duplicate => write!(f, "the atoms are already bonded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Invalid bond between {a} and {b}: {reason}")]
    InvalidBond {
        a: AtomId,
        b: AtomId,
        reason: InvalidBondReason,
    },
    #[error("Unknown atom id {0}")]
    UnknownAtom(AtomId),
}

/// The molecular structure graph.
///
/// Atoms are stored in insertion order and addressed by sequential [`AtomId`]s.
/// Bonds live in a slot map; a pair index and per-atom adjacency lists are kept
/// in step with it by every mutating method, so the bond set and the adjacency
/// never disagree.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    atoms: Vec<Atom>,
    bonds: SlotMap<BondId, Bond>,
    /// Unordered pair (low, high) to bond.
    bond_index: HashMap<(AtomId, AtomId), BondId>,
    /// Neighbors of each atom, in bond insertion order.
    adjacency: Vec<Vec<AtomId>>,
    rings: Vec<Ring>,
    groups: Vec<FunctionalGroup>,
}

fn pair_key(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl MolecularGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(atoms: usize, bonds: usize) -> Self {
        Self {
            atoms: Vec::with_capacity(atoms),
            bonds: SlotMap::with_capacity_and_key(bonds),
            bond_index: HashMap::with_capacity(bonds),
            adjacency: Vec::with_capacity(atoms),
            rings: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Adds an atom and returns its id, the next sequential one.
    ///
    /// # Arguments
    ///
    /// * `element` - Canonical element symbol. Validation against the element
    ///   registry is the caller's job.
    /// * `position` - Cartesian coordinates in Angstroms.
    /// * `charge` - Optional formal or partial charge.
    pub fn add_atom(&mut self, element: &str, position: Point3<f64>, charge: Option<f64>) -> AtomId {
        let serial = self.atoms.len() + 1;
        self.insert_atom(
            Atom::new(element, position)
                .with_serial(serial)
                .with_charge(charge),
        )
    }

    /// Inserts a fully populated atom. Its id is overwritten with the next one.
    pub fn insert_atom(&mut self, mut atom: Atom) -> AtomId {
        let id = AtomId(self.atoms.len());
        atom.id = id;
        atom.tags = AtomTags::default();
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        id
    }

    /// Adds a bond between two existing, distinct, not yet bonded atoms.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidBond`] for self bonds, unknown atoms and
    /// duplicate pairs. The graph is left untouched in every failure case.
    pub fn add_bond(&mut self, a: AtomId, b: AtomId, order: BondOrder) -> Result<BondId, GraphError> {
        let invalid = |reason| GraphError::InvalidBond { a, b, reason };
        if a == b {
            return Err(invalid(InvalidBondReason::SelfBond));
        }
        for id in [a, b] {
            if !self.contains_atom(id) {
                return Err(invalid(InvalidBondReason::UnknownAtom(id)));
            }
        }
        let key = pair_key(a, b);
        if self.bond_index.contains_key(&key) {
            return Err(invalid(InvalidBondReason::Duplicate));
        }

        let bond_id = self.bonds.insert(Bond::new(a, b, order));
        self.bond_index.insert(key, bond_id);
        self.adjacency[a.0].push(b);
        self.adjacency[b.0].push(a);
        Ok(bond_id)
    }

    /// Removes a bond and updates the adjacency in the same step.
    ///
    /// Rings and groups depend on the bond set, so all annotations are cleared.
    pub fn remove_bond(&mut self, bond_id: BondId) -> Option<Bond> {
        let bond = self.bonds.remove(bond_id)?;
        self.bond_index.remove(&bond.key());
        self.adjacency[bond.atom1_id.0].retain(|&n| n != bond.atom2_id);
        self.adjacency[bond.atom2_id.0].retain(|&n| n != bond.atom1_id);
        self.clear_annotations();
        Some(bond)
    }

    pub fn contains_atom(&self, id: AtomId) -> bool {
        id.0 < self.atoms.len()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id.0)
    }

    /// Atoms in insertion order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn atom_ids(&self) -> impl Iterator<Item = AtomId> + use<> {
        (0..self.atoms.len()).map(AtomId)
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id)
    }

    pub fn bonds(&self) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds.iter()
    }

    /// Bond ids ordered by their endpoints, for output that must not depend on
    /// slot reuse.
    pub fn sorted_bond_ids(&self) -> Vec<BondId> {
        let mut ids: Vec<(AtomId, AtomId, BondId)> = self
            .bonds
            .iter()
            .map(|(id, bond)| (bond.atom1_id, bond.atom2_id, id))
            .collect();
        ids.sort_unstable_by_key(|&(a, b, _)| (a, b));
        ids.into_iter().map(|(_, _, id)| id).collect()
    }

    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<BondId> {
        self.bond_index.get(&pair_key(a, b)).copied()
    }

    pub fn bond_order_between(&self, a: AtomId, b: AtomId) -> Option<BondOrder> {
        self.bond_between(a, b)
            .and_then(|id| self.bonds.get(id))
            .map(|bond| bond.order)
    }

    /// Neighbors of an atom, each listed once, in bond insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAtom`] if the id is not part of the graph.
    pub fn neighbors(&self, id: AtomId) -> Result<&[AtomId], GraphError> {
        self.adjacency
            .get(id.0)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownAtom(id))
    }

    pub fn degree(&self, id: AtomId) -> Result<usize, GraphError> {
        self.neighbors(id).map(<[AtomId]>::len)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn groups(&self) -> &[FunctionalGroup] {
        &self.groups
    }

    /// Cross-checks adjacency, pair index and bond set.
    ///
    /// Returns a description of the first mismatch found. A graph only built
    /// through the public methods always passes.
    pub fn verify_consistency(&self) -> Result<(), String> {
        if self.adjacency.len() != self.atoms.len() {
            return Err(format!(
                "adjacency covers {} atoms but the graph holds {}",
                self.adjacency.len(),
                self.atoms.len()
            ));
        }
        if self.bond_index.len() != self.bonds.len() {
            return Err(format!(
                "pair index holds {} entries for {} bonds",
                self.bond_index.len(),
                self.bonds.len()
            ));
        }

        for (bond_id, bond) in &self.bonds {
            let (a, b) = bond.key();
            if a == b || !self.contains_atom(a) || !self.contains_atom(b) {
                return Err(format!("bond {:?} has invalid endpoints {} and {}", bond_id, a, b));
            }
            if self.bond_index.get(&(a, b)) != Some(&bond_id) {
                return Err(format!("bond {} - {} is missing from the pair index", a, b));
            }
            if !self.adjacency[a.0].contains(&b) || !self.adjacency[b.0].contains(&a) {
                return Err(format!("bond {} - {} is missing from the adjacency", a, b));
            }
        }

        let mut half_edges = 0;
        for (index, neighbors) in self.adjacency.iter().enumerate() {
            let atom = AtomId(index);
            for (position, &neighbor) in neighbors.iter().enumerate() {
                if neighbors[..position].contains(&neighbor) {
                    return Err(format!("{} lists neighbor {} twice", atom, neighbor));
                }
                if self.bond_between(atom, neighbor).is_none() {
                    return Err(format!("adjacency {} - {} has no bond", atom, neighbor));
                }
            }
            half_edges += neighbors.len();
        }
        if half_edges != 2 * self.bonds.len() {
            return Err(format!(
                "adjacency holds {} half-edges for {} bonds",
                half_edges,
                self.bonds.len()
            ));
        }
        Ok(())
    }

    pub(crate) fn clear_annotations(&mut self) {
        for atom in &mut self.atoms {
            atom.tags = AtomTags::default();
        }
        for (_, bond) in self.bonds.iter_mut() {
            bond.tags = BondTags::default();
        }
        self.rings.clear();
        self.groups.clear();
    }

    pub(crate) fn atom_tags_mut(&mut self, id: AtomId) -> Option<&mut AtomTags> {
        self.atoms.get_mut(id.0).map(|atom| &mut atom.tags)
    }

    pub(crate) fn bond_tags_mut(&mut self, id: BondId) -> Option<&mut BondTags> {
        self.bonds.get_mut(id).map(|bond| &mut bond.tags)
    }

    pub(crate) fn set_rings(&mut self, rings: Vec<Ring>) {
        self.rings = rings;
    }

    pub(crate) fn set_groups(&mut self, groups: Vec<FunctionalGroup>) {
        self.groups = groups;
    }

    /// Drops the last adjacency entry of `atom` behind the bond set's back.
    #[cfg(test)]
    pub(crate) fn corrupt_adjacency(&mut self, atom: AtomId) {
        if let Some(neighbors) = self.adjacency.get_mut(atom.0) {
            neighbors.pop();
        }
    }
}
