use super::cycle_space::{CycleBasis, EdgeSet};
use crate::core::models::annotations::{Ring, RingKind};
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::{AtomId, BondId, RingId};
use crate::core::models::topology::BondOrder;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Longest cycle looked for in the first search stage. Later stages double it
/// until the component's rank is reached.
const INITIAL_CYCLE_LIMIT: usize = 8;

/// Core bonds of one component in canonical order, and their positions in
/// that component's edge space.
struct EdgeIndex {
    endpoints: Vec<(AtomId, AtomId)>,
    positions: HashMap<BondId, usize>,
}

impl EdgeIndex {
    fn new(graph: &MolecularGraph, bond_ids: impl IntoIterator<Item = BondId>) -> Self {
        let mut endpoints = Vec::new();
        let mut positions = HashMap::new();
        for id in bond_ids {
            if let Some(bond) = graph.bond(id) {
                positions.insert(id, endpoints.len());
                endpoints.push((bond.atom1_id, bond.atom2_id));
            }
        }
        Self {
            endpoints,
            positions,
        }
    }

    fn len(&self) -> usize {
        self.endpoints.len()
    }

    fn between(&self, graph: &MolecularGraph, a: AtomId, b: AtomId) -> Option<usize> {
        graph
            .bond_between(a, b)
            .and_then(|id| self.positions.get(&id).copied())
    }

    /// Edge set of a closed atom cycle.
    fn cycle_edges(&self, graph: &MolecularGraph, atoms: &[AtomId]) -> Option<EdgeSet> {
        let mut set = EdgeSet::new(self.len());
        for (i, &a) in atoms.iter().enumerate() {
            let b = atoms[(i + 1) % atoms.len()];
            set.toggle(self.between(graph, a, b)?);
        }
        Some(set)
    }
}

/// A breadth-first spanning forest. Roots are their own parents.
struct SpanningForest {
    parent: Vec<AtomId>,
    depth: Vec<usize>,
    component: Vec<usize>,
    /// Atoms of each component in discovery order.
    components: Vec<Vec<AtomId>>,
}

impl SpanningForest {
    fn build(graph: &MolecularGraph) -> Self {
        let n = graph.atom_count();
        let mut forest = Self {
            parent: (0..n).map(AtomId).collect(),
            depth: vec![0; n],
            component: vec![usize::MAX; n],
            components: Vec::new(),
        };

        for root in graph.atom_ids() {
            if forest.component[root.0] != usize::MAX {
                continue;
            }
            let index = forest.components.len();
            let mut members = vec![root];
            forest.component[root.0] = index;
            let mut queue = VecDeque::from([root]);
            while let Some(atom) = queue.pop_front() {
                for &next in graph.neighbors(atom).unwrap_or_default() {
                    if forest.component[next.0] == usize::MAX {
                        forest.component[next.0] = index;
                        forest.parent[next.0] = atom;
                        forest.depth[next.0] = forest.depth[atom.0] + 1;
                        members.push(next);
                        queue.push_back(next);
                    }
                }
            }
            forest.components.push(members);
        }
        forest
    }

    fn is_tree_edge(&self, a: AtomId, b: AtomId) -> bool {
        (self.parent[a.0] == b && a != b) || (self.parent[b.0] == a && a != b)
    }

    /// The cycle a non-tree edge `(u, v)` closes: `u` up to the lowest common
    /// ancestor, then down to `v`.
    fn fundamental_cycle(&self, u: AtomId, v: AtomId) -> Vec<AtomId> {
        let (mut a, mut b) = (u, v);
        let mut left = vec![a];
        let mut right = vec![b];
        while self.depth[a.0] > self.depth[b.0] {
            a = self.parent[a.0];
            left.push(a);
        }
        while self.depth[b.0] > self.depth[a.0] {
            b = self.parent[b.0];
            right.push(b);
        }
        while a != b {
            a = self.parent[a.0];
            left.push(a);
            b = self.parent[b.0];
            right.push(b);
        }
        right.pop();
        left.extend(right.into_iter().rev());
        left
    }
}

/// Atoms left after repeatedly pruning atoms with at most one remaining
/// neighbour. Every cycle lies inside it.
fn cyclic_core(graph: &MolecularGraph) -> Vec<bool> {
    let n = graph.atom_count();
    let mut in_core = vec![true; n];
    let mut degree: Vec<usize> = graph.atom_ids().map(|a| graph.degree(a).unwrap_or(0)).collect();
    let mut queue: VecDeque<AtomId> = graph.atom_ids().filter(|a| degree[a.0] <= 1).collect();
    while let Some(atom) = queue.pop_front() {
        if !in_core[atom.0] {
            continue;
        }
        in_core[atom.0] = false;
        for &next in graph.neighbors(atom).unwrap_or_default() {
            if in_core[next.0] {
                degree[next.0] -= 1;
                if degree[next.0] == 1 {
                    queue.push_back(next);
                }
            }
        }
    }
    in_core
}

/// Depth-limited BFS tree over core atoms, reused between roots. Only the
/// atoms reached by the last search are reset.
struct Ball {
    depth: Vec<usize>,
    parent: Vec<Option<AtomId>>,
    reached: Vec<AtomId>,
}

impl Ball {
    fn new(atom_count: usize) -> Self {
        Self {
            depth: vec![usize::MAX; atom_count],
            parent: vec![None; atom_count],
            reached: Vec::new(),
        }
    }

    fn contains(&self, atom: AtomId) -> bool {
        self.depth[atom.0] != usize::MAX
    }

    fn grow(&mut self, graph: &MolecularGraph, root: AtomId, in_core: &[bool], max_depth: usize) {
        for atom in self.reached.drain(..) {
            self.depth[atom.0] = usize::MAX;
            self.parent[atom.0] = None;
        }
        self.depth[root.0] = 0;
        self.reached.push(root);
        let mut cursor = 0;
        while let Some(&atom) = self.reached.get(cursor) {
            cursor += 1;
            if self.depth[atom.0] == max_depth {
                continue;
            }
            for &next in graph.neighbors(atom).unwrap_or_default() {
                if in_core[next.0] && !self.contains(next) {
                    self.depth[next.0] = self.depth[atom.0] + 1;
                    self.parent[next.0] = Some(atom);
                    self.reached.push(next);
                }
            }
        }
    }

    fn path_to_root(&self, start: AtomId) -> Vec<AtomId> {
        let mut path = vec![start];
        let mut current = start;
        while let Some(up) = self.parent[current.0] {
            path.push(up);
            current = up;
        }
        path
    }

    /// Horton candidates of at most `max_len` atoms through the root: every
    /// core edge `x - y` inside the ball but outside its tree closes
    /// `root -> x, x - y, y -> root`, kept when the two tree paths leave the
    /// root through different branches.
    fn horton_candidates(
        &self,
        graph: &MolecularGraph,
        edges: &EdgeIndex,
        max_len: usize,
        out: &mut Vec<Vec<AtomId>>,
    ) {
        let mut inner: Vec<usize> = self
            .reached
            .iter()
            .flat_map(|&x| {
                graph
                    .neighbors(x)
                    .unwrap_or_default()
                    .iter()
                    .filter(move |&&y| self.contains(y))
                    .filter_map(move |&y| edges.between(graph, x, y))
            })
            .collect();
        inner.sort_unstable();
        inner.dedup();

        for position in inner {
            let (x, y) = edges.endpoints[position];
            if self.parent[x.0] == Some(y)
                || self.parent[y.0] == Some(x)
                || self.depth[x.0] + self.depth[y.0] + 1 > max_len
            {
                continue;
            }
            let left = self.path_to_root(x);
            let right = self.path_to_root(y);
            // Non-tree edges never touch the root, so both paths have at least
            // two atoms.
            if left[left.len() - 2] == right[right.len() - 2] {
                continue;
            }
            let mut cycle: Vec<AtomId> = left.into_iter().rev().collect();
            cycle.extend(&right[..right.len() - 1]);
            out.push(cycle);
        }
    }
}

/// Rotates a cycle to start at its lowest atom id and to continue toward the
/// smaller of that atom's two ring neighbours.
pub(crate) fn normalize_cycle(mut atoms: Vec<AtomId>) -> Vec<AtomId> {
    let Some(start) = atoms
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
    else {
        return atoms;
    };
    atoms.rotate_left(start);
    let n = atoms.len();
    if n > 2 && atoms[n - 1] < atoms[1] {
        atoms[1..].reverse();
    }
    atoms
}

/// Rings of a search together with how many candidate cycles were examined.
pub(crate) struct RingSearch {
    pub rings: Vec<Ring>,
    pub candidates: usize,
}

/// Finds a minimum cycle basis of the bond graph.
///
/// Each connected component contributes exactly `E - V + 1` rings, and every
/// ring is as short as the cycle space allows. Rings are numbered in the order
/// they are accepted: by component, then by length. Ring kinds are assigned
/// here; tagging atoms and bonds is left to the analyzer.
pub fn find_rings(graph: &MolecularGraph) -> Vec<Ring> {
    search_rings(graph).rings
}

/// Candidates are Horton cycles (a shortest path from a root to each end of an
/// edge) plus the fundamental cycles of the spanning forest, fed to the basis
/// shortest first. The search runs in stages with a growing length limit, so
/// small rings only ever look at a small neighbourhood of each atom. The
/// fundamental cycles guarantee the rank is reached once the limit covers the
/// longest of them.
pub(crate) fn search_rings(graph: &MolecularGraph) -> RingSearch {
    let forest = SpanningForest::build(graph);
    let in_core = cyclic_core(graph);
    let mut ball = Ball::new(graph.atom_count());

    let mut bonds_by_component: Vec<Vec<BondId>> = vec![Vec::new(); forest.components.len()];
    for id in graph.sorted_bond_ids() {
        if let Some(bond) = graph.bond(id) {
            bonds_by_component[forest.component[bond.atom1_id.0]].push(id);
        }
    }

    let mut cycles: Vec<Vec<AtomId>> = Vec::new();
    let mut total_candidates = 0;

    for (index, members) in forest.components.iter().enumerate() {
        let bonds = &bonds_by_component[index];
        let rank = (bonds.len() + 1).saturating_sub(members.len());
        if rank == 0 {
            continue;
        }

        let edges = EdgeIndex::new(
            graph,
            bonds.iter().copied().filter(|&id| {
                graph
                    .bond(id)
                    .is_some_and(|b| in_core[b.atom1_id.0] && in_core[b.atom2_id.0])
            }),
        );
        let fundamental: Vec<Vec<AtomId>> = edges
            .endpoints
            .iter()
            .filter(|(a, b)| !forest.is_tree_edge(*a, *b))
            .map(|&(a, b)| forest.fundamental_cycle(a, b))
            .collect();
        let longest = fundamental.iter().map(Vec::len).max().unwrap_or(0);
        let mut roots: Vec<AtomId> = members.iter().copied().filter(|a| in_core[a.0]).collect();
        roots.sort_unstable();

        let mut seen: HashSet<EdgeSet> = HashSet::new();
        let mut basis = CycleBasis::new();
        let mut max_len = INITIAL_CYCLE_LIMIT.min(longest);
        let mut stages = 0;
        loop {
            stages += 1;
            let mut candidates: Vec<Vec<AtomId>> = Vec::new();
            for &root in &roots {
                ball.grow(graph, root, &in_core, max_len / 2);
                ball.horton_candidates(graph, &edges, max_len, &mut candidates);
            }
            candidates.extend(fundamental.iter().filter(|c| c.len() <= max_len).cloned());
            candidates.sort_by_key(Vec::len);
            total_candidates += candidates.len();

            for cycle in candidates {
                if basis.rank() == rank {
                    break;
                }
                let Some(edge_set) = edges.cycle_edges(graph, &cycle) else {
                    continue;
                };
                if !seen.insert(edge_set.clone()) {
                    continue;
                }
                if basis.insert(&edge_set) {
                    cycles.push(normalize_cycle(cycle));
                }
            }

            if basis.rank() == rank || max_len >= longest {
                break;
            }
            max_len = (max_len * 2).min(longest);
        }

        debug!(
            component = index,
            atoms = members.len(),
            bonds = bonds.len(),
            rank,
            stages,
            cycle_limit = max_len,
            "Ring search finished for component."
        );
    }

    let mut rings: Vec<Ring> = cycles
        .into_iter()
        .enumerate()
        .map(|(i, atoms)| {
            let bonds = (0..atoms.len())
                .filter_map(|k| graph.bond_between(atoms[k], atoms[(k + 1) % atoms.len()]))
                .collect();
            Ring {
                id: RingId(i),
                atoms,
                bonds,
                kind: RingKind::Carbocycle,
            }
        })
        .collect();

    let ring_bonds: HashSet<BondId> = rings.iter().flat_map(|r| r.bonds.iter().copied()).collect();
    for ring in &mut rings {
        ring.kind = classify_ring(graph, ring, &ring_bonds);
    }
    RingSearch {
        rings,
        candidates: total_candidates,
    }
}

/// Whether `atom` has a double bond that belongs to some ring.
fn has_ring_double_bond(graph: &MolecularGraph, atom: AtomId, ring_bonds: &HashSet<BondId>) -> bool {
    graph.neighbors(atom).unwrap_or_default().iter().any(|&next| {
        graph.bond_between(atom, next).is_some_and(|id| {
            ring_bonds.contains(&id)
                && graph.bond(id).is_some_and(|b| b.order == BondOrder::Double)
        })
    })
}

/// Aromatic when every ring bond is aromatic, when all six members of a
/// six-ring carry a ring double bond, or when four members of a five-ring do
/// and the fifth is N, O or S. Hetero when any member is not carbon.
pub(crate) fn classify_ring(graph: &MolecularGraph, ring: &Ring, ring_bonds: &HashSet<BondId>) -> RingKind {
    let element = |id: AtomId| graph.atom(id).map_or("", |a| a.element.as_str());
    let hetero = ring.atoms.iter().any(|&id| element(id) != "C");

    let all_aromatic_bonds = !ring.bonds.is_empty()
        && ring
            .bonds
            .iter()
            .all(|&id| graph.bond(id).is_some_and(|b| b.order == BondOrder::Aromatic));
    let aromatic = all_aromatic_bonds || {
        let (with_double, without): (Vec<AtomId>, Vec<AtomId>) = ring
            .atoms
            .iter()
            .partition(|&&id| has_ring_double_bond(graph, id, ring_bonds));
        match (ring.len(), without.as_slice()) {
            (6, []) => true,
            (5, [lone]) => with_double.len() == 4 && matches!(element(*lone), "N" | "O" | "S"),
            _ => false,
        }
    };

    match (aromatic, hetero) {
        (true, false) => RingKind::Aromatic,
        (true, true) => RingKind::Heteroaromatic,
        (false, false) => RingKind::Carbocycle,
        (false, true) => RingKind::Heterocycle,
    }
}

/// Writes ring ids onto the atoms and bonds of each ring and stores the rings
/// on the graph.
pub(crate) fn annotate_rings(graph: &mut MolecularGraph, rings: Vec<Ring>) {
    for ring in &rings {
        for &atom in &ring.atoms {
            if let Some(tags) = graph.atom_tags_mut(atom) {
                tags.rings.insert(ring.id);
            }
        }
        for &bond in &ring.bonds {
            if let Some(tags) = graph.bond_tags_mut(bond) {
                tags.rings.insert(ring.id);
            }
        }
    }
    graph.set_rings(rings);
}
