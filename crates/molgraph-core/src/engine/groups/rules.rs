//! The functional-group rule table.
//!
//! Rules are listed in evaluation priority. Earlier rules claim atoms first,
//! so overlapping patterns (an acid's OH against a plain hydroxyl, an ester's
//! carbonyl against a ketone) are resolved by position in [`RULES`].

use crate::core::models::annotations::{GroupKind, Ring, RingKind};
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;

/// A pattern hit: the anchor and every atom the group covers, anchor first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match {
    pub anchor: AtomId,
    pub atoms: Vec<AtomId>,
}

impl Match {
    fn new(anchor: AtomId, rest: impl IntoIterator<Item = AtomId>) -> Self {
        let mut atoms = vec![anchor];
        atoms.extend(rest);
        Self { anchor, atoms }
    }
}

pub(crate) type AtomMatcher = fn(&MatchContext<'_>, AtomId) -> Option<Match>;
pub(crate) type RingMatcher = fn(&MatchContext<'_>, &Ring) -> bool;

#[derive(Clone, Copy)]
pub(crate) enum Matcher {
    /// Tried on every atom in insertion order.
    Atom(AtomMatcher),
    /// Tried on every ring; a hit covers the ring atoms not yet claimed.
    Ring(RingMatcher),
}

pub(crate) struct Rule {
    pub kind: GroupKind,
    /// Only evaluated when ring detection ran.
    pub needs_rings: bool,
    pub matcher: Matcher,
}

/// Read-only view of the graph used by the matchers.
pub(crate) struct MatchContext<'a> {
    pub graph: &'a MolecularGraph,
    /// Rings found in this analysis, or `None` when ring detection is off.
    pub rings: Option<&'a [Ring]>,
}

impl<'a> MatchContext<'a> {
    pub fn new(graph: &'a MolecularGraph, rings: Option<&'a [Ring]>) -> Self {
        Self { graph, rings }
    }

    pub fn element(&self, id: AtomId) -> &'a str {
        self.graph.atom(id).map_or("", |a| a.element.as_str())
    }

    fn is(&self, id: AtomId, symbol: &str) -> bool {
        self.element(id) == symbol
    }

    fn is_hydrogen(&self, id: AtomId) -> bool {
        self.graph.atom(id).is_some_and(|a| a.is_hydrogen())
    }

    pub fn neighbors(&self, id: AtomId) -> &'a [AtomId] {
        self.graph.neighbors(id).unwrap_or_default()
    }

    fn order(&self, a: AtomId, b: AtomId) -> Option<BondOrder> {
        self.graph.bond_order_between(a, b)
    }

    /// Neighbours of `id` with the given element, joined by a bond of `order`.
    fn bonded(&self, id: AtomId, symbol: &str, order: BondOrder) -> impl Iterator<Item = AtomId> {
        self.neighbors(id)
            .iter()
            .copied()
            .filter(move |&n| self.is(n, symbol) && self.order(id, n) == Some(order))
    }

    fn hydrogens(&self, id: AtomId) -> Vec<AtomId> {
        self.neighbors(id)
            .iter()
            .copied()
            .filter(|&n| self.is_hydrogen(n))
            .collect()
    }

    fn heavy_neighbors(&self, id: AtomId) -> Vec<AtomId> {
        self.neighbors(id)
            .iter()
            .copied()
            .filter(|&n| !self.is_hydrogen(n))
            .collect()
    }

    fn only_single_bonds(&self, id: AtomId) -> bool {
        self.neighbors(id)
            .iter()
            .all(|&n| self.order(id, n) == Some(BondOrder::Single))
    }

    /// Aromatic by bond order, or by membership in an aromatic ring when rings
    /// are known.
    pub fn is_aromatic(&self, id: AtomId) -> bool {
        let by_bonds = self
            .neighbors(id)
            .iter()
            .any(|&n| self.order(id, n) == Some(BondOrder::Aromatic));
        by_bonds
            || self.rings.is_some_and(|rings| {
                rings
                    .iter()
                    .any(|ring| ring.kind.is_aromatic() && ring.contains(id))
            })
    }

    /// The `=O` partner of a carbonyl carbon.
    fn carbonyl_oxygen(&self, carbon: AtomId) -> Option<AtomId> {
        if !self.is(carbon, "C") {
            return None;
        }
        self.bonded(carbon, "O", BondOrder::Double).next()
    }
}

#[rustfmt::skip]
pub(crate) static RULES: &[Rule] = &[
    Rule { kind: GroupKind::Arene, needs_rings: true, matcher: Matcher::Ring(arene) },
    Rule { kind: GroupKind::Heteroarene, needs_rings: true, matcher: Matcher::Ring(heteroarene) },
    Rule { kind: GroupKind::CarboxylicAcid, needs_rings: false, matcher: Matcher::Atom(carboxylic_acid) },
    Rule { kind: GroupKind::Ester, needs_rings: false, matcher: Matcher::Atom(ester) },
    Rule { kind: GroupKind::Amide, needs_rings: false, matcher: Matcher::Atom(amide) },
    Rule { kind: GroupKind::Aldehyde, needs_rings: false, matcher: Matcher::Atom(aldehyde) },
    Rule { kind: GroupKind::Ketone, needs_rings: false, matcher: Matcher::Atom(ketone) },
    Rule { kind: GroupKind::Carbonyl, needs_rings: false, matcher: Matcher::Atom(carbonyl) },
    Rule { kind: GroupKind::Nitrile, needs_rings: false, matcher: Matcher::Atom(nitrile) },
    Rule { kind: GroupKind::Nitro, needs_rings: false, matcher: Matcher::Atom(nitro) },
    Rule { kind: GroupKind::Water, needs_rings: false, matcher: Matcher::Atom(water) },
    Rule { kind: GroupKind::Phenol, needs_rings: true, matcher: Matcher::Atom(phenol) },
    Rule { kind: GroupKind::Hydroxyl, needs_rings: false, matcher: Matcher::Atom(hydroxyl) },
    Rule { kind: GroupKind::Ether, needs_rings: false, matcher: Matcher::Atom(ether) },
    Rule { kind: GroupKind::Thiol, needs_rings: false, matcher: Matcher::Atom(thiol) },
    Rule { kind: GroupKind::Thioether, needs_rings: false, matcher: Matcher::Atom(thioether) },
    Rule { kind: GroupKind::Amine, needs_rings: false, matcher: Matcher::Atom(amine) },
    Rule { kind: GroupKind::Halide, needs_rings: false, matcher: Matcher::Atom(halide) },
    Rule { kind: GroupKind::Alkyne, needs_rings: false, matcher: Matcher::Atom(alkyne) },
    Rule { kind: GroupKind::Alkene, needs_rings: false, matcher: Matcher::Atom(alkene) },
    Rule { kind: GroupKind::Methyl, needs_rings: false, matcher: Matcher::Atom(methyl) },
];

fn arene(_: &MatchContext<'_>, ring: &Ring) -> bool {
    ring.kind == RingKind::Aromatic
}

fn heteroarene(_: &MatchContext<'_>, ring: &Ring) -> bool {
    ring.kind == RingKind::Heteroaromatic
}

fn carboxylic_acid(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    let o_double = ctx.carbonyl_oxygen(c)?;
    ctx.bonded(c, "O", BondOrder::Single).find_map(|o| {
        let hydrogens = ctx.hydrogens(o);
        (ctx.neighbors(o).len() == 2 && hydrogens.len() == 1)
            .then(|| Match::new(c, [o_double, o, hydrogens[0]]))
    })
}

fn ester(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    let o_double = ctx.carbonyl_oxygen(c)?;
    ctx.bonded(c, "O", BondOrder::Single)
        .find(|&o| {
            let neighbors = ctx.neighbors(o);
            neighbors.len() == 2
                && neighbors
                    .iter()
                    .all(|&n| ctx.is(n, "C") && ctx.order(o, n) == Some(BondOrder::Single))
        })
        .map(|o| Match::new(c, [o_double, o]))
}

fn amide(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    let o_double = ctx.carbonyl_oxygen(c)?;
    let n = ctx.bonded(c, "N", BondOrder::Single).next()?;
    Some(Match::new(c, [o_double, n].into_iter().chain(ctx.hydrogens(n))))
}

fn aldehyde(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    let o_double = ctx.carbonyl_oxygen(c)?;
    let h = ctx.hydrogens(c).into_iter().next()?;
    Some(Match::new(c, [o_double, h]))
}

fn ketone(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    let o_double = ctx.carbonyl_oxygen(c)?;
    (ctx.bonded(c, "C", BondOrder::Single).count() == 2).then(|| Match::new(c, [o_double]))
}

fn carbonyl(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    ctx.carbonyl_oxygen(c).map(|o| Match::new(c, [o]))
}

fn nitrile(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    if !ctx.is(c, "C") {
        return None;
    }
    ctx.bonded(c, "N", BondOrder::Triple)
        .next()
        .map(|n| Match::new(c, [n]))
}

fn nitro(ctx: &MatchContext<'_>, n: AtomId) -> Option<Match> {
    if !ctx.is(n, "N") {
        return None;
    }
    let oxygens: Vec<AtomId> = ctx
        .neighbors(n)
        .iter()
        .copied()
        .filter(|&o| ctx.is(o, "O"))
        .collect();
    (oxygens.len() == 2).then(|| Match::new(n, oxygens))
}

fn water(ctx: &MatchContext<'_>, o: AtomId) -> Option<Match> {
    if !ctx.is(o, "O") || ctx.neighbors(o).len() != 2 {
        return None;
    }
    let hydrogens = ctx.hydrogens(o);
    (hydrogens.len() == 2).then(|| Match::new(o, hydrogens))
}

/// `X` bonded by single bonds to exactly one carbon and one hydrogen.
fn carbon_and_hydrogen(ctx: &MatchContext<'_>, x: AtomId, symbol: &str) -> Option<(AtomId, AtomId)> {
    if !ctx.is(x, symbol) || ctx.neighbors(x).len() != 2 || !ctx.only_single_bonds(x) {
        return None;
    }
    let carbon = ctx.neighbors(x).iter().copied().find(|&n| ctx.is(n, "C"))?;
    let hydrogen = ctx.hydrogens(x).into_iter().next()?;
    Some((carbon, hydrogen))
}

/// `X` bonded by single bonds to exactly two carbons.
fn two_carbons(ctx: &MatchContext<'_>, x: AtomId, symbol: &str) -> bool {
    ctx.is(x, symbol)
        && ctx.neighbors(x).len() == 2
        && ctx.only_single_bonds(x)
        && ctx.neighbors(x).iter().all(|&n| ctx.is(n, "C"))
}

fn phenol(ctx: &MatchContext<'_>, o: AtomId) -> Option<Match> {
    let (carbon, hydrogen) = carbon_and_hydrogen(ctx, o, "O")?;
    ctx.is_aromatic(carbon).then(|| Match::new(o, [hydrogen]))
}

fn hydroxyl(ctx: &MatchContext<'_>, o: AtomId) -> Option<Match> {
    carbon_and_hydrogen(ctx, o, "O").map(|(_, h)| Match::new(o, [h]))
}

fn ether(ctx: &MatchContext<'_>, o: AtomId) -> Option<Match> {
    two_carbons(ctx, o, "O").then(|| Match::new(o, []))
}

fn thiol(ctx: &MatchContext<'_>, s: AtomId) -> Option<Match> {
    carbon_and_hydrogen(ctx, s, "S").map(|(_, h)| Match::new(s, [h]))
}

fn thioether(ctx: &MatchContext<'_>, s: AtomId) -> Option<Match> {
    two_carbons(ctx, s, "S").then(|| Match::new(s, []))
}

fn amine(ctx: &MatchContext<'_>, n: AtomId) -> Option<Match> {
    let qualifies = ctx.is(n, "N")
        && ctx.only_single_bonds(n)
        && ctx.neighbors(n).iter().any(|&c| ctx.is(c, "C"))
        && !ctx.is_aromatic(n);
    qualifies.then(|| Match::new(n, ctx.hydrogens(n)))
}

fn halide(ctx: &MatchContext<'_>, x: AtomId) -> Option<Match> {
    if !matches!(ctx.element(x), "F" | "Cl" | "Br" | "I") {
        return None;
    }
    match ctx.neighbors(x) {
        [c] if ctx.is(*c, "C") && ctx.order(x, *c) == Some(BondOrder::Single) => {
            Some(Match::new(x, []))
        }
        _ => None,
    }
}

fn alkyne(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    if !ctx.is(c, "C") {
        return None;
    }
    ctx.bonded(c, "C", BondOrder::Triple)
        .next()
        .map(|partner| Match::new(c, [partner]))
}

fn alkene(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    if !ctx.is(c, "C") || ctx.is_aromatic(c) {
        return None;
    }
    ctx.bonded(c, "C", BondOrder::Double)
        .find(|&partner| !ctx.is_aromatic(partner))
        .map(|partner| Match::new(c, [partner]))
}

fn methyl(ctx: &MatchContext<'_>, c: AtomId) -> Option<Match> {
    if !ctx.is(c, "C") || ctx.neighbors(c).len() != 4 {
        return None;
    }
    let hydrogens = ctx.hydrogens(c);
    (hydrogens.len() == 3 && ctx.heavy_neighbors(c).len() == 1).then(|| Match::new(c, hydrogens))
}
