//! Functional-group classification.
//!
//! Groups are found by a fixed, ordered rule table (`rules::RULES`). Each
//! rule is tried on every anchor candidate in insertion order; a hit claims
//! its atoms, and later hits that touch a claimed atom are dropped. The first
//! rule to claim an atom therefore decides its group. Ring rules are the
//! exception: a ring fused to an already claimed ring claims its remaining
//! atoms.

pub(crate) mod rules;

use super::config::AnalysisConfig;
use crate::core::models::annotations::{FunctionalGroup, GroupKind};
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::GroupId;
use itertools::Itertools;
use rules::{Match, MatchContext, Matcher, RULES};
use tracing::trace;

/// Runs the rule table over `graph`.
///
/// Ring-context rules only run when `config.detect_rings` is set, in which case
/// the rings already stored on the graph are used.
pub fn classify_groups(graph: &MolecularGraph, config: &AnalysisConfig) -> Vec<FunctionalGroup> {
    let rings = config.detect_rings.then(|| graph.rings());
    let ctx = MatchContext::new(graph, rings);
    let mut claimed = vec![false; graph.atom_count()];
    let mut groups: Vec<FunctionalGroup> = Vec::new();

    let mut claim = |kind: GroupKind, hit: Match, claimed: &mut Vec<bool>| {
        if hit.atoms.iter().any(|a| claimed[a.index()]) {
            trace!(%kind, anchor = %hit.anchor, "Match overlaps a claimed atom, skipping.");
            return;
        }
        for atom in &hit.atoms {
            claimed[atom.index()] = true;
        }
        groups.push(FunctionalGroup {
            id: GroupId(groups.len()),
            kind,
            anchor: hit.anchor,
            atoms: hit.atoms,
        });
    };

    for rule in RULES {
        if !config.is_group_enabled(rule.kind) || (rule.needs_rings && rings.is_none()) {
            continue;
        }
        match rule.matcher {
            Matcher::Ring(matches) => {
                for ring in rings.unwrap_or_default() {
                    if !matches(&ctx, ring) {
                        continue;
                    }
                    // Fused rings share atoms; each ring group keeps only the
                    // atoms no earlier group took.
                    let free: Vec<_> = ring
                        .atoms
                        .iter()
                        .copied()
                        .filter(|a| !claimed[a.index()])
                        .collect();
                    let Some(&anchor) = free.first() else {
                        continue;
                    };
                    claim(rule.kind, Match { anchor, atoms: free }, &mut claimed);
                }
            }
            Matcher::Atom(matches) => {
                for atom in graph.atom_ids() {
                    if claimed[atom.index()] {
                        continue;
                    }
                    if let Some(hit) = matches(&ctx, atom) {
                        claim(rule.kind, hit, &mut claimed);
                    }
                }
            }
        }
    }
    groups
}

/// Tags group atoms, and bonds joining two atoms of the same group, then
/// stores the groups on the graph.
pub(crate) fn annotate_groups(graph: &mut MolecularGraph, groups: Vec<FunctionalGroup>) {
    for group in &groups {
        let tag = group.tag();
        for &atom in &group.atoms {
            if let Some(tags) = graph.atom_tags_mut(atom) {
                tags.group = Some(tag);
            }
        }
        for (a, b) in group.atoms.iter().tuple_combinations() {
            if let Some(bond) = graph.bond_between(*a, *b) {
                if let Some(tags) = graph.bond_tags_mut(bond) {
                    tags.group = Some(tag);
                }
            }
        }
    }
    graph.set_groups(groups);
}
