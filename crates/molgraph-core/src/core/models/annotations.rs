use super::ids::{AtomId, BondId, GroupId, RingId};
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical classification of a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKind {
    Aromatic,
    Heteroaromatic,
    Carbocycle,
    Heterocycle,
}

impl RingKind {
    pub fn is_aromatic(self) -> bool {
        matches!(self, Self::Aromatic | Self::Heteroaromatic)
    }
}

impl fmt::Display for RingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Aromatic => "aromatic",
                Self::Heteroaromatic => "heteroaromatic",
                Self::Carbocycle => "carbocycle",
                Self::Heterocycle => "heterocycle",
            }
        )
    }
}

/// A ring of the minimal cycle basis.
///
/// `atoms` is the cyclic sequence: consecutive entries are bonded, and the last
/// entry is bonded to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub id: RingId,
    pub atoms: Vec<AtomId>,
    pub bonds: Vec<BondId>,
    pub kind: RingKind,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms.contains(&atom_id)
    }
}

/// Functional group kinds, in no particular order.
///
/// The evaluation priority lives in the rule table of the analyzer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Arene,
    Heteroarene,
    CarboxylicAcid,
    Ester,
    Amide,
    Aldehyde,
    Ketone,
    Carbonyl,
    Nitrile,
    Nitro,
    Water,
    Phenol,
    Hydroxyl,
    Ether,
    Thiol,
    Thioether,
    Amine,
    Halide,
    Alkyne,
    Alkene,
    Methyl,
}

impl GroupKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Arene => "arene",
            Self::Heteroarene => "heteroarene",
            Self::CarboxylicAcid => "carboxylic_acid",
            Self::Ester => "ester",
            Self::Amide => "amide",
            Self::Aldehyde => "aldehyde",
            Self::Ketone => "ketone",
            Self::Carbonyl => "carbonyl",
            Self::Nitrile => "nitrile",
            Self::Nitro => "nitro",
            Self::Water => "water",
            Self::Phenol => "phenol",
            Self::Hydroxyl => "hydroxyl",
            Self::Ether => "ether",
            Self::Thiol => "thiol",
            Self::Thioether => "thioether",
            Self::Amine => "amine",
            Self::Halide => "halide",
            Self::Alkyne => "alkyne",
            Self::Alkene => "alkene",
            Self::Methyl => "methyl",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("Invalid functional group name '{0}'")]
pub struct ParseGroupKindError(pub String);

static GROUP_NAMES: Map<&'static str, GroupKind> = phf_map! {
    "arene" => GroupKind::Arene,
    "heteroarene" => GroupKind::Heteroarene,
    "carboxylic_acid" => GroupKind::CarboxylicAcid,
    "ester" => GroupKind::Ester,
    "amide" => GroupKind::Amide,
    "aldehyde" => GroupKind::Aldehyde,
    "ketone" => GroupKind::Ketone,
    "carbonyl" => GroupKind::Carbonyl,
    "nitrile" => GroupKind::Nitrile,
    "nitro" => GroupKind::Nitro,
    "water" => GroupKind::Water,
    "phenol" => GroupKind::Phenol,
    "hydroxyl" => GroupKind::Hydroxyl,
    "ether" => GroupKind::Ether,
    "thiol" => GroupKind::Thiol,
    "thioether" => GroupKind::Thioether,
    "amine" => GroupKind::Amine,
    "halide" => GroupKind::Halide,
    "alkyne" => GroupKind::Alkyne,
    "alkene" => GroupKind::Alkene,
    "methyl" => GroupKind::Methyl,
};

impl FromStr for GroupKind {
    type Err = ParseGroupKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        GROUP_NAMES
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| ParseGroupKindError(s.to_string()))
    }
}

/// Group membership as recorded on atoms and bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupTag {
    pub id: GroupId,
    pub kind: GroupKind,
}

impl GroupTag {
    pub fn label(&self) -> String {
        format!("{}#{}", self.kind, self.id.index())
    }
}

/// A classified functional group: a connected set of atoms around an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalGroup {
    pub id: GroupId,
    pub kind: GroupKind,
    pub anchor: AtomId,
    pub atoms: Vec<AtomId>,
}

impl FunctionalGroup {
    pub fn tag(&self) -> GroupTag {
        GroupTag {
            id: self.id,
            kind: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_kind_names_round_trip_through_from_str() {
        assert_eq!("hydroxyl".parse::<GroupKind>().unwrap(), GroupKind::Hydroxyl);
        assert_eq!(
            "Carboxylic-Acid".parse::<GroupKind>().unwrap(),
            GroupKind::CarboxylicAcid
        );
        assert_eq!(GroupKind::CarboxylicAcid.to_string(), "carboxylic_acid");
        assert!("sulfonamide".parse::<GroupKind>().is_err());
    }

    #[test]
    fn ring_kind_aromaticity() {
        assert!(RingKind::Aromatic.is_aromatic());
        assert!(RingKind::Heteroaromatic.is_aromatic());
        assert!(!RingKind::Carbocycle.is_aromatic());
        assert_eq!(RingKind::Heterocycle.to_string(), "heterocycle");
    }

    #[test]
    fn group_tag_label_combines_kind_and_id() {
        let group = FunctionalGroup {
            id: GroupId(3),
            kind: GroupKind::Carbonyl,
            anchor: AtomId(0),
            atoms: vec![AtomId(0), AtomId(1)],
        };
        assert_eq!(group.tag().label(), "carbonyl#3");
    }
}
