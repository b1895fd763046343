use super::annotations::GroupTag;
use super::ids::{AtomId, RingId};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Numeric bond order; aromatic bonds count as 1.5.
    pub fn value(self) -> f64 {
        match self {
            Self::Single => 1.0,
            Self::Double => 2.0,
            Self::Triple => 3.0,
            Self::Aromatic => 1.5,
        }
    }

    /// Maps a record multiplicity (how many times a partner is listed) to an order.
    pub fn from_multiplicity(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            _ => None,
        }
    }

    /// Whether the bond contributes a pi bond (double, triple or aromatic).
    pub fn is_unsaturated(self) -> bool {
        !matches!(self, Self::Single)
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "1.5" | "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// Derived annotations attached to a bond by the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondTags {
    pub rings: BTreeSet<RingId>,
    pub group: Option<GroupTag>,
}

impl BondTags {
    pub fn is_ring_bond(&self) -> bool {
        !self.rings.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty() && self.group.is_none()
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.rings.iter().map(|r| r.to_string()).collect();
        if let Some(group) = &self.group {
            labels.push(group.label());
        }
        labels
    }
}

/// An undirected bond. Endpoints are stored in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub atom1_id: AtomId, // lower endpoint
    pub atom2_id: AtomId, // higher endpoint
    pub order: BondOrder,
    pub(crate) tags: BondTags,
}

impl Bond {
    pub fn new(a: AtomId, b: AtomId, order: BondOrder) -> Self {
        let (atom1_id, atom2_id) = if a <= b { (a, b) } else { (b, a) };
        Self {
            atom1_id,
            atom2_id,
            order,
            tags: BondTags::default(),
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// Returns the endpoint opposite to `atom_id`, if `atom_id` is an endpoint.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }

    pub fn key(&self) -> (AtomId, AtomId) {
        (self.atom1_id, self.atom2_id)
    }

    pub fn tags(&self) -> &BondTags {
        &self.tags
    }
}
