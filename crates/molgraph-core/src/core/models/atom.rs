use super::annotations::GroupTag;
use super::ids::{AtomId, RingId};
use nalgebra::Point3;
use std::collections::BTreeSet;

/// Derived annotations attached to an atom by the analyzer.
///
/// Tags are recomputed on every analysis run and never edited by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomTags {
    /// Rings this atom belongs to.
    pub rings: BTreeSet<RingId>,
    /// The functional group this atom was classified into, if any.
    pub group: Option<GroupTag>,
}

impl AtomTags {
    pub fn is_in_ring(&self) -> bool {
        !self.rings.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty() && self.group.is_none()
    }

    /// Renders the tags as stable, human-readable labels.
    ///
    /// Ring labels come first in ring order, followed by the group label.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.rings.iter().map(|r| r.to_string()).collect();
        if let Some(group) = &self.group {
            labels.push(group.label());
        }
        labels
    }
}

/// Represents an atom of a molecular graph.
///
/// The element symbol is stored in canonical form (`"Cl"`, not `"CL"`) and acts
/// as a key into the element registry the graph was parsed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Identifier within the owning graph. Assigned by the graph on insertion.
    pub(crate) id: AtomId,
    /// Canonical element symbol (e.g., "C", "Cl").
    pub element: String,
    /// Atom name as given by the source file (e.g., "C1", "OH").
    pub name: String,
    /// Serial number as given by the source file.
    pub serial: usize,
    /// Residue name, for formats that carry one.
    pub residue_name: Option<String>,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Formal or partial charge, when the file supplies one.
    pub charge: Option<f64>,
    pub(crate) tags: AtomTags,
}

impl Atom {
    /// Creates an atom with the given element and position.
    ///
    /// The name defaults to the element symbol and the serial to zero; readers
    /// overwrite both with what the file provides.
    pub fn new(element: &str, position: Point3<f64>) -> Self {
        Self {
            id: AtomId(0),
            element: element.to_string(),
            name: element.to_string(),
            serial: 0,
            residue_name: None,
            position,
            charge: None,
            tags: AtomTags::default(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_serial(mut self, serial: usize) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_charge(mut self, charge: Option<f64>) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_residue_name(mut self, residue_name: Option<&str>) -> Self {
        self.residue_name = residue_name.map(str::to_string);
        self
    }

    pub fn id(&self) -> AtomId {
        self.id
    }

    pub fn tags(&self) -> &AtomTags {
        &self.tags
    }

    pub fn is_element(&self, symbol: &str) -> bool {
        self.element == symbol
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == "H" || self.element == "D"
    }

    pub fn is_carbon(&self) -> bool {
        self.element == "C"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotations::GroupKind;
    use crate::core::models::ids::GroupId;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new("C", Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.element, "C");
        assert_eq!(atom.name, "C");
        assert_eq!(atom.serial, 0);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.charge, None);
        assert!(atom.residue_name.is_none());
        assert!(atom.tags().is_empty());
    }

    #[test]
    fn builder_methods_override_file_fields() {
        let atom = Atom::new("O", Point3::origin())
            .with_name("OH")
            .with_serial(17)
            .with_charge(Some(-0.4))
            .with_residue_name(Some("SER"));

        assert_eq!(atom.name, "OH");
        assert_eq!(atom.serial, 17);
        assert_eq!(atom.charge, Some(-0.4));
        assert_eq!(atom.residue_name.as_deref(), Some("SER"));
    }

    #[test]
    fn hydrogen_and_deuterium_count_as_hydrogen() {
        assert!(Atom::new("H", Point3::origin()).is_hydrogen());
        assert!(Atom::new("D", Point3::origin()).is_hydrogen());
        assert!(!Atom::new("He", Point3::origin()).is_hydrogen());
    }

    #[test]
    fn labels_list_rings_before_group() {
        let mut tags = AtomTags::default();
        tags.rings.insert(RingId(1));
        tags.rings.insert(RingId(0));
        tags.group = Some(GroupTag {
            id: GroupId(4),
            kind: GroupKind::Hydroxyl,
        });

        assert!(tags.is_in_ring());
        assert_eq!(tags.labels(), vec!["ring0", "ring1", "hydroxyl#4"]);
    }
}
