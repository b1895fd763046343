use super::error::ParseError;
use phf::{Map, phf_map};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Structure file formats understood by the readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    /// Protein Data Bank records: ATOM/HETATM plus optional CONECT.
    Pdb,
    /// BioGraf records: ATOM/HETATM plus CONECT/ORDER.
    Bgf,
    /// Plain XYZ coordinates, no connectivity.
    Xyz,
}

/// Accepted format tags, including the legacy aliases for PDB.
static FORMAT_TAGS: Map<&'static str, StructureFormat> = phf_map! {
    "pdb" => StructureFormat::Pdb,
    "pdb_1" => StructureFormat::Pdb,
    "true_pdb" => StructureFormat::Pdb,
    "ent" => StructureFormat::Pdb,
    "bgf" => StructureFormat::Bgf,
    "xyz" => StructureFormat::Xyz,
};

impl StructureFormat {
    /// Resolves a format tag case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedFormat`] for unknown tags.
    pub fn from_tag(tag: &str) -> Result<Self, ParseError> {
        FORMAT_TAGS
            .get(tag.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ParseError::UnsupportedFormat(tag.to_string()))
    }

    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ParseError::UnsupportedFormat(path.display().to_string()))
            .and_then(Self::from_tag)
    }

    /// The canonical tag for this format.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Pdb => "pdb",
            Self::Bgf => "bgf",
            Self::Xyz => "xyz",
        }
    }
}

impl FromStr for StructureFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
