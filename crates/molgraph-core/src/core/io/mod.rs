//! Reading structure files into [`MolecularGraph`]s.
//!
//! Each supported format has a reader implementing [`traits::StructureReader`].
//! [`parse`] and [`parse_with`] pick the reader from a format tag, validate
//! element symbols against an [`ElementRegistry`], and infer bonds from
//! interatomic distances when the file carries no connectivity.

mod builder;
pub mod bgf;
pub mod error;
mod fields;
pub mod format;
pub mod pdb;
pub mod perception;
pub mod report;
pub mod traits;
pub mod xyz;

use crate::core::elements::registry::ElementRegistry;
use crate::core::models::graph::MolecularGraph;
use bgf::BgfFile;
use error::ParseError;
use format::StructureFormat;
use pdb::PdbFile;
use std::path::Path;
use tracing::{info, instrument};
use traits::{ParseOptions, StructureReader};
use xyz::XyzFile;

/// Parses a structure file selected by format tag (`"pdb"`, `"pdb_1"`,
/// `"true_pdb"`, `"bgf"`, `"xyz"`) with default options.
///
/// # Errors
///
/// Returns [`ParseError::UnsupportedFormat`] for an unknown tag, otherwise
/// whatever the reader raises.
pub fn parse<P: AsRef<Path>>(
    path: P,
    format: &str,
    registry: &ElementRegistry,
) -> Result<MolecularGraph, ParseError> {
    let format = StructureFormat::from_tag(format)?;
    parse_with(path, format, registry, &ParseOptions::default())
}

#[instrument(skip_all, name = "parse", fields(path = %path.as_ref().display(), format = %format))]
pub fn parse_with<P: AsRef<Path>>(
    path: P,
    format: StructureFormat,
    registry: &ElementRegistry,
    options: &ParseOptions,
) -> Result<MolecularGraph, ParseError> {
    let path = path.as_ref();
    let graph = match format {
        StructureFormat::Pdb => PdbFile::read_from_path(path, registry, options)?,
        StructureFormat::Bgf => BgfFile::read_from_path(path, registry, options)?,
        StructureFormat::Xyz => XyzFile::read_from_path(path, registry, options)?,
    };
    info!(
        atoms = graph.atom_count(),
        bonds = graph.bond_count(),
        "Parsed structure."
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BENZENE_XYZ: &str = "\
12
benzene
C   1.3970   0.0000   0.0000
C   0.6985   1.2098   0.0000
C  -0.6985   1.2098   0.0000
C  -1.3970   0.0000   0.0000
C  -0.6985  -1.2098   0.0000
C   0.6985  -1.2098   0.0000
H   2.4810   0.0000   0.0000
H   1.2405   2.1486   0.0000
H  -1.2405   2.1486   0.0000
H  -2.4810   0.0000   0.0000
H  -1.2405  -2.1486   0.0000
H   1.2405  -2.1486   0.0000
";

    #[test]
    fn parse_dispatches_on_format_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benzene.xyz");
        fs::write(&path, BENZENE_XYZ).unwrap();
        let registry = ElementRegistry::bundled().unwrap();

        let graph = parse(&path, "xyz", &registry).unwrap();

        assert_eq!(graph.atom_count(), 12);
        assert_eq!(graph.bond_count(), 12);
    }

    #[test]
    fn unknown_tag_fails_before_reading() {
        let registry = ElementRegistry::bundled().unwrap();

        let err = parse("does-not-exist.mol2", "mol2", &registry).unwrap_err();

        assert!(matches!(err, ParseError::UnsupportedFormat(tag) if tag == "mol2"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ElementRegistry::bundled().unwrap();

        let err = parse(dir.path().join("absent.pdb"), "pdb_1", &registry).unwrap_err();

        assert!(matches!(err, ParseError::Io { .. }));
    }
}
