use super::error::{ParseError, RecordContext};
use super::format::StructureFormat;
use super::perception::{BondPerception, PerceptionConfig};
use crate::core::elements::registry::ElementRegistry;
use crate::core::models::graph::MolecularGraph;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reader-side knobs shared by every format.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParseOptions {
    pub bond_perception: BondPerception,
    pub perception: PerceptionConfig,
}

/// Defines the interface for reading a structure file into a [`MolecularGraph`].
///
/// Implementors handle format-specific record parsing. Element symbols are
/// validated against the supplied registry, and every error carries the
/// `origin` name so callers can report where it happened.
pub trait StructureReader {
    /// The format this reader understands.
    const FORMAT: StructureFormat;

    /// Reads a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `origin` - Name of the source, used in error messages.
    /// * `registry` - Element data used to validate symbols and perceive bonds.
    /// * `options` - Bond perception settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if a record is malformed, an element is unknown
    /// or the source holds no atoms.
    fn read_from(
        reader: &mut impl BufRead,
        origin: &str,
        registry: &ElementRegistry,
        options: &ParseOptions,
    ) -> Result<MolecularGraph, ParseError>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be opened, or any error
    /// [`StructureReader::read_from`] raises.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        registry: &ElementRegistry,
        options: &ParseOptions,
    ) -> Result<MolecularGraph, ParseError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|e| RecordContext::new(&origin).io(e))?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, &origin, registry, options)
    }
}
