use super::builder::GraphBuilder;
use super::error::{ParseError, RecordContext, RecordErrorKind};
use super::fields::{parse_float, parse_int, slice_and_trim};
use super::format::StructureFormat;
use super::traits::{ParseOptions, StructureReader};
use crate::core::elements::registry::{ElementRegistry, UnknownElementError};
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::io::BufRead;
use tracing::warn;

/// Coordinates end at column 54; anything shorter cannot hold an atom.
const MIN_ATOM_RECORD_LEN: usize = 54;

pub struct PdbFile;

impl StructureReader for PdbFile {
    const FORMAT: StructureFormat = StructureFormat::Pdb;

    fn read_from(
        reader: &mut impl BufRead,
        origin: &str,
        registry: &ElementRegistry,
        options: &ParseOptions,
    ) -> Result<MolecularGraph, ParseError> {
        let ctx = RecordContext::new(origin);
        let mut builder = GraphBuilder::new(ctx);
        // Set at the first ENDMDL that closes a non-empty model. Coordinates of
        // later models are skipped, but CONECT records usually follow the last
        // model and still apply.
        let mut first_model_done = false;

        for (index, line_res) in reader.lines().enumerate() {
            let line_num = index + 1;
            let line = line_res.map_err(|e| ctx.io(e))?;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "ATOM" | "HETATM" if !first_model_done => {
                    let atom = parse_atom_record(&ctx, line_num, &line, registry)?;
                    builder.add_atom(line_num, atom)?;
                }
                "CONECT" => parse_conect_record(&ctx, line_num, &line, &mut builder)?,
                "ENDMDL" => first_model_done |= builder.atom_count() > 0,
                "END" => break,
                _ => {}
            }
        }

        builder.finish(registry, options)
    }
}

fn parse_atom_record(
    ctx: &RecordContext<'_>,
    line_num: usize,
    line: &str,
    registry: &ElementRegistry,
) -> Result<Atom, ParseError> {
    if line.len() < MIN_ATOM_RECORD_LEN {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::LineTooShort {
                record: "ATOM/HETATM",
                min: MIN_ATOM_RECORD_LEN,
            },
        ));
    }

    let serial: usize = parse_int(ctx, line_num, "columns 7-11", slice_and_trim(line, 6, 11))?;
    let raw_name = line.get(12..16).unwrap_or("");
    let name = raw_name.trim();
    let res_name = slice_and_trim(line, 17, 20);
    let x = parse_float(ctx, line_num, "columns 31-38", slice_and_trim(line, 30, 38))?;
    let y = parse_float(ctx, line_num, "columns 39-46", slice_and_trim(line, 38, 46))?;
    let z = parse_float(ctx, line_num, "columns 47-54", slice_and_trim(line, 46, 54))?;
    let element_field = slice_and_trim(line, 76, 78);
    let charge_field = slice_and_trim(line, 78, 80);

    let symbol = if element_field.is_empty() {
        infer_element(raw_name, registry).ok_or_else(|| {
            ctx.malformed(
                line_num,
                RecordErrorKind::UnresolvableElement(name.to_string()),
            )
        })?
    } else {
        element_field.to_string()
    };
    let element = registry
        .lookup(&symbol)
        .map_err(|source| ctx.unknown_element(line_num, source))?;

    let charge = if charge_field.is_empty() {
        None
    } else {
        Some(parse_formal_charge(charge_field).ok_or_else(|| {
            ctx.malformed(
                line_num,
                RecordErrorKind::InvalidInt {
                    field: "columns 79-80".into(),
                    value: charge_field.into(),
                },
            )
        })?)
    };

    Ok(Atom::new(&element.symbol, Point3::new(x, y, z))
        .with_name(if name.is_empty() { &element.symbol } else { name })
        .with_serial(serial)
        .with_residue_name((!res_name.is_empty()).then_some(res_name))
        .with_charge(charge))
}

/// Derives an element symbol from a PDB atom name.
///
/// Two-letter elements are written starting in column 13 (`"FE  "`, `"CL1 "`),
/// single-letter ones in column 14 (`" CA "` is an alpha carbon). Leading digits
/// (`"1HB "`) are skipped. A name filling all four columns and starting with
/// `H` is a hydrogen.
fn infer_element(raw_name: &str, registry: &ElementRegistry) -> Option<String> {
    let letters: String = raw_name
        .trim()
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    // Four-character names starting with H are hydrogens (`HG11`, `HD21`),
    // not mercury or helium.
    if raw_name.trim().len() == 4 && letters.starts_with('H') {
        return Some("H".to_string());
    }
    if !raw_name.starts_with(' ') && letters.len() >= 2 {
        let two = &letters[..2];
        if registry.contains(two) {
            return Some(two.to_string());
        }
    }
    Some(letters[..1].to_string())
}

/// Parses the `"2+"`, `"1-"` or `"-1"` charge notation.
fn parse_formal_charge(field: &str) -> Option<f64> {
    let (digits, negative) = if let Some(d) = field.strip_suffix('-') {
        (d, true)
    } else if let Some(d) = field.strip_suffix('+') {
        (d, false)
    } else if let Some(d) = field.strip_prefix('-') {
        (d, true)
    } else {
        (field.strip_prefix('+').unwrap_or(field), false)
    };
    let magnitude: u8 = if digits.is_empty() { 1 } else { digits.parse().ok()? };
    let magnitude = f64::from(magnitude);
    Some(if negative { -magnitude } else { magnitude })
}

/// `CONECT a b c ...` bonds `a` to each partner. A partner repeated within one
/// record raises the bond order (two listings make a double bond).
fn parse_conect_record(
    ctx: &RecordContext<'_>,
    line_num: usize,
    line: &str,
    builder: &mut GraphBuilder<'_>,
) -> Result<(), ParseError> {
    let serials = line
        .split_whitespace()
        .skip(1)
        .map(|token| parse_int::<usize>(ctx, line_num, "CONECT serial", token))
        .collect::<Result<Vec<_>, _>>()?;
    let Some((&origin, partners)) = serials.split_first() else {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::IncompleteConnectivity { record: "CONECT" },
        ));
    };
    if partners.is_empty() {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::IncompleteConnectivity { record: "CONECT" },
        ));
    }

    let mut counted: Vec<(usize, usize)> = Vec::with_capacity(partners.len());
    for &partner in partners {
        match counted.iter_mut().find(|(serial, _)| *serial == partner) {
            Some((_, count)) => *count += 1,
            None => counted.push((partner, 1)),
        }
    }

    for (partner, count) in counted {
        let order = BondOrder::from_multiplicity(count).unwrap_or_else(|| {
            warn!(
                line = line_num,
                partner, count, "CONECT multiplicity above three, treating as a triple bond."
            );
            BondOrder::Triple
        });
        builder.connect(line_num, origin, partner, order)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::perception::BondPerception;
    use crate::core::models::ids::AtomId;
    use std::io::Cursor;

    fn registry() -> ElementRegistry {
        ElementRegistry::bundled().unwrap()
    }

    fn read(content: &str) -> Result<MolecularGraph, ParseError> {
        let mut cursor = Cursor::new(content);
        PdbFile::read_from(&mut cursor, "test.pdb", &registry(), &ParseOptions::default())
    }

    const ETHANOL: &str = "\
HEADER    ETHANOL
HETATM    1  C1  EOH     1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  C2  EOH     1       1.520   0.000   0.000  1.00  0.00           C
HETATM    3  O1  EOH     1       2.020   1.350   0.000  1.00  0.00           O
HETATM    4  HO  EOH     1       2.980   1.350   0.000  1.00  0.00           H
CONECT    1    2
CONECT    2    1    3
CONECT    3    2    4
CONECT    4    3
END
";

    #[test]
    fn reads_atoms_and_symmetric_conect_records() {
        let graph = read(ETHANOL).unwrap();

        assert_eq!(graph.atom_count(), 4);
        assert_eq!(graph.bond_count(), 3);

        let oxygen = graph.atom(AtomId(2)).unwrap();
        assert_eq!(oxygen.element, "O");
        assert_eq!(oxygen.name, "O1");
        assert_eq!(oxygen.serial, 3);
        assert_eq!(oxygen.residue_name.as_deref(), Some("EOH"));
        assert_eq!(oxygen.position, Point3::new(2.02, 1.35, 0.0));
        assert_eq!(
            graph.neighbors(AtomId(2)).unwrap(),
            &[AtomId(1), AtomId(3)]
        );
    }

    #[test]
    fn repeated_conect_partner_sets_bond_order() {
        let content = "\
HETATM    1  C1  ACE     1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  O1  ACE     1       1.230   0.000   0.000  1.00  0.00           O
CONECT    1    2    2
CONECT    2    1    1
END
";
        let graph = read(content).unwrap();

        assert_eq!(graph.bond_count(), 1);
        assert_eq!(
            graph.bond_order_between(AtomId(0), AtomId(1)),
            Some(BondOrder::Double)
        );
    }

    #[test]
    fn element_falls_back_to_atom_name() {
        let content = "\
ATOM      1  CA  GLY A   1       0.000   0.000   0.000
HETATM    2 FE   HEM A   2       2.000   0.000   0.000
ATOM      3 1HB  ALA A   3       4.000   0.000   0.000
HETATM    4 CL1  LIG A   4       6.000   0.000   0.000
";
        let graph = read(content).unwrap();
        let elements: Vec<&str> = graph.atoms().map(|a| a.element.as_str()).collect();

        assert_eq!(elements, ["C", "Fe", "H", "Cl"]);
    }

    #[test]
    fn four_character_hydrogen_names_are_not_mercury() {
        let content = "\
ATOM      1 HG11 VAL A   1       0.000   0.000   0.000
ATOM      2 HD21 ASN A   2       2.000   0.000   0.000
HETATM    3 HG    HG A   3       4.000   0.000   0.000
";
        let graph = read(content).unwrap();
        let elements: Vec<&str> = graph.atoms().map(|a| a.element.as_str()).collect();

        assert_eq!(elements, ["H", "H", "Hg"]);
    }

    #[test]
    fn formal_charge_columns_are_parsed() {
        assert_eq!(parse_formal_charge("2+"), Some(2.0));
        assert_eq!(parse_formal_charge("1-"), Some(-1.0));
        assert_eq!(parse_formal_charge("-1"), Some(-1.0));
        assert_eq!(parse_formal_charge("+"), Some(1.0));
        assert_eq!(parse_formal_charge("x"), None);

        let content = "\
HETATM    1 NA    NA A   1       0.000   0.000   0.000  1.00  0.00          NA1+
";
        let graph = read(content).unwrap();
        let sodium = graph.atom(AtomId(0)).unwrap();
        assert_eq!(sodium.element, "Na");
        assert_eq!(sodium.charge, Some(1.0));
    }

    #[test]
    fn bonds_are_perceived_without_conect_records() {
        let content = "\
HETATM    1  O   HOH     1       0.000   0.000   0.000
HETATM    2  H1  HOH     1       0.957   0.000   0.000
HETATM    3  H2  HOH     1      -0.240   0.927   0.000
";
        let graph = read(content).unwrap();
        assert_eq!(graph.bond_count(), 2);

        let options = ParseOptions {
            bond_perception: BondPerception::Never,
            ..ParseOptions::default()
        };
        let graph = PdbFile::read_from(
            &mut Cursor::new(content),
            "test.pdb",
            &registry(),
            &options,
        )
        .unwrap();
        assert_eq!(graph.bond_count(), 0);
    }

    #[test]
    fn only_the_first_model_is_read() {
        let content = "\
MODEL        1
HETATM    1  O   HOH     1       0.000   0.000   0.000
ENDMDL
MODEL        2
HETATM    1  O   HOH     1       5.000   0.000   0.000
ENDMDL
";
        let graph = read(content).unwrap();
        assert_eq!(graph.atom_count(), 1);
    }

    #[test]
    fn conect_after_last_model_still_applies() {
        let content = "\
MODEL        1
HETATM    1  C1  ALD     1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  O1  ALD     1       1.210   0.000   0.000  1.00  0.00           O
HETATM    3  C2  ALD     1      -0.760   1.300   0.000  1.00  0.00           C
ENDMDL
MODEL        2
HETATM    1  C1  ALD     1       0.100   0.000   0.000  1.00  0.00           C
HETATM    2  O1  ALD     1       1.310   0.000   0.000  1.00  0.00           O
HETATM    3  C2  ALD     1      -0.660   1.300   0.000  1.00  0.00           C
ENDMDL
CONECT    1    2    2    3
CONECT    2    1    1
CONECT    3    1
END
";
        let graph = read(content).unwrap();

        assert_eq!(graph.atom_count(), 3);
        assert_eq!(graph.bond_count(), 2);
        assert_eq!(
            graph.bond_order_between(AtomId(0), AtomId(1)),
            Some(BondOrder::Double)
        );
        assert_eq!(graph.atom(AtomId(0)).unwrap().position, Point3::origin());
    }

    #[test]
    fn bad_coordinate_reports_line_number() {
        let content = "\
REMARK   test
HETATM    1  C1  LIG     1       0.000   0.000   0.000
HETATM    2  C2  LIG     1       abc     0.000   0.000
";
        let err = read(content).unwrap_err();

        assert_eq!(err.line(), Some(3));
        assert!(matches!(
            err,
            ParseError::Malformed { kind: RecordErrorKind::InvalidFloat { .. }, .. }
        ));
    }

    #[test]
    fn short_atom_line_is_rejected() {
        let err = read("ATOM      1  C1  LIG     1       0.000\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed { line: 1, kind: RecordErrorKind::LineTooShort { .. }, .. }
        ));
    }

    #[test]
    fn unknown_element_symbol_is_reported() {
        let content = "\
HETATM    1  X1  LIG     1       0.000   0.000   0.000  1.00  0.00          XQ
";
        let err = read(content).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownElement { line: 1, source: UnknownElementError { ref symbol }, .. }
                if symbol == "XQ"
        ));
    }

    #[test]
    fn conect_to_missing_atom_is_rejected() {
        let content = "\
HETATM    1  C1  LIG     1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  C2  LIG     1       1.540   0.000   0.000  1.00  0.00           C
CONECT    1    2
CONECT    2    9
";
        let err = read(content).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed { line: 4, kind: RecordErrorKind::UnknownAtomSerial(9), .. }
        ));
    }

    #[test]
    fn file_without_atoms_is_missing_atoms() {
        let err = read("REMARK nothing here\nEND\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingAtoms { .. }));
    }

    #[test]
    fn read_from_path_uses_path_in_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdb");

        let err = PdbFile::read_from_path(&missing, &registry(), &ParseOptions::default())
            .unwrap_err();

        assert!(matches!(err, ParseError::Io { ref path, .. } if path.ends_with("missing.pdb")));
    }
}
