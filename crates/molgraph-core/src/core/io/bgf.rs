use super::builder::GraphBuilder;
use super::error::{ParseError, RecordContext, RecordErrorKind};
use super::fields::{parse_float, parse_int, slice_and_trim};
use super::format::StructureFormat;
use super::traits::{ParseOptions, StructureReader};
use crate::core::elements::registry::ElementRegistry;
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::warn;

const MIN_ATOM_RECORD_LEN: usize = 80;

pub struct BgfFile;

impl StructureReader for BgfFile {
    const FORMAT: StructureFormat = StructureFormat::Bgf;

    fn read_from(
        reader: &mut impl BufRead,
        origin: &str,
        registry: &ElementRegistry,
        options: &ParseOptions,
    ) -> Result<MolecularGraph, ParseError> {
        let ctx = RecordContext::new(origin);
        let mut builder = GraphBuilder::new(ctx);
        // ORDER records list orders in the same sequence as the preceding
        // CONECT record of the same atom.
        let mut partners_by_serial: HashMap<usize, Vec<usize>> = HashMap::new();

        for (index, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| ctx.io(e))?;
            let line_num = index + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => {
                    let atom = parse_atom_record(&ctx, line_num, &line, registry)?;
                    builder.add_atom(line_num, atom)?;
                }
                "CONECT" => {
                    let (origin_serial, partners) =
                        parse_serial_list(&ctx, line_num, &line, "CONECT")?;
                    for &partner in &partners {
                        builder.connect(line_num, origin_serial, partner, BondOrder::Single)?;
                    }
                    partners_by_serial.insert(origin_serial, partners);
                }
                "ORDER" => {
                    let mut tokens = line.split_whitespace().skip(1);
                    let Some(origin_token) = tokens.next() else {
                        return Err(ctx.malformed(
                            line_num,
                            RecordErrorKind::IncompleteConnectivity { record: "ORDER" },
                        ));
                    };
                    let origin_serial: usize =
                        parse_int(&ctx, line_num, "ORDER serial", origin_token)?;
                    let Some(partners) = partners_by_serial.get(&origin_serial) else {
                        warn!(
                            line = line_num,
                            serial = origin_serial,
                            "ORDER record without a preceding CONECT record, ignoring."
                        );
                        continue;
                    };
                    for (&partner, token) in partners.iter().zip(tokens) {
                        let order: BondOrder = token.parse().map_err(|_| {
                            ctx.malformed(
                                line_num,
                                RecordErrorKind::InvalidBondOrder(token.to_string()),
                            )
                        })?;
                        builder.set_order(line_num, origin_serial, partner, order)?;
                    }
                }
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

    let serial: usize = parse_int(ctx, line_num, "columns 8-12", slice_and_trim(line, 7, 12))?;
    let name = slice_and_trim(line, 13, 18);
    let res_name = slice_and_trim(line, 19, 22);
    let x = parse_float(ctx, line_num, "columns 31-40", slice_and_trim(line, 30, 40))?;
    let y = parse_float(ctx, line_num, "columns 41-50", slice_and_trim(line, 40, 50))?;
    let z = parse_float(ctx, line_num, "columns 51-60", slice_and_trim(line, 50, 60))?;
    let ff_type = slice_and_trim(line, 61, 66);
    let charge_field = slice_and_trim(line, 72, 80);

    if name.is_empty() {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::MissingRequiredField {
                field: "columns 14-18".into(),
            },
        ));
    }
    if ff_type.is_empty() {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::MissingRequiredField {
                field: "columns 62-66".into(),
            },
        ));
    }

    let symbol = element_from_ff_type(ff_type, registry)
        .ok_or_else(|| ctx.malformed(line_num, RecordErrorKind::UnresolvableElement(ff_type.into())))?;
    let element = registry
        .lookup(&symbol)
        .map_err(|source| ctx.unknown_element(line_num, source))?;
    let charge = if charge_field.is_empty() {
        None
    } else {
        Some(parse_float(ctx, line_num, "columns 73-80", charge_field)?)
    };

    Ok(Atom::new(&element.symbol, Point3::new(x, y, z))
        .with_name(name)
        .with_serial(serial)
        .with_residue_name((!res_name.is_empty()).then_some(res_name))
        .with_charge(charge))
}

/// Force field types carry the element as their leading letters (`"C_3"`,
/// `"Cl"`, `"H___A"`). A two-letter prefix wins when it names a known element.
fn element_from_ff_type(ff_type: &str, registry: &ElementRegistry) -> Option<String> {
    let letters: String = ff_type
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    if letters.len() >= 2 && registry.contains(&letters[..2]) {
        return Some(letters[..2].to_string());
    }
    Some(letters[..1].to_string())
}

fn parse_serial_list(
    ctx: &RecordContext<'_>,
    line_num: usize,
    line: &str,
    record: &'static str,
) -> Result<(usize, Vec<usize>), ParseError> {
    let serials = line
        .split_whitespace()
        .skip(1)
        .map(|token| parse_int::<usize>(ctx, line_num, "CONECT serial", token))
        .collect::<Result<Vec<_>, _>>()?;
    match serials.split_first() {
        Some((&origin, partners)) if !partners.is_empty() => Ok((origin, partners.to_vec())),
        _ => Err(ctx.malformed(
            line_num,
            RecordErrorKind::IncompleteConnectivity { record },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::AtomId;
    use std::io::Cursor;

    fn registry() -> ElementRegistry {
        ElementRegistry::bundled().unwrap()
    }

    fn read(content: &str) -> Result<MolecularGraph, ParseError> {
        BgfFile::read_from(
            &mut Cursor::new(content),
            "test.bgf",
            &registry(),
            &ParseOptions::default(),
        )
    }

    const ACETIC_ACID: &str = "\
BIOGRF  332
DESCRP acetic acid
FORCEFIELD DREIDING
FORMAT ATOM   (a6,1x,i5,1x,a5,1x,a3,1x,a1,1x,a5,3f10.5,1x,a5,i3,i2,1x,f8.5)
HETATM     1 C1    ACT A     1   0.00000   0.00000   0.00000 C_3    1 0 -0.30000
HETATM     2 C2    ACT A     1   1.52000   0.00000   0.00000 C_2    1 0  0.50000
HETATM     3 O1    ACT A     1   2.10000   1.05000   0.00000 O_2    1 0 -0.50000
HETATM     4 O2    ACT A     1   2.10000  -1.10000   0.00000 O_3    1 0 -0.45000
FORMAT CONECT (a6,12i6)
CONECT     1     2
CONECT     2     1     3     4
ORDER      2     1     2     1
CONECT     3     2
ORDER      3     2
CONECT     4     2
END
";

    #[test]
    fn reads_atoms_with_elements_from_force_field_types() {
        let graph = read(ACETIC_ACID).unwrap();

        assert_eq!(graph.atom_count(), 4);
        let elements: Vec<&str> = graph.atoms().map(|a| a.element.as_str()).collect();
        assert_eq!(elements, ["C", "C", "O", "O"]);

        let carbonyl_carbon = graph.atom(AtomId(1)).unwrap();
        assert_eq!(carbonyl_carbon.name, "C2");
        assert_eq!(carbonyl_carbon.charge, Some(0.5));
        assert_eq!(carbonyl_carbon.residue_name.as_deref(), Some("ACT"));
    }

    #[test]
    fn order_records_apply_to_conect_partners() {
        let graph = read(ACETIC_ACID).unwrap();
        let id = AtomId;

        assert_eq!(graph.bond_count(), 3);
        assert_eq!(graph.bond_order_between(id(1), id(2)), Some(BondOrder::Double));
        assert_eq!(graph.bond_order_between(id(1), id(3)), Some(BondOrder::Single));
        assert_eq!(graph.bond_order_between(id(0), id(1)), Some(BondOrder::Single));
    }

    #[test]
    fn two_letter_force_field_prefix_resolves_to_element() {
        assert_eq!(element_from_ff_type("Cl", &registry()).as_deref(), Some("Cl"));
        assert_eq!(element_from_ff_type("C_R", &registry()).as_deref(), Some("C"));
        assert_eq!(element_from_ff_type("H___A", &registry()).as_deref(), Some("H"));
        assert_eq!(element_from_ff_type("Na", &registry()).as_deref(), Some("Na"));
        assert_eq!(element_from_ff_type("_X", &registry()), None);
    }

    #[test]
    fn short_atom_line_is_rejected() {
        let content = "HETATM     1 C1    ACT A     1   0.00000   0.00000   0.00000 C_3\n";
        let err = read(content).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Malformed { line: 1, kind: RecordErrorKind::LineTooShort { min: 80, .. }, .. }
        ));
    }

    #[test]
    fn invalid_order_token_is_reported() {
        let content = "\
HETATM     1 C1    ACT A     1   0.00000   0.00000   0.00000 C_3    1 0 -0.30000
HETATM     2 C2    ACT A     1   1.52000   0.00000   0.00000 C_2    1 0  0.50000
CONECT     1     2
ORDER      1     9
";
        let err = read(content).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Malformed { line: 4, kind: RecordErrorKind::InvalidBondOrder(ref t), .. }
                if t == "9"
        ));
    }

    #[test]
    fn conect_without_partners_is_incomplete() {
        let content = "\
HETATM     1 C1    ACT A     1   0.00000   0.00000   0.00000 C_3    1 0 -0.30000
CONECT     1
";
        let err = read(content).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Malformed {
                line: 2,
                kind: RecordErrorKind::IncompleteConnectivity { record: "CONECT" },
                ..
            }
        ));
    }
}
