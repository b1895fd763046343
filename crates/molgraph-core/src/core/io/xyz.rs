use super::builder::GraphBuilder;
use super::error::{ParseError, RecordContext, RecordErrorKind};
use super::fields::{parse_float, parse_int};
use super::format::StructureFormat;
use super::traits::{ParseOptions, StructureReader};
use crate::core::elements::registry::ElementRegistry;
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use nalgebra::Point3;
use std::io::BufRead;

/// Plain XYZ reader: an atom count line, a comment line, then one
/// `symbol x y z` line per atom. Only the first frame is read. The format has
/// no connectivity, so bonds come from perception.
pub struct XyzFile;

impl StructureReader for XyzFile {
    const FORMAT: StructureFormat = StructureFormat::Xyz;

    fn read_from(
        reader: &mut impl BufRead,
        origin: &str,
        registry: &ElementRegistry,
        options: &ParseOptions,
    ) -> Result<MolecularGraph, ParseError> {
        let ctx = RecordContext::new(origin);
        let mut builder = GraphBuilder::new(ctx);
        let mut lines = reader.lines().enumerate().map(|(index, line)| (index + 1, line));

        let mut expected = None;
        let mut last_line = 0;
        for (line_num, line_res) in lines.by_ref() {
            let line = line_res.map_err(|e| ctx.io(e))?;
            last_line = line_num;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            expected = Some(parse_int::<usize>(&ctx, line_num, "atom count", trimmed)?);
            break;
        }
        let Some(expected) = expected.filter(|&count| count > 0) else {
            return Err(ParseError::MissingAtoms {
                path: origin.to_string(),
            });
        };

        // Comment line.
        if let Some((line_num, line_res)) = lines.next() {
            line_res.map_err(|e| ctx.io(e))?;
            last_line = line_num;
        }

        for (line_num, line_res) in lines {
            if builder.atom_count() == expected {
                break;
            }
            let line = line_res.map_err(|e| ctx.io(e))?;
            last_line = line_num;
            if line.trim().is_empty() {
                break;
            }
            let atom = parse_atom_line(&ctx, line_num, &line, builder.atom_count() + 1, registry)?;
            builder.add_atom(line_num, atom)?;
        }

        if builder.atom_count() != expected {
            return Err(ctx.malformed(
                last_line,
                RecordErrorKind::AtomCountMismatch {
                    expected,
                    found: builder.atom_count(),
                },
            ));
        }

        builder.finish(registry, options)
    }
}

fn parse_atom_line(
    ctx: &RecordContext<'_>,
    line_num: usize,
    line: &str,
    serial: usize,
    registry: &ElementRegistry,
) -> Result<Atom, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [symbol, x, y, z, ..] = fields.as_slice() else {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::MissingRequiredField {
                field: "symbol x y z".into(),
            },
        ));
    };

    let element = registry
        .lookup(symbol)
        .map_err(|source| ctx.unknown_element(line_num, source))?;
    let position = Point3::new(
        parse_float(ctx, line_num, "x", x)?,
        parse_float(ctx, line_num, "y", y)?,
        parse_float(ctx, line_num, "z", z)?,
    );

    Ok(Atom::new(&element.symbol, position)
        .with_name(&format!("{}{}", element.symbol, serial))
        .with_serial(serial))
}
