use super::error::{ParseError, RecordContext, RecordErrorKind};
use std::str::FromStr;

/// Fixed-column slice of a record, trimmed. Out-of-range columns read as empty.
pub(crate) fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

pub(crate) fn parse_int<T: FromStr>(
    ctx: &RecordContext<'_>,
    line_num: usize,
    field: &str,
    value: &str,
) -> Result<T, ParseError> {
    if value.is_empty() {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::MissingRequiredField {
                field: field.to_string(),
            },
        ));
    }
    value.parse().map_err(|_| {
        ctx.malformed(
            line_num,
            RecordErrorKind::InvalidInt {
                field: field.to_string(),
                value: value.to_string(),
            },
        )
    })
}

pub(crate) fn parse_float(
    ctx: &RecordContext<'_>,
    line_num: usize,
    field: &str,
    value: &str,
) -> Result<f64, ParseError> {
    if value.is_empty() {
        return Err(ctx.malformed(
            line_num,
            RecordErrorKind::MissingRequiredField {
                field: field.to_string(),
            },
        ));
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ctx.malformed(
            line_num,
            RecordErrorKind::InvalidFloat {
                field: field.to_string(),
                value: value.to_string(),
            },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_and_trim_tolerates_short_lines() {
        assert_eq!(slice_and_trim("ATOM      1", 6, 11), "1");
        assert_eq!(slice_and_trim("ATOM", 6, 11), "");
        assert_eq!(slice_and_trim("ATOM  12", 6, 11), "12");
    }

    #[test]
    fn parse_helpers_report_field_and_value() {
        let ctx = RecordContext::new("mol.pdb");

        assert_eq!(parse_int::<usize>(&ctx, 1, "columns 7-11", "42").unwrap(), 42);
        assert_eq!(parse_float(&ctx, 1, "columns 31-38", "-1.250").unwrap(), -1.25);

        let err = parse_float(&ctx, 7, "columns 31-38", "abc").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed {
                line: 7,
                kind: RecordErrorKind::InvalidFloat { ref value, .. },
                ..
            } if value == "abc"
        ));

        let err = parse_float(&ctx, 2, "columns 31-38", "NaN").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 2, .. }));

        let err = parse_int::<usize>(&ctx, 3, "columns 7-11", "").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed {
                kind: RecordErrorKind::MissingRequiredField { .. },
                ..
            }
        ));
    }
}
