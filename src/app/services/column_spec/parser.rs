//! Parser for the column-definition string
//!
//! Consumes the definition left to right, greedily matching one type code,
//! an optional parenthesized parameter group and an optional `!` suffix per
//! column. All parameter names are checked against the type's accepted set
//! here, at parse time, so the row engine never sees an unknown parameter.

use super::{ColumnKind, ColumnSpec, ColumnSpecList};
use crate::{Error, Result};

const KNOWN_CODES: &str = "c, s, i, f, d, b, x, &";

/// Parse a column definition string into an ordered [`ColumnSpecList`]
///
/// Positions in error messages are 1-based character offsets into the
/// definition string. Parsing is pure: the same input always yields a
/// structurally equal list.
pub fn parse_column_definition(definition: &str) -> Result<ColumnSpecList> {
    if definition.is_empty() {
        return Err(Error::column_spec_parse(1, "column definition is empty"));
    }

    let chars: Vec<char> = definition.chars().collect();
    let mut columns = Vec::new();
    let mut pos = 0;
    let mut input_index = 0;
    let mut output_position = 0;

    while pos < chars.len() {
        let code = chars[pos];
        let code_pos = pos + 1;
        pos += 1;

        if !"csifdbx&".contains(code) {
            return Err(Error::column_spec_parse(
                code_pos,
                format!(
                    "unrecognized type code '{}', available: {}",
                    code, KNOWN_CODES
                ),
            ));
        }

        // Optional parameter group. Valid orderings are `x`, `x!`, `x(...)`
        // and `x(...)!`.
        let mut group: Option<String> = None;
        if pos < chars.len() && chars[pos] == '(' {
            let open_pos = pos + 1;
            let close = chars[pos + 1..]
                .iter()
                .position(|&c| c == ')')
                .map(|offset| pos + 1 + offset)
                .ok_or_else(|| {
                    Error::column_spec_parse(
                        open_pos,
                        format!("found '(' at position {} but no matching ')'", open_pos),
                    )
                })?;
            group = Some(chars[pos + 1..close].iter().collect());
            pos = close + 1;
        }

        let mut required = false;
        if pos < chars.len() && chars[pos] == '!' {
            required = true;
            pos += 1;
        }

        let kind = resolve_kind(code, code_pos, group.as_deref())?;
        let consumes = kind.consumes_input();
        let produces = kind.produces_output();

        columns.push(ColumnSpec {
            kind,
            required,
            output_position: produces.then_some(output_position),
            input_index: consumes.then_some(input_index),
        });

        if consumes {
            input_index += 1;
        }
        if produces {
            output_position += 1;
        }
    }

    Ok(ColumnSpecList::new(columns))
}

/// One `name=value` segment of a parameter group, or a bare continuation
/// segment extending the previous list-valued parameter
struct Segment {
    name: Option<String>,
    value: String,
}

fn split_segments(group: &str) -> Vec<Segment> {
    if group.is_empty() {
        return Vec::new();
    }
    group
        .split(',')
        .map(|part| match part.split_once('=') {
            Some((name, value)) => Segment {
                name: Some(name.to_string()),
                value: value.to_string(),
            },
            None => Segment {
                name: None,
                value: part.to_string(),
            },
        })
        .collect()
}

/// Resolve a type code plus raw parameter group into a [`ColumnKind`]
fn resolve_kind(code: char, code_pos: usize, group: Option<&str>) -> Result<ColumnKind> {
    let segments = split_segments(group.unwrap_or(""));

    match code {
        'c' => no_params(code, code_pos, &segments).map(|_| ColumnKind::Counter),
        's' => no_params(code, code_pos, &segments).map(|_| ColumnKind::Text),
        'i' => no_params(code, code_pos, &segments).map(|_| ColumnKind::Integer),
        'x' => no_params(code, code_pos, &segments).map(|_| ColumnKind::Drop),
        'f' => resolve_float(code_pos, &segments),
        'd' => resolve_date(code_pos, &segments),
        'b' => resolve_boolean(code_pos, &segments),
        '&' => resolve_add_on(code_pos, &segments),
        _ => unreachable!("code already validated"),
    }
}

fn no_params(code: char, code_pos: usize, segments: &[Segment]) -> Result<()> {
    match segments.first() {
        None => Ok(()),
        Some(segment) => Err(Error::column_spec_parse(
            code_pos,
            format!(
                "type '{}' accepts no parameters, got '{}'",
                code,
                segment.name.as_deref().unwrap_or(&segment.value)
            ),
        )),
    }
}

fn resolve_float(code_pos: usize, segments: &[Segment]) -> Result<ColumnKind> {
    let mut thousands_separator = None;
    for segment in segments {
        match segment.name.as_deref() {
            Some("thousands_separator") => {
                let mut chars = segment.value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => thousands_separator = Some(c),
                    _ => {
                        return Err(Error::column_spec_parse(
                            code_pos,
                            format!(
                                "thousands_separator must be a single character, got '{}'",
                                segment.value
                            ),
                        ));
                    }
                }
            }
            Some(name) => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("unknown parameter '{}' for type 'f'", name),
                ));
            }
            None => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("parameter '{}' is missing '='", segment.value),
                ));
            }
        }
    }
    Ok(ColumnKind::Float {
        thousands_separator,
    })
}

fn resolve_date(code_pos: usize, segments: &[Segment]) -> Result<ColumnKind> {
    let mut in_fmt = None;
    for segment in segments {
        match segment.name.as_deref() {
            Some("in_fmt") => {
                if segment.value.is_empty() {
                    return Err(Error::column_spec_parse(
                        code_pos,
                        "in_fmt must not be empty",
                    ));
                }
                in_fmt = Some(segment.value.clone());
            }
            Some(name) => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("unknown parameter '{}' for type 'd'", name),
                ));
            }
            None => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("parameter '{}' is missing '='", segment.value),
                ));
            }
        }
    }
    match in_fmt {
        Some(in_fmt) => Ok(ColumnKind::Date { in_fmt }),
        None => Err(Error::column_spec_parse(
            code_pos,
            "type 'd' requires the in_fmt parameter",
        )),
    }
}

/// Which boolean token list a continuation segment extends
enum BooleanList {
    True,
    False,
}

fn resolve_boolean(code_pos: usize, segments: &[Segment]) -> Result<ColumnKind> {
    let mut true_tokens: Vec<String> = Vec::new();
    let mut false_tokens: Vec<String> = Vec::new();
    let mut current: Option<BooleanList> = None;

    for segment in segments {
        let list = match segment.name.as_deref() {
            Some("true") => {
                current = Some(BooleanList::True);
                &mut true_tokens
            }
            Some("false") => {
                current = Some(BooleanList::False);
                &mut false_tokens
            }
            Some(name) => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("unknown parameter '{}' for type 'b'", name),
                ));
            }
            None => match current {
                Some(BooleanList::True) => &mut true_tokens,
                Some(BooleanList::False) => &mut false_tokens,
                None => {
                    return Err(Error::column_spec_parse(
                        code_pos,
                        format!("parameter '{}' is missing '='", segment.value),
                    ));
                }
            },
        };
        if segment.value.is_empty() {
            return Err(Error::column_spec_parse(
                code_pos,
                "boolean tokens must not be empty",
            ));
        }
        list.push(segment.value.clone());
    }

    if true_tokens.is_empty() || false_tokens.is_empty() {
        return Err(Error::column_spec_parse(
            code_pos,
            "type 'b' requires both the true and false token lists",
        ));
    }

    Ok(ColumnKind::Boolean {
        true_tokens,
        false_tokens,
    })
}

fn resolve_add_on(code_pos: usize, segments: &[Segment]) -> Result<ColumnKind> {
    let mut value = String::new();
    for segment in segments {
        match segment.name.as_deref() {
            Some("value") => value = segment.value.clone(),
            Some(name) => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("unknown parameter '{}' for type '&'", name),
                ));
            }
            None => {
                return Err(Error::column_spec_parse(
                    code_pos,
                    format!("parameter '{}' is missing '='", segment.value),
                ));
            }
        }
    }
    Ok(ColumnKind::AddOn { value })
}
