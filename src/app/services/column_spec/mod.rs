//! Column-definition mini-language for worksheet downloads
//!
//! A column definition is a compact string describing, per worksheet column,
//! which validator to apply and with which parameters. It is the sole
//! configuration surface for validation behaviour.
//!
//! ## Grammar
//!
//! The string is a concatenation of column tokens, each a single-letter type
//! code, optionally followed by a parenthesized `name=value` parameter group
//! and an optional `!` (required) suffix:
//!
//! | code | type    | parameters                                          |
//! |------|---------|-----------------------------------------------------|
//! | `c`  | counter | none (synthetic, consumes no worksheet cell)        |
//! | `s`  | string  | none                                                |
//! | `i`  | integer | none                                                |
//! | `f`  | float   | `thousands_separator` (single character)            |
//! | `d`  | date    | `in_fmt` (strptime-style pattern, required)         |
//! | `b`  | boolean | `true`, `false` (token lists, both required)        |
//! | `x`  | drop    | none (cell is read and discarded)                   |
//! | `&`  | add-on  | `value` (constant emitted in every row)             |
//!
//! For the list-valued `true`/`false` parameters, a comma-separated segment
//! without a `=` extends the preceding list, so `b(true=ja,yes,false=nein,no)`
//! maps both `ja` and `yes` to true.
//!
//! Example: `csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)fs` describes a counter
//! column followed by a string, a German-formatted date, an integer, a
//! ja/nein boolean, a float and a trailing string.

pub mod parser;

#[cfg(test)]
pub mod tests;

pub use parser::parse_column_definition;

use crate::{Error, Result};
use std::str::FromStr;

/// Validator kind with resolved parameters for one output column
///
/// A closed set: adding a type is a compile-time-checked change because every
/// consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// `c`: synthetic auto-incrementing counter, consumes no worksheet cell
    Counter,

    /// `s`: verbatim string
    Text,

    /// `i`: base-10 signed integer
    Integer,

    /// `f`: float with `.` as the decimal separator; the configured
    /// thousands separator is stripped before parsing
    Float { thousands_separator: Option<char> },

    /// `d`: date matching the `in_fmt` pattern exactly
    Date { in_fmt: String },

    /// `b`: boolean matched case-sensitively against explicit token lists
    Boolean {
        true_tokens: Vec<String>,
        false_tokens: Vec<String>,
    },

    /// `&`: constant value emitted in every row, consumes no worksheet cell
    AddOn { value: String },

    /// `x`: worksheet cell is read and discarded
    Drop,
}

impl ColumnKind {
    /// The single-letter type code of this kind
    pub fn code(&self) -> char {
        match self {
            ColumnKind::Counter => 'c',
            ColumnKind::Text => 's',
            ColumnKind::Integer => 'i',
            ColumnKind::Float { .. } => 'f',
            ColumnKind::Date { .. } => 'd',
            ColumnKind::Boolean { .. } => 'b',
            ColumnKind::AddOn { .. } => '&',
            ColumnKind::Drop => 'x',
        }
    }

    /// Whether this column consumes one cell of the raw worksheet row
    pub fn consumes_input(&self) -> bool {
        !matches!(self, ColumnKind::Counter | ColumnKind::AddOn { .. })
    }

    /// Whether this column contributes a value to the output row
    pub fn produces_output(&self) -> bool {
        !matches!(self, ColumnKind::Drop)
    }
}

/// One entry of a parsed column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Validator kind with resolved parameters
    pub kind: ColumnKind,

    /// Whether the produced value must be non-empty (`!` suffix)
    pub required: bool,

    /// Zero-based position in the output row; `None` for dropped columns
    pub output_position: Option<usize>,

    /// Zero-based position in the raw worksheet row; `None` for synthetic
    /// columns (counter, add-on)
    pub input_index: Option<usize>,
}

/// The full ordered sequence of column specs parsed from one definition string
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpecList {
    columns: Vec<ColumnSpec>,
}

impl ColumnSpecList {
    pub(crate) fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// All column specs in definition order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpec> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of worksheet cells each raw row is expected to supply
    pub fn input_width(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.kind.consumes_input())
            .count()
    }

    /// Number of values in each output row
    pub fn output_width(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.kind.produces_output())
            .count()
    }

    /// Whether the definition contains at least one counter column
    pub fn has_counter(&self) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c.kind, ColumnKind::Counter))
    }
}

impl FromStr for ColumnSpecList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_column_definition(s)
    }
}

impl<'a> IntoIterator for &'a ColumnSpecList {
    type Item = &'a ColumnSpec;
    type IntoIter = std::slice::Iter<'a, ColumnSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
