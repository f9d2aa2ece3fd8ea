//! Data models for worksheet downloads
//!
//! This module contains the core data structures for representing typed
//! worksheet cells and rows, plus the per-download running counter that feeds
//! synthetic counter columns.

use chrono::NaiveDate;
use std::fmt;

/// A single validated, typed cell value
///
/// Aligned with the type tags of the column-definition language. Values are
/// immutable once produced by the row validation engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Synthetic counter or `i` column value
    Integer(i64),

    /// `f` column value
    Float(f64),

    /// `b` column value
    Boolean(bool),

    /// `d` column value
    Date(NaiveDate),

    /// `s` column or add-on column value, verbatim
    Text(String),
}

impl CellValue {
    /// Whether the value renders as an empty output field
    ///
    /// Only text values can be empty; every other variant always carries
    /// content. Used to enforce the `!` (required) column flag.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Boolean(v) => write!(f, "{}", v),
            CellValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            CellValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// One fully validated output row
///
/// Produced by the row validation engine from one raw worksheet row plus the
/// running counter state; consumed exactly once by the downstream loader.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    /// Absolute 1-based worksheet row number this row was built from
    pub source_row: usize,

    /// Typed values in column-definition order
    pub values: Vec<CellValue>,
}

impl TypedRow {
    /// Render every value as a string, in output order
    pub fn to_fields(&self) -> Vec<String> {
        self.values.iter().map(|v| v.to_string()).collect()
    }
}

/// Auto-incrementing counter scoped to one worksheet download
///
/// Advanced exactly once per emitted row; the first row observes 1. Owned by
/// the row stream so that concurrent downloads can never share counter state.
#[derive(Debug)]
pub struct RunningCounter {
    next: i64,
}

impl RunningCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the counter value for the current row and advance
    pub fn next_value(&mut self) -> i64 {
        let value = self.next;
        self.next += 1;
        value
    }
}

impl Default for RunningCounter {
    fn default() -> Self {
        Self::new()
    }
}
