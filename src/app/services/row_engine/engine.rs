//! Row validation engine and its lazy row stream
//!
//! The engine turns a raw 2-D cell grid into a [`RowStream`]: an iterator of
//! validated [`TypedRow`]s that fails the whole operation on the first bad
//! cell and on empty results. Rows must be consumed in worksheet order; the
//! synthetic counter is order-dependent and failure reports carry the
//! absolute worksheet row number.

use tracing::debug;

use super::validators;
use crate::app::models::{CellValue, RunningCounter, TypedRow};
use crate::app::services::column_spec::{ColumnKind, ColumnSpecList};
use crate::{Error, Result};

/// Applies a column definition to every data row of a raw worksheet grid
#[derive(Debug, Clone)]
pub struct RowValidationEngine {
    specs: ColumnSpecList,
}

impl RowValidationEngine {
    /// Create an engine for one parsed column definition
    pub fn new(specs: ColumnSpecList) -> Self {
        Self { specs }
    }

    /// Validate a raw grid into a lazy stream of typed rows
    ///
    /// The first `skip_rows` rows are dropped unvalidated (header rows).
    /// Every returned stream owns a fresh [`RunningCounter`], so concurrent
    /// downloads never share counter state.
    pub fn validate_rows(&self, grid: Vec<Vec<String>>, skip_rows: usize) -> RowStream {
        debug!(
            rows = grid.len(),
            skip_rows,
            columns = self.specs.len(),
            "starting row validation"
        );
        RowStream {
            specs: self.specs.clone(),
            rows: grid.into_iter().enumerate(),
            skip_rows,
            counter: RunningCounter::new(),
            emitted: 0,
            done: false,
        }
    }
}

/// Lazy sequence of validated rows for one worksheet download
///
/// Yields `Ok(TypedRow)` per data row in worksheet order. The first
/// validation failure is yielded as `Err` and fuses the stream; a stream
/// that runs dry without emitting a single row yields
/// [`Error::EmptyResult`]. Rows already yielded are never retracted, so a
/// consumer performing a bulk load must not commit before the stream
/// completes; [`collect_rows`](RowStream::collect_rows) provides that
/// all-or-nothing view.
#[derive(Debug)]
pub struct RowStream {
    specs: ColumnSpecList,
    rows: std::iter::Enumerate<std::vec::IntoIter<Vec<String>>>,
    skip_rows: usize,
    counter: RunningCounter,
    emitted: usize,
    done: bool,
}

impl RowStream {
    /// Drain the stream into a vector, failing on any validation error or
    /// on an empty result
    pub fn collect_rows(self) -> Result<Vec<TypedRow>> {
        let mut rows = Vec::new();
        for row in self {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Validate one raw row into a typed row
    ///
    /// `row_number` is the absolute 1-based worksheet row number, used in
    /// failure reports.
    fn validate_row(&mut self, raw: &[String], row_number: usize) -> Result<TypedRow> {
        // The counter advances once per row, in row order, no matter how
        // many counter columns the definition contains.
        let mut row_counter: Option<i64> = None;
        let mut values = Vec::with_capacity(self.specs.output_width());

        for spec in self.specs.columns() {
            let produced = match &spec.kind {
                ColumnKind::Counter => {
                    let value = *row_counter.get_or_insert_with(|| self.counter.next_value());
                    Some(CellValue::Integer(value))
                }
                ColumnKind::AddOn { value } => Some(CellValue::Text(value.clone())),
                ColumnKind::Drop => None,
                kind => {
                    // Raw rows shorter than the definition are padded with
                    // empty cells; surplus cells are ignored.
                    let raw_cell = spec
                        .input_index
                        .and_then(|i| raw.get(i))
                        .map(String::as_str)
                        .unwrap_or("");
                    let output_position = spec.output_position.unwrap_or(0);

                    let value = match kind {
                        ColumnKind::Text => Ok(validators::validate_text(raw_cell)),
                        ColumnKind::Integer => validators::validate_integer(raw_cell),
                        ColumnKind::Float {
                            thousands_separator,
                        } => validators::validate_float(raw_cell, *thousands_separator),
                        ColumnKind::Date { in_fmt } => {
                            validators::validate_date(raw_cell, in_fmt)
                        }
                        ColumnKind::Boolean {
                            true_tokens,
                            false_tokens,
                        } => validators::validate_boolean(raw_cell, true_tokens, false_tokens),
                        ColumnKind::Counter | ColumnKind::AddOn { .. } | ColumnKind::Drop => {
                            unreachable!("synthetic kinds handled above")
                        }
                    }
                    .map_err(|reason| {
                        Error::validation(row_number, output_position, raw_cell, reason)
                    })?;
                    Some(value)
                }
            };

            if let Some(value) = produced {
                if spec.required && value.is_empty() {
                    return Err(Error::validation(
                        row_number,
                        spec.output_position.unwrap_or(0),
                        "",
                        "is empty but the column is required",
                    ));
                }
                values.push(value);
            }
        }

        Ok(TypedRow {
            source_row: row_number,
            values,
        })
    }
}

impl Iterator for RowStream {
    type Item = Result<TypedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some((index, raw)) = self.rows.next() {
            if index < self.skip_rows {
                continue;
            }
            let row_number = index + 1;

            // Rows with no content at all (trailing blank worksheet rows)
            // are skipped without consuming a counter value.
            if raw.iter().all(|cell| cell.is_empty()) {
                debug!(row = row_number, "skipping blank row");
                continue;
            }

            return match self.validate_row(&raw, row_number) {
                Ok(typed) => {
                    self.emitted += 1;
                    Some(Ok(typed))
                }
                Err(error) => {
                    self.done = true;
                    Some(Err(error))
                }
            };
        }

        self.done = true;
        if self.emitted == 0 {
            return Some(Err(Error::empty_result(self.skip_rows)));
        }
        None
    }
}
