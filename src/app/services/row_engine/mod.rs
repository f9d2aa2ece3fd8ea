//! Row validation engine for raw worksheet grids
//!
//! Applies a parsed [`ColumnSpecList`](crate::ColumnSpecList) to every data
//! row of a raw 2-D cell grid, producing a lazy sequence of typed rows. The
//! first failing cell aborts the whole sequence; an exhausted sequence that
//! produced no rows is an error, never a silent no-op.
//!
//! ## Architecture
//!
//! - [`validators`] - pure per-type cell validators
//! - [`engine`] - the engine and its lazy [`RowStream`](engine::RowStream)

pub mod engine;
pub mod validators;

#[cfg(test)]
pub mod tests;

pub use engine::{RowStream, RowValidationEngine};
