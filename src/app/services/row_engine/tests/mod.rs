//! Tests for cell validators and the row validation engine

use crate::app::services::column_spec::ColumnSpecList;


/// Helper to parse a column definition in tests
pub fn specs(definition: &str) -> ColumnSpecList {
    definition.parse().unwrap()
}

/// Helper to build an owned grid from string slices
pub fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
