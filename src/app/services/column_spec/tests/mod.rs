//! Tests for the column-definition mini-language
