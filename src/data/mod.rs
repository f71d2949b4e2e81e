//! Data layer for the translation matrix
//!
//! `matrix` holds the canonical data (original and working copies);
//! `data_view` derives filtered, sorted, paged views of it without ever
//! changing which language a column index refers to.

pub mod data_view;
pub mod matrix;
