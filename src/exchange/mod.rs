//! Two-column spreadsheet exchange of source temperatures.

pub mod spreadsheet;
