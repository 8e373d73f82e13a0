//! File format adapters
//!
//! Adapters for the tabular inputs of the plotting pipeline (BED-like view/focus rows, intervals lists).

pub mod bed;
pub mod intervals;

pub use bed::{parse_focus_row, parse_view_row, BedParseError, FocusRow, ViewRow};
pub use intervals::{
    rewrite_interval_file, rewrite_interval_file_if_present, rewrite_intervals,
    IntervalListRewrite,
};
