//! TrackPrep - pre-flight input preparation for batch track plotting
//!
//! Runs once, before per-region plotting jobs fan out in parallel.
//!
//! # Features
//!
//! - Joins view and focus BED files by region name and clamps over-wide views
//! - Reports whether interval files are bgzipped and tabix-indexed
//! - Plans the sort/compress/index steps for files that are not, so no two
//!   parallel workers ever rewrite the same shared file
//!
//! # Example
//!
//! ```ignore
//! use track_prep::{resolve_files, Planner};
//!
//! let resolution = resolve_files("views.bed", "focus.bed", 10_000)?;
//! for (name, pair) in resolution.iter() {
//!     println!("{}\t{}", name, pair.view_string());
//! }
//!
//! let plan = Planner::new().plan("genes.gtf")?;
//! for action in &plan.actions {
//!     println!("{}", action);
//! }
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use core::{
    check, resolve, resolve_files, CoordinatePair, Diagnostic, FileState, FileStatus,
    FocusWindow, Planner, ReadinessError, RemediationPlan, Resolution, ResolveError, Strand,
    TrackPrepError, ViewWindow,
};
pub use formats::{bed, intervals};
