//! Core pre-flight functionality
//!
//! This module contains the view/focus coordinate resolver, the file
//! readiness query and the remediation planner.

mod error;
pub mod io;
pub mod plan;
pub mod readiness;
mod resolver;
mod window;

pub use error::{
    IntervalListError, IntervalListResult, ReadinessError, ReadinessResult, ResolveError,
    ResolveResult, Result, TrackPrepError,
};
pub use plan::{
    target_path, Action, Planner, RemediationPlan, SortKey, SortKeyParseError, SortKind,
    SortOrder, TabixPreset,
};
pub use readiness::{
    check, classify, index_path, is_bgzf, FileState, FileStatus, BGZIP_SUFFIX,
    COMPRESSED_SUFFIXES, INDEX_SUFFIX,
};
pub use resolver::{resolve, resolve_files, Diagnostic, Resolution, ResolveStats};
pub use window::{CoordinatePair, FocusWindow, Strand, ViewWindow, WindowParseError};
