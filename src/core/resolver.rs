//! View/focus coordinate resolution
//!
//! Joins a view source and a focus source by region name:
//! 1. View pass: every usable view row creates (or overwrites) the pair for its name
//! 2. Focus pass: every usable focus row whose name already has a pair sets the
//!    focus, then clamps the view to `max_width` around the focus midpoint
//!
//! Focus rows without a view are dropped. Width clamping is reported back as
//! [`Diagnostic`] values rather than printed.

use crate::core::error::{ResolveError, ResolveResult};
use crate::core::io::{open_source, DataLines};
use crate::core::window::{CoordinatePair, ViewWindow};
use crate::formats::bed::{parse_focus_row, parse_view_row};
use log::{debug, trace};
use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

/// A recoverable condition met while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The view was wider than `max_width` and was re-centred on the focus
    WidthExceeded {
        name: String,
        max_width: u64,
        width: u64,
        original: ViewWindow,
        updated: ViewWindow,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::WidthExceeded {
                name,
                max_width,
                width,
                original,
                updated,
            } => {
                writeln!(
                    f,
                    "Warning: Interval '{}' exceeds max_width of {}bp (current width: {}bp). \
                     Adjusting to center around focus region.",
                    name, max_width, width
                )?;
                writeln!(f, "  - Original view: {}", original)?;
                write!(f, "  - Updated view: {}", updated)
            }
        }
    }
}

/// Row counters for one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub view_rows: usize,
    pub focus_rows: usize,
    pub skipped: usize,
    pub unmatched_focus: usize,
    pub clamped: usize,
}

/// Outcome of [`resolve`]: the pairs keyed by name, plus diagnostics
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pairs: HashMap<String, CoordinatePair>,
    order: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ResolveStats,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&CoordinatePair> {
        self.pairs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in order of first appearance in the view source
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CoordinatePair)> {
        self.order
            .iter()
            .filter_map(|name| self.pairs.get(name).map(|pair| (name.as_str(), pair)))
    }

    /// Consume into the bare name → pair mapping
    pub fn into_pairs(self) -> HashMap<String, CoordinatePair> {
        self.pairs
    }

    fn insert_view(&mut self, name: &str, view: ViewWindow) {
        match self.pairs.get_mut(name) {
            Some(pair) => {
                trace!("View for '{}' overwritten by a later row", name);
                *pair = CoordinatePair::new(view);
            }
            None => {
                self.order.push(name.to_string());
                self.pairs.insert(name.to_string(), CoordinatePair::new(view));
            }
        }
    }
}

/// Resolve view and focus windows from two readers
///
/// Only I/O failures are errors; unusable rows are skipped and counted.
pub fn resolve<V: BufRead, F: BufRead>(
    view_source: V,
    focus_source: F,
    max_width: u64,
) -> ResolveResult<Resolution> {
    if max_width == 0 {
        return Err(ResolveError::InvalidMaxWidth(max_width));
    }

    let mut resolution = Resolution::default();

    let mut lines = DataLines::new(view_source);
    while let Some(line) = lines.next_line() {
        let (line_number, line) = line?;
        match parse_view_row(line) {
            Ok(row) => {
                resolution.stats.view_rows += 1;
                resolution.insert_view(row.name, row.window);
            }
            Err(e) => {
                debug!("Skipping view line {}: {}", line_number, e);
                resolution.stats.skipped += 1;
            }
        }
    }

    let mut lines = DataLines::new(focus_source);
    while let Some(line) = lines.next_line() {
        let (line_number, line) = line?;
        let row = match parse_focus_row(line) {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping focus line {}: {}", line_number, e);
                resolution.stats.skipped += 1;
                continue;
            }
        };
        resolution.stats.focus_rows += 1;

        let Some(pair) = resolution.pairs.get(row.name) else {
            debug!("Dropping focus line {}: no view for '{}'", line_number, row.name);
            resolution.stats.unmatched_focus += 1;
            continue;
        };

        let mut updated = CoordinatePair {
            view: pair.view.clone(),
            focus: Some(row.window),
        };
        if let Some(clamped) = updated.view.clamp_to_focus(&row.window, max_width) {
            resolution.diagnostics.push(Diagnostic::WidthExceeded {
                name: row.name.to_string(),
                max_width,
                width: updated.view.width(),
                original: updated.view.clone(),
                updated: clamped.clone(),
            });
            resolution.stats.clamped += 1;
            updated.view = clamped;
        }
        resolution.pairs.insert(row.name.to_string(), updated);
    }

    Ok(resolution)
}

/// Resolve from files on disk. Missing sources are fatal.
pub fn resolve_files<P: AsRef<Path>, Q: AsRef<Path>>(
    view_path: P,
    focus_path: Q,
    max_width: u64,
) -> ResolveResult<Resolution> {
    let view_path = view_path.as_ref();
    let focus_path = focus_path.as_ref();
    for path in [view_path, focus_path] {
        if !path.is_file() {
            return Err(ResolveError::SourceNotFound(path.to_path_buf()));
        }
    }

    resolve(open_source(view_path)?, open_source(focus_path)?, max_width)
}
