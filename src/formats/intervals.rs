//! Intervals list adapter
//!
//! An intervals list names one track file per line (first whitespace-separated
//! field) followed by its plotting options. Rewriting plans every distinct
//! referenced file exactly once, then points each line at the plan's target.
//! Files are planned in parallel; planning only reads.

use crate::core::{
    IntervalListError, IntervalListResult, Planner, ReadinessError, RemediationPlan,
};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Minimum fields on a track line: file path plus at least one option
pub const MIN_TRACK_FIELDS: usize = 2;

/// Default name for the rewritten list
pub const DEFAULT_OUTPUT: &str = "intervals.validated.txt";

/// Result of planning an intervals list
#[derive(Debug, Clone, Default)]
pub struct IntervalListRewrite {
    /// Output lines, trimmed; comments, blanks and short lines kept as read
    pub lines: Vec<String>,
    /// One plan per distinct existing file, in order of first reference
    pub plans: Vec<RemediationPlan>,
    /// Referenced files that do not exist; their lines are left unchanged
    pub missing: Vec<PathBuf>,
    /// Whether any line now points at a different file
    pub updated: bool,
}

impl IntervalListRewrite {
    /// Plans with at least one step to run
    pub fn pending(&self) -> impl Iterator<Item = &RemediationPlan> {
        self.plans.iter().filter(|plan| !plan.is_empty())
    }

    /// Write the rewritten lines, one per line
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for line in &self.lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }
}

fn is_passthrough(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Plan an intervals list read from `reader`
pub fn rewrite_intervals<R: BufRead>(
    reader: R,
    planner: &Planner,
) -> IntervalListResult<IntervalListRewrite> {
    let raw: Vec<String> = reader
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()))
        .collect::<io::Result<_>>()?;

    let mut seen = HashSet::new();
    let mut files: Vec<PathBuf> = Vec::new();
    for line in &raw {
        if is_passthrough(line) {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= MIN_TRACK_FIELDS && seen.insert(parts[0]) {
            files.push(PathBuf::from(parts[0]));
        }
    }

    let outcomes: Vec<(PathBuf, Result<RemediationPlan, ReadinessError>)> = files
        .into_par_iter()
        .map(|file| {
            let plan = planner.plan(&file);
            (file, plan)
        })
        .collect();

    let mut rewrite = IntervalListRewrite::default();
    let mut targets: HashMap<PathBuf, PathBuf> = HashMap::new();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(plan) => {
                debug!("{}", plan);
                if plan.changes_path() {
                    targets.insert(file, plan.target.clone());
                }
                rewrite.plans.push(plan);
            }
            Err(ReadinessError::FileNotFound(_)) => {
                warn!("File specified in intervals not found: {}", file.display());
                rewrite.missing.push(file);
            }
            Err(source) => return Err(IntervalListError::Planning { path: file, source }),
        }
    }

    for line in raw {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if is_passthrough(&line) || parts.len() < MIN_TRACK_FIELDS {
            rewrite.lines.push(line);
            continue;
        }

        let target = targets.get(Path::new(parts[0]));
        let mut out: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
        if let Some(target) = target {
            out[0] = target.display().to_string();
            rewrite.updated = true;
        }
        rewrite.lines.push(out.join("\t"));
    }

    Ok(rewrite)
}

/// Plan the intervals list at `path`
pub fn rewrite_interval_file<P: AsRef<Path>>(
    path: P,
    planner: &Planner,
) -> IntervalListResult<IntervalListRewrite> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IntervalListError::ListNotFound(path.to_path_buf()));
    }

    let rewrite = rewrite_intervals(BufReader::new(File::open(path)?), planner)?;
    info!(
        "Planned {} track file(s) from {}: {} need work, {} missing",
        rewrite.plans.len(),
        path.display(),
        rewrite.pending().count(),
        rewrite.missing.len()
    );
    Ok(rewrite)
}

/// Like [`rewrite_interval_file`], but a missing list is not an error.
///
/// The list is optional pipeline input; `Ok(None)` means there was nothing to plan.
pub fn rewrite_interval_file_if_present<P: AsRef<Path>>(
    path: P,
    planner: &Planner,
) -> IntervalListResult<Option<IntervalListRewrite>> {
    match rewrite_interval_file(path, planner) {
        Ok(rewrite) => Ok(Some(rewrite)),
        Err(IntervalListError::ListNotFound(path)) => {
            warn!("No intervals file provided or file not found: {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_passthrough_lines() {
        let input = "# comment\n\nlonely\n";
        let rewrite = rewrite_intervals(input.as_bytes(), &Planner::new()).unwrap();
        assert_eq!(rewrite.lines, vec!["# comment", "", "lonely"]);
        assert!(rewrite.plans.is_empty());
        assert!(!rewrite.updated);
    }

    #[test]
    fn test_missing_file_kept() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.bed");
        let input = format!("{} bed\n", missing.display());
        let rewrite = rewrite_intervals(input.as_bytes(), &Planner::new()).unwrap();
        assert_eq!(rewrite.missing, vec![missing.clone()]);
        assert_eq!(rewrite.lines, vec![format!("{}\tbed", missing.display())]);
        assert!(!rewrite.updated);
    }

    #[test]
    fn test_shared_file_planned_once() {
        let dir = TempDir::new().unwrap();
        let bed = dir.path().join("peaks.bed");
        fs::write(&bed, "chr1\t1\t2\n").unwrap();

        let input = format!("{0}\tbed\tlabel=a\n{0} bed label=b\n", bed.display());
        let rewrite = rewrite_intervals(input.as_bytes(), &Planner::new()).unwrap();

        assert_eq!(rewrite.plans.len(), 1);
        assert!(rewrite.updated);
        let target = format!("{}.bgz", bed.display());
        assert_eq!(
            rewrite.lines,
            vec![
                format!("{}\tbed\tlabel=a", target),
                format!("{}\tbed\tlabel=b", target),
            ]
        );
    }

    #[test]
    fn test_list_not_found() {
        let dir = TempDir::new().unwrap();
        let err = rewrite_interval_file(dir.path().join("intervals.txt"), &Planner::new())
            .unwrap_err();
        assert!(matches!(err, IntervalListError::ListNotFound(_)));
    }

    #[test]
    fn test_missing_list_is_skipped() {
        let dir = TempDir::new().unwrap();
        let rewrite =
            rewrite_interval_file_if_present(dir.path().join("intervals.txt"), &Planner::new())
                .unwrap();
        assert!(rewrite.is_none());

        let list = dir.path().join("present.txt");
        fs::write(&list, "# nothing yet\n").unwrap();
        let rewrite = rewrite_interval_file_if_present(&list, &Planner::new()).unwrap();
        assert_eq!(rewrite.unwrap().lines, vec!["# nothing yet"]);
    }
}
