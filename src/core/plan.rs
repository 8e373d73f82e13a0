//! Remediation planning
//!
//! Turns the readiness state of an interval file into the list of steps an
//! orchestrator must run before the file can be handed to parallel plotting
//! jobs. Planning is read-only; nothing here executes a command.
//!
//! | state                 | steps                                   | target           |
//! |-----------------------|-----------------------------------------|------------------|
//! | compressed + indexed  | none                                    | source           |
//! | compressed            | index                                   | source           |
//! | compressed, malformed | decompress, sort, compress, index       | `<base>.bgz`     |
//! | uncompressed          | sort, compress, index                   | `<source>.bgz`   |
//!
//! Steps that rewrite content always produce a new path; the source file is
//! never modified.

use crate::core::error::ReadinessResult;
use crate::core::readiness::{
    append_suffix, classify, index_path, FileState, BGZIP_SUFFIX, COMPRESSED_SUFFIXES,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Infix used when a re-compressed target would land on its own source
pub const RESORTED_INFIX: &str = ".resorted";

/// Tabix preset, chosen from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabixPreset {
    Bed,
    Gff,
}

impl TabixPreset {
    /// `Bed` when the lower-cased file name contains `.bed`, otherwise `Gff`.
    /// Directory names are not considered.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_string_lossy()
            .to_lowercase();
        if name.contains(".bed") {
            TabixPreset::Bed
        } else {
            TabixPreset::Gff
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabixPreset::Bed => "bed",
            TabixPreset::Gff => "gff",
        }
    }
}

impl fmt::Display for TabixPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied to a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKind {
    #[default]
    Lexical,
    Numeric,
    /// Natural ordering of embedded numbers (chr2 < chr10)
    Version,
}

impl SortKind {
    fn flag(&self) -> &'static str {
        match self {
            SortKind::Lexical => "",
            SortKind::Numeric => "n",
            SortKind::Version => "V",
        }
    }
}

/// Error parsing a sort key spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort key '{0}' (expected e.g. '1V', '2n' or '4,4n')")]
pub struct SortKeyParseError(String);

/// One `sort -k` key: 1-based start field, optional end field, comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub field: usize,
    pub end_field: Option<usize>,
    pub kind: SortKind,
}

impl SortKey {
    pub fn new(field: usize, end_field: Option<usize>, kind: SortKind) -> Self {
        Self {
            field,
            end_field,
            kind,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-k{}", self.field)?;
        if let Some(end) = self.end_field {
            write!(f, ",{}", end)?;
        }
        f.write_str(self.kind.flag())
    }
}

impl FromStr for SortKey {
    type Err = SortKeyParseError;

    /// Accepts `1V`, `2n`, `1,1`, `4,4n`, with or without a leading `-k`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SortKeyParseError(s.to_string());
        let spec = s.trim();
        let spec = spec.strip_prefix("-k").unwrap_or(spec);

        let (body, kind) = match spec.chars().last() {
            Some('n') => (&spec[..spec.len() - 1], SortKind::Numeric),
            Some('V') => (&spec[..spec.len() - 1], SortKind::Version),
            _ => (spec, SortKind::Lexical),
        };

        let field_num = |v: &str| v.parse::<usize>().ok().filter(|&n| n > 0);
        let (field, end_field) = match body.split_once(',') {
            Some((start, end)) => (
                field_num(start).ok_or_else(err)?,
                Some(field_num(end).ok_or_else(err)?),
            ),
            None => (field_num(body).ok_or_else(err)?, None),
        };
        if end_field.is_some_and(|end| end < field) {
            return Err(err());
        }

        Ok(SortKey::new(field, end_field, kind))
    }
}

/// Ordered list of sort keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub keys: Vec<SortKey>,
}

impl SortOrder {
    /// Default genomic ordering for a preset
    ///
    /// BED: chromosome (version sort), start, end. GFF/GTF: chromosome, then
    /// column 4 numerically.
    pub fn for_preset(preset: TabixPreset) -> Self {
        let keys = match preset {
            TabixPreset::Bed => vec![
                SortKey::new(1, None, SortKind::Version),
                SortKey::new(2, None, SortKind::Numeric),
                SortKey::new(3, None, SortKind::Numeric),
            ],
            TabixPreset::Gff => vec![
                SortKey::new(1, Some(1), SortKind::Lexical),
                SortKey::new(4, Some(4), SortKind::Numeric),
            ],
        };
        Self { keys }
    }

    /// `sort` arguments for this ordering
    pub fn args(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.to_string()).collect()
    }
}

impl FromStr for SortOrder {
    type Err = SortKeyParseError;

    /// Comma-separated keys are ambiguous with `4,4n`, so keys are separated by
    /// whitespace or `;`: `"1V 2n 3n"`, `"1,1;4,4n"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split(|c: char| c == ';' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<SortKey>, _>>()?;
        if keys.is_empty() {
            return Err(SortKeyParseError(s.to_string()));
        }
        Ok(Self { keys })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

/// One remediation step, in the order it must run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Stream the decompressed source
    Decompress { source: PathBuf },
    /// Sort records into genomic order; `input` is `None` when reading the
    /// output of the previous step
    Sort {
        order: SortOrder,
        input: Option<PathBuf>,
    },
    /// Block-compress into `target`
    Compress { target: PathBuf },
    /// Build the tabix index for `target`
    Index { target: PathBuf, preset: TabixPreset },
}

impl Action {
    /// Command line this step stands for, as an argument vector
    pub fn argv(&self) -> Vec<String> {
        match self {
            Action::Decompress { source } => {
                vec!["zcat".to_string(), source.display().to_string()]
            }
            Action::Sort { order, input } => {
                let mut argv = vec!["sort".to_string()];
                argv.extend(order.args());
                if let Some(input) = input {
                    argv.push(input.display().to_string());
                }
                argv
            }
            Action::Compress { .. } => vec!["bgzip".to_string(), "-c".to_string()],
            Action::Index { target, preset } => vec![
                "tabix".to_string(),
                "-p".to_string(),
                preset.to_string(),
                target.display().to_string(),
            ],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))?;
        if let Action::Compress { target } = self {
            write!(f, " > {}", target.display())?;
        }
        Ok(())
    }
}

/// Steps needed to make one file compressed and indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationPlan {
    pub source: PathBuf,
    pub state: FileState,
    pub preset: TabixPreset,
    /// File downstream tools should read once the plan has run
    pub target: PathBuf,
    pub index: PathBuf,
    pub actions: Vec<Action>,
}

impl RemediationPlan {
    /// Nothing to do
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether downstream consumers must switch to a new path
    pub fn changes_path(&self) -> bool {
        self.target != self.source
    }
}

impl fmt::Display for RemediationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] -> {}", self.source.display(), self.state, self.target.display())?;
        if self.is_empty() {
            return write!(f, " (ready)");
        }
        for (i, action) in self.actions.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, action)?;
        }
        Ok(())
    }
}

/// Deterministic target path for a file in `state`
///
/// Uncompressed `name.ext` → `name.ext.bgz`. Malformed `name.ext.gz` or
/// `name.ext.bgz` → `name.ext.bgz`, or `name.ext.resorted.bgz` when that would
/// be the source itself. Compressed files keep their path.
pub fn target_path<P: AsRef<Path>>(path: P, state: FileState) -> PathBuf {
    let path = path.as_ref();
    match state {
        FileState::CompressedIndexed | FileState::CompressedUnindexed => path.to_path_buf(),
        FileState::Uncompressed => append_suffix(path, BGZIP_SUFFIX),
        FileState::CompressedMalformed => {
            let raw = path.to_string_lossy();
            let base = COMPRESSED_SUFFIXES
                .iter()
                .find_map(|suffix| raw.strip_suffix(suffix))
                .unwrap_or(&*raw);
            let target = PathBuf::from(format!("{}{}", base, BGZIP_SUFFIX));
            if target == path {
                PathBuf::from(format!("{}{}{}", base, RESORTED_INFIX, BGZIP_SUFFIX))
            } else {
                target
            }
        }
    }
}

/// Builds [`RemediationPlan`]s with per-preset sort orders
#[derive(Debug, Clone)]
pub struct Planner {
    bed_order: SortOrder,
    gff_order: SortOrder,
    check_header: bool,
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            bed_order: SortOrder::for_preset(TabixPreset::Bed),
            gff_order: SortOrder::for_preset(TabixPreset::Gff),
            check_header: false,
        }
    }
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the sort order used for `preset`
    pub fn with_sort_order(mut self, preset: TabixPreset, order: SortOrder) -> Self {
        match preset {
            TabixPreset::Bed => self.bed_order = order,
            TabixPreset::Gff => self.gff_order = order,
        }
        self
    }

    /// Read gzip headers so non-BGZF `.gz` files are planned as malformed
    pub fn with_header_check(mut self, check_header: bool) -> Self {
        self.check_header = check_header;
        self
    }

    pub fn sort_order(&self, preset: TabixPreset) -> &SortOrder {
        match preset {
            TabixPreset::Bed => &self.bed_order,
            TabixPreset::Gff => &self.gff_order,
        }
    }

    /// Inspect `path` and plan its remediation, preset taken from the file name
    pub fn plan<P: AsRef<Path>>(&self, path: P) -> ReadinessResult<RemediationPlan> {
        let path = path.as_ref();
        self.plan_with_preset(path, TabixPreset::from_path(path))
    }

    /// Inspect `path` and plan its remediation with a fixed preset
    pub fn plan_with_preset<P: AsRef<Path>>(
        &self,
        path: P,
        preset: TabixPreset,
    ) -> ReadinessResult<RemediationPlan> {
        let path = path.as_ref();
        let state = classify(path, self.check_header)?;
        Ok(self.plan_for_state_with_preset(path, state, preset))
    }

    /// Plan for a file whose tabix indexing failed downstream
    pub fn plan_after_index_failure<P: AsRef<Path>>(&self, path: P) -> RemediationPlan {
        self.plan_for_state(path, FileState::CompressedMalformed)
    }

    /// Plan for a file already known to be in `state`
    pub fn plan_for_state<P: AsRef<Path>>(&self, path: P, state: FileState) -> RemediationPlan {
        let preset = TabixPreset::from_path(path.as_ref());
        self.plan_for_state_with_preset(path, state, preset)
    }

    pub fn plan_for_state_with_preset<P: AsRef<Path>>(
        &self,
        path: P,
        state: FileState,
        preset: TabixPreset,
    ) -> RemediationPlan {
        let source = path.as_ref().to_path_buf();
        let target = target_path(&source, state);
        let order = self.sort_order(preset).clone();

        let index = Action::Index {
            target: target.clone(),
            preset,
        };
        let compress = Action::Compress {
            target: target.clone(),
        };
        let actions = match state {
            FileState::CompressedIndexed => Vec::new(),
            FileState::CompressedUnindexed => vec![index],
            FileState::Uncompressed => vec![
                Action::Sort {
                    order,
                    input: Some(source.clone()),
                },
                compress,
                index,
            ],
            FileState::CompressedMalformed => vec![
                Action::Decompress {
                    source: source.clone(),
                },
                Action::Sort { order, input: None },
                compress,
                index,
            ],
        };

        RemediationPlan {
            index: index_path(&target),
            source,
            state,
            preset,
            target,
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_path() {
        assert_eq!(TabixPreset::from_path("peaks.BED"), TabixPreset::Bed);
        assert_eq!(TabixPreset::from_path("a.bed.gz"), TabixPreset::Bed);
        assert_eq!(TabixPreset::from_path("genes.gtf"), TabixPreset::Gff);
        assert_eq!(TabixPreset::from_path("genes.gff3.gz"), TabixPreset::Gff);
    }

    #[test]
    fn test_default_sort_orders() {
        assert_eq!(
            SortOrder::for_preset(TabixPreset::Bed).to_string(),
            "-k1V -k2n -k3n"
        );
        assert_eq!(
            SortOrder::for_preset(TabixPreset::Gff).to_string(),
            "-k1,1 -k4,4n"
        );
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("1V".parse::<SortKey>().unwrap(), SortKey::new(1, None, SortKind::Version));
        assert_eq!(
            "-k4,4n".parse::<SortKey>().unwrap(),
            SortKey::new(4, Some(4), SortKind::Numeric)
        );
        assert_eq!("1,1".parse::<SortKey>().unwrap(), SortKey::new(1, Some(1), SortKind::Lexical));
        assert!("0n".parse::<SortKey>().is_err());
        assert!("4,2".parse::<SortKey>().is_err());
        assert!("x".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_order_parse() {
        let order: SortOrder = "1,1;4,4n;5,5n".parse().unwrap();
        assert_eq!(order.to_string(), "-k1,1 -k4,4n -k5,5n");
        assert!("".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_target_paths() {
        assert_eq!(
            target_path("data/a.bed", FileState::Uncompressed),
            PathBuf::from("data/a.bed.bgz")
        );
        assert_eq!(
            target_path("data/g.gtf.gz", FileState::CompressedMalformed),
            PathBuf::from("data/g.gtf.bgz")
        );
        assert_eq!(
            target_path("data/g.gtf.bgz", FileState::CompressedMalformed),
            PathBuf::from("data/g.gtf.resorted.bgz")
        );
        assert_eq!(
            target_path("data/g.gtf.gz", FileState::CompressedUnindexed),
            PathBuf::from("data/g.gtf.gz")
        );
    }

    #[test]
    fn test_plan_uncompressed() {
        let plan = Planner::new().plan_for_state("a.bed", FileState::Uncompressed);
        let steps: Vec<String> = plan.actions.iter().map(|a| a.to_string()).collect();
        assert_eq!(
            steps,
            vec![
                "sort -k1V -k2n -k3n a.bed",
                "bgzip -c > a.bed.bgz",
                "tabix -p bed a.bed.bgz",
            ]
        );
        assert_eq!(plan.index, PathBuf::from("a.bed.bgz.tbi"));
        assert!(plan.changes_path());
    }

    #[test]
    fn test_plan_malformed() {
        let plan = Planner::new().plan_after_index_failure("genes.gtf.gz");
        assert_eq!(plan.actions.len(), 4);
        assert_eq!(plan.actions[0].to_string(), "zcat genes.gtf.gz");
        assert_eq!(plan.actions[1].to_string(), "sort -k1,1 -k4,4n");
        assert_eq!(plan.target, PathBuf::from("genes.gtf.bgz"));
    }

    #[test]
    fn test_plan_unindexed_only_indexes() {
        let plan = Planner::new().plan_for_state("x.bed.gz", FileState::CompressedUnindexed);
        assert_eq!(
            plan.actions,
            vec![Action::Index {
                target: PathBuf::from("x.bed.gz"),
                preset: TabixPreset::Bed
            }]
        );
        assert!(!plan.changes_path());
    }

    #[test]
    fn test_plan_ready_is_empty() {
        let plan = Planner::new().plan_for_state("x.bed.gz", FileState::CompressedIndexed);
        assert!(plan.is_empty());
        assert!(plan.to_string().ends_with("(ready)"));
    }

    #[test]
    fn test_custom_sort_order() {
        let order: SortOrder = "1,1 4,4n 5,5n".parse().unwrap();
        let planner = Planner::new().with_sort_order(TabixPreset::Gff, order.clone());
        let plan = planner.plan_for_state("g.gtf", FileState::Uncompressed);
        assert_eq!(
            plan.actions[0],
            Action::Sort {
                order,
                input: Some(PathBuf::from("g.gtf"))
            }
        );
    }

    #[test]
    fn test_preset_ignores_directories() {
        assert_eq!(
            TabixPreset::from_path("project.bedfiles/genes.gtf"),
            TabixPreset::Gff
        );
        let plan =
            Planner::new().plan_for_state("project.bedfiles/genes.gtf", FileState::Uncompressed);
        assert_eq!(plan.preset, TabixPreset::Gff);
    }

    #[test]
    fn test_fixed_preset_overrides_name() {
        let plan = Planner::new().plan_for_state_with_preset(
            "annotation.bed.gtf",
            FileState::Uncompressed,
            TabixPreset::Gff,
        );
        assert_eq!(plan.preset, TabixPreset::Gff);
        assert_eq!(plan.actions[0].to_string(), "sort -k1,1 -k4,4n annotation.bed.gtf");
        assert_eq!(
            plan.actions[2].to_string(),
            "tabix -p gff annotation.bed.gtf.bgz"
        );
    }

    #[test]
    fn test_malformed_sort_reads_pipe() {
        let plan = Planner::new().plan_after_index_failure("a.bed.gz");
        assert!(matches!(plan.actions[1], Action::Sort { input: None, .. }));
    }
}
