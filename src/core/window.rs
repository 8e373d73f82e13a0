//! View and focus windows
//!
//! A view window is the full span plotted for a region; a focus window is
//! the sub-span highlighted inside it. Both are plain values: updating a
//! pair replaces its windows wholesale.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from a BED strand field
    ///
    /// # Examples
    /// ```
    /// use track_prep::core::Strand;
    /// assert_eq!(Strand::from_field("+"), Some(Strand::Plus));
    /// assert_eq!(Strand::from_field("-"), Some(Strand::Minus));
    /// assert_eq!(Strand::from_field("."), None);
    /// ```
    pub fn from_field(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Error parsing a view or focus string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowParseError {
    #[error("expected '<chrom>:<start>-<end>:<strand>', got '{0}'")]
    MalformedView(String),

    #[error("expected '<start>-<end>', got '{0}'")]
    MalformedFocus(String),

    #[error("invalid strand '{0}'")]
    InvalidStrand(String),

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error("end ({end}) is before start ({start})")]
    InvertedRange { start: u64, end: u64 },
}

fn parse_range(s: &str) -> Option<(&str, &str)> {
    s.split_once('-')
}

fn parse_coord(s: &str) -> Result<u64, WindowParseError> {
    s.parse()
        .map_err(|_| WindowParseError::InvalidCoordinate(s.to_string()))
}

/// Full plotted span of a region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewWindow {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl ViewWindow {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64, strand: Strand) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            strand,
        }
    }

    /// Rendered width in bases
    pub fn width(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Re-centre the window on the midpoint of `focus` if it is wider than `max_width`.
    ///
    /// Returns `None` when the window already fits (strictly `width <= max_width`).
    /// Otherwise the returned window is exactly `max_width` wide; its start is
    /// floored at 0, in which case it extends further right of the focus centre.
    ///
    /// # Examples
    /// ```
    /// use track_prep::core::{FocusWindow, Strand, ViewWindow};
    /// let view = ViewWindow::new("chr1", 200, 9000, Strand::Minus);
    /// let clamped = view.clamp_to_focus(&FocusWindow::new(4000, 4010), 1000).unwrap();
    /// assert_eq!(clamped.to_string(), "chr1:3505-4505:-");
    /// ```
    pub fn clamp_to_focus(&self, focus: &FocusWindow, max_width: u64) -> Option<ViewWindow> {
        if self.width() <= max_width {
            return None;
        }

        let start = focus.center().saturating_sub(max_width / 2);
        Some(ViewWindow {
            chrom: self.chrom.clone(),
            start,
            end: start.saturating_add(max_width),
            strand: self.strand,
        })
    }
}

impl fmt::Display for ViewWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.chrom, self.start, self.end, self.strand)
    }
}

impl FromStr for ViewWindow {
    type Err = WindowParseError;

    /// Parse `<chrom>:<start>-<end>:<strand>`. The chromosome may itself contain ':'.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WindowParseError::MalformedView(s.to_string());

        let (rest, strand) = s.rsplit_once(':').ok_or_else(malformed)?;
        let (chrom, range) = rest.rsplit_once(':').ok_or_else(malformed)?;
        let (start, end) = parse_range(range).ok_or_else(malformed)?;
        if chrom.is_empty() {
            return Err(malformed());
        }

        let strand = Strand::from_field(strand)
            .ok_or_else(|| WindowParseError::InvalidStrand(strand.to_string()))?;
        let start = parse_coord(start)?;
        let end = parse_coord(end)?;
        if end < start {
            return Err(WindowParseError::InvertedRange { start, end });
        }

        Ok(ViewWindow::new(chrom, start, end, strand))
    }
}

/// Highlighted sub-span, always on the chromosome of its paired view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusWindow {
    pub start: u64,
    pub end: u64,
}

impl FocusWindow {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Floor midpoint, exact for coordinates up to `u64::MAX`
    pub fn center(&self) -> u64 {
        self.start / 2 + self.end / 2 + (self.start % 2 + self.end % 2) / 2
    }
}

impl fmt::Display for FocusWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for FocusWindow {
    type Err = WindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) =
            parse_range(s).ok_or_else(|| WindowParseError::MalformedFocus(s.to_string()))?;
        let start = parse_coord(start)?;
        let end = parse_coord(end)?;
        if end < start {
            return Err(WindowParseError::InvertedRange { start, end });
        }
        Ok(FocusWindow::new(start, end))
    }
}

/// View window of a region plus its optional focus
///
/// Pairs only come into existence from a view row, so the view is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatePair {
    pub view: ViewWindow,
    pub focus: Option<FocusWindow>,
}

impl CoordinatePair {
    pub fn new(view: ViewWindow) -> Self {
        Self { view, focus: None }
    }

    /// Rendered view string, `<chrom>:<start>-<end>:<strand>`
    pub fn view_string(&self) -> String {
        self.view.to_string()
    }

    /// Rendered focus string, `<start>-<end>`, if a focus was set
    pub fn focus_string(&self) -> Option<String> {
        self.focus.map(|f| f.to_string())
    }
}
