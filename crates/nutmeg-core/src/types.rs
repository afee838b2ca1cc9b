//! Common types, errors, and constants for NutMeg file operations

use num_complex::Complex64;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Anchor that starts every plot segment (and ends the file header)
pub const PLOT_ANCHOR: &[u8] = b"Plotname";
/// Literal sequence directly preceding the binary payload of a plot
pub const BINARY_MARKER: &[u8] = b"\nBinary:\n";

pub const TITLE_LABEL: &str = "Title";
pub const DATE_LABEL: &str = "Date";
pub const PLOTNAME_LABEL: &str = "Plotname";
pub const FLAGS_LABEL: &str = "Flags";
pub const NUM_VARIABLES_LABEL: &str = "No. Variables";
pub const NUM_POINTS_LABEL: &str = "No. Points";
pub const VARIABLES_BLOCK_START: &str = "Variables:";
pub const VARIABLES_BLOCK_END: &str = "Binary:";

/// Flag substring that switches a plot to complex cells
pub const COMPLEX_FLAG: &str = "complex";

/// Width of one real cell (big-endian f64)
pub const REAL_CELL_SIZE: usize = 8;
/// Width of one complex cell (two big-endian f64: re, im)
pub const COMPLEX_CELL_SIZE: usize = 16;

/// Key of the pseudo-entry carrying the trailing offset in exported tables
pub const OFFSET_KEY: &str = "offset";

// ============================================================================
// Enums
// ============================================================================

/// Numeric representation shared by every cell of one plot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// 8-byte big-endian IEEE-754 double
    Real,
    /// 16-byte big-endian complex double
    Complex,
}

impl CellKind {
    /// Determine the cell kind from the raw `Flags:` text
    pub fn from_flags(flags: &str) -> Self {
        if flags.contains(COMPLEX_FLAG) {
            CellKind::Complex
        } else {
            CellKind::Real
        }
    }

    /// Storage width in bytes
    #[inline]
    pub fn width(self) -> usize {
        match self {
            CellKind::Real => REAL_CELL_SIZE,
            CellKind::Complex => COMPLEX_CELL_SIZE,
        }
    }
}

/// Simulation type associated with a plot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Ac,
    Dc,
    DcMatch,
    DcOp,
    Noise,
    Stb,
    Tran,
    Xf,
    /// Backtick-quoted analysis name found in the plot name
    Named(String),
    /// Generated name for plots that carry no recognizable kind
    Fallback(String),
}

impl AnalysisKind {
    /// Known kinds, longest token first so that `dcop` wins over `dc`
    pub const KNOWN: [AnalysisKind; 8] = [
        AnalysisKind::DcMatch,
        AnalysisKind::Noise,
        AnalysisKind::DcOp,
        AnalysisKind::Tran,
        AnalysisKind::Stb,
        AnalysisKind::Ac,
        AnalysisKind::Dc,
        AnalysisKind::Xf,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AnalysisKind::Ac => "ac",
            AnalysisKind::Dc => "dc",
            AnalysisKind::DcMatch => "dcmatch",
            AnalysisKind::DcOp => "dcop",
            AnalysisKind::Noise => "noise",
            AnalysisKind::Stb => "stb",
            AnalysisKind::Tran => "tran",
            AnalysisKind::Xf => "xf",
            AnalysisKind::Named(s) | AnalysisKind::Fallback(s) => s,
        }
    }

    /// Match a known analysis token at the start of a plot name (case-insensitive)
    pub fn from_prefix(plot_name: &str) -> Option<Self> {
        let lower = plot_name.trim_start().to_lowercase();
        Self::KNOWN
            .iter()
            .find(|kind| lower.starts_with(kind.as_str()))
            .cloned()
    }

    /// Whether the kind came out of the name generator
    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisKind::Fallback(_))
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vector data - either real or complex
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl VectorData {
    /// Empty column with room for `capacity` cells
    pub fn with_capacity(kind: CellKind, capacity: usize) -> Self {
        match kind {
            CellKind::Real => VectorData::Real(Vec::with_capacity(capacity)),
            CellKind::Complex => VectorData::Complex(Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VectorData::Real(v) => v.len(),
            VectorData::Complex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, VectorData::Complex(_))
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            VectorData::Real(v) => Some(v),
            VectorData::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Option<&[Complex64]> {
        match self {
            VectorData::Complex(v) => Some(v),
            VectorData::Real(_) => None,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for NutMeg reading operations
#[derive(Debug, Error)]
pub enum NutError {
    /// The input path does not exist or is not a file
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural failure in the header text or binary payload
    #[error("Format error: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, NutError>;

// ============================================================================
// Data Structures
// ============================================================================

/// One entry of a plot's `Variables:` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Position declared in the text block
    pub index: usize,
    pub unit: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, index: usize, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index,
            unit: unit.into(),
        }
    }
}

/// A fully decoded plot segment
#[derive(Debug, Clone)]
pub struct NutPlot {
    /// Raw `Plotname:` text
    pub plot_name: String,
    pub analysis: AnalysisKind,
    /// Raw `Flags:` text
    pub flags: String,
    /// Value of `No. Points:` as written in the file
    pub n_points: usize,
    /// Variables in record order
    pub variables: Vec<Variable>,
    /// One column per variable, `max(1, n_points)` cells each
    pub data: Vec<VectorData>,
}

impl NutPlot {
    /// Column of the variable called `name`
    pub fn get(&self, name: &str) -> Option<&VectorData> {
        let idx = self.variables.iter().position(|v| v.name == name)?;
        self.data.get(idx)
    }

    pub fn column(&self, index: usize) -> Option<&VectorData> {
        self.data.get(index)
    }

    pub fn is_complex(&self) -> bool {
        CellKind::from_flags(&self.flags) == CellKind::Complex
    }

    /// Number of decoded records (never below one)
    pub fn num_records(&self) -> usize {
        self.data.first().map(|v| v.len()).unwrap_or(0)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }
}

/// A parsed NutMeg file
///
/// Plots keep file order. Re-inserting an existing key replaces the plot
/// but keeps the position of the first appearance.
#[derive(Debug, Clone, Default)]
pub struct NutMeg {
    pub title: String,
    pub date: String,
    plots: Vec<(String, NutPlot)>,
    index: HashMap<String, usize>,
    /// Bytes from the first plot anchor to the end of file
    pub offset: usize,
}

impl NutMeg {
    pub(crate) fn new(title: String, date: String, offset: usize) -> Self {
        Self {
            title,
            date,
            plots: Vec::new(),
            index: HashMap::new(),
            offset,
        }
    }

    /// Insert a plot, returning the replaced one if the key was taken
    pub(crate) fn insert(&mut self, key: String, plot: NutPlot) -> Option<NutPlot> {
        match self.index.get(&key).copied() {
            Some(pos) => Some(std::mem::replace(&mut self.plots[pos].1, plot)),
            None => {
                self.index.insert(key.clone(), self.plots.len());
                self.plots.push((key, plot));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&NutPlot> {
        self.index.get(key).map(|&pos| &self.plots[pos].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.plots.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutPlot)> {
        self.plots.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn first(&self) -> Option<&NutPlot> {
        self.plots.first().map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }
}
