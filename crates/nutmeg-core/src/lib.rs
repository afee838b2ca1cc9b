//! # Binary NutMeg Reader - Core Library
//!
//! Reads the binary variant of the NutMeg raw format written by circuit
//! simulators (ngspice, Spectre, Xyce) into typed, columnar plots.
//!
//! ## Features
//!
//! - Memory-mapped file I/O, one pass over the mapped bytes
//! - Multiple plots per file, real and complex payloads
//! - Big-endian records decoded into native `f64` / `Complex64` columns
//! - Pluggable fallback naming for plots without an analysis kind
//! - Structured logging via `tracing` for diagnostics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nutmeg_core::{read_raw, VectorData};
//!
//! let nut = read_raw("testbench.raw").unwrap();
//! println!("Title: {}", nut.title);
//!
//! for (key, plot) in nut.iter() {
//!     println!("{key}: {} ({} points)", plot.analysis, plot.n_points);
//!     if let Some(VectorData::Real(time)) = plot.get("time") {
//!         println!("  time points: {}", time.len());
//!     }
//! }
//! ```
//!
//! ## Options
//!
//! ```rust,no_run
//! use nutmeg_core::{read_raw_with, PlotKeying, ReadOptions, SeededNamer};
//! use std::sync::Arc;
//!
//! let options = ReadOptions::new()
//!     .with_keying(PlotKeying::AnalysisKind)
//!     .with_namer(Arc::new(SeededNamer::new(0)));
//! let nut = read_raw_with("testbench.raw", &options).unwrap();
//! println!("plots: {:?}", nut.keys().collect::<Vec<_>>());
//! ```
//!
//! ## Enabling Logging
//!
//! This library uses `tracing` for structured logging. To see log output,
//! initialize a tracing subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! let nut = nutmeg_core::read_raw("testbench.raw").unwrap();
//! ```

mod export;
mod layout;
mod naming;
mod parser;
mod plot;
mod reader;
mod scanner;
mod types;

use std::path::Path;

// Re-export public types
pub use types::{
    AnalysisKind,
    CellKind,
    NutError,
    NutMeg,
    NutPlot,
    Result,
    Variable,
    VectorData,
    // Constants
    BINARY_MARKER,
    COMPLEX_CELL_SIZE,
    OFFSET_KEY,
    PLOT_ANCHOR,
    REAL_CELL_SIZE,
};

pub use export::{plot_dict, plot_table, ExportEntry, PlotTable};
pub use layout::{build_layout, RecordLayout};
pub use naming::{FallbackNamer, RandomNamer, SeededNamer, FALLBACK_NAME_LEN};
pub use parser::{parse_raw, PlotKeying, ReadOptions};
pub use plot::{analysis_kind, parse_plot, parse_plot_with};
pub use scanner::{read_labeled_block, read_labeled_line};

// ============================================================================
// Public API Functions
// ============================================================================

/// Read a binary NutMeg file.
///
/// # Arguments
/// * `filename` - Path to the raw file
///
/// # Returns
/// * `Ok(NutMeg)` - Title, date, plots in file order and trailing offset
/// * `Err(NutError::NotFound)` - If the path is not a file
/// * `Err(NutError::Format)` - If a header field or payload is malformed
///
/// # Example
/// ```rust,no_run
/// let nut = nutmeg_core::read_raw("testbench.raw").unwrap();
/// println!("{} plots, {} bytes after the header", nut.len(), nut.offset);
/// ```
pub fn read_raw<P: AsRef<Path>>(filename: P) -> Result<NutMeg> {
    parser::read_raw_impl(filename)
}

/// Read a binary NutMeg file with custom [`ReadOptions`].
pub fn read_raw_with<P: AsRef<Path>>(filename: P, options: &ReadOptions) -> Result<NutMeg> {
    parser::read_raw_with_impl(filename, options)
}
