//! Plot segment decoder
//!
//! A plot segment runs from one `Plotname:` anchor to the next (or to the end
//! of file). It holds its own text header followed by `\nBinary:\n` and
//! `max(1, No. Points)` fixed-width big-endian records.

use crate::layout::{build_layout, RecordLayout};
use crate::naming::{FallbackNamer, RandomNamer};
use crate::reader::{complex_at, real_at, PayloadReader};
use crate::scanner::{find_subsequence, read_labeled_block, read_labeled_line};
use crate::types::*;
use tracing::{debug, warn};

/// Resolve the analysis kind of a plot name.
///
/// A known analysis token at the start of the name wins, then a
/// backtick-quoted name (`` `tran' ``), then a generated fallback.
pub fn analysis_kind(plot_name: &str, namer: &dyn FallbackNamer) -> AnalysisKind {
    if let Some(kind) = AnalysisKind::from_prefix(plot_name) {
        return kind;
    }
    if let Some(name) = backtick_name(plot_name) {
        return AnalysisKind::Named(name.to_string());
    }
    AnalysisKind::Fallback(namer.next_fallback_name())
}

/// Text between the first backtick and the next apostrophe
fn backtick_name(plot_name: &str) -> Option<&str> {
    let (_, rest) = plot_name.split_once('`')?;
    let (name, _) = rest.split_once('\'')?;
    Some(name)
}

fn parse_count(raw: &[u8], label: &str) -> Result<usize> {
    let value = read_labeled_line(raw, label, false);
    value
        .parse()
        .map_err(|_| NutError::Format(format!("{label}: invalid integer '{value}'")))
}

/// Decode `count` records into one column per schema field
fn decode_records(
    payload: &[u8],
    layout: &RecordLayout,
    count: usize,
) -> Result<Vec<VectorData>> {
    let record_size = layout.record_size()?;
    // counts come from header text: bound them by the payload before allocating
    match count.checked_mul(record_size) {
        Some(needed) if needed <= payload.len() => {}
        _ => {
            return Err(NutError::Format(format!(
                "payload truncated: need {count} records of {record_size} bytes, have {} bytes",
                payload.len()
            )))
        }
    }
    if layout.offsets.is_empty() {
        return Ok(Vec::new());
    }

    let mut columns: Vec<VectorData> = layout
        .offsets
        .iter()
        .map(|_| VectorData::with_capacity(layout.kind, count))
        .collect();

    let mut reader = PayloadReader::new(payload);

    for _ in 0..count {
        let record = reader.read_record(record_size)?;
        for ((_, offset), column) in layout.offsets.iter().zip(columns.iter_mut()) {
            match column {
                VectorData::Real(v) => v.push(real_at(record, *offset)),
                VectorData::Complex(v) => v.push(complex_at(record, *offset)),
            }
        }
    }

    if reader.remaining() > 0 {
        debug!(
            consumed = reader.position(),
            unused = reader.remaining(),
            "unused bytes after the last record"
        );
    }

    Ok(columns)
}

/// Parse one plot segment using the default random fallback namer
pub fn parse_plot(raw_plot: &[u8]) -> Result<NutPlot> {
    parse_plot_with(raw_plot, &RandomNamer)
}

/// Parse one plot segment into a typed [`NutPlot`]
pub fn parse_plot_with(raw_plot: &[u8], namer: &dyn FallbackNamer) -> Result<NutPlot> {
    let plot_name = read_labeled_line(raw_plot, PLOTNAME_LABEL, false);
    let analysis = analysis_kind(&plot_name, namer);
    let flags = read_labeled_line(raw_plot, FLAGS_LABEL, false);
    let n_variables = parse_count(raw_plot, NUM_VARIABLES_LABEL)?;
    let n_points = parse_count(raw_plot, NUM_POINTS_LABEL)?;
    let variables =
        read_labeled_block(raw_plot, VARIABLES_BLOCK_START, VARIABLES_BLOCK_END, true)?;

    let layout = build_layout(&variables, n_variables, &flags)?;

    let data_start = find_subsequence(raw_plot, BINARY_MARKER)
        .map(|pos| pos + BINARY_MARKER.len())
        .ok_or_else(|| {
            NutError::Format(format!("plot '{plot_name}': binary marker not found"))
        })?;

    let num_records = n_points.max(1);
    let data = decode_records(&raw_plot[data_start..], &layout, num_records).map_err(|e| {
        match e {
            NutError::Format(msg) => NutError::Format(format!(
                "plot '{plot_name}' ({num_records} records of {n_variables} fields from offset {data_start}): {msg}"
            )),
            other => other,
        }
    })?;

    if analysis.is_fallback() {
        warn!(plot = %plot_name, kind = %analysis, "no analysis kind in plot name");
    }
    debug!(
        plot = %plot_name,
        kind = %analysis,
        points = n_points,
        variables = variables.len(),
        complex = layout.kind == CellKind::Complex,
        "Plot decoded"
    );

    Ok(NutPlot {
        plot_name,
        analysis,
        flags,
        n_points,
        variables,
        data,
    })
}
