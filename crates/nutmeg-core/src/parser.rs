//! Binary NutMeg file parser

use crate::naming::{FallbackNamer, RandomNamer};
use crate::plot::parse_plot_with;
use crate::scanner::{find_all, find_subsequence, read_labeled_line};
use crate::types::*;
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// How plots are keyed in the resulting [`NutMeg`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotKeying {
    /// Raw `Plotname:` text
    #[default]
    RawName,
    /// Resolved analysis kind (`tran`, `ac`, backtick name or fallback)
    AnalysisKind,
}

/// Options for reading a NutMeg file
#[derive(Clone)]
pub struct ReadOptions {
    /// Anchor that starts each plot segment
    pub plot_anchor: Vec<u8>,
    /// Bytes skipped after the header split before plot scanning begins
    pub skip: usize,
    pub keying: PlotKeying,
    pub namer: Arc<dyn FallbackNamer>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            plot_anchor: PLOT_ANCHOR.to_vec(),
            skip: 0,
            keying: PlotKeying::default(),
            namer: Arc::new(RandomNamer),
        }
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("plot_anchor", &String::from_utf8_lossy(&self.plot_anchor))
            .field("skip", &self.skip)
            .field("keying", &self.keying)
            .finish_non_exhaustive()
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plot_anchor(mut self, anchor: impl Into<Vec<u8>>) -> Self {
        self.plot_anchor = anchor.into();
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_keying(mut self, keying: PlotKeying) -> Self {
        self.keying = keying;
        self
    }

    pub fn with_namer(mut self, namer: Arc<dyn FallbackNamer>) -> Self {
        self.namer = namer;
        self
    }
}

/// Parse a whole NutMeg buffer.
///
/// The header is everything before the first plot anchor; plots start at
/// every anchor found in the body. Any plot that fails to decode fails the
/// whole buffer.
pub fn parse_raw(raw: &[u8], options: &ReadOptions) -> Result<NutMeg> {
    if options.plot_anchor.is_empty() {
        return Err(NutError::Format("plot anchor must not be empty".into()));
    }

    let split = find_subsequence(raw, &options.plot_anchor).ok_or_else(|| {
        NutError::Format(format!(
            "no '{}' anchor found in {} bytes",
            String::from_utf8_lossy(&options.plot_anchor),
            raw.len()
        ))
    })?;
    let header = &raw[..split];
    let body = raw.get(split.saturating_add(options.skip)..).unwrap_or_default();

    let title = read_labeled_line(header, TITLE_LABEL, false);
    let date = read_labeled_line(header, DATE_LABEL, false);

    let starts = find_all(body, &options.plot_anchor);
    trace!(header = split, plots = ?starts, "Plot anchors");

    let mut nut = NutMeg::new(title, date, raw.len() - split);

    let ends = starts.iter().skip(1).copied().chain(std::iter::once(body.len()));
    for (start, end) in starts.iter().copied().zip(ends) {
        let plot = parse_plot_with(&body[start..end], options.namer.as_ref())?;
        let key = match options.keying {
            PlotKeying::RawName => plot.plot_name.clone(),
            PlotKeying::AnalysisKind => plot.analysis.to_string(),
        };
        if nut.insert(key.clone(), plot).is_some() {
            warn!(key = %key, "duplicate plot key, earlier plot replaced");
        }
    }

    if nut.is_empty() {
        return Err(NutError::Format(format!(
            "no plots found after header (skip = {})",
            options.skip
        )));
    }

    Ok(nut)
}

/// Read a NutMeg file with default options
pub fn read_raw_impl<P: AsRef<Path>>(path: P) -> Result<NutMeg> {
    read_raw_with_impl(path, &ReadOptions::default())
}

/// Read a NutMeg file: map it once, then parse the mapped bytes
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_raw_with_impl<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<NutMeg> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(NutError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    debug!(
        bytes = mmap.len(),
        mb = mmap.len() as f64 / 1_048_576.0,
        "File mapped"
    );

    let nut = parse_raw(&mmap, options)?;

    info!(
        title = %nut.title,
        plots = nut.len(),
        offset = nut.offset,
        "NutMeg file read"
    );

    Ok(nut)
}
