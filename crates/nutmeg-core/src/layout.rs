//! Binary record layout derived from a plot's variable schema

use crate::types::{CellKind, NutError, Result, Variable};
use tracing::warn;

/// Fixed-width big-endian record layout of one plot
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    /// Cell representation shared by all fields
    pub kind: CellKind,
    /// Fields per record, as declared by `No. Variables:`
    pub field_count: usize,
    /// Byte offset of each schema field inside a record, in schema order
    pub offsets: Vec<(String, usize)>,
}

impl RecordLayout {
    /// Bytes occupied by one record
    ///
    /// Fails when `No. Variables` is too large for any record to exist.
    #[inline]
    pub fn record_size(&self) -> Result<usize> {
        self.field_count
            .checked_mul(self.kind.width())
            .ok_or_else(|| {
                NutError::Format(format!(
                    "record of {} fields overflows the address space",
                    self.field_count
                ))
            })
    }

    /// Byte offset of the field called `name`
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.offsets
            .iter()
            .find(|(field, _)| field == name)
            .map(|&(_, offset)| offset)
    }
}

/// Build the record layout for a plot.
///
/// The record stride always follows `declared` (the binary is written with
/// that many fields). A schema shorter than `declared` only logs a warning:
/// the missing trailing fields are skipped on decode. A schema longer than
/// `declared` cannot be mapped onto the records and is rejected.
pub fn build_layout(schema: &[Variable], declared: usize, flags: &str) -> Result<RecordLayout> {
    let kind = CellKind::from_flags(flags);

    if schema.len() != declared {
        warn!(
            schema = schema.len(),
            declared, "variable block length differs from No. Variables"
        );
    }
    if schema.len() > declared {
        return Err(NutError::Format(format!(
            "schema has {} variables but records hold only {}",
            schema.len(),
            declared
        )));
    }

    let offsets = schema
        .iter()
        .enumerate()
        .map(|(i, var)| (var.name.clone(), i * kind.width()))
        .collect();

    Ok(RecordLayout {
        kind,
        field_count: declared,
        offsets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> Vec<Variable> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Variable::new(*n, i, "V"))
            .collect()
    }

    #[test]
    fn test_real_layout() {
        let layout = build_layout(&schema(&["time", "v(out)", "v(in)"]), 3, "real").unwrap();
        assert_eq!(layout.kind, CellKind::Real);
        assert_eq!(layout.record_size().unwrap(), 24);
        assert_eq!(layout.offset_of("v(in)"), Some(16));
    }

    #[test]
    fn test_complex_layout() {
        let layout = build_layout(&schema(&["frequency", "v(out)"]), 2, "complex").unwrap();
        assert_eq!(layout.kind, CellKind::Complex);
        assert_eq!(layout.record_size().unwrap(), 32);
        assert_eq!(layout.offset_of("v(out)"), Some(16));
        assert_eq!(layout.offset_of("missing"), None);
    }

    #[test]
    fn test_short_schema_keeps_declared_stride() {
        let layout = build_layout(&schema(&["time"]), 2, "real").unwrap();
        assert_eq!(layout.record_size().unwrap(), 16);
        assert_eq!(layout.offsets.len(), 1);
    }

    #[test]
    fn test_huge_field_count_is_format_error() {
        let layout = build_layout(&schema(&["time"]), usize::MAX / 4, "real").unwrap();
        assert!(matches!(layout.record_size(), Err(NutError::Format(_))));

        let layout = build_layout(&schema(&["time"]), usize::MAX / 10, "complex").unwrap();
        assert!(matches!(layout.record_size(), Err(NutError::Format(_))));
    }

    #[test]
    fn test_long_schema_is_rejected() {
        let result = build_layout(&schema(&["a", "b", "c"]), 2, "real");
        assert!(matches!(result, Err(NutError::Format(_))));
    }
}
