//! Tabular export of parsed plots
//!
//! Bridges a [`NutMeg`] to column-oriented consumers (dataframes, numpy).
//! Columns are native-endian and named after the plot's variables; the
//! trailing offset travels as a final `"offset"` entry.

use crate::types::{NutMeg, NutPlot, VectorData, OFFSET_KEY};

/// Named native-endian columns of one plot
#[derive(Debug, Clone, PartialEq)]
pub struct PlotTable {
    pub columns: Vec<(String, VectorData)>,
}

impl PlotTable {
    pub fn get(&self, name: &str) -> Option<&VectorData> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, data)| data)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Number of rows (records)
    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry of an exported document
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEntry {
    Table(PlotTable),
    Offset(usize),
}

/// Columns of one plot, named by variable
pub fn plot_table(plot: &NutPlot) -> PlotTable {
    PlotTable {
        columns: plot
            .variables
            .iter()
            .zip(plot.data.iter())
            .map(|(var, data)| (var.name.clone(), data.clone()))
            .collect(),
    }
}

/// All plots as tables in file order, followed by the `"offset"` entry
pub fn plot_dict(nut: &NutMeg) -> Vec<(String, ExportEntry)> {
    nut.iter()
        .map(|(key, plot)| (key.to_string(), ExportEntry::Table(plot_table(plot))))
        .chain(std::iter::once((
            OFFSET_KEY.to_string(),
            ExportEntry::Offset(nut.offset),
        )))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisKind, Variable};

    fn sample() -> NutMeg {
        let mut nut = NutMeg::new("demo".into(), "now".into(), 128);
        nut.insert(
            "tran".into(),
            NutPlot {
                plot_name: "Transient Analysis".into(),
                analysis: AnalysisKind::Tran,
                flags: "real".into(),
                n_points: 2,
                variables: vec![Variable::new("time", 0, "s"), Variable::new("v(out)", 1, "V")],
                data: vec![
                    VectorData::Real(vec![0.0, 1.0]),
                    VectorData::Real(vec![2.0, 3.0]),
                ],
            },
        );
        nut
    }

    #[test]
    fn test_plot_table_columns() {
        let nut = sample();
        let table = plot_table(nut.first().unwrap());
        assert_eq!(table.names(), vec!["time", "v(out)"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("v(out)"), Some(&VectorData::Real(vec![2.0, 3.0])));
    }

    #[test]
    fn test_plot_dict_ends_with_offset() {
        let entries = plot_dict(&sample());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "tran");
        assert!(matches!(entries[0].1, ExportEntry::Table(_)));
        assert_eq!(entries[1], ("offset".to_string(), ExportEntry::Offset(128)));
    }
}
