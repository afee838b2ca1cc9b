//! Python bindings for the binary NutMeg reader
//!
//! This crate exposes nutmeg-core to Python. Plots are handed over as
//! dictionaries of numpy arrays, one per variable, ready for
//! `pandas.DataFrame(...)`.

use nutmeg_core::{
    self, plot_dict as export_plot_dict, ExportEntry, NutError, NutMeg, NutPlot, PlotKeying,
    ReadOptions, Variable, VectorData,
};
use numpy::ndarray::Array1;
use numpy::IntoPyArray;
use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Python Classes
// ============================================================================

/// Python wrapper for one entry of a plot's variable block
#[pyclass(name = "Variable")]
#[derive(Clone)]
pub struct PyVariable {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub index: usize,
    #[pyo3(get)]
    pub unit: String,
}

#[pymethods]
impl PyVariable {
    fn __repr__(&self) -> String {
        format!(
            "Variable(name='{}', index={}, unit='{}')",
            self.name, self.index, self.unit
        )
    }
}

impl From<&Variable> for PyVariable {
    fn from(v: &Variable) -> Self {
        PyVariable {
            name: v.name.clone(),
            index: v.index,
            unit: v.unit.clone(),
        }
    }
}

/// Python wrapper for NutPlot
#[pyclass(name = "NutPlot")]
pub struct PyNutPlot {
    #[pyo3(get)]
    pub plot_name: String,
    #[pyo3(get)]
    pub analysis: String,
    #[pyo3(get)]
    pub flags: String,
    #[pyo3(get)]
    pub n_points: usize,

    inner: NutPlot,
}

#[pymethods]
impl PyNutPlot {
    /// Variables in record order
    #[getter]
    fn variables(&self) -> Vec<PyVariable> {
        self.inner.variables.iter().map(PyVariable::from).collect()
    }

    /// Get column data by variable name
    fn get(&self, py: Python, name: &str) -> Option<Py<PyAny>> {
        self.inner.get(name).map(|v| vector_to_numpy(py, v))
    }

    /// All columns as {name: ndarray}
    fn data<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        plot_to_dict(py, &self.inner)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Number of decoded records
    fn __len__(&self) -> usize {
        self.inner.num_records()
    }

    fn __repr__(&self) -> String {
        format!(
            "NutPlot(plot_name='{}', analysis='{}', points={}, vars={})",
            self.plot_name,
            self.analysis,
            self.n_points,
            self.inner.variables.len()
        )
    }
}

impl From<NutPlot> for PyNutPlot {
    fn from(p: NutPlot) -> Self {
        PyNutPlot {
            plot_name: p.plot_name.clone(),
            analysis: p.analysis.to_string(),
            flags: p.flags.clone(),
            n_points: p.n_points,
            inner: p,
        }
    }
}

/// Python wrapper for NutMeg
#[pyclass(name = "NutMeg")]
pub struct PyNutMeg {
    #[pyo3(get)]
    pub title: String,
    #[pyo3(get)]
    pub date: String,
    #[pyo3(get)]
    pub offset: usize,

    inner: NutMeg,
}

#[pymethods]
impl PyNutMeg {
    /// Plot keys in file order
    fn keys(&self) -> Vec<String> {
        self.inner.keys().map(str::to_string).collect()
    }

    /// Get a plot by key
    fn plot(&self, key: &str) -> Option<PyNutPlot> {
        self.inner.get(key).cloned().map(PyNutPlot::from)
    }

    /// All plots as {key: NutPlot}
    fn plots<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (key, plot) in self.inner.iter() {
            dict.set_item(key, PyNutPlot::from(plot.clone()))?;
        }
        Ok(dict)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "NutMeg(title='{}', date='{}', plots={}, offset={})",
            self.title,
            self.date,
            self.inner.len(),
            self.offset
        )
    }
}

impl From<NutMeg> for PyNutMeg {
    fn from(n: NutMeg) -> Self {
        PyNutMeg {
            title: n.title.clone(),
            date: n.date.clone(),
            offset: n.offset,
            inner: n,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn vector_to_numpy(py: Python, vector: &VectorData) -> Py<PyAny> {
    match vector {
        VectorData::Real(v) => Array1::from_vec(v.clone())
            .into_pyarray(py)
            .into_any()
            .unbind(),
        VectorData::Complex(v) => Array1::from_vec(v.clone())
            .into_pyarray(py)
            .into_any()
            .unbind(),
    }
}

fn plot_to_dict<'py>(py: Python<'py>, plot: &NutPlot) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (var, vector) in plot.variables.iter().zip(plot.data.iter()) {
        dict.set_item(var.name.as_str(), vector_to_numpy(py, vector))?;
    }
    Ok(dict)
}

fn to_py_err(e: NutError) -> PyErr {
    match e {
        NutError::NotFound { path } => {
            PyFileNotFoundError::new_err(path.display().to_string())
        }
        NutError::Io(e) => PyIOError::new_err(e.to_string()),
        NutError::Format(s) => PyValueError::new_err(s),
    }
}

fn parse_keying(keying: &str) -> PyResult<PlotKeying> {
    match keying {
        "name" => Ok(PlotKeying::RawName),
        "analysis" => Ok(PlotKeying::AnalysisKind),
        other => Err(PyValueError::new_err(format!(
            "unknown keying '{other}', expected 'name' or 'analysis'"
        ))),
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Read a binary NutMeg raw file
///
/// Args:
///     file_name: Path to the raw file
///     plots_id: Anchor that starts each plot segment
///     skip: Bytes skipped after the header before scanning for plots
///     keying: "name" (raw plot name) or "analysis" (analysis kind)
///
/// Returns:
///     NutMeg object
///
/// Raises:
///     FileNotFoundError, IOError, ValueError
#[pyfunction]
#[pyo3(signature = (file_name, plots_id=None, skip=0, keying="name"))]
pub fn read_raw(
    py: Python,
    file_name: &str,
    plots_id: Option<&[u8]>,
    skip: usize,
    keying: &str,
) -> PyResult<PyNutMeg> {
    let mut options = ReadOptions::new()
        .with_skip(skip)
        .with_keying(parse_keying(keying)?);
    if let Some(anchor) = plots_id {
        options = options.with_plot_anchor(anchor);
    }

    py.allow_threads(|| nutmeg_core::read_raw_with(file_name, &options))
        .map(PyNutMeg::from)
        .map_err(to_py_err)
}

/// Plots as dictionaries of numpy arrays
///
/// Returns:
///     {plot_key: {variable: ndarray}, ..., "offset": int}
#[pyfunction]
pub fn plot_dict<'py>(py: Python<'py>, nut: &PyNutMeg) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (key, entry) in export_plot_dict(&nut.inner) {
        match entry {
            ExportEntry::Table(table) => {
                let columns = PyDict::new(py);
                for (name, vector) in &table.columns {
                    columns.set_item(name.as_str(), vector_to_numpy(py, vector))?;
                }
                dict.set_item(key, columns)?;
            }
            ExportEntry::Offset(offset) => dict.set_item(key, offset)?,
        }
    }
    Ok(dict)
}

/// Route library logs to stderr
///
/// Args:
///     level: tracing filter directive, e.g. "info" or "nutmeg_core=debug"
///
/// Returns:
///     False if a subscriber was already installed
#[pyfunction]
#[pyo3(signature = (level="info"))]
pub fn init_logging(level: &str) -> PyResult<bool> {
    let filter = EnvFilter::try_new(level).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok())
}

// ============================================================================
// Module Definition
// ============================================================================

#[pymodule]
pub fn pynut(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Functions
    m.add_function(wrap_pyfunction!(read_raw, m)?)?;
    m.add_function(wrap_pyfunction!(plot_dict, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;

    // Classes
    m.add_class::<PyNutMeg>()?;
    m.add_class::<PyNutPlot>()?;
    m.add_class::<PyVariable>()?;

    Ok(())
}
