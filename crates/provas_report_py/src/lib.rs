use std::collections::BTreeMap;

use provas_report::conf::derive_default_report_options;
use provas_report::spec::{EnumCellValue, ReportError, SpecReportOptions};
use provas_report::{
    ReportWorkbook, SpecInputTable, build_workbook, derive_output_filename, format_timestamp,
    normalize_score, process_csv_bytes, process_ipc_bytes, resolve_layout,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBytes, PyDict};
use tracing_subscriber::EnvFilter;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "provas_report.workbook.v1";
const C_BRIDGE_TRANSPORT: &str = "bytes";
const C_LOG_LEVEL_DEFAULT: &str = "warn";
const TUP_OPTION_KEYS: [&str; 10] = [
    "zoom",
    "width_cell_padding",
    "color_header_bg",
    "color_header_font",
    "color_row_even",
    "color_row_odd",
    "color_band_fail",
    "color_band_borderline",
    "color_band_pass",
    "font_size_total",
];

#[pyclass(name = "ReportWorkbook", frozen)]
#[derive(Debug, Clone)]
struct PyReportWorkbook {
    #[pyo3(get)]
    sheets: Vec<(String, usize)>,
    #[pyo3(get)]
    warnings: Vec<String>,
    inner: ReportWorkbook,
}

impl From<ReportWorkbook> for PyReportWorkbook {
    fn from(report: ReportWorkbook) -> Self {
        Self {
            sheets: report
                .sheets
                .iter()
                .map(|sheet| (sheet.sheet_name.clone(), sheet.n_rows))
                .collect(),
            warnings: report.warnings.clone(),
            inner: report,
        }
    }
}

#[pymethods]
impl PyReportWorkbook {
    #[getter]
    fn sheet_count(&self) -> usize {
        self.inner.sheet_count()
    }

    #[getter]
    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.inner.warning_count()
    }

    fn to_dict(&self) -> BTreeMap<String, usize> {
        self.inner.to_dict()
    }

    #[pyo3(signature = (prefix = "[REPORT]"))]
    fn format(&self, prefix: &str) -> String {
        self.inner.format(prefix)
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

fn map_report_error(exception: ReportError) -> PyErr {
    match exception {
        ReportError::Render(_) => PyRuntimeError::new_err(exception.to_string()),
        ReportError::UnsupportedLayout { .. }
        | ReportError::InvalidTimestamp(_)
        | ReportError::ColumnRange { .. }
        | ReportError::MissingColumn(_)
        | ReportError::TableRead(_) => PyValueError::new_err(exception.to_string()),
    }
}

fn parse_spec_report_options(options: Option<&Bound<'_, PyDict>>) -> PyResult<SpecReportOptions> {
    let mut cfg_options = derive_default_report_options();
    let Some(options) = options else {
        return Ok(cfg_options);
    };

    for key in options.keys() {
        let c_key = key.extract::<String>()?;
        if !TUP_OPTION_KEYS.contains(&c_key.as_str()) {
            return Err(PyValueError::new_err(format!(
                "Unknown report option: `{c_key}`. Expected one of: {TUP_OPTION_KEYS:?}"
            )));
        }
    }

    if let Some(val) = extract_optional_item::<u16>(options, "zoom")? {
        if !(10..=400).contains(&val) {
            return Err(PyValueError::new_err(format!(
                "Invalid zoom: {val}. Expected a value in [10, 400]"
            )));
        }
        cfg_options.zoom = val;
    }
    if let Some(val) = extract_optional_item::<usize>(options, "width_cell_padding")? {
        cfg_options.width_cell_padding = val;
    }
    if let Some(val) = extract_optional_item::<i64>(options, "font_size_total")? {
        if val <= 0 {
            return Err(PyValueError::new_err(format!(
                "Invalid font_size_total: {val}. Expected a positive value"
            )));
        }
        cfg_options.font_size_total = val;
    }

    for (c_key, c_color) in [
        ("color_header_bg", &mut cfg_options.color_header_bg),
        ("color_header_font", &mut cfg_options.color_header_font),
        ("color_row_even", &mut cfg_options.color_row_even),
        ("color_row_odd", &mut cfg_options.color_row_odd),
        ("color_band_fail", &mut cfg_options.color_band_fail),
        ("color_band_borderline", &mut cfg_options.color_band_borderline),
        ("color_band_pass", &mut cfg_options.color_band_pass),
    ] {
        if let Some(val) = extract_optional_item::<String>(options, c_key)? {
            *c_color = val;
        }
    }

    Ok(cfg_options)
}

fn extract_optional_item<T>(obj: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    for<'a> T: FromPyObject<'a>,
{
    let Some(val) = obj.get_item(key)? else {
        return Ok(None);
    };
    if val.is_none() {
        return Ok(None);
    }
    Ok(Some(val.extract::<T>()?))
}

fn derive_cell_value_from_py(value: &Bound<'_, PyAny>) -> EnumCellValue {
    if value.is_none() {
        return EnumCellValue::None;
    }
    if let Ok(val) = value.extract::<String>() {
        return EnumCellValue::String(val);
    }
    match value.extract::<f64>() {
        Ok(val) => EnumCellValue::Number(val),
        Err(_) => EnumCellValue::None,
    }
}

#[pyfunction]
#[pyo3(signature = (data, **options))]
fn process_exam_csv<'py>(
    py: Python<'py>,
    data: &[u8],
    options: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyBytes>> {
    let cfg_options = parse_spec_report_options(options)?;
    let v_xlsx = py
        .allow_threads(|| process_csv_bytes(data, &cfg_options))
        .map_err(map_report_error)?;
    Ok(PyBytes::new(py, &v_xlsx))
}

#[pyfunction]
#[pyo3(signature = (data, **options))]
fn process_exam_ipc<'py>(
    py: Python<'py>,
    data: &[u8],
    options: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyBytes>> {
    let cfg_options = parse_spec_report_options(options)?;
    let v_xlsx = py
        .allow_threads(|| process_ipc_bytes(data, &cfg_options))
        .map_err(map_report_error)?;
    Ok(PyBytes::new(py, &v_xlsx))
}

#[pyfunction]
#[pyo3(signature = (data, **options))]
fn summarize_exam_csv(
    py: Python<'_>,
    data: &[u8],
    options: Option<&Bound<'_, PyDict>>,
) -> PyResult<PyReportWorkbook> {
    let cfg_options = parse_spec_report_options(options)?;
    let (_, report) = py
        .allow_threads(|| {
            let table = SpecInputTable::from_csv_bytes(data)?;
            build_workbook(&table, &cfg_options)
        })
        .map_err(map_report_error)?;
    Ok(PyReportWorkbook::from(report))
}

/// Returns `(schema_version, n_questions_per_subject, n_subjects)`.
#[pyfunction(name = "resolve_layout")]
fn resolve_layout_py(n_columns: usize) -> PyResult<(String, usize, usize)> {
    let layout = resolve_layout(n_columns).map_err(map_report_error)?;
    Ok((
        layout.schema_version.to_string(),
        layout.n_questions_per_subject,
        layout.n_subjects,
    ))
}

#[pyfunction(name = "format_timestamp")]
fn format_timestamp_py(text: &str) -> PyResult<String> {
    format_timestamp(text).map_err(map_report_error)
}

#[pyfunction(name = "normalize_score")]
fn normalize_score_py(value: &Bound<'_, PyAny>) -> u8 {
    normalize_score(&derive_cell_value_from_py(value))
}

#[pyfunction(name = "derive_output_filename")]
fn derive_output_filename_py(name: &str) -> String {
    derive_output_filename(name)
}

/// Install a stderr `tracing` subscriber. Returns `False` if one is already set.
#[pyfunction]
#[pyo3(signature = (level = None))]
fn init_logging(level: Option<&str>) -> PyResult<bool> {
    let filter = EnvFilter::try_new(level.unwrap_or(C_LOG_LEVEL_DEFAULT)).map_err(|err| {
        PyValueError::new_err(format!("Invalid log level filter: {err}"))
    })?;
    let if_installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    Ok(if_installed)
}

#[pymodule]
fn _provas_report_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportWorkbook>()?;
    module.add_function(wrap_pyfunction!(process_exam_csv, module)?)?;
    module.add_function(wrap_pyfunction!(process_exam_ipc, module)?)?;
    module.add_function(wrap_pyfunction!(summarize_exam_csv, module)?)?;
    module.add_function(wrap_pyfunction!(resolve_layout_py, module)?)?;
    module.add_function(wrap_pyfunction!(format_timestamp_py, module)?)?;
    module.add_function(wrap_pyfunction!(normalize_score_py, module)?)?;
    module.add_function(wrap_pyfunction!(derive_output_filename_py, module)?)?;
    module.add_function(wrap_pyfunction!(init_logging, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
