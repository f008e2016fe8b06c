//! Stateless helpers: layout resolution, timestamp/score normalization, naming.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::conf::{
    C_HEADER_TOTAL, C_OUTPUT_FILENAME_FALLBACK_STEM, C_OUTPUT_FILENAME_SUFFIX,
    CHR_SCORE_POSITIVE, N_SCORE_BAND_PIVOT, TUP_EXAM_SCHEMAS, TUP_HEADER_LEADING,
    TUP_MONTH_ABBREV, TUP_WEEKDAY_ABBREV,
};
use crate::spec::{EnumCellValue, EnumScoreBand, ReportError, SpecExamLayout};

// Slash dates are month-first; day-first only matches when the first field exceeds 12.
const TUP_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const TUP_DATETIME_FORMATS_12H: [&str; 3] = [
    "%Y/%m/%d %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M:%S %p",
];
const TUP_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

////////////////////////////////////////////////////////////////////////////////
// #region LayoutResolution

/// Resolve the slicing layout from the input column count.
///
/// Only the registered export schemas are accepted; anything else rejects the file.
pub fn resolve_layout(n_columns: usize) -> Result<SpecExamLayout, ReportError> {
    let Some(schema) = TUP_EXAM_SCHEMAS
        .iter()
        .find(|schema| schema.n_columns == n_columns)
    else {
        return Err(ReportError::UnsupportedLayout { n_columns });
    };

    let layout = SpecExamLayout::from_schema(schema);
    tracing::debug!(
        schema = layout.schema_version,
        n_columns,
        n_questions_per_subject = layout.n_questions_per_subject,
        "resolved exam layout"
    );
    Ok(layout)
}

/// Warning text when some score bands cannot be reached with `layout`.
pub fn derive_band_reachability_warning(layout: &SpecExamLayout) -> Option<String> {
    if layout.n_questions_per_subject > N_SCORE_BAND_PIVOT {
        return None;
    }
    Some(format!(
        "Score bands are fixed at pivot {N_SCORE_BAND_PIVOT}; with {} questions per subject the pass band is unreachable.",
        layout.n_questions_per_subject
    ))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Timestamp

/// Parse an export timestamp without any timezone conversion.
///
/// A trailing ` GMT±h` zone label is ignored; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ReportError> {
    let c_raw = raw.trim();
    let c_local = c_raw
        .find(" GMT")
        .map_or(c_raw, |n_idx| c_raw[..n_idx].trim_end());

    for c_fmt in TUP_DATETIME_FORMATS
        .iter()
        .chain(TUP_DATETIME_FORMATS_12H.iter())
    {
        if let Ok(dt) = NaiveDateTime::parse_from_str(c_local, c_fmt) {
            return Ok(dt);
        }
    }
    for c_fmt in TUP_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(c_local, c_fmt) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    Err(ReportError::InvalidTimestamp(raw.to_string()))
}

/// Render `dt` as `{weekday}, {dd}/{month}/{yy}, {HH:MM}`.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    let c_weekday = TUP_WEEKDAY_ABBREV[dt.weekday().num_days_from_monday() as usize];
    let c_month = TUP_MONTH_ABBREV[dt.month0() as usize];
    format!(
        "{c_weekday}, {:02}/{c_month}/{:02}, {:02}:{:02}",
        dt.day(),
        dt.year().rem_euclid(100),
        dt.hour(),
        dt.minute()
    )
}

/// Parse and format one textual timestamp.
pub fn format_timestamp(raw: &str) -> Result<String, ReportError> {
    parse_timestamp(raw).map(|dt| format_datetime(&dt))
}

/// Format a timestamp cell; only text cells are accepted.
pub fn format_timestamp_cell(value: &EnumCellValue) -> Result<String, ReportError> {
    match value {
        EnumCellValue::String(s) => format_timestamp(s),
        EnumCellValue::Number(n) => Err(ReportError::InvalidTimestamp(n.to_string())),
        EnumCellValue::None => Err(ReportError::InvalidTimestamp(String::new())),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ScoreNormalization

/// Normalize a raw score cell to 0/1. Never fails.
///
/// Text scores count when they start with the full-credit marker; numeric
/// scores count when `>= 1`; anything else is 0.
pub fn normalize_score(value: &EnumCellValue) -> u8 {
    match value {
        EnumCellValue::String(s) => u8::from(s.starts_with(CHR_SCORE_POSITIVE)),
        EnumCellValue::Number(n) => u8::from(*n >= 1.0),
        EnumCellValue::None => 0,
    }
}

/// Classify a subject total into its color band.
pub fn classify_score_band(total: usize) -> EnumScoreBand {
    match total.cmp(&N_SCORE_BAND_PIVOT) {
        std::cmp::Ordering::Less => EnumScoreBand::Fail,
        std::cmp::Ordering::Equal => EnumScoreBand::Borderline,
        std::cmp::Ordering::Greater => EnumScoreBand::Pass,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TextHelpers

/// Render a cell as plain text; integral numbers drop the fraction.
pub fn convert_cell_value_to_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(s) => s.clone(),
        EnumCellValue::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 {
                format!("{n:.0}")
            } else {
                n.to_string()
            }
        }
    }
}

/// Sheet title for a one-based inclusive question range.
pub fn derive_sheet_title(n_question_start: usize, n_question_end: usize) -> String {
    format!("Questões {n_question_start} a {n_question_end}")
}

/// Header labels for a sheet with `n_questions` question columns.
pub fn derive_header_labels(n_questions: usize) -> Vec<String> {
    TUP_HEADER_LEADING
        .iter()
        .map(ToString::to_string)
        .chain((1..=n_questions).map(|n_idx| format!("Q{n_idx}")))
        .chain(std::iter::once(C_HEADER_TOTAL.to_string()))
        .collect()
}

/// Derive the download file name from the uploaded file name.
///
/// A trailing `.csv` (any case) or other last extension is dropped and
/// `_processado.xlsx` appended; an empty stem falls back to `relatorio`.
pub fn derive_output_filename(name_file_in: &str) -> String {
    let c_name = name_file_in
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let n_len_suffix_csv = ".csv".len();
    let c_stem = if c_name.len() >= n_len_suffix_csv
        && c_name.is_char_boundary(c_name.len() - n_len_suffix_csv)
        && c_name[c_name.len() - n_len_suffix_csv..].eq_ignore_ascii_case(".csv")
    {
        &c_name[..c_name.len() - n_len_suffix_csv]
    } else {
        match c_name.rfind('.') {
            Some(n_idx) if n_idx > 0 => &c_name[..n_idx],
            _ => c_name,
        }
    };
    let c_stem = if c_stem.is_empty() {
        C_OUTPUT_FILENAME_FALLBACK_STEM
    } else {
        c_stem
    };
    format!("{c_stem}{C_OUTPUT_FILENAME_SUFFIX}")
}

/// Displayed width of a cell value in character units.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    convert_cell_value_to_text(value).chars().count()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
