//! Report models, options and error types.

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{
    C_COLOR_BAND_BORDERLINE, C_COLOR_BAND_FAIL, C_COLOR_BAND_PASS, C_COLOR_HEADER_BG,
    C_COLOR_HEADER_FONT, C_COLOR_ROW_EVEN, C_COLOR_ROW_ODD, N_FONT_SIZE_TOTAL,
    N_WIDTH_CELL_PADDING, N_ZOOM_SHEET,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification used by the styling plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Solid background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
    /// Font color (`#RRGGBB`).
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Cell value read from the input table or written to a report sheet.
///
/// Score cells are normalized from this shape: text and numbers carry meaning,
/// everything else is `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExamLayout

/// Versioned description of one fixed exam-export column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecExamSchema {
    /// Schema identifier.
    pub version: &'static str,
    /// Exact column count that selects this schema.
    pub n_columns: usize,
    /// Questions grouped under each subject.
    pub n_questions_per_subject: usize,
    /// Number of subjects in the export.
    pub n_subjects: usize,
    /// Columns consumed by each question block.
    pub n_columns_per_question: usize,
    /// First column of the first subject block.
    pub n_offset_base: usize,
    /// Position of the score column inside a question block.
    pub n_offset_score: usize,
    /// Zero-based position of the student name column.
    pub idx_col_student_name: usize,
}

/// Resolved slicing parameters, shared read-only by every subject sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecExamLayout {
    /// Schema the layout was resolved from.
    pub schema_version: &'static str,
    /// Questions grouped under each subject.
    pub n_questions_per_subject: usize,
    /// Number of subjects (one report sheet each).
    pub n_subjects: usize,
    /// Columns consumed by each question block.
    pub n_columns_per_question: usize,
    /// First column of the first subject block.
    pub n_offset_base: usize,
    /// Position of the score column inside a question block.
    pub n_offset_score: usize,
    /// Zero-based position of the student name column.
    pub idx_col_student_name: usize,
}

impl SpecExamLayout {
    /// Build the layout described by `schema`.
    pub fn from_schema(schema: &SpecExamSchema) -> Self {
        Self {
            schema_version: schema.version,
            n_questions_per_subject: schema.n_questions_per_subject,
            n_subjects: schema.n_subjects,
            n_columns_per_question: schema.n_columns_per_question,
            n_offset_base: schema.n_offset_base,
            n_offset_score: schema.n_offset_score,
            idx_col_student_name: schema.idx_col_student_name,
        }
    }

    /// First column of the block belonging to `idx_subject`.
    pub fn derive_subject_col_start(&self, idx_subject: usize) -> usize {
        self.n_offset_base + idx_subject * self.n_questions_per_subject * self.n_columns_per_question
    }

    /// Score column of question `idx_question` inside subject `idx_subject`.
    pub fn derive_score_col(&self, idx_subject: usize, idx_question: usize) -> usize {
        self.derive_subject_col_start(idx_subject)
            + idx_question * self.n_columns_per_question
            + self.n_offset_score
    }

    /// One-based inclusive question range covered by `idx_subject`.
    pub fn derive_question_range(&self, idx_subject: usize) -> (usize, usize) {
        let n_start = idx_subject * self.n_questions_per_subject + 1;
        (n_start, n_start + self.n_questions_per_subject - 1)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportModels

/// One respondent's line in a subject sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSubjectRow {
    /// Formatted answer timestamp.
    pub answered_at: String,
    /// Respondent identifier (e-mail).
    pub respondent_email: String,
    /// Uppercased student name; sheet sort key.
    pub student_name: String,
    /// Binary per-question scores.
    pub scores: Vec<u8>,
    /// Sum of `scores`.
    pub total: usize,
}

impl SpecSubjectRow {
    /// Create a row, deriving `total` from `scores`.
    pub fn new(
        answered_at: String,
        respondent_email: String,
        student_name: String,
        scores: Vec<u8>,
    ) -> Self {
        let total = scores.iter().map(|n| usize::from(*n)).sum();
        Self {
            answered_at,
            respondent_email,
            student_name,
            scores,
            total,
        }
    }
}

/// One subject's sheet content, rows sorted by student name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportSheet {
    /// Sheet title, e.g. `Questões 1 a 5`.
    pub title: String,
    /// Question columns in this sheet.
    pub n_questions: usize,
    /// Body rows.
    pub rows: Vec<SpecSubjectRow>,
}

/// Color band assigned to a subject total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumScoreBand {
    /// Total below the pivot.
    Fail,
    /// Total equal to the pivot.
    Borderline,
    /// Total above the pivot.
    Pass,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetLayout

/// One cell write instruction with its final format.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetCell {
    /// Zero-based physical row.
    pub row_idx: usize,
    /// Zero-based column.
    pub col_idx: usize,
    /// Cell value.
    pub value: EnumCellValue,
    /// Resolved cell format.
    pub format: SpecCellFormat,
}

/// Declarative rendering of one report sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetLayout {
    /// Worksheet name.
    pub sheet_name: String,
    /// Cell writes in row-major order, header first.
    pub cells: Vec<SpecSheetCell>,
    /// Column widths in character units.
    pub widths_by_col: Vec<usize>,
    /// Zoom percentage.
    pub zoom: u16,
}

impl SpecSheetLayout {
    /// Look up the instruction for one cell.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&SpecSheetCell> {
        self.cells
            .iter()
            .find(|cell| cell.row_idx == row_idx && cell.col_idx == col_idx)
    }

    /// Number of physical rows including the header.
    pub fn height(&self) -> usize {
        self.cells.iter().map(|cell| cell.row_idx + 1).max().unwrap_or(0)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportOptions

/// Presentation options for rendered sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportOptions {
    /// Sheet zoom percentage.
    pub zoom: u16,
    /// Width padding added to the longest value of each column.
    pub width_cell_padding: usize,
    /// Header fill color.
    pub color_header_bg: String,
    /// Header font color.
    pub color_header_font: String,
    /// Fill of even physical rows (one-based, header is row 1).
    pub color_row_even: String,
    /// Fill of odd physical rows.
    pub color_row_odd: String,
    /// Total fill below the band pivot.
    pub color_band_fail: String,
    /// Total fill at the band pivot.
    pub color_band_borderline: String,
    /// Total fill above the band pivot.
    pub color_band_pass: String,
    /// Font size of the total column.
    pub font_size_total: i64,
}

impl Default for SpecReportOptions {
    fn default() -> Self {
        Self {
            zoom: N_ZOOM_SHEET,
            width_cell_padding: N_WIDTH_CELL_PADDING,
            color_header_bg: C_COLOR_HEADER_BG.to_string(),
            color_header_font: C_COLOR_HEADER_FONT.to_string(),
            color_row_even: C_COLOR_ROW_EVEN.to_string(),
            color_row_odd: C_COLOR_ROW_ODD.to_string(),
            color_band_fail: C_COLOR_BAND_FAIL.to_string(),
            color_band_borderline: C_COLOR_BAND_BORDERLINE.to_string(),
            color_band_pass: C_COLOR_BAND_PASS.to_string(),
            font_size_total: N_FONT_SIZE_TOTAL,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal failures of one report build. Any of them rejects the whole file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Column count matches no known exam-export schema.
    #[error(
        "Unsupported exam layout: {n_columns} columns (expected 156 for 5 questions or 96 for 3 questions per subject)."
    )]
    UnsupportedLayout {
        /// Column count of the rejected table.
        n_columns: usize,
    },
    /// Timestamp cell could not be parsed.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
    /// Positional column offset outside the table.
    #[error("Column index {column} out of range for table with {n_columns} columns.")]
    ColumnRange {
        /// Requested zero-based column.
        column: usize,
        /// Table width.
        n_columns: usize,
    },
    /// Required named column absent.
    #[error("Required column not found: {0:?}")]
    MissingColumn(String),
    /// Input bytes could not be read as a table.
    #[error("Failed to read input table: {0}")]
    TableRead(String),
    /// Workbook output failed.
    #[error("xlsx write error: {0}")]
    Render(String),
}

impl From<XlsxError> for ReportError {
    fn from(err: XlsxError) -> Self {
        Self::Render(err.to_string())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
