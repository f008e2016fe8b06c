//! Exam-export constants, schema presets and default format factories.

use crate::spec::{SpecCellFormat, SpecExamSchema, SpecReportOptions};

/// Name of the answer timestamp column.
pub const C_COL_TIMESTAMP: &str = "Carimbo de data/hora";
/// Name of the respondent identifier column.
pub const C_COL_RESPONDENT: &str = "Nome de usuário";

/// Subjects per exam export.
pub const N_SUBJECTS: usize = 10;
/// Columns per question block (metadata, score, feedback).
pub const N_COLUMNS_PER_QUESTION: usize = 3;
/// First column of the first subject block.
pub const N_OFFSET_SUBJECT_BASE: usize = 6;
/// Score column position inside a question block.
pub const N_OFFSET_SCORE_IN_QUESTION: usize = 1;
/// Zero-based student name column.
pub const N_IDX_COL_STUDENT_NAME: usize = 3;

/// Leading character of a full-credit textual score.
pub const CHR_SCORE_POSITIVE: char = '1';
/// Totals below this are failing, equal is borderline, above is passing.
pub const N_SCORE_BAND_PIVOT: usize = 3;

/// Weekday abbreviations, Monday first.
pub const TUP_WEEKDAY_ABBREV: [&str; 7] = ["SEG", "TER", "QUA", "QUI", "SEX", "SÁB", "DOM"];
/// Month abbreviations, January first.
pub const TUP_MONTH_ABBREV: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

/// Header labels before the question columns.
pub const TUP_HEADER_LEADING: [&str; 3] = ["DATA RESPOSTA", "EMAIL RESPOSTA", "NOME ALUNO"];
/// Header label of the total column.
pub const C_HEADER_TOTAL: &str = "TOTAL";

/// Suffix replacing the input file extension.
pub const C_OUTPUT_FILENAME_SUFFIX: &str = "_processado.xlsx";
/// Stem used when the input file has no usable name.
pub const C_OUTPUT_FILENAME_FALLBACK_STEM: &str = "relatorio";

/// Sheet zoom percentage.
pub const N_ZOOM_SHEET: u16 = 150;
/// Character padding added to autofit widths.
pub const N_WIDTH_CELL_PADDING: usize = 2;
/// Font size of the total column.
pub const N_FONT_SIZE_TOTAL: i64 = 14;

pub const C_COLOR_HEADER_BG: &str = "#000000";
pub const C_COLOR_HEADER_FONT: &str = "#FFFFFF";
pub const C_COLOR_ROW_EVEN: &str = "#CCCCCC";
pub const C_COLOR_ROW_ODD: &str = "#FFFFFF";
pub const C_COLOR_BAND_FAIL: &str = "#FF9999";
pub const C_COLOR_BAND_BORDERLINE: &str = "#FFFF99";
pub const C_COLOR_BAND_PASS: &str = "#CCFFCC";

/// Export with five questions per subject.
pub const SPEC_EXAM_SCHEMA_FIVE_QUESTIONS: SpecExamSchema = SpecExamSchema {
    version: "five-questions-v1",
    n_columns: 156,
    n_questions_per_subject: 5,
    n_subjects: N_SUBJECTS,
    n_columns_per_question: N_COLUMNS_PER_QUESTION,
    n_offset_base: N_OFFSET_SUBJECT_BASE,
    n_offset_score: N_OFFSET_SCORE_IN_QUESTION,
    idx_col_student_name: N_IDX_COL_STUDENT_NAME,
};

/// Export with three questions per subject.
pub const SPEC_EXAM_SCHEMA_THREE_QUESTIONS: SpecExamSchema = SpecExamSchema {
    version: "three-questions-v1",
    n_columns: 96,
    n_questions_per_subject: 3,
    n_subjects: N_SUBJECTS,
    n_columns_per_question: N_COLUMNS_PER_QUESTION,
    n_offset_base: N_OFFSET_SUBJECT_BASE,
    n_offset_score: N_OFFSET_SCORE_IN_QUESTION,
    idx_col_student_name: N_IDX_COL_STUDENT_NAME,
};

/// Registered schemas, selected by exact column count.
pub const TUP_EXAM_SCHEMAS: [SpecExamSchema; 2] = [
    SPEC_EXAM_SCHEMA_FIVE_QUESTIONS,
    SPEC_EXAM_SCHEMA_THREE_QUESTIONS,
];

/// Named format presets used by [`crate::render::render_sheet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportFormats {
    /// Header row.
    pub header: SpecCellFormat,
    /// Even physical body rows.
    pub row_even: SpecCellFormat,
    /// Odd physical body rows.
    pub row_odd: SpecCellFormat,
    /// Patch applied to the total column on top of the row stripe.
    pub total: SpecCellFormat,
    /// Total fill for [`crate::spec::EnumScoreBand::Fail`].
    pub band_fail: SpecCellFormat,
    /// Total fill for [`crate::spec::EnumScoreBand::Borderline`].
    pub band_borderline: SpecCellFormat,
    /// Total fill for [`crate::spec::EnumScoreBand::Pass`].
    pub band_pass: SpecCellFormat,
}

/// Build format presets from report options.
pub fn derive_report_formats(options: &SpecReportOptions) -> SpecReportFormats {
    let cfg_fill = |color: &str| SpecCellFormat {
        bg_color: Some(color.to_string()),
        ..Default::default()
    };

    SpecReportFormats {
        header: cfg_fill(&options.color_header_bg).with_(SpecCellFormat {
            font_color: Some(options.color_header_font.clone()),
            ..Default::default()
        }),
        row_even: cfg_fill(&options.color_row_even),
        row_odd: cfg_fill(&options.color_row_odd),
        total: SpecCellFormat {
            bold: Some(true),
            font_size: Some(options.font_size_total),
            ..Default::default()
        },
        band_fail: cfg_fill(&options.color_band_fail),
        band_borderline: cfg_fill(&options.color_band_borderline),
        band_pass: cfg_fill(&options.color_band_pass),
    }
}

/// Build default report options.
pub fn derive_default_report_options() -> SpecReportOptions {
    SpecReportOptions::default()
}
