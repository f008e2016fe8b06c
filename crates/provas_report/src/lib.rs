//! `provas_report` v1:
//! Rust-side exam-export report kernel.
//!
//! One CSV export in, one styled XLSX workbook out (one sheet per subject):
//! - `conf`    : constants, exam schema presets and default formats
//! - `spec`    : specs/models/options/errors
//! - `util`    : pure helper functions
//! - `table`   : polars-backed input table adapter
//! - `builder` : per-subject extraction, totals and sorting
//! - `render`  : pure sheet styling plan
//! - `writer`  : `rust_xlsxwriter` workbook kernel
//! - `report`  : run summary
pub mod builder;
pub mod conf;
pub mod render;
pub mod report;
pub mod spec;
pub mod table;
pub mod util;
pub mod writer;

pub use builder::{build_report_sheets, build_subject_sheet};
pub use conf::{
    SPEC_EXAM_SCHEMA_FIVE_QUESTIONS, SPEC_EXAM_SCHEMA_THREE_QUESTIONS, TUP_EXAM_SCHEMAS,
    derive_default_report_options,
};
pub use render::render_sheet;
pub use report::{ReportWorkbook, ReportWorkbookBuilder, SpecSheetSummary};
pub use spec::{
    EnumCellValue, EnumScoreBand, ReportError, SpecCellFormat, SpecExamLayout, SpecExamSchema,
    SpecReportOptions, SpecReportSheet, SpecSheetCell, SpecSheetLayout, SpecSubjectRow,
};
pub use table::SpecInputTable;
pub use util::{
    classify_score_band, derive_output_filename, format_timestamp, normalize_score,
    resolve_layout,
};
pub use writer::{
    ReportWriter, build_workbook, build_workbook_bytes, process_csv_bytes, process_ipc_bytes,
};
