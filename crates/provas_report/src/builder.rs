//! Per-subject extraction, aggregation and sorting.

use crate::conf::{C_COL_RESPONDENT, C_COL_TIMESTAMP};
use crate::spec::{ReportError, SpecExamLayout, SpecReportSheet, SpecSubjectRow};
use crate::table::SpecInputTable;
use crate::util::{
    convert_cell_value_to_text, derive_sheet_title, format_timestamp_cell, normalize_score,
};

/// Identity fields shared by every subject sheet of one input row.
#[derive(Debug, Clone)]
struct SpecRowIdentity {
    answered_at: String,
    respondent_email: String,
    student_name: String,
}

/// Build the report sheet for `idx_subject`.
///
/// Rows are sorted by uppercased student name; the sort is stable, so equal
/// names keep input order.
pub fn build_subject_sheet(
    table: &SpecInputTable,
    layout: &SpecExamLayout,
    idx_subject: usize,
) -> Result<SpecReportSheet, ReportError> {
    let l_identities = derive_row_identities(table, layout)?;
    build_subject_sheet_with_identities(table, layout, idx_subject, &l_identities)
}

/// Build all subject sheets in subject order.
pub fn build_report_sheets(
    table: &SpecInputTable,
    layout: &SpecExamLayout,
) -> Result<Vec<SpecReportSheet>, ReportError> {
    let l_identities = derive_row_identities(table, layout)?;
    (0..layout.n_subjects)
        .map(|idx_subject| {
            build_subject_sheet_with_identities(table, layout, idx_subject, &l_identities)
        })
        .collect()
}

fn build_subject_sheet_with_identities(
    table: &SpecInputTable,
    layout: &SpecExamLayout,
    idx_subject: usize,
    identities: &[SpecRowIdentity],
) -> Result<SpecReportSheet, ReportError> {
    let l_cols_score: Vec<usize> = (0..layout.n_questions_per_subject)
        .map(|idx_question| layout.derive_score_col(idx_subject, idx_question))
        .collect();
    for col_idx in &l_cols_score {
        table.validate_column(*col_idx)?;
    }

    let mut l_rows = Vec::with_capacity(identities.len());
    for (row_idx, identity) in identities.iter().enumerate() {
        let mut l_scores = Vec::with_capacity(l_cols_score.len());
        for col_idx in &l_cols_score {
            l_scores.push(normalize_score(table.get_cell(row_idx, *col_idx)?));
        }
        l_rows.push(SpecSubjectRow::new(
            identity.answered_at.clone(),
            identity.respondent_email.clone(),
            identity.student_name.clone(),
            l_scores,
        ));
    }
    l_rows.sort_by(|a, b| a.student_name.cmp(&b.student_name));

    let (n_question_start, n_question_end) = layout.derive_question_range(idx_subject);
    let sheet = SpecReportSheet {
        title: derive_sheet_title(n_question_start, n_question_end),
        n_questions: layout.n_questions_per_subject,
        rows: l_rows,
    };
    tracing::debug!(sheet = %sheet.title, n_rows = sheet.rows.len(), "built subject sheet");
    Ok(sheet)
}

fn derive_row_identities(
    table: &SpecInputTable,
    layout: &SpecExamLayout,
) -> Result<Vec<SpecRowIdentity>, ReportError> {
    let idx_col_timestamp = table.find_column(C_COL_TIMESTAMP)?;
    let idx_col_respondent = table.find_column(C_COL_RESPONDENT)?;
    table.validate_column(layout.idx_col_student_name)?;

    (0..table.height())
        .map(|row_idx| {
            Ok(SpecRowIdentity {
                answered_at: format_timestamp_cell(table.get_cell(row_idx, idx_col_timestamp)?)?,
                respondent_email: convert_cell_value_to_text(
                    table.get_cell(row_idx, idx_col_respondent)?,
                ),
                student_name: convert_cell_value_to_text(
                    table.get_cell(row_idx, layout.idx_col_student_name)?,
                )
                .to_uppercase(),
            })
        })
        .collect()
}
