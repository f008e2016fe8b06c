//! Pure styling plan: turns a report sheet into cell/width/zoom instructions.

use crate::conf::{SpecReportFormats, derive_report_formats};
use crate::spec::{
    EnumCellValue, EnumScoreBand, SpecCellFormat, SpecReportOptions, SpecReportSheet,
    SpecSheetCell, SpecSheetLayout,
};
use crate::util::{classify_score_band, derive_header_labels, estimate_width_len};

/// Render `sheet` into a declarative layout.
///
/// Body stripes follow the one-based physical row number (header is row 1), so
/// the first data row is an even row. The total column overlays bold text and
/// its score band fill on top of the stripe.
pub fn render_sheet(sheet: &SpecReportSheet, options: &SpecReportOptions) -> SpecSheetLayout {
    let fmts = derive_report_formats(options);
    let l_header = derive_header_labels(sheet.n_questions);
    let n_width = l_header.len();
    let idx_col_total = n_width - 1;

    let mut l_cells = Vec::with_capacity(n_width * (sheet.rows.len() + 1));
    for (col_idx, c_label) in l_header.into_iter().enumerate() {
        l_cells.push(SpecSheetCell {
            row_idx: 0,
            col_idx,
            value: EnumCellValue::String(c_label),
            format: fmts.header.clone(),
        });
    }

    for (n_idx_body, row) in sheet.rows.iter().enumerate() {
        let row_idx = n_idx_body + 1;
        let fmt_stripe = derive_stripe_format(&fmts, row_idx);

        let l_values = [
            EnumCellValue::String(row.answered_at.clone()),
            EnumCellValue::String(row.respondent_email.clone()),
            EnumCellValue::String(row.student_name.clone()),
        ]
        .into_iter()
        .chain(
            row.scores
                .iter()
                .map(|n_score| EnumCellValue::Number(f64::from(*n_score))),
        )
        .chain(std::iter::once(EnumCellValue::Number(row.total as f64)));

        for (col_idx, value) in l_values.enumerate() {
            let format = if col_idx == idx_col_total {
                fmt_stripe
                    .merge(&fmts.total)
                    .merge(derive_band_format(&fmts, classify_score_band(row.total)))
            } else {
                fmt_stripe.clone()
            };
            l_cells.push(SpecSheetCell {
                row_idx,
                col_idx,
                value,
                format,
            });
        }
    }

    let widths_by_col = derive_column_widths(&l_cells, n_width, options.width_cell_padding);

    SpecSheetLayout {
        sheet_name: sheet.title.clone(),
        cells: l_cells,
        widths_by_col,
        zoom: options.zoom,
    }
}

fn derive_stripe_format(fmts: &SpecReportFormats, row_idx: usize) -> SpecCellFormat {
    if (row_idx + 1) % 2 == 0 {
        fmts.row_even.clone()
    } else {
        fmts.row_odd.clone()
    }
}

fn derive_band_format(fmts: &SpecReportFormats, band: EnumScoreBand) -> &SpecCellFormat {
    match band {
        EnumScoreBand::Fail => &fmts.band_fail,
        EnumScoreBand::Borderline => &fmts.band_borderline,
        EnumScoreBand::Pass => &fmts.band_pass,
    }
}

/// Longest stringified value per column plus `n_pad`.
fn derive_column_widths(cells: &[SpecSheetCell], n_width: usize, n_pad: usize) -> Vec<usize> {
    let mut l_widths = vec![0usize; n_width];
    for cell in cells {
        if let Some(n_width_col) = l_widths.get_mut(cell.col_idx) {
            *n_width_col = usize::max(*n_width_col, estimate_width_len(&cell.value));
        }
    }
    l_widths.into_iter().map(|n| n + n_pad).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecSubjectRow;

    fn create_sheet(rows: Vec<(&str, Vec<u8>)>) -> SpecReportSheet {
        SpecReportSheet {
            title: "Questões 1 a 5".to_string(),
            n_questions: 5,
            rows: rows
                .into_iter()
                .map(|(name, scores)| {
                    SpecSubjectRow::new(
                        "SEG, 04/MAR/24, 09:15".to_string(),
                        format!("{}@escola.br", name.to_lowercase()),
                        name.to_string(),
                        scores,
                    )
                })
                .collect(),
        }
    }

    fn bg(layout: &SpecSheetLayout, row_idx: usize, col_idx: usize) -> Option<String> {
        layout
            .cell(row_idx, col_idx)
            .and_then(|cell| cell.format.bg_color.clone())
    }

    #[test]
    fn header_is_black_with_white_font() {
        let layout = render_sheet(&create_sheet(vec![]), &SpecReportOptions::default());

        assert_eq!(layout.height(), 1);
        assert_eq!(layout.cells.len(), 9);
        let cell = layout.cell(0, 8).expect("total header");
        assert_eq!(cell.value, EnumCellValue::String("TOTAL".to_string()));
        assert_eq!(cell.format.bg_color.as_deref(), Some("#000000"));
        assert_eq!(cell.format.font_color.as_deref(), Some("#FFFFFF"));
        assert_eq!(layout.zoom, 150);
    }

    #[test]
    fn body_rows_alternate_by_physical_row() {
        let layout = render_sheet(
            &create_sheet(vec![
                ("A", vec![1, 1, 1, 1, 1]),
                ("B", vec![1, 1, 1, 0, 0]),
                ("C", vec![0, 0, 0, 0, 0]),
            ]),
            &SpecReportOptions::default(),
        );

        assert_eq!(bg(&layout, 1, 0).as_deref(), Some("#CCCCCC"));
        assert_eq!(bg(&layout, 2, 0).as_deref(), Some("#FFFFFF"));
        assert_eq!(bg(&layout, 3, 7).as_deref(), Some("#CCCCCC"));
        assert_eq!(
            layout.cell(2, 3).map(|cell| cell.value.clone()),
            Some(EnumCellValue::Number(1.0))
        );
    }

    #[test]
    fn total_column_is_banded_and_bold() {
        let layout = render_sheet(
            &create_sheet(vec![
                ("A", vec![1, 1, 1, 1, 1]),
                ("B", vec![1, 1, 1, 0, 0]),
                ("C", vec![0, 0, 0, 0, 0]),
            ]),
            &SpecReportOptions::default(),
        );

        assert_eq!(bg(&layout, 1, 8).as_deref(), Some("#CCFFCC"));
        assert_eq!(bg(&layout, 2, 8).as_deref(), Some("#FFFF99"));
        assert_eq!(bg(&layout, 3, 8).as_deref(), Some("#FF9999"));
        let cell = layout.cell(1, 8).expect("total");
        assert_eq!(cell.value, EnumCellValue::Number(5.0));
        assert_eq!(cell.format.bold, Some(true));
        assert_eq!(cell.format.font_size, Some(14));
        assert_eq!(layout.cell(1, 7).expect("q5").format.bold, None);
    }

    #[test]
    fn widths_fit_longest_value_plus_padding() {
        let layout = render_sheet(
            &create_sheet(vec![("MARIA DAS DORES", vec![1, 0, 0, 0, 0])]),
            &SpecReportOptions::default(),
        );

        assert_eq!(layout.widths_by_col.len(), 9);
        assert_eq!(layout.widths_by_col[0], "SEG, 04/MAR/24, 09:15".chars().count() + 2);
        assert_eq!(layout.widths_by_col[1], "maria das dores@escola.br".len() + 2);
        assert_eq!(layout.widths_by_col[2], "MARIA DAS DORES".len() + 2);
        assert_eq!(layout.widths_by_col[3], 4);
        assert_eq!(layout.widths_by_col[8], 7);
    }

    #[test]
    fn options_override_colors_and_zoom() {
        let options = SpecReportOptions {
            zoom: 100,
            color_band_fail: "#123456".to_string(),
            ..SpecReportOptions::default()
        };
        let layout = render_sheet(&create_sheet(vec![("Z", vec![0; 5])]), &options);

        assert_eq!(layout.zoom, 100);
        assert_eq!(bg(&layout, 1, 8).as_deref(), Some("#123456"));
    }
}
