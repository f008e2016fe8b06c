//! Workbook writer that applies sheet layouts to `rust_xlsxwriter`.

use std::collections::{BTreeSet, HashMap};

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::builder::build_report_sheets;
use crate::render::render_sheet;
use crate::report::{ReportWorkbook, ReportWorkbookBuilder};
use crate::spec::{
    EnumCellValue, ReportError, SpecCellFormat, SpecReportOptions, SpecReportSheet,
    SpecSheetLayout,
};
use crate::table::SpecInputTable;
use crate::util::{derive_band_reachability_warning, resolve_layout};

/// Workbook writer. The workbook stays in memory until [`Self::finish`].
pub struct ReportWriter {
    workbook: Workbook,
    options: SpecReportOptions,
    set_sheet_names_existing: BTreeSet<String>,
    builder_report: ReportWorkbookBuilder,
}

impl ReportWriter {
    /// Create an empty workbook writer.
    pub fn new(options: SpecReportOptions) -> Self {
        Self {
            workbook: Workbook::new(),
            options,
            set_sheet_names_existing: BTreeSet::new(),
            builder_report: ReportWorkbookBuilder::default(),
        }
    }

    /// Snapshot of the run report so far.
    pub fn report(&self) -> ReportWorkbook {
        self.builder_report.snapshot()
    }

    /// Record a non-fatal warning in the run report.
    pub fn add_warning(&mut self, warning: String) {
        self.builder_report.add_warning(warning);
    }

    /// Render and write one report sheet.
    pub fn write_sheet(&mut self, sheet: &SpecReportSheet) -> Result<(), ReportError> {
        let layout = render_sheet(sheet, &self.options);
        self.write_sheet_layout(&layout)
    }

    /// Write one already rendered layout as a new worksheet.
    pub fn write_sheet_layout(&mut self, layout: &SpecSheetLayout) -> Result<(), ReportError> {
        if !self.set_sheet_names_existing.insert(layout.sheet_name.clone()) {
            return Err(ReportError::Render(format!(
                "Duplicate sheet name: {:?}",
                layout.sheet_name
            )));
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&layout.sheet_name)?;

        let mut dict_formats: HashMap<&SpecCellFormat, Format> = HashMap::new();
        for cell in &layout.cells {
            let format = dict_formats
                .entry(&cell.format)
                .or_insert_with(|| derive_rust_xlsx_format(&cell.format));
            write_cell_with_format(worksheet, cell.row_idx, cell.col_idx, &cell.value, format)?;
        }

        for (col_idx, n_width) in layout.widths_by_col.iter().enumerate() {
            worksheet.set_column_width(cast_col_num(col_idx)?, *n_width as f64)?;
        }
        worksheet.set_zoom(layout.zoom);

        self.builder_report
            .add_sheet(&layout.sheet_name, layout.height().saturating_sub(1));
        Ok(())
    }

    /// Serialize the workbook and return it with the run report.
    pub fn finish(mut self) -> Result<(Vec<u8>, ReportWorkbook), ReportError> {
        let v_xlsx = self.workbook.save_to_buffer()?;
        let report = self.builder_report.build();
        tracing::info!(
            n_sheets = report.sheet_count(),
            n_rows = report.row_count(),
            n_bytes = v_xlsx.len(),
            "serialized report workbook"
        );
        Ok((v_xlsx, report))
    }
}

/// Build the full workbook for one input table.
///
/// All-or-nothing: the first error aborts and no partial workbook is returned.
pub fn build_workbook(
    table: &SpecInputTable,
    options: &SpecReportOptions,
) -> Result<(Vec<u8>, ReportWorkbook), ReportError> {
    let layout = resolve_layout(table.width())?;
    let l_sheets = build_report_sheets(table, &layout)?;

    let mut writer = ReportWriter::new(options.clone());
    if let Some(c_warning) = derive_band_reachability_warning(&layout) {
        tracing::warn!("{c_warning}");
        writer.add_warning(c_warning);
    }
    for sheet in &l_sheets {
        writer.write_sheet(sheet)?;
    }
    writer.finish()
}

/// Build the workbook bytes for one input table.
pub fn build_workbook_bytes(
    table: &SpecInputTable,
    options: &SpecReportOptions,
) -> Result<Vec<u8>, ReportError> {
    build_workbook(table, options).map(|(v_xlsx, _)| v_xlsx)
}

/// CSV export bytes in, workbook bytes out.
pub fn process_csv_bytes(
    v_csv: &[u8],
    options: &SpecReportOptions,
) -> Result<Vec<u8>, ReportError> {
    build_workbook_bytes(&SpecInputTable::from_csv_bytes(v_csv)?, options)
}

/// Polars IPC bytes in, workbook bytes out.
pub fn process_ipc_bytes(
    v_ipc_df: &[u8],
    options: &SpecReportOptions,
) -> Result<Vec<u8>, ReportError> {
    build_workbook_bytes(&SpecInputTable::from_ipc_bytes(v_ipc_df)?, options)
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), ReportError> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                val,
                format,
            )?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(
                cast_row_num(row_idx)?,
                cast_col_num(col_idx)?,
                *val,
                format,
            )?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    format
}

fn cast_row_num(value: usize) -> Result<u32, ReportError> {
    u32::try_from(value).map_err(|_| ReportError::Render(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, ReportError> {
    u16::try_from(value)
        .map_err(|_| ReportError::Render(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::builder::tests::{SpecTestRespondent, create_exam_table};
    use crate::conf::{C_COL_RESPONDENT, C_COL_TIMESTAMP};

    fn is_zip(v_bytes: &[u8]) -> bool {
        v_bytes.starts_with(b"PK")
    }

    fn read_xlsx_part(v_xlsx: &[u8], name_part: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(v_xlsx)).expect("open xlsx zip");
        let mut file_part = archive.by_name(name_part).expect("xlsx part");
        let mut txt = String::new();
        file_part.read_to_string(&mut txt).expect("read xlsx part");
        txt
    }

    fn create_respondent<'a>(name: &'a str, scores: &[f64]) -> SpecTestRespondent<'a> {
        SpecTestRespondent {
            name,
            answered_at: "2024-03-04 09:15:00",
            scores_by_subject: vec![scores.iter().map(|n| EnumCellValue::Number(*n)).collect()],
        }
    }

    #[test]
    fn empty_table_still_yields_ten_header_only_sheets() {
        let table = create_exam_table(156, &[]);
        let (v_xlsx, report) =
            build_workbook(&table, &SpecReportOptions::default()).expect("workbook");

        assert!(is_zip(&v_xlsx));
        assert_eq!(report.sheet_count(), 10);
        assert_eq!(report.row_count(), 0);
        assert_eq!(report.sheets[0].sheet_name, "Questões 1 a 5");
        assert_eq!(report.sheets[9].sheet_name, "Questões 46 a 50");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn three_question_layout_reports_band_warning() {
        let table = create_exam_table(
            96,
            &[SpecTestRespondent {
                name: "ana",
                answered_at: "2024-03-04 09:15:00",
                scores_by_subject: vec![],
            }],
        );
        let (_, report) = build_workbook(&table, &SpecReportOptions::default()).expect("workbook");

        assert_eq!(report.sheet_count(), 10);
        assert_eq!(report.row_count(), 10);
        assert_eq!(report.sheets[0].sheet_name, "Questões 1 a 3");
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn unsupported_width_rejects_whole_file() {
        let table = SpecInputTable::new(
            vec![C_COL_TIMESTAMP.to_string(), C_COL_RESPONDENT.to_string()],
            vec![],
        )
        .expect("table");
        assert!(matches!(
            build_workbook_bytes(&table, &SpecReportOptions::default()),
            Err(ReportError::UnsupportedLayout { n_columns: 2 })
        ));
    }

    #[test]
    fn duplicate_sheet_names_are_render_errors() {
        let sheet = SpecReportSheet {
            title: "Questões 1 a 5".to_string(),
            n_questions: 5,
            rows: vec![],
        };
        let mut writer = ReportWriter::new(SpecReportOptions::default());
        writer.write_sheet(&sheet).expect("first sheet");
        assert!(matches!(
            writer.write_sheet(&sheet),
            Err(ReportError::Render(_))
        ));
        assert_eq!(writer.report().sheet_count(), 1);
    }

    #[test]
    fn csv_export_end_to_end() {
        let mut l_header: Vec<String> = (0..156).map(|n| format!("col_{n}")).collect();
        l_header[0] = C_COL_TIMESTAMP.to_string();
        l_header[1] = C_COL_RESPONDENT.to_string();
        l_header[3] = "Nome".to_string();

        let create_line = |ts: &str, name: &str, scores: [&str; 5]| {
            let mut l_cells = vec![String::new(); 156];
            l_cells[0] = ts.to_string();
            l_cells[1] = format!("{name}@escola.br");
            l_cells[3] = name.to_string();
            for (idx_question, c_score) in scores.iter().enumerate() {
                l_cells[7 + idx_question * 3] = c_score.to_string();
            }
            l_cells.join(",")
        };
        let txt_csv = [
            l_header.join(","),
            create_line("2024-03-04 09:15:00", "b", ["1", "1", "1", "0", "0"]),
            create_line("2024-03-04 10:15:00", "a", ["1", "1", "1", "1", "1"]),
            create_line("2024-03-04 11:15:00", "c", ["0", "0", "0", "0", "0"]),
        ]
        .join("\n");

        let table = SpecInputTable::from_csv_bytes(txt_csv.as_bytes()).expect("csv");
        let layout = resolve_layout(table.width()).expect("layout");
        let l_sheets = build_report_sheets(&table, &layout).expect("sheets");
        let l_summary: Vec<(&str, usize)> = l_sheets[0]
            .rows
            .iter()
            .map(|row| (row.student_name.as_str(), row.total))
            .collect();
        assert_eq!(l_summary, vec![("A", 5), ("B", 3), ("C", 0)]);

        let v_xlsx =
            process_csv_bytes(txt_csv.as_bytes(), &SpecReportOptions::default()).expect("xlsx");
        assert!(is_zip(&v_xlsx));
    }

    #[test]
    fn saved_workbook_carries_zoom_widths_and_fills() {
        let table = create_exam_table(
            156,
            &[
                create_respondent("b", &[1.0, 1.0, 1.0, 0.0, 0.0]),
                create_respondent("a", &[1.0, 1.0, 1.0, 1.0, 1.0]),
                create_respondent("c", &[0.0, 0.0, 0.0, 0.0, 0.0]),
            ],
        );
        let options = SpecReportOptions {
            zoom: 120,
            ..SpecReportOptions::default()
        };
        let v_xlsx = build_workbook_bytes(&table, &options).expect("workbook");

        let txt_workbook = read_xlsx_part(&v_xlsx, "xl/workbook.xml");
        assert!(txt_workbook.contains(r#"name="Questões 1 a 5""#));
        assert!(txt_workbook.contains(r#"name="Questões 46 a 50""#));

        let txt_sheet = read_xlsx_part(&v_xlsx, "xl/worksheets/sheet1.xml");
        assert!(txt_sheet.contains(r#"zoomScale="120""#));
        assert!(txt_sheet.contains("<cols>"));
        assert!(txt_sheet.contains(r#"customWidth="1""#));
        assert!(txt_sheet.contains(r#"r="I4""#));
        assert!(!txt_sheet.contains(r#"r="A5""#));

        let txt_styles = read_xlsx_part(&v_xlsx, "xl/styles.xml");
        for c_rgb in ["FF000000", "FFCCCCCC", "FFFF9999", "FFFFFF99", "FFCCFFCC"] {
            assert!(txt_styles.contains(c_rgb), "missing fill {c_rgb}");
        }
        assert!(txt_styles.contains("<b/>"));
        assert!(txt_styles.contains(r#"<sz val="14"/>"#));
    }
}
