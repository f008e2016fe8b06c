//! Workbook run report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// One written sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Worksheet name.
    pub sheet_name: String,
    /// Body rows written below the header.
    pub n_rows: usize,
}

/// Summary of one workbook build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportWorkbook {
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSheetSummary>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportWorkbook {
    /// Number of written sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Body rows summed over all sheets.
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.n_rows).sum()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, usize> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_sheets".to_string(), self.sheet_count());
        dict_counts.insert("cnt_rows".to_string(), self.row_count());
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count());
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} sheets={} rows={} warnings={}",
            self.sheet_count(),
            self.row_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportWorkbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[REPORT]"))
    }
}

/// Mutable accumulator used while the workbook is written.
#[derive(Debug, Default, Clone)]
pub struct ReportWorkbookBuilder {
    /// See [`ReportWorkbook::sheets`].
    pub sheets: Vec<SpecSheetSummary>,
    /// See [`ReportWorkbook::warnings`].
    pub warnings: Vec<String>,
}

impl ReportWorkbookBuilder {
    /// Record one written sheet.
    pub fn add_sheet(&mut self, sheet_name: &str, n_rows: usize) {
        self.sheets.push(SpecSheetSummary {
            sheet_name: sheet_name.to_string(),
            n_rows,
        });
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Immutable snapshot of the current state.
    pub fn snapshot(&self) -> ReportWorkbook {
        self.clone().build()
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportWorkbook {
        ReportWorkbook {
            sheets: self.sheets,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReportWorkbookBuilder;

    #[test]
    fn report_counts_and_format() {
        let mut builder = ReportWorkbookBuilder::default();
        builder.add_sheet("Questões 1 a 3", 4);
        builder.add_sheet("Questões 4 a 6", 4);
        builder.add_warning("w".to_string());
        let report = builder.build();

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_sheets"], 2);
        assert_eq!(dict_counts["cnt_rows"], 8);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[REPORT]");
        assert_eq!(txt, "[REPORT] sheets=2 rows=8 warnings=1");
        assert_eq!(report.to_string(), txt);
    }
}
