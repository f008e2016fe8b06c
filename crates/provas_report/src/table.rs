//! Row/column input table backed by polars readers.

use std::io::Cursor;

use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, IpcReader, SerReader};

use crate::spec::{EnumCellValue, ReportError};

/// Immutable row-major view of one uploaded export.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecInputTable {
    columns: Vec<String>,
    rows: Vec<Vec<EnumCellValue>>,
}

impl SpecInputTable {
    /// Create a table; every row must be exactly as wide as `columns`.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<EnumCellValue>>) -> Result<Self, ReportError> {
        if let Some((n_idx_row, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ReportError::TableRead(format!(
                "Row {n_idx_row} has {} cells, expected {}.",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Convert an in-memory dataframe.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, ReportError> {
        let l_colnames: Vec<String> = df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let n_height = df.height();
        let mut l_rows = vec![Vec::with_capacity(l_colnames.len()); n_height];
        for col in df.get_columns() {
            for (n_idx_row, row) in l_rows.iter_mut().enumerate() {
                let value = col.get(n_idx_row).map_err(|err| {
                    ReportError::TableRead(format!("Failed to access cell value: {err}"))
                })?;
                row.push(derive_cell_value_from_any_value(value));
            }
        }

        Self::new(l_colnames, l_rows)
    }

    /// Read CSV bytes with a header row.
    ///
    /// The whole file is scanned for schema inference so that a column mixing
    /// numbers and text is kept as text instead of failing mid-file.
    pub fn from_csv_bytes(v_csv: &[u8]) -> Result<Self, ReportError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(Cursor::new(v_csv))
            .finish()
            .map_err(|err| ReportError::TableRead(format!("Failed to parse CSV bytes: {err}")))?;
        Self::from_dataframe(&df)
    }

    /// Read polars IPC bytes.
    pub fn from_ipc_bytes(v_ipc_df: &[u8]) -> Result<Self, ReportError> {
        let df = IpcReader::new(Cursor::new(v_ipc_df))
            .finish()
            .map_err(|err| {
                ReportError::TableRead(format!("Failed to read IPC DataFrame bytes: {err}"))
            })?;
        Self::from_dataframe(&df)
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Position of a required named column.
    pub fn find_column(&self, name: &str) -> Result<usize, ReportError> {
        self.columns
            .iter()
            .position(|c_name| c_name == name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
    }

    /// Fail unless `col_idx` addresses an existing column.
    pub fn validate_column(&self, col_idx: usize) -> Result<(), ReportError> {
        if col_idx < self.width() {
            return Ok(());
        }
        Err(ReportError::ColumnRange {
            column: col_idx,
            n_columns: self.width(),
        })
    }

    /// Cell at (`row_idx`, `col_idx`).
    pub fn get_cell(&self, row_idx: usize, col_idx: usize) -> Result<&EnumCellValue, ReportError> {
        self.validate_column(col_idx)?;
        self.rows
            .get(row_idx)
            .and_then(|row| row.get(col_idx))
            .ok_or_else(|| {
                ReportError::TableRead(format!(
                    "Row {row_idx} out of range for table with {} rows.",
                    self.height()
                ))
            })
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Number(if val { 1.0 } else { 0.0 }),
        AnyValue::Int32(val) => EnumCellValue::Number(f64::from(val)),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(f64::from(val)),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(f64::from(val)),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ if value.dtype().is_numeric() => value
            .extract::<f64>()
            .map_or(EnumCellValue::None, EnumCellValue::Number),
        _ => EnumCellValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_bytes(lines: &[&str]) -> Vec<u8> {
        let mut txt = lines.join("\n");
        txt.push('\n');
        txt.into_bytes()
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let res = SpecInputTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![EnumCellValue::None]],
        );
        assert!(matches!(res, Err(ReportError::TableRead(_))));
    }

    #[test]
    fn csv_cells_keep_text_numbers_and_nulls() {
        let v_csv = csv_bytes(&[
            "Carimbo de data/hora,Nome de usuário,pontos,texto",
            "2024-03-04 09:15:00,a@x.com,1,1 - correta",
            "2024-03-05 10:00:00,b@x.com,,0 - errada",
        ]);
        let table = SpecInputTable::from_csv_bytes(&v_csv).expect("read csv");

        assert_eq!(table.width(), 4);
        assert_eq!(table.height(), 2);
        assert_eq!(table.find_column("Nome de usuário").expect("col"), 1);
        assert_eq!(
            table.get_cell(0, 0).expect("cell"),
            &EnumCellValue::String("2024-03-04 09:15:00".to_string())
        );
        assert_eq!(table.get_cell(0, 2).expect("cell"), &EnumCellValue::Number(1.0));
        assert_eq!(table.get_cell(1, 2).expect("cell"), &EnumCellValue::None);
        assert_eq!(
            table.get_cell(1, 3).expect("cell"),
            &EnumCellValue::String("0 - errada".to_string())
        );
    }

    #[test]
    fn ipc_bytes_map_booleans_to_numbers() {
        use polars::prelude::{IpcWriter, NamedFrom, SerWriter, Series};

        let mut df = DataFrame::new(vec![
            Series::new("nome".into(), &["ana", "bia"]).into(),
            Series::new("acerto".into(), &[true, false]).into(),
        ])
        .expect("df");
        let mut v_ipc = Vec::new();
        IpcWriter::new(&mut v_ipc).finish(&mut df).expect("write ipc");

        let table = SpecInputTable::from_ipc_bytes(&v_ipc).expect("read ipc");
        assert_eq!(table.columns(), &["nome".to_string(), "acerto".to_string()]);
        assert_eq!(table.get_cell(0, 1).expect("cell"), &EnumCellValue::Number(1.0));
        assert_eq!(table.get_cell(1, 1).expect("cell"), &EnumCellValue::Number(0.0));
    }

    #[test]
    fn missing_and_out_of_range_columns_fail() {
        let table = SpecInputTable::new(vec!["x".to_string()], vec![]).expect("table");
        assert!(matches!(
            table.find_column("Carimbo de data/hora"),
            Err(ReportError::MissingColumn(_))
        ));
        assert!(matches!(
            table.validate_column(1),
            Err(ReportError::ColumnRange {
                column: 1,
                n_columns: 1
            })
        ));
    }
}
