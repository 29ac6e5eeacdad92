use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Reader, Xlsx, open_workbook_from_rs};

use crate::error::MapError;

/// Minimum number of columns an uploaded sheet must contain.
pub const MIN_COLUMNS: usize = 3;

/// A single scalar cell taken from an uploaded sheet.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Numeric view of the cell. Numeric-looking text is parsed, so a rating
    /// typed as `"4"` behaves like the number 4.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty => None,
        }
    }

    /// Textual view of the cell. Whole numbers drop their trailing `.0` so
    /// labels read the way they do in the sheet.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            // Dates, durations and error cells fall back to whatever numeric
            // or textual reading calamine can give them.
            other => other
                .as_f64()
                .map(CellValue::Number)
                .or_else(|| other.as_string().map(CellValue::Text))
                .unwrap_or(CellValue::Empty),
        }
    }
}

/// A named column of cells, in sheet order.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Tabular view of one uploaded worksheet: ordered named columns of equal
/// length. A table is built fresh for every upload event and dropped once the
/// chart spec has been produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table from pre-assembled columns
    ///
    /// Used for the built-in sample dataset and in tests; uploads go through
    /// [`Table::from_xlsx_bytes`] instead.
    ///
    /// # Arguments
    /// * `columns` - The named columns, in display order
    ///
    /// # Returns
    /// * `Result<Table, MapError>` - The table, or an error when fewer than
    ///   three columns are given or the columns differ in length
    ///
    /// # Examples
    /// ```
    /// use materiality_map::table::{CellValue, Column, Table};
    ///
    /// let table = Table::from_columns(vec![
    ///     Column::new("Impact", vec![CellValue::Number(3.0)]),
    ///     Column::new("Risk", vec![CellValue::Number(4.0)]),
    ///     Column::new("Sub-Topic", vec![CellValue::Text("Social".into())]),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.row_count(), 1);
    /// ```
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, MapError> {
        if columns.len() < MIN_COLUMNS {
            return Err(MapError::TooFewColumns(columns.len()));
        }

        let rows = columns[0].values.len();
        if columns.iter().any(|c| c.values.len() != rows) {
            return Err(MapError::RaggedColumns);
        }

        Ok(Table { columns, rows })
    }

    /// Decode an uploaded workbook into a table
    ///
    /// Reads the first worksheet of the workbook; the first row is taken as
    /// the header row and every following row becomes a data row. Cells
    /// missing from short rows are treated as empty.
    ///
    /// # Arguments
    /// * `bytes` - The raw `.xlsx` file content as received from the browser
    ///
    /// # Returns
    /// * `Result<Table, MapError>` - The decoded table, or a decode error when
    ///   the bytes are not a valid workbook, the workbook has no sheets, or
    ///   fewer than three columns are present
    ///
    /// # Examples
    /// ```no_run
    /// use materiality_map::table::Table;
    ///
    /// let bytes = std::fs::read("data/Materiality_Template.xlsx").unwrap();
    /// match Table::from_xlsx_bytes(&bytes) {
    ///     Ok(table) => println!("decoded {} rows", table.row_count()),
    ///     Err(e) => eprintln!("decode failed: {}", e),
    /// }
    /// ```
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self, MapError> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(MapError::EmptyWorkbook)??;

        Self::from_range(&range)
    }

    /// Decode a workbook from disk, used for the default template loaded at
    /// startup.
    pub fn from_xlsx_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let bytes = std::fs::read(path)?;
        Self::from_xlsx_bytes(&bytes)
    }

    fn from_range(range: &calamine::Range<Data>) -> Result<Self, MapError> {
        let mut rows = range.rows();

        let header = rows.next().ok_or(MapError::TooFewColumns(0))?;
        let mut columns: Vec<Column> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = cell
                    .as_string()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("Column {}", i + 1));
                Column::new(name, Vec::new())
            })
            .collect();

        for row in rows {
            for (i, column) in columns.iter_mut().enumerate() {
                let value = row.get(i).map(CellValue::from).unwrap_or(CellValue::Empty);
                column.values.push(value);
            }
        }

        Self::from_columns(columns)
    }

    /// Look up a column by its header name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of data rows (the header row is not counted).
    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when every one of `names` is present as a header.
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.column(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use serde_json::{Value, json};

    /// Builds an in-memory workbook with the given header row and data rows.
    fn xlsx_fixture(headers: &[&str], rows: &[Vec<Value>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (c, name) in headers.iter().enumerate() {
            worksheet.write_string(0, c as u16, *name).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                match value {
                    Value::Number(n) => {
                        worksheet
                            .write_number((r + 1) as u32, c as u16, n.as_f64().unwrap())
                            .unwrap();
                    }
                    Value::String(s) => {
                        worksheet
                            .write_string((r + 1) as u32, c as u16, s.as_str())
                            .unwrap();
                    }
                    Value::Null => {}
                    other => panic!("unsupported fixture cell: {other:?}"),
                }
            }
        }

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn decodes_headers_and_rows() {
        let bytes = xlsx_fixture(
            &["Name of IRO", "Impact", "Risk", "Sub-Topic"],
            &[
                vec![json!("GHG Emissions"), json!(5), json!(5), json!("Environmental")],
                vec![json!("Water Use"), json!(3), json!(2), json!("Environmental")],
            ],
        );

        let table = Table::from_xlsx_bytes(&bytes).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 4);
        assert_eq!(
            table.headers().collect::<Vec<_>>(),
            vec!["Name of IRO", "Impact", "Risk", "Sub-Topic"]
        );
        assert_eq!(
            table.column("Impact").unwrap().values[0],
            CellValue::Number(5.0)
        );
        assert_eq!(
            table.column("Sub-Topic").unwrap().values[1],
            CellValue::Text("Environmental".into())
        );
    }

    #[test]
    fn header_only_sheet_decodes_to_zero_rows() {
        let bytes = xlsx_fixture(&["Name of IRO", "Impact", "Risk", "Sub-Topic"], &[]);

        let table = Table::from_xlsx_bytes(&bytes).unwrap();

        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = Table::from_xlsx_bytes(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, MapError::Decode(_)));
    }

    #[test]
    fn rejects_too_few_columns() {
        let bytes = xlsx_fixture(&["Impact", "Risk"], &[vec![json!(1), json!(2)]]);

        let err = Table::from_xlsx_bytes(&bytes).unwrap_err();
        assert!(matches!(err, MapError::TooFewColumns(2)));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::from_columns(vec![
            Column::new("A", vec![CellValue::Number(1.0)]),
            Column::new("B", vec![]),
            Column::new("C", vec![CellValue::Number(3.0)]),
        ])
        .unwrap_err();

        assert!(matches!(err, MapError::RaggedColumns));
    }

    #[test]
    fn missing_cells_in_short_rows_read_as_empty() {
        let bytes = xlsx_fixture(
            &["Name of IRO", "Impact", "Risk", "Sub-Topic"],
            &[vec![json!("Water Use"), json!(3)]],
        );

        let table = Table::from_xlsx_bytes(&bytes).unwrap();

        assert_eq!(table.column("Risk").unwrap().values[0], CellValue::Empty);
        assert_eq!(
            table.column("Sub-Topic").unwrap().values[0],
            CellValue::Empty
        );
    }

    #[test]
    fn cell_value_coercions() {
        assert_eq!(CellValue::Number(4.5).as_number(), Some(4.5));
        assert_eq!(CellValue::Text(" 4 ".into()).as_number(), Some(4.0));
        assert_eq!(CellValue::Text("high".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);

        assert_eq!(CellValue::Number(3.0).as_text(), "3");
        assert_eq!(CellValue::Number(3.5).as_text(), "3.5");
        assert_eq!(CellValue::Empty.as_text(), "");
    }
}
