use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::MapError;
use crate::table::{CellValue, Table};

/// Filename offered for the template download.
pub const TEMPLATE_FILENAME: &str = "Materiality_Template.xlsx";

/// Convert a table to XLSX format
///
/// Writes a table to an in-memory workbook, header row first, so the user can
/// download a starting point with the expected column names already in place.
///
/// # Arguments
/// * `table` - The table to serialize
///
/// # Returns
/// * `Result<Vec<u8>, MapError>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use materiality_map::sample::sample_table;
/// use materiality_map::template::to_xlsx;
///
/// let bytes = to_xlsx(&sample_table()).unwrap();
/// assert!(!bytes.is_empty());
/// ```
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, MapError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, column) in table.columns().enumerate() {
        worksheet.write_string(0, c as u16, &column.name)?;

        for (r, value) in column.values.iter().enumerate() {
            match value {
                CellValue::Number(n) => {
                    worksheet.write_number((r + 1) as u32, c as u16, *n)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string((r + 1) as u32, c as u16, s.as_str())?;
                }
                CellValue::Empty => {}
            }
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ColumnMapping;
    use crate::sample::sample_table;

    #[test]
    fn template_decodes_back_with_required_columns() {
        let bytes = to_xlsx(&sample_table()).unwrap();

        let table = Table::from_xlsx_bytes(&bytes).unwrap();

        assert!(table.has_columns(&ColumnMapping::default().required()));
        assert_eq!(table.row_count(), sample_table().row_count());
    }
}
