use crate::table::{CellValue, Column, Table};

/// Built-in demonstration dataset.
///
/// Shown on the dashboard before any upload, used as the fallback when the
/// default template workbook is missing or unusable, and exported as the
/// content of the downloadable template.
pub fn sample_table() -> Table {
    let names = [
        "Energy Efficiency",
        "Water Use",
        "Labor Practices",
        "GHG Emissions",
        "Diversity & Inclusion",
        "Product Safety",
        "Supply Chain Ethics",
        "Board Independence",
        "Climate Risk Strategy",
        "Customer Privacy",
    ];
    let impact = [4.0, 3.0, 5.0, 5.0, 2.0, 4.0, 3.0, 1.0, 5.0, 2.0];
    let risk = [5.0, 2.0, 4.0, 5.0, 3.0, 3.0, 2.0, 1.0, 5.0, 4.0];
    let sub_topics = [
        "Environmental",
        "Environmental",
        "Social",
        "Environmental",
        "Social",
        "Social",
        "Social",
        "Governance",
        "Environmental",
        "Governance",
    ];

    let columns = vec![
        Column::new(
            "Name of IRO",
            names
                .iter()
                .map(|n| CellValue::Text(n.to_string()))
                .collect(),
        ),
        Column::new("Impact", impact.iter().map(|v| CellValue::Number(*v)).collect()),
        Column::new("Risk", risk.iter().map(|v| CellValue::Number(*v)).collect()),
        Column::new(
            "Sub-Topic",
            sub_topics
                .iter()
                .map(|s| CellValue::Text(s.to_string()))
                .collect(),
        ),
    ];

    Table::from_columns(columns).expect("sample dataset is well formed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ColumnMapping;

    #[test]
    fn sample_has_required_columns_and_ten_rows() {
        let table = sample_table();

        assert_eq!(table.row_count(), 10);
        assert!(table.has_columns(&ColumnMapping::default().required()));
    }
}
