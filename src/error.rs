use thiserror::Error;

/// Error type for the materiality map pipeline.
///
/// Aggregates the two user-facing failure families (an upload that cannot be
/// decoded into a table, and a table that cannot be mapped onto the chart)
/// together with the i/o and drawing errors of the export paths.
#[derive(Error, Debug)]
pub enum MapError {
    // Upload decoding
    #[error("could not read spreadsheet: {0}")]
    Decode(#[from] calamine::XlsxError),

    #[error("workbook contains no worksheets")]
    EmptyWorkbook,

    #[error("spreadsheet must contain at least 3 columns, found {0}")]
    TooFewColumns(usize),

    #[error("columns have unequal lengths")]
    RaggedColumns,

    #[error("no file data received")]
    EmptyUpload,

    // Chart building
    #[error("missing required columns: {0}")]
    MissingColumn(String),

    #[error("column {column:?} holds non-numeric value {value:?} at data row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    // Export paths
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("could not write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
