use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::table::Table;

/// Fixed numeric range shown on both axes. Ratings run 1-5; the extra 0.1
/// keeps markers at 5 clear of the frame.
pub const AXIS_RANGE: [f64; 2] = [0.0, 5.1];

/// Tick marks shown on both axes.
pub const AXIS_TICKS: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

pub const X_AXIS_TITLE: &str = "Financial Materiality (Risk or Opportunity)";
pub const Y_AXIS_TITLE: &str = "Impact Materiality";

/// Column names the plot builder reads from an uploaded table.
///
/// Selection is strictly by header name; a sheet whose columns merely happen
/// to be in the right order is not accepted.
#[derive(Clone, Debug)]
pub struct ColumnMapping {
    /// Column plotted on the x axis.
    pub x: String,
    /// Column plotted on the y axis.
    pub y: String,
    /// Categorical column assigning marker colors.
    pub group: String,
    /// Column supplying per-point hover text.
    pub label: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            x: "Risk".to_string(),
            y: "Impact".to_string(),
            group: "Sub-Topic".to_string(),
            label: "Name of IRO".to_string(),
        }
    }
}

impl ColumnMapping {
    /// The four header names an uploaded sheet must carry.
    pub fn required(&self) -> [&str; 4] {
        [
            self.x.as_str(),
            self.y.as_str(),
            self.group.as_str(),
            self.label.as_str(),
        ]
    }
}

/// Presentation options for chart building
///
/// Holds the customizable properties of a generated chart; everything else
/// (axis ranges, tick marks, axis titles) is fixed by the rating scale.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Company name worked into the chart title, when given.
    pub company: Option<String>,

    /// Width of the exported chart in pixels
    pub width: u32,

    /// Height of the exported chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            company: None,
            width: 850,
            height: 620,
        }
    }
}

/// One scatter marker: position, color group and hover text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub group: String,
    pub label: String,
}

/// One axis of the chart: title, fixed range and tick values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub title: String,
    pub range: [f64; 2],
    pub ticks: Vec<f64>,
}

impl AxisSpec {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            range: AXIS_RANGE,
            ticks: AXIS_TICKS.to_vec(),
        }
    }
}

/// Declarative description of one materiality map.
///
/// Produced once per upload event and handed unchanged to both renderers:
/// serialized to JSON for the in-browser plot, and drawn directly for the PNG
/// export. Building it twice from the same table yields an identical spec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    /// Distinct color groups in first-appearance order.
    pub fn groups(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for point in &self.points {
            if !seen.contains(&point.group.as_str()) {
                seen.push(point.group.as_str());
            }
        }
        seen
    }
}

/// Build a chart spec from an uploaded table
///
/// This is the main entry point of the plot builder. It resolves the four
/// mapped columns by header name, coerces the axis columns to numbers, and
/// assembles one point per usable data row.
///
/// # Arguments
/// * `table` - The decoded upload
/// * `mapping` - Which headers feed the x, y, color and hover encodings
/// * `options` - Title and sizing options
///
/// # Returns
/// * `Result<ChartSpec, MapError>` - The chart spec, or `MissingColumn`
///   naming every absent required header, or `NonNumeric` when an axis cell
///   holds text that is not a number
///
/// # Notes
/// * Rows whose x or y cell is empty carry no point and are skipped
///
/// # Examples
/// ```
/// use materiality_map::chart::{ChartOptions, ColumnMapping, build_chart};
/// use materiality_map::sample::sample_table;
///
/// let table = sample_table();
/// let spec = build_chart(&table, &ColumnMapping::default(), &ChartOptions::default()).unwrap();
///
/// assert_eq!(spec.points.len(), table.row_count());
/// ```
pub fn build_chart(
    table: &Table,
    mapping: &ColumnMapping,
    options: &ChartOptions,
) -> Result<ChartSpec, MapError> {
    let (xs, ys, groups, labels) = (
        table.column(&mapping.x),
        table.column(&mapping.y),
        table.column(&mapping.group),
        table.column(&mapping.label),
    );

    let (Some(xs), Some(ys), Some(groups), Some(labels)) = (xs, ys, groups, labels) else {
        let missing: Vec<&str> = mapping
            .required()
            .into_iter()
            .filter(|name| table.column(name).is_none())
            .collect();
        return Err(MapError::MissingColumn(missing.join(", ")));
    };

    let mut points = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let x_cell = &xs.values[row];
        let y_cell = &ys.values[row];

        // Rows without both ratings carry no point.
        if x_cell.is_empty() || y_cell.is_empty() {
            continue;
        }

        let x = x_cell.as_number().ok_or_else(|| MapError::NonNumeric {
            column: mapping.x.clone(),
            row: row + 1,
            value: x_cell.as_text(),
        })?;
        let y = y_cell.as_number().ok_or_else(|| MapError::NonNumeric {
            column: mapping.y.clone(),
            row: row + 1,
            value: y_cell.as_text(),
        })?;

        points.push(ChartPoint {
            x,
            y,
            group: wrap_label(&groups.values[row].as_text()),
            label: labels.values[row].as_text(),
        });
    }

    Ok(ChartSpec {
        title: title_for(options.company.as_deref()),
        x_axis: AxisSpec::new(X_AXIS_TITLE),
        y_axis: AxisSpec::new(Y_AXIS_TITLE),
        points,
    })
}

/// Wraps a group label into lines of four words so long sub-topics stay
/// readable in the legend. Underscores read as spaces; lines are joined with
/// `<br>`, which the browser renderer understands.
pub fn wrap_label(raw: &str) -> String {
    let clean = raw.replace('_', " ");
    let words: Vec<&str> = clean.split_whitespace().collect();

    words
        .chunks(4)
        .map(|chunk| chunk.join(" "))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Chart title, with the company name worked in when one was entered.
pub fn title_for(company: Option<&str>) -> String {
    match company.map(str::trim) {
        Some(name) if !name.is_empty() => {
            format!("<b>{} : Double Materiality Map</b>", name)
        }
        _ => "<b>Double Materiality Map</b>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_table;
    use crate::table::{CellValue, Column, Table};

    fn one_row_table() -> Table {
        Table::from_columns(vec![
            Column::new("Name of IRO", vec![CellValue::Text("X".into())]),
            Column::new("Impact", vec![CellValue::Number(3.0)]),
            Column::new("Risk", vec![CellValue::Number(4.0)]),
            Column::new("Sub-Topic", vec![CellValue::Text("A".into())]),
        ])
        .unwrap()
    }

    #[test]
    fn point_count_equals_row_count() {
        let table = sample_table();
        let spec =
            build_chart(&table, &ColumnMapping::default(), &ChartOptions::default()).unwrap();

        assert_eq!(spec.points.len(), table.row_count());
    }

    #[test]
    fn maps_columns_onto_encodings() {
        let spec = build_chart(
            &one_row_table(),
            &ColumnMapping::default(),
            &ChartOptions::default(),
        )
        .unwrap();

        assert_eq!(spec.points.len(), 1);
        let point = &spec.points[0];
        assert_eq!(point.x, 4.0);
        assert_eq!(point.y, 3.0);
        assert_eq!(point.group, "A");
        assert_eq!(point.label, "X");
    }

    #[test]
    fn missing_columns_are_all_named() {
        let table = Table::from_columns(vec![
            Column::new("Name of IRO", vec![]),
            Column::new("Impact", vec![]),
            Column::new("Severity", vec![]),
        ])
        .unwrap();

        let err = build_chart(&table, &ColumnMapping::default(), &ChartOptions::default())
            .unwrap_err();

        match err {
            MapError::MissingColumn(names) => assert_eq!(names, "Risk, Sub-Topic"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn header_only_table_builds_empty_chart() {
        let table = Table::from_columns(vec![
            Column::new("Name of IRO", vec![]),
            Column::new("Impact", vec![]),
            Column::new("Risk", vec![]),
            Column::new("Sub-Topic", vec![]),
        ])
        .unwrap();

        let spec =
            build_chart(&table, &ColumnMapping::default(), &ChartOptions::default()).unwrap();

        assert!(spec.points.is_empty());
        assert_eq!(spec.x_axis.range, AXIS_RANGE);
    }

    #[test]
    fn rows_with_empty_ratings_are_skipped() {
        let table = Table::from_columns(vec![
            Column::new(
                "Name of IRO",
                vec![CellValue::Text("X".into()), CellValue::Text("Y".into())],
            ),
            Column::new(
                "Impact",
                vec![CellValue::Number(3.0), CellValue::Empty],
            ),
            Column::new(
                "Risk",
                vec![CellValue::Number(4.0), CellValue::Number(2.0)],
            ),
            Column::new(
                "Sub-Topic",
                vec![CellValue::Text("A".into()), CellValue::Text("B".into())],
            ),
        ])
        .unwrap();

        let spec =
            build_chart(&table, &ColumnMapping::default(), &ChartOptions::default()).unwrap();

        assert_eq!(spec.points.len(), 1);
        assert_eq!(spec.points[0].label, "X");
    }

    #[test]
    fn non_numeric_rating_is_an_error() {
        let table = Table::from_columns(vec![
            Column::new("Name of IRO", vec![CellValue::Text("X".into())]),
            Column::new("Impact", vec![CellValue::Text("high".into())]),
            Column::new("Risk", vec![CellValue::Number(4.0)]),
            Column::new("Sub-Topic", vec![CellValue::Text("A".into())]),
        ])
        .unwrap();

        let err = build_chart(&table, &ColumnMapping::default(), &ChartOptions::default())
            .unwrap_err();

        match err {
            MapError::NonNumeric { column, row, value } => {
                assert_eq!(column, "Impact");
                assert_eq!(row, 1);
                assert_eq!(value, "high");
            }
            other => panic!("expected NonNumeric, got {other:?}"),
        }
    }

    #[test]
    fn same_table_builds_identical_specs() {
        let table = sample_table();
        let mapping = ColumnMapping::default();
        let options = ChartOptions {
            company: Some("Acme".to_string()),
            ..ChartOptions::default()
        };

        let first = build_chart(&table, &mapping, &options).unwrap();
        let second = build_chart(&table, &mapping, &options).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let table = sample_table();
        let spec =
            build_chart(&table, &ColumnMapping::default(), &ChartOptions::default()).unwrap();

        assert_eq!(spec.groups(), vec!["Environmental", "Social", "Governance"]);
    }

    #[test]
    fn wraps_long_group_labels() {
        assert_eq!(wrap_label("Climate"), "Climate");
        assert_eq!(
            wrap_label("Own_Workforce Working Conditions and Equal Treatment"),
            "Own Workforce Working Conditions<br>and Equal Treatment"
        );
    }

    #[test]
    fn titles_with_and_without_company() {
        assert_eq!(title_for(None), "<b>Double Materiality Map</b>");
        assert_eq!(title_for(Some("  ")), "<b>Double Materiality Map</b>");
        assert_eq!(
            title_for(Some("Acme Corp")),
            "<b>Acme Corp : Double Materiality Map</b>"
        );
    }
}
