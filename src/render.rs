use plotters::prelude::*;

use crate::chart::ChartSpec;
use crate::error::MapError;

/// Render a chart spec to a PNG image
///
/// Draws the scatter plot into a temporary file-based bitmap and returns the
/// PNG bytes, ready to be sent as a download. Markers are colored per group
/// and listed in a legend; the `<b>`/`<br>` markup aimed at the browser
/// renderer is stripped for the static image.
///
/// # Arguments
/// * `spec` - The chart to draw
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// * `Result<Vec<u8>, MapError>` - The PNG image data as bytes or an error
///
/// # Examples
/// ```
/// use materiality_map::chart::{ChartOptions, ColumnMapping, build_chart};
/// use materiality_map::render::render_png;
/// use materiality_map::sample::sample_table;
///
/// let options = ChartOptions::default();
/// let spec = build_chart(&sample_table(), &ColumnMapping::default(), &options).unwrap();
/// let png = render_png(&spec, options.width, options.height).unwrap();
/// assert!(!png.is_empty());
/// ```
pub fn render_png(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>, MapError> {
    let file = tempfile::Builder::new().suffix(".png").tempfile()?;
    let path = file.path().to_path_buf();

    {
        let root = BitMapBackend::new(&path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(strip_markup(&spec.title), ("sans-serif", 28).into_font())
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(48)
            .build_cartesian_2d(
                spec.x_axis.range[0]..spec.x_axis.range[1],
                spec.y_axis.range[0]..spec.y_axis.range[1],
            )
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(&spec.x_axis.title)
            .y_desc(&spec.y_axis.title)
            .x_labels(spec.x_axis.ticks.len() + 1)
            .y_labels(spec.y_axis.ticks.len() + 1)
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()
            .map_err(draw_err)?;

        for (index, group) in spec.groups().into_iter().enumerate() {
            let color = Palette99::pick(index).to_rgba();
            chart
                .draw_series(
                    spec.points
                        .iter()
                        .filter(|p| p.group == group)
                        .map(|p| Circle::new((p.x, p.y), 6, color.filled())),
                )
                .map_err(draw_err)?
                .label(strip_markup(group))
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        if !spec.points.is_empty() {
            chart
                .configure_series_labels()
                .border_style(BLACK)
                .background_style(WHITE.mix(0.85))
                .draw()
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
    }

    Ok(std::fs::read(&path)?)
}

/// Drops the markup the browser renderer understands; the static image gets
/// plain text.
fn strip_markup(text: &str) -> String {
    text.replace("<b>", "")
        .replace("</b>", "")
        .replace("<br>", " ")
}

fn draw_err(e: impl std::fmt::Display) -> MapError {
    MapError::Render(e.to_string())
}
