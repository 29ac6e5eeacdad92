#![cfg(not(tarpaulin_include))]

use materiality_map::chart::{ChartOptions, ColumnMapping, build_chart};
use materiality_map::render::render_png;
use materiality_map::sample::sample_table;

/// Renders the built-in sample dataset to a PNG for a quick visual check.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = sample_table();
    let options = ChartOptions::default();
    let spec = build_chart(&table, &ColumnMapping::default(), &options)?;

    std::fs::create_dir_all("chart_output")?;
    let png = render_png(&spec, options.width, options.height)?;

    let path = "chart_output/materiality_map.png";
    std::fs::write(path, &png)?;
    println!("Created sample map with {} points at {}", spec.points.len(), path);

    Ok(())
}
