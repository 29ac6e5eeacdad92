/*!
# Materiality Map Dashboard

A browser-based double materiality map, built in Rust.

## Overview

The dashboard lets a user upload a rating spreadsheet and see its rows as a
scatter plot: financial materiality (`Risk`) on the x axis, impact materiality
(`Impact`) on the y axis, markers colored by `Sub-Topic` and labeled with
`Name of IRO`. Both axes are fixed to the 1-5 rating scale. Uploads are
stateless; every submission is decoded, charted, and forgotten.

## Architecture

The application follows a client-server architecture:

### Frontend Layer
- **Technologies**: HTML, Plotly.js
- A single page with a drag-and-drop upload target, a company name input,
  template and chart downloads, and the chart area. The chart spec produced by
  the backend is rendered client-side by Plotly.js.

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Upload Handler - Decodes uploaded `.xlsx` bytes into a table of named
    columns (calamine)
  - Plot Builder - Maps the four required columns onto scatter encodings and
    produces a declarative chart spec
  - PNG Exporter - Draws a chart spec as a static image for download (plotters)
  - Template Writer - Generates the downloadable input template
    (rust_xlsxwriter)

There is no persistence layer: nothing is written on upload, and the only
long-lived data is the immutable default dataset backing the initial chart.

## Modules

- **table**: Tabular model of one uploaded worksheet and its xlsx decoding
- **chart**: Chart spec types and the column-to-encoding plot builder
- **render**: PNG export of a chart spec
- **template**: XLSX template generation
- **sample**: Built-in demonstration dataset
- **error**: Error type shared across the pipeline
- **app**: Routing and request handlers

## REST API Endpoints

- `GET /api/chart` - Chart spec for the default dataset
- `POST /api/upload` - Multipart upload, answers with the chart spec
- `POST /api/export` - Renders a posted chart spec as a PNG download
- `GET /api/template` - Downloadable input template workbook
*/

// Re-export all modules so they appear in the documentation
pub mod app;
pub mod chart;
pub mod error;
pub mod render;
pub mod sample;
pub mod table;
pub mod template;

/// Re-export everything from these modules to make it easier to use
pub use chart::*;
pub use error::*;
pub use render::*;
pub use sample::*;
pub use table::*;
pub use template::*;
