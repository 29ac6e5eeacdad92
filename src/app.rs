use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::chart::{self, ChartOptions, ChartSpec, ColumnMapping};
use crate::error::MapError;
use crate::render;
use crate::sample;
use crate::table::Table;
use crate::template;

/// Path of the workbook seeding the chart shown before any upload.
pub const DEFAULT_TEMPLATE_PATH: &str = "data/Materiality_Template.xlsx";

/// Upload body cap; rating sheets are small.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState {
    default_table: Table,
}

#[derive(Deserialize)]
struct CompanyQuery {
    company: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

impl IntoResponse for MapError {
    fn into_response(self) -> Response {
        let status = match &self {
            MapError::Decode(_)
            | MapError::EmptyWorkbook
            | MapError::TooFewColumns(_)
            | MapError::RaggedColumns
            | MapError::MissingColumn(_)
            | MapError::NonNumeric { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MapError::EmptyUpload => StatusCode::BAD_REQUEST,
            MapError::Io(_) | MapError::Render(_) | MapError::Xlsx(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn run(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Load the dataset backing the initial chart
    let default_table = load_default_table(DEFAULT_TEMPLATE_PATH);

    // Setup app state
    let app_state = Arc::new(AppState { default_table });

    // Build router
    let app = Router::new()
        .route("/", get(serve_index))
        .route("/api/chart", get(default_chart))
        .route("/api/upload", post(upload_chart))
        .route("/api/export", post(export_chart))
        .route("/api/template", get(download_template))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the workbook backing the initial chart, falling back to the built-in
/// sample dataset when the file is absent, unreadable, or lacks the required
/// columns.
fn load_default_table(path: &str) -> Table {
    let mapping = ColumnMapping::default();

    match Table::from_xlsx_file(path) {
        Ok(table) if table.row_count() > 0 && table.has_columns(&mapping.required()) => {
            log::info!("loaded default template from {}", path);
            table
        }
        Ok(_) => {
            log::warn!(
                "default template {} is empty or lacks the required columns; using sample data",
                path
            );
            sample::sample_table()
        }
        Err(e) => {
            log::warn!(
                "could not load default template {}: {}; using sample data",
                path,
                e
            );
            sample::sample_table()
        }
    }
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Chart for the default dataset, shown before any upload.
async fn default_chart(
    Query(params): Query<CompanyQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartSpec>, MapError> {
    let options = ChartOptions {
        company: params.company,
        ..ChartOptions::default()
    };

    let spec = chart::build_chart(&state.default_table, &ColumnMapping::default(), &options)?;

    Ok(Json(spec))
}

/// Decode an uploaded workbook and answer with its chart. Each upload is
/// handled within its own request; nothing is kept afterwards.
async fn upload_chart(mut multipart: Multipart) -> Result<Json<ChartSpec>, MapError> {
    let mut file_data: Vec<u8> = Vec::new();
    let mut filename = String::new();
    let mut company: Option<String> = None;

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let field_name = field.name().unwrap_or("unknown").to_string();

        if field_name == "file" {
            filename = field.file_name().unwrap_or("upload.xlsx").to_string();
            file_data = field.bytes().await.unwrap_or_default().to_vec();
        } else if field_name == "company" {
            company = field.text().await.ok().filter(|s| !s.trim().is_empty());
        }
    }

    if file_data.is_empty() {
        return Err(MapError::EmptyUpload);
    }

    let table = Table::from_xlsx_bytes(&file_data)?;
    let options = ChartOptions {
        company,
        ..ChartOptions::default()
    };
    let spec = chart::build_chart(&table, &ColumnMapping::default(), &options)?;

    log::info!(
        "upload {:?}: {} data rows, {} points",
        filename,
        table.row_count(),
        spec.points.len()
    );

    Ok(Json(spec))
}

/// Render the chart the client is currently showing as a PNG download.
async fn export_chart(
    Query(params): Query<CompanyQuery>,
    Json(spec): Json<ChartSpec>,
) -> Result<Response, MapError> {
    let options = ChartOptions::default();
    let png = render::render_png(&spec, options.width, options.height)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                export_filename(params.company.as_deref())
            ),
        )
        .body(axum::body::Body::from(png))
        .unwrap();

    Ok(response)
}

/// The sample dataset as a downloadable workbook with the expected headers.
async fn download_template() -> Result<Response, MapError> {
    let bytes = template::to_xlsx(&sample::sample_table())?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", template::TEMPLATE_FILENAME),
        )
        .body(axum::body::Body::from(bytes))
        .unwrap();

    Ok(response)
}

/// `materiality_map_{company}_{YYYYMMDD}.png`, the name shown in the
/// browser's save dialog.
fn export_filename(company: Option<&str>) -> String {
    let slug = company
        .unwrap_or("company")
        .trim()
        .to_lowercase()
        .replace(' ', "_");
    let slug = if slug.is_empty() {
        "company".to_string()
    } else {
        slug
    };

    format!(
        "materiality_map_{}_{}.png",
        slug,
        chrono::Local::now().format("%Y%m%d")
    )
}
