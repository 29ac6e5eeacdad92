#![cfg(not(tarpaulin_include))]

use materiality_map::app;

/// Main entry point for the web application
///
/// Initializes logging and runs the dashboard server. The bind address can be
/// given as the first command line argument.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:3000".to_string());

    app::run(&addr).await
}
