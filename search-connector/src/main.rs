//! Search Connector Main Entry Point
//!
//! Builds the search core connections from the environment and, when asked,
//! checks that every configured core exists on the server.

use dotenv::dotenv;
use search_connector::{ConnectorError, Dependencies};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize tracing/logging.
///
/// `LOG_FORMAT=json` selects structured output for log shippers. Anything
/// else gets the pretty console format.
fn init_tracing() -> Result<(), ConnectorError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("search_connector=info,search_connector_repository=info")
    });

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let output = if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).pretty().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .map_err(|e| ConnectorError::config(format!("Failed to initialize tracing: {}", e)))?;

    info!(
        service_name = "search-connector",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = if json { "json" } else { "console" },
        "Tracing initialized"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ConnectorError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting search connector");

    let deps = match Dependencies::new() {
        Ok(deps) => {
            info!(cores = ?deps.registry.names(), "Search connections initialized");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize search connections");
            return Err(e);
        }
    };

    if deps.validate_on_startup {
        match deps.validate().await {
            Ok(()) => info!("All configured search cores are present"),
            Err(e) => {
                error!(error = %e, "Search setup validation failed");
                return Err(e);
            }
        }
    }

    Ok(())
}
