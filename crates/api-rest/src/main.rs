//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging of the HTTP surface. The workspace's main
//! `pharmabook-run` binary serves the same router with the same configuration.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_state, router};
use pharmabook_core::{
    config::access_token,
    constants::{DEFAULT_REST_ADDR, ENV_REST_ADDR},
    CoreConfig, Session,
};

/// Main entry point for the Pharmabook REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `PHARMABOOK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `PHARMABOOK_GATEWAY_URL` / `PHARMABOOK_GATEWAY_KEY` or `PHARMABOOK_SNAPSHOT_DIR`: catalog
///   source
/// - `PHARMABOOK_DATA_DIR`: where favorites are stored
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("pharmabook_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting Pharmabook REST API on {}", addr);

    let lookup = |key: &str| std::env::var(key).ok();
    let cfg = Arc::new(CoreConfig::from_lookup(lookup)?);
    let session = access_token(lookup).and_then(Session::new);

    let state = build_state(cfg, session).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
