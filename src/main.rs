use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_state, router};
use pharmabook_core::{
    config::access_token,
    constants::{DEFAULT_REST_ADDR, ENV_REST_ADDR},
    CoreConfig, GatewaySource, Session,
};

/// Main entry point for the Pharmabook application
///
/// Resolves configuration, performs the first catalog load and serves the REST API.
///
/// # Environment Variables
/// - `PHARMABOOK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PHARMABOOK_GATEWAY_URL`: Base URL of the hosted data service
/// - `PHARMABOOK_GATEWAY_KEY`: Publishable API key for the hosted data service
/// - `PHARMABOOK_SNAPSHOT_DIR`: Directory of exported rows, instead of the hosted service
/// - `PHARMABOOK_DATA_DIR`: Directory for favorites (default: platform data dir)
/// - `PHARMABOOK_ACCESS_TOKEN`: Access token of a signed-in session
/// - `PHARMABOOK_REQUIRE_SESSION`: Refuse to load the catalog without a session
/// - `PHARMABOOK_GATEWAY_TIMEOUT_SECS`: Gateway request timeout (default: 30)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pharmabook=info".parse()?)
                .add_directive("pharmabook_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let lookup = |key: &str| std::env::var(key).ok();
    let cfg = Arc::new(CoreConfig::from_lookup(lookup)?);
    let session = access_token(lookup).and_then(Session::new);

    match cfg.gateway() {
        GatewaySource::Rest { url, .. } => tracing::info!("++ Catalog gateway: {}", url),
        GatewaySource::Snapshot { dir } => {
            tracing::info!("++ Catalog snapshot: {}", dir.display())
        }
    }
    tracing::info!("++ Favorites stored in {}", cfg.data_dir().display());
    tracing::info!("++ Starting Pharmabook REST on {}", rest_addr);

    let state = build_state(cfg, session).await?;

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
