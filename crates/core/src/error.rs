#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("a signed-in session is required before loading the catalog")]
    NoSession,

    #[error("failed to build gateway client: {0}")]
    GatewayClient(reqwest::Error),
    #[error("could not reach gateway at {url}: {source}")]
    GatewayConnection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("gateway query on {relation} failed: {source}")]
    GatewayRequest {
        relation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("gateway query on {relation} returned status {status}: {body}")]
    GatewayStatus {
        relation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode {relation} rows from gateway: {source}")]
    GatewayDecode {
        relation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read snapshot file {path}: {source}", path = path.display())]
    SnapshotRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot file {path}: {source}", path = path.display())]
    SnapshotParse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read favorites storage: {0}")]
    FavoritesRead(std::io::Error),
    #[error("failed to write favorites storage: {0}")]
    FavoritesWrite(std::io::Error),
    #[error("failed to serialize favorites: {0}")]
    FavoritesSerialization(serde_json::Error),

    #[error("unknown condition: {0}")]
    UnknownCondition(String),
}

impl CatalogError {
    /// Whether this error came from one of the two catalog queries.
    ///
    /// These are the failures that leave previously loaded data in place and are surfaced to the
    /// user as a failed load.
    pub fn is_gateway_query(&self) -> bool {
        matches!(
            self,
            CatalogError::GatewayClient(_)
                | CatalogError::GatewayConnection { .. }
                | CatalogError::GatewayRequest { .. }
                | CatalogError::GatewayStatus { .. }
                | CatalogError::GatewayDecode { .. }
                | CatalogError::SnapshotRead { .. }
                | CatalogError::SnapshotParse { .. }
        )
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
