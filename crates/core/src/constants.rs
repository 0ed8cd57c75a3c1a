//! Constants used throughout the Pharmabook core crate.
//!
//! Relation names, storage keys and default locations live here so the gateway, the favorites
//! store and the binaries agree on them.

/// Relation holding the body systems.
pub const SYSTEMS_RELATION: &str = "systems";

/// Relation holding the clinical conditions.
pub const CONDITIONS_RELATION: &str = "conditions";

/// Column used to order the systems relation.
pub const SYSTEMS_ORDER_COLUMN: &str = "order_index";

/// Column used to order the conditions relation.
pub const CONDITIONS_ORDER_COLUMN: &str = "name";

/// Projection for the systems query.
pub const SYSTEMS_SELECT: &str = "*";

/// Projection for the conditions query, embedding the owning system and its medications.
pub const CONDITIONS_SELECT: &str = "*,systems(slug,name,icon),medications(*)";

/// Path prefix of the hosted REST endpoint.
pub const REST_PATH_PREFIX: &str = "rest/v1";

/// Storage key under which favorite condition ids are persisted.
pub const FAVORITES_STORAGE_KEY: &str = "pharmabook_favorites";

/// Snapshot export filename for the systems relation.
pub const SYSTEMS_SNAPSHOT_FILENAME: &str = "systems.json";

/// Snapshot export filename for the conditions relation.
pub const CONDITIONS_SNAPSHOT_FILENAME: &str = "conditions.json";

/// Directory name appended to the platform data directory.
pub const APP_DIR_NAME: &str = "pharmabook";

/// Fallback data directory when the platform has no local data directory.
pub const DEFAULT_DATA_DIR: &str = "pharmabook_data";

/// Default gateway request timeout in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Environment variable: base URL of the hosted data service.
pub const ENV_GATEWAY_URL: &str = "PHARMABOOK_GATEWAY_URL";

/// Environment variable: publishable API key of the hosted data service.
pub const ENV_GATEWAY_KEY: &str = "PHARMABOOK_GATEWAY_KEY";

/// Environment variable: directory of exported snapshot rows.
pub const ENV_SNAPSHOT_DIR: &str = "PHARMABOOK_SNAPSHOT_DIR";

/// Environment variable: directory for durable user preferences.
pub const ENV_DATA_DIR: &str = "PHARMABOOK_DATA_DIR";

/// Environment variable: access token of a signed-in session.
pub const ENV_ACCESS_TOKEN: &str = "PHARMABOOK_ACCESS_TOKEN";

/// Environment variable: whether loading requires a signed-in session.
pub const ENV_REQUIRE_SESSION: &str = "PHARMABOOK_REQUIRE_SESSION";

/// Environment variable: gateway request timeout in seconds.
pub const ENV_GATEWAY_TIMEOUT_SECS: &str = "PHARMABOOK_GATEWAY_TIMEOUT_SECS";

/// REST server bind address.
pub const ENV_REST_ADDR: &str = "PHARMABOOK_REST_ADDR";

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
