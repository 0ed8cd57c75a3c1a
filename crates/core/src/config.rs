//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services as an
//! `Arc<CoreConfig>`. Nothing in this crate reads process environment variables: binaries hand
//! a lookup function to [`CoreConfig::from_lookup`], which keeps request handling and tests
//! independent of process-wide state.

use crate::constants::{
    APP_DIR_NAME, DEFAULT_DATA_DIR, DEFAULT_GATEWAY_TIMEOUT_SECS, ENV_ACCESS_TOKEN, ENV_DATA_DIR,
    ENV_GATEWAY_KEY, ENV_GATEWAY_TIMEOUT_SECS, ENV_GATEWAY_URL, ENV_REQUIRE_SESSION,
    ENV_SNAPSHOT_DIR,
};
use crate::error::{CatalogError, CatalogResult};
use std::path::{Path, PathBuf};

/// Where catalog rows are fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewaySource {
    /// Hosted REST service.
    Rest { url: String, api_key: String },
    /// Exported rows on disk.
    Snapshot { dir: PathBuf },
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    gateway: GatewaySource,
    data_dir: PathBuf,
    require_session: bool,
    gateway_timeout_secs: u64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidInput` if the timeout is zero.
    pub fn new(
        gateway: GatewaySource,
        data_dir: PathBuf,
        require_session: bool,
        gateway_timeout_secs: u64,
    ) -> CatalogResult<Self> {
        if gateway_timeout_secs == 0 {
            return Err(CatalogError::InvalidInput(
                "gateway timeout must be at least one second".into(),
            ));
        }

        Ok(Self {
            gateway,
            data_dir,
            require_session,
            gateway_timeout_secs,
        })
    }

    /// Resolve configuration from a key lookup, typically `|k| std::env::var(k).ok()`.
    ///
    /// The access token is not part of the configuration; read it with [`access_token`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CatalogResult<Self> {
        let gateway = gateway_source_from_env_values(
            lookup(ENV_GATEWAY_URL),
            lookup(ENV_GATEWAY_KEY),
            lookup(ENV_SNAPSHOT_DIR),
        )?;
        let data_dir = resolve_data_dir(non_blank(lookup(ENV_DATA_DIR)).map(PathBuf::from));
        let require_session =
            bool_from_env_value(ENV_REQUIRE_SESSION, lookup(ENV_REQUIRE_SESSION))?;
        let gateway_timeout_secs = timeout_from_env_value(lookup(ENV_GATEWAY_TIMEOUT_SECS))?;

        Self::new(gateway, data_dir, require_session, gateway_timeout_secs)
    }

    pub fn gateway(&self) -> &GatewaySource {
        &self.gateway
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn require_session(&self) -> bool {
        self.require_session
    }

    pub fn gateway_timeout_secs(&self) -> u64 {
        self.gateway_timeout_secs
    }
}

/// Session access token from a key lookup, if one is set.
pub fn access_token(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    non_blank(lookup(ENV_ACCESS_TOKEN))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pick the gateway from the URL, key and snapshot settings.
///
/// Exactly one of `url` and `snapshot_dir` must be set. A URL requires an API key.
pub fn gateway_source_from_env_values(
    url: Option<String>,
    api_key: Option<String>,
    snapshot_dir: Option<String>,
) -> CatalogResult<GatewaySource> {
    match (non_blank(url), non_blank(snapshot_dir)) {
        (Some(_), Some(_)) => Err(CatalogError::InvalidInput(format!(
            "{ENV_GATEWAY_URL} and {ENV_SNAPSHOT_DIR} are mutually exclusive"
        ))),
        (Some(url), None) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CatalogError::InvalidInput(format!(
                    "{ENV_GATEWAY_URL} must be an http(s) URL"
                )));
            }
            let api_key = non_blank(api_key).ok_or_else(|| {
                CatalogError::InvalidInput(format!(
                    "{ENV_GATEWAY_KEY} is required when {ENV_GATEWAY_URL} is set"
                ))
            })?;
            Ok(GatewaySource::Rest { url, api_key })
        }
        (None, Some(dir)) => Ok(GatewaySource::Snapshot {
            dir: PathBuf::from(dir),
        }),
        (None, None) => Err(CatalogError::InvalidInput(format!(
            "set either {ENV_GATEWAY_URL} or {ENV_SNAPSHOT_DIR}"
        ))),
    }
}

/// Resolve the preferences directory.
///
/// An explicit override wins; otherwise the platform local data directory is used, falling
/// back to a relative directory when the platform has none.
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir;
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse a boolean flag. Unset or blank means `false`.
pub fn bool_from_env_value(name: &str, value: Option<String>) -> CatalogResult<bool> {
    match non_blank(value).map(|v| v.to_lowercase()).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(CatalogError::InvalidInput(format!(
            "{name} must be true or false, got {other:?}"
        ))),
    }
}

/// Parse the gateway timeout. Unset or blank means the default.
pub fn timeout_from_env_value(value: Option<String>) -> CatalogResult<u64> {
    non_blank(value)
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                CatalogError::InvalidInput(format!("{ENV_GATEWAY_TIMEOUT_SECS}: {e}"))
            })
        })
        .transpose()
        .map(|secs| secs.unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS))
}
