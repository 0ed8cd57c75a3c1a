//! Hosted REST gateway.
//!
//! Talks to a PostgREST-style endpoint (`<base>/rest/v1/<relation>`) with a publishable API
//! key. When a signed-in session is present its access token is sent as the bearer credential,
//! otherwise the API key is.

use super::CatalogGateway;
use crate::constants::{
    CONDITIONS_ORDER_COLUMN, CONDITIONS_RELATION, CONDITIONS_SELECT, REST_PATH_PREFIX,
    SYSTEMS_ORDER_COLUMN, SYSTEMS_RELATION, SYSTEMS_SELECT,
};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{RawCondition, RawSystem};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct RestGateway {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: reqwest::blocking::Client,
}

impl RestGateway {
    /// Creates a gateway for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::GatewayClient` if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> CatalogResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(CatalogError::GatewayClient)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
            client,
        })
    }

    /// Uses a session access token as the bearer credential.
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn relation_url(&self, relation: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH_PREFIX, relation)
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        relation: &'static str,
        select: &str,
        order: &str,
    ) -> CatalogResult<Vec<T>> {
        let url = self.relation_url(relation);

        let response = self
            .client
            .get(&url)
            .query(&query_params(select, order))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    CatalogError::GatewayConnection {
                        url: self.base_url.clone(),
                        source: e,
                    }
                } else {
                    CatalogError::GatewayRequest {
                        relation,
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::GatewayStatus {
                relation,
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<T> = response
            .json()
            .map_err(|e| CatalogError::GatewayDecode {
                relation,
                source: e,
            })?;

        tracing::debug!("fetched {} rows from {}", rows.len(), relation);
        Ok(rows)
    }
}

impl CatalogGateway for RestGateway {
    fn fetch_systems(&self) -> CatalogResult<Vec<RawSystem>> {
        self.fetch(SYSTEMS_RELATION, SYSTEMS_SELECT, SYSTEMS_ORDER_COLUMN)
    }

    fn fetch_conditions(&self) -> CatalogResult<Vec<RawCondition>> {
        self.fetch(CONDITIONS_RELATION, CONDITIONS_SELECT, CONDITIONS_ORDER_COLUMN)
    }
}

/// Query string for an active-only, ordered select.
fn query_params<'a>(select: &'a str, order: &'a str) -> [(&'static str, &'a str); 3] {
    [("select", select), ("active", "eq.true"), ("order", order)]
}
