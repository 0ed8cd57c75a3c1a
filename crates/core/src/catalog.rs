//! Catalog loading.
//!
//! [`CatalogService::load`] runs the two gateway queries in sequence (systems, then
//! conditions) and normalises the rows only once both succeed. A failure of either query is
//! returned as-is and produces no data, so callers can keep whatever they displayed before.

use crate::config::{CoreConfig, GatewaySource};
use crate::error::{CatalogError, CatalogResult};
use crate::gateway::{CatalogGateway, RestGateway, SnapshotGateway};
use crate::models::CatalogData;
use crate::normalizer::normalize;
use std::sync::Arc;

/// A signed-in session as seen by the catalog.
///
/// Identity itself is handled elsewhere; the catalog only needs to know a session exists and
/// which bearer token to forward to the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    /// Returns `None` for a blank token.
    pub fn new(access_token: impl Into<String>) -> Option<Self> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            None
        } else {
            Some(Self { access_token })
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Loads the catalog from a gateway.
#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<dyn CatalogGateway>,
    require_session: bool,
    session: Option<Session>,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn CatalogGateway>, require_session: bool) -> Self {
        Self {
            gateway,
            require_session,
            session: None,
        }
    }

    /// Builds the gateway selected by `cfg`, forwarding the session token when there is one.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::GatewayClient` if the HTTP client cannot be constructed.
    pub fn from_config(cfg: &CoreConfig, session: Option<Session>) -> CatalogResult<Self> {
        let gateway: Arc<dyn CatalogGateway> = match cfg.gateway() {
            GatewaySource::Rest { url, api_key } => Arc::new(
                RestGateway::new(url, api_key, cfg.gateway_timeout_secs())?
                    .with_access_token(session.as_ref().map(|s| s.access_token().to_string())),
            ),
            GatewaySource::Snapshot { dir } => Arc::new(SnapshotGateway::new(dir.clone())),
        };

        Ok(Self::new(gateway, cfg.require_session()).with_session(session))
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Fetches and normalises the catalog.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NoSession` if a session is required and absent; the gateway is not
    ///   contacted.
    /// - Any gateway error from either query.
    pub fn load(&self) -> CatalogResult<CatalogData> {
        if self.require_session && self.session.is_none() {
            return Err(CatalogError::NoSession);
        }

        let raw_systems = self.gateway.fetch_systems().map_err(|e| {
            tracing::error!("systems query failed: {}", e);
            e
        })?;
        let raw_conditions = self.gateway.fetch_conditions().map_err(|e| {
            tracing::error!("conditions query failed: {}", e);
            e
        })?;

        let data = normalize(&raw_systems, &raw_conditions);
        tracing::info!(
            "catalog loaded: {} systems, {} conditions",
            data.systems.len(),
            data.conditions.len()
        );

        Ok(data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gateway::snapshot::tests::write_snapshot;
    use crate::models::{RawCondition, RawSystem};
    use crate::normalizer::tests::{raw_condition, raw_system};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// In-memory gateway that can be told to fail either query.
    #[derive(Default)]
    pub(crate) struct StubGateway {
        pub systems: Vec<RawSystem>,
        pub conditions: Vec<RawCondition>,
        pub fail_systems: bool,
        pub fail_conditions: bool,
        pub calls: AtomicUsize,
    }

    impl StubGateway {
        pub(crate) fn sample() -> Self {
            Self {
                systems: vec![
                    raw_system("respiratorio", "Respiratório", 1),
                    raw_system("digestivo", "Digestivo", 2),
                ],
                conditions: vec![
                    raw_condition("asma", "Asma", "respiratorio", "Crise de falta de ar"),
                    raw_condition("azia", "Azia", "digestivo", "Queimação"),
                    raw_condition("rinite", "Rinite", "respiratorio", "Inflamação alérgica"),
                ],
                ..Self::default()
            }
        }

        fn failure(relation: &'static str) -> CatalogError {
            CatalogError::GatewayStatus {
                relation,
                status: 503,
                body: "unavailable".into(),
            }
        }
    }

    impl CatalogGateway for StubGateway {
        fn fetch_systems(&self) -> CatalogResult<Vec<RawSystem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_systems {
                return Err(Self::failure("systems"));
            }
            Ok(self.systems.clone())
        }

        fn fetch_conditions(&self) -> CatalogResult<Vec<RawCondition>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_conditions {
                return Err(Self::failure("conditions"));
            }
            Ok(self.conditions.clone())
        }
    }

    #[test]
    fn test_load_normalizes_both_queries() {
        let service = CatalogService::new(Arc::new(StubGateway::sample()), false);

        let data = service.load().expect("load should succeed");

        assert_eq!(data.systems.len(), 2);
        assert_eq!(data.systems[0].count, 2);
        assert_eq!(data.conditions.len(), 3);
        assert_eq!(data.details.len(), 3);
    }

    #[test]
    fn test_load_fails_when_either_query_fails() {
        let gateway = StubGateway {
            fail_conditions: true,
            ..StubGateway::sample()
        };
        let err = CatalogService::new(Arc::new(gateway), false)
            .load()
            .expect_err("load should fail");
        assert!(err.is_gateway_query());

        let gateway = StubGateway {
            fail_systems: true,
            ..StubGateway::sample()
        };
        let err = CatalogService::new(Arc::new(gateway), false)
            .load()
            .expect_err("load should fail");
        assert!(err.is_gateway_query());
    }

    #[test]
    fn test_session_gate_blocks_before_gateway() {
        let gateway = Arc::new(StubGateway::sample());
        let service = CatalogService::new(gateway.clone(), true);

        let err = service.load().expect_err("load should require a session");
        assert!(matches!(err, CatalogError::NoSession));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);

        let service = service.with_session(Session::new("token"));
        service.load().expect("load should succeed with a session");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_session_rejects_blank_token_and_redacts_debug() {
        assert!(Session::new("   ").is_none());

        let session = Session::new(" secret ").expect("session should exist");
        assert_eq!(session.access_token(), "secret");
        assert!(!format!("{session:?}").contains("secret"));
    }

    #[test]
    fn test_from_config_with_snapshot_gateway() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_snapshot(temp_dir.path());
        let cfg = CoreConfig::new(
            GatewaySource::Snapshot {
                dir: temp_dir.path().to_path_buf(),
            },
            PathBuf::from("unused"),
            false,
            5,
        )
        .expect("CoreConfig::new should succeed");

        let data = CatalogService::from_config(&cfg, None)
            .expect("service should build")
            .load()
            .expect("load should succeed");

        let ids: Vec<&str> = data.conditions.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["asma", "azia", "rinite"]);
        assert_eq!(data.systems[0].id, "respiratorio");
        assert_eq!(data.systems[0].count, 2);
        assert_eq!(data.details["asma"].system, "Respiratório");
        assert!(data.details["asma"].causes.is_empty());
        assert!(data.details["rinite"].medications[0].mip);
    }
}
