//! # API REST
//!
//! REST API implementation for Pharmabook.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Catalog loading and favorites writes are blocking operations in `pharmabook-core`; handlers
//! run them on the blocking thread pool.

#![warn(rust_2018_idioms)]

pub mod types;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use pharmabook_core::{
    CatalogData, CatalogError, CatalogResult, CatalogService, CoreConfig, EmptyReason, Favorites,
    FilterState, JsonFileStorage, KeyValueStorage, Session, Tab,
};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use types::{
    ConditionDetailRes, ConditionRes, ConditionsQuery, FavoritesRes, HealthRes, ListConditionsRes,
    ListSystemsRes, MedicationRes, ReloadRes, SystemRes, ToggleFavoriteRes,
};

/// Favorites backend shared by all handlers.
pub type SharedStorage = Box<dyn KeyValueStorage + Send>;

/// Application state shared across REST API handlers
///
/// Holds the catalog service used by `/reload`, the most recently loaded catalog and the
/// favorites set. Cloning is cheap; all clones see the same data.
#[derive(Clone)]
pub struct AppState {
    catalog: CatalogService,
    data: Arc<RwLock<CatalogData>>,
    favorites: Arc<Mutex<Favorites<SharedStorage>>>,
}

impl AppState {
    /// Creates state with an empty catalog. Call [`AppState::reload`] to populate it.
    pub fn new(catalog: CatalogService, favorites: Favorites<SharedStorage>) -> Self {
        Self {
            catalog,
            data: Arc::new(RwLock::new(CatalogData::default())),
            favorites: Arc::new(Mutex::new(favorites)),
        }
    }

    /// Runs the catalog load and swaps in the result.
    ///
    /// Blocking. On failure the previously loaded catalog stays in place.
    ///
    /// # Errors
    ///
    /// Returns whatever [`CatalogService::load`] returns.
    pub fn reload(&self) -> CatalogResult<ReloadRes> {
        let fresh = self.catalog.load()?;
        let res = ReloadRes {
            systems: fresh.systems.len(),
            conditions: fresh.conditions.len(),
        };

        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        *data = fresh;

        Ok(res)
    }

    fn data(&self) -> RwLockReadGuard<'_, CatalogData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn favorites(&self) -> MutexGuard<'_, Favorites<SharedStorage>> {
        self.favorites.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builds the state for a server from resolved configuration and performs the first load.
///
/// A failed first load is logged and the server starts with an empty catalog; `/reload` can be
/// used to retry.
///
/// # Errors
///
/// Returns an error if the gateway client cannot be constructed.
pub async fn build_state(
    cfg: Arc<CoreConfig>,
    session: Option<Session>,
) -> anyhow::Result<AppState> {
    let state = tokio::task::spawn_blocking(move || -> CatalogResult<AppState> {
        let catalog = CatalogService::from_config(&cfg, session)?;
        let storage: SharedStorage = Box::new(JsonFileStorage::new(cfg.data_dir()));
        let state = AppState::new(catalog, Favorites::load(storage));

        if let Err(e) = state.reload() {
            tracing::error!("Initial catalog load failed: {}", e);
        }

        Ok(state)
    })
    .await??;

    Ok(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_systems,
        list_conditions,
        get_condition,
        list_favorites,
        toggle_favorite,
        reload,
    ),
    components(schemas(
        HealthRes,
        SystemRes,
        ListSystemsRes,
        ConditionRes,
        ListConditionsRes,
        MedicationRes,
        ConditionDetailRes,
        FavoritesRes,
        ToggleFavoriteRes,
        ReloadRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/systems", get(list_systems))
        .route("/conditions", get(list_conditions))
        .route("/conditions/:id", get(get_condition))
        .route("/favorites", get(list_favorites))
        .route("/favorites/:id", post(toggle_favorite))
        .route("/reload", post(reload))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// # Returns
/// * `Json<HealthRes>` - Always `ok: true` while the process is serving
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Pharmabook is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/systems",
    responses(
        (status = 200, description = "Systems in display order with condition counts", body = ListSystemsRes)
    )
)]
/// List body systems in display order
async fn list_systems(State(state): State<AppState>) -> Json<ListSystemsRes> {
    let data = state.data();
    Json(ListSystemsRes {
        systems: data.systems.iter().map(SystemRes::from).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/conditions",
    params(ConditionsQuery),
    responses(
        (status = 200, description = "Visible conditions for the given filter", body = ListConditionsRes),
        (status = 400, description = "Unknown tab")
    )
)]
/// List the conditions visible under a tab, system scope and search term
///
/// # Returns
/// * `Ok(Json<ListConditionsRes>)` - Visible conditions in catalog order, each with its
///   favorite flag, plus the reason when the list is empty
/// * `Err((StatusCode, &str))` - Bad request if `tab` is not recognised
async fn list_conditions(
    State(state): State<AppState>,
    Query(query): Query<ConditionsQuery>,
) -> Result<Json<ListConditionsRes>, (StatusCode, &'static str)> {
    let tab = match query.tab.as_deref() {
        Some(raw) => Tab::from_str(raw).map_err(|e| {
            tracing::warn!("Rejected conditions query: {}", e);
            (StatusCode::BAD_REQUEST, "Unknown tab")
        })?,
        None => Tab::default(),
    };
    let filter = FilterState {
        tab,
        system_filter: query.system.filter(|s| !s.is_empty()),
        search_term: query.search.unwrap_or_default(),
    };

    let data = state.data();
    let favorites = state.favorites();
    let visible = filter.apply(&data.conditions, favorites.ids());

    let empty_reason = visible
        .is_empty()
        .then(|| EmptyReason::for_filter(&filter, favorites.count()).to_string());
    let conditions = visible
        .into_iter()
        .map(|c| ConditionRes::new(c, favorites.contains(&c.id)))
        .collect();

    Ok(Json(ListConditionsRes {
        tab: tab.to_string(),
        conditions,
        favorites_count: favorites.count(),
        empty_reason,
    }))
}

#[utoipa::path(
    get,
    path = "/conditions/{id}",
    params(("id" = String, Path, description = "Condition id or display name")),
    responses(
        (status = 200, description = "Full clinical record", body = ConditionDetailRes),
        (status = 404, description = "Condition not found")
    )
)]
/// Read the full clinical record of one condition
///
/// The path segment may be the condition id or its display name in any casing or accenting.
async fn get_condition(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ConditionDetailRes>, (StatusCode, &'static str)> {
    let data = state.data();
    let (id, detail) = data
        .resolve_condition_id(&id)
        .and_then(|resolved| data.detail(resolved).map(|d| (resolved, d)))
        .ok_or((StatusCode::NOT_FOUND, "Condition not found"))?;

    let favorite = state.favorites().contains(id);
    Ok(Json(ConditionDetailRes::new(id, detail, favorite)))
}

#[utoipa::path(
    get,
    path = "/favorites",
    responses(
        (status = 200, description = "Favorite condition ids", body = FavoritesRes)
    )
)]
/// List favorite condition ids
async fn list_favorites(State(state): State<AppState>) -> Json<FavoritesRes> {
    let favorites = state.favorites();
    Json(FavoritesRes {
        ids: favorites.ids().iter().cloned().collect(),
        count: favorites.count(),
    })
}

#[utoipa::path(
    post,
    path = "/favorites/{id}",
    params(("id" = String, Path, description = "Condition id")),
    responses(
        (status = 200, description = "New favorite membership", body = ToggleFavoriteRes),
        (status = 500, description = "Favorites could not be stored")
    )
)]
/// Toggle a condition's favorite membership
///
/// # Returns
/// * `Ok(Json<ToggleFavoriteRes>)` - Membership after the toggle
/// * `Err((StatusCode, &str))` - Internal server error if the set could not be persisted; the
///   membership is left as it was
async fn toggle_favorite(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ToggleFavoriteRes>, (StatusCode, &'static str)> {
    let result = tokio::task::spawn_blocking(move || {
        let mut favorites = state.favorites();
        let favorite = favorites.toggle(&id)?;
        let res = ToggleFavoriteRes {
            id,
            favorite,
            count: favorites.count(),
        };
        Ok::<_, CatalogError>(res)
    })
    .await
    .map_err(|e| {
        tracing::error!("Toggle favorite task failed: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    match result {
        Ok(res) => Ok(Json(res)),
        Err(e) => {
            tracing::error!("Toggle favorite error: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Favorites could not be stored"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/reload",
    responses(
        (status = 200, description = "Catalog reloaded", body = ReloadRes),
        (status = 401, description = "A signed-in session is required"),
        (status = 502, description = "A catalog query failed; previous data kept")
    )
)]
/// Re-run the catalog load
///
/// # Returns
/// * `Ok(Json<ReloadRes>)` - Sizes of the freshly loaded catalog
/// * `Err((StatusCode, &str))` - Unauthorized without a required session, bad gateway if a
///   query failed
async fn reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadRes>, (StatusCode, &'static str)> {
    let result = tokio::task::spawn_blocking(move || state.reload())
        .await
        .map_err(|e| {
            tracing::error!("Reload task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?;

    match result {
        Ok(res) => Ok(Json(res)),
        Err(CatalogError::NoSession) => Err((StatusCode::UNAUTHORIZED, "Session required")),
        Err(e) if e.is_gateway_query() => {
            tracing::error!("Reload error: {}", e);
            Err((StatusCode::BAD_GATEWAY, "Catalog query failed"))
        }
        Err(e) => {
            tracing::error!("Reload error: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}
