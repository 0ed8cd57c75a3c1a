//! # Pharmabook Core
//!
//! Core business logic for the Pharmabook clinical reference catalog.
//!
//! This crate contains pure data operations:
//! - Fetching raw `systems` and `conditions` rows through a [`CatalogGateway`]
//! - Normalising them into the systems summary, the condition index and the detail map
//! - Filtering the condition index by tab, system, favorites and search term
//! - Persisting the user's favorite conditions
//! - A view model tying those together for a browsing front end
//!
//! **No API concerns**: HTTP servers and command line handling belong in `api-rest` and `cli`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod gateway;
pub mod models;
pub mod normalizer;
pub mod slug;
pub mod view;

pub use catalog::{CatalogService, Session};
pub use config::{CoreConfig, GatewaySource};
pub use error::{CatalogError, CatalogResult};
pub use favorites::{Favorites, JsonFileStorage, KeyValueStorage, MemoryStorage};
pub use filter::{filter_conditions, FilterState, Tab};
pub use gateway::{CatalogGateway, RestGateway, SnapshotGateway};
pub use models::{
    CatalogData, ConditionDetail, ConditionSummary, Medication, RawCondition, RawMedication,
    RawSystem, System,
};
pub use normalizer::normalize;
pub use slug::slugify;
pub use view::{EmptyReason, LoadState, View, ViewModel};
