//! Remote data gateway.
//!
//! The catalog lives in a hosted relational store exposing two relations:
//!
//! - `systems`: active rows ordered by `order_index`
//! - `conditions`: active rows ordered by `name`, each embedding its owning system and its
//!   medications
//!
//! [`CatalogGateway`] abstracts where those rows come from. [`rest::RestGateway`] queries the
//! hosted service; [`snapshot::SnapshotGateway`] reads exported rows from disk and applies the
//! same filtering and ordering locally.

pub mod rest;
pub mod snapshot;

use crate::error::CatalogResult;
use crate::models::{RawCondition, RawSystem};

pub use rest::RestGateway;
pub use snapshot::SnapshotGateway;

/// Source of raw catalog rows.
pub trait CatalogGateway: Send + Sync {
    /// Active systems in display order.
    fn fetch_systems(&self) -> CatalogResult<Vec<RawSystem>>;

    /// Active conditions ordered by name, with embedded system and medications.
    fn fetch_conditions(&self) -> CatalogResult<Vec<RawCondition>>;
}

impl<G: CatalogGateway + ?Sized> CatalogGateway for Box<G> {
    fn fetch_systems(&self) -> CatalogResult<Vec<RawSystem>> {
        (**self).fetch_systems()
    }

    fn fetch_conditions(&self) -> CatalogResult<Vec<RawCondition>> {
        (**self).fetch_conditions()
    }
}
