//! Browsing view model.
//!
//! The browsing session is an explicit state machine instead of loose flags:
//!
//! - [`View`]: which screen is showing (`Home` or `Detail` of one condition)
//! - [`FilterState`]: tab, system scope and search term, orthogonal to the view
//! - [`LoadState`]: progress of the last catalog load, including its failure
//!
//! Failures are reported through [`LoadState::Failed`] and [`ViewModel::take_error`] rather than
//! interrupting the caller. A failed load keeps the previously loaded data.

use crate::error::{CatalogError, CatalogResult};
use crate::favorites::{Favorites, KeyValueStorage};
use crate::filter::{FilterState, Tab};
use crate::models::{CatalogData, ConditionDetail, ConditionSummary, System};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "condition", rename_all = "kebab-case")]
pub enum View {
    #[default]
    Home,
    Detail(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "kebab-case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Why the home list is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyReason {
    NoFavorites,
    ComingSoon,
    NoSearchMatches,
    NoConditions,
}

impl EmptyReason {
    /// Reason for an empty list produced by `filter`.
    ///
    /// The placeholder tab and an empty favorites set take precedence over search.
    pub fn for_filter(filter: &FilterState, favorite_count: usize) -> Self {
        match filter.tab {
            Tab::ComingSoon => EmptyReason::ComingSoon,
            Tab::Favorites if favorite_count == 0 => EmptyReason::NoFavorites,
            _ if filter.is_searching() => EmptyReason::NoSearchMatches,
            Tab::Favorites => EmptyReason::NoFavorites,
            _ => EmptyReason::NoConditions,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyReason::NoFavorites => "no-favorites",
            EmptyReason::ComingSoon => "coming-soon",
            EmptyReason::NoSearchMatches => "no-search-matches",
            EmptyReason::NoConditions => "no-conditions",
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ViewModel<S> {
    data: CatalogData,
    favorites: Favorites<S>,
    filter: FilterState,
    view: View,
    load_state: LoadState,
    last_error: Option<CatalogError>,
}

impl<S: KeyValueStorage> ViewModel<S> {
    pub fn new(favorites: Favorites<S>) -> Self {
        Self {
            data: CatalogData::default(),
            favorites,
            filter: FilterState::default(),
            view: View::Home,
            load_state: LoadState::Idle,
            last_error: None,
        }
    }

    pub fn begin_load(&mut self) {
        self.load_state = LoadState::Loading;
    }

    /// Records the outcome of a catalog load.
    ///
    /// Success replaces all three derived structures at once. Failure leaves them untouched and
    /// records the error. Whichever load result is applied last wins.
    pub fn apply_load(&mut self, result: CatalogResult<CatalogData>) {
        match result {
            Ok(data) => {
                self.data = data;
                self.load_state = LoadState::Ready;
                self.last_error = None;

                if let View::Detail(id) = &self.view {
                    if !self.data.details.contains_key(id) {
                        self.view = View::Home;
                    }
                }
            }
            Err(e) => {
                tracing::error!("catalog load failed: {}", e);
                self.load_state = LoadState::Failed(e.to_string());
                self.last_error = Some(e);
            }
        }
    }

    /// Switches tab and drops any system scope.
    pub fn select_tab(&mut self, tab: Tab) {
        self.filter.tab = tab;
        self.filter.system_filter = None;
    }

    /// Scopes the list to one system and returns to the `all` tab.
    pub fn select_system(&mut self, system_id: &str) {
        self.filter.system_filter = Some(system_id.to_string());
        self.filter.tab = Tab::All;
    }

    /// Replaces tab, system scope and search term together.
    ///
    /// Unlike [`ViewModel::select_system`] this keeps the given tab.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn clear_system_filter(&mut self) {
        self.filter.system_filter = None;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
    }

    /// Shows the detail of `condition_id`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownCondition` and leaves the view unchanged if the id is not in
    /// the loaded catalog.
    pub fn open_condition(&mut self, condition_id: &str) -> CatalogResult<&ConditionDetail> {
        if !self.data.details.contains_key(condition_id) {
            return Err(CatalogError::UnknownCondition(condition_id.to_string()));
        }
        self.view = View::Detail(condition_id.to_string());
        self.data
            .detail(condition_id)
            .ok_or_else(|| CatalogError::UnknownCondition(condition_id.to_string()))
    }

    pub fn back(&mut self) {
        self.view = View::Home;
    }

    /// See [`Favorites::toggle`].
    pub fn toggle_favorite(&mut self, condition_id: &str) -> CatalogResult<bool> {
        self.favorites.toggle(condition_id)
    }

    pub fn visible_conditions(&self) -> Vec<&ConditionSummary> {
        self.filter
            .apply(&self.data.conditions, self.favorites.ids())
    }

    /// Detail record for the current view, if it is a detail view.
    pub fn current_detail(&self) -> Option<&ConditionDetail> {
        match &self.view {
            View::Detail(id) => self.data.detail(id),
            View::Home => None,
        }
    }

    /// Reason to show instead of an empty home list, or `None` when something is visible.
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.visible_conditions().is_empty() {
            return None;
        }
        Some(EmptyReason::for_filter(&self.filter, self.favorites.count()))
    }

    /// Returns and clears the most recent error.
    pub fn take_error(&mut self) -> Option<CatalogError> {
        self.last_error.take()
    }

    pub fn is_favorite(&self, condition_id: &str) -> bool {
        self.favorites.contains(condition_id)
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.count()
    }

    pub fn favorites(&self) -> &Favorites<S> {
        &self.favorites
    }

    pub fn systems(&self) -> &[System] {
        &self.data.systems
    }

    pub fn data(&self) -> &CatalogData {
        &self.data
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }
}
