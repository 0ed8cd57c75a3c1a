//! Filter/selection over the flat condition index.
//!
//! [`filter_conditions`] narrows the index in a fixed order and never reorders:
//!
//! 1. system scope (when a system filter is set)
//! 2. tab semantics
//! 3. case-insensitive substring search over name and short description
//!
//! It is a pure function of its inputs and cheap enough to run on every interaction.

use crate::error::CatalogError;
use crate::models::ConditionSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Home view tabs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    #[serde(alias = "todas")]
    All,
    #[serde(alias = "favoritas")]
    Favorites,
    /// Currently identical to [`Tab::All`]; no ranking exists yet.
    #[serde(alias = "mais-consultadas")]
    MostConsulted,
    /// Placeholder tab, always empty.
    #[serde(alias = "em-breve")]
    ComingSoon,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::All, Tab::Favorites, Tab::MostConsulted, Tab::ComingSoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::All => "all",
            Tab::Favorites => "favorites",
            Tab::MostConsulted => "most-consulted",
            Tab::ComingSoon => "coming-soon",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todas" => Ok(Tab::All),
            "favorites" | "favoritas" => Ok(Tab::Favorites),
            "most-consulted" | "mais-consultadas" => Ok(Tab::MostConsulted),
            "coming-soon" | "em-breve" => Ok(Tab::ComingSoon),
            other => Err(CatalogError::InvalidInput(format!("unknown tab: {other}"))),
        }
    }
}

/// Filter inputs orthogonal to which view is showing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub tab: Tab,
    pub system_filter: Option<String>,
    pub search_term: String,
}

impl FilterState {
    pub fn apply<'a>(
        &self,
        conditions: &'a [ConditionSummary],
        favorites: &BTreeSet<String>,
    ) -> Vec<&'a ConditionSummary> {
        filter_conditions(
            conditions,
            self.tab,
            self.system_filter.as_deref(),
            favorites,
            &self.search_term,
        )
    }

    /// Whether a non-blank search term is active.
    pub fn is_searching(&self) -> bool {
        !self.search_term.trim().is_empty()
    }
}

/// Returns the visible subset of `conditions`, preserving their relative order.
///
/// The search term is only checked for blankness after trimming; matching itself uses the
/// term as typed, lowercased.
pub fn filter_conditions<'a>(
    conditions: &'a [ConditionSummary],
    tab: Tab,
    system_filter: Option<&str>,
    favorites: &BTreeSet<String>,
    search_term: &str,
) -> Vec<&'a ConditionSummary> {
    if tab == Tab::ComingSoon {
        return Vec::new();
    }

    let term = if search_term.trim().is_empty() {
        None
    } else {
        Some(search_term.to_lowercase())
    };

    conditions
        .iter()
        .filter(|c| system_filter.map_or(true, |system| c.system == system))
        .filter(|c| match tab {
            Tab::Favorites => favorites.contains(&c.id),
            Tab::All | Tab::MostConsulted => true,
            Tab::ComingSoon => false,
        })
        .filter(|c| {
            term.as_deref().map_or(true, |term| {
                c.name.to_lowercase().contains(term) || c.desc.to_lowercase().contains(term)
            })
        })
        .collect()
}
