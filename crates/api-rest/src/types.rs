//! Request and response bodies for the REST surface.
//!
//! These mirror the core view-ready records but add the per-request fields a client needs, such
//! as the `favorite` flag on each condition. All of them derive `ToSchema` so they appear in the
//! OpenAPI document.

use pharmabook_core::{ConditionDetail, ConditionSummary, Medication, System};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SystemRes {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Number of active conditions in the system.
    pub count: usize,
}

impl From<&System> for SystemRes {
    fn from(system: &System) -> Self {
        Self {
            id: system.id.clone(),
            name: system.name.clone(),
            icon: system.icon.clone(),
            color: system.color.clone(),
            count: system.count,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListSystemsRes {
    pub systems: Vec<SystemRes>,
}

/// Query string of `GET /conditions`.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConditionsQuery {
    /// `all`, `favorites`, `most-consulted` or `coming-soon` (Portuguese aliases accepted).
    pub tab: Option<String>,
    /// Restrict to one system id.
    pub system: Option<String>,
    /// Case-insensitive substring of the name or short description.
    pub search: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConditionRes {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub system: String,
    pub favorite: bool,
}

impl ConditionRes {
    pub fn new(summary: &ConditionSummary, favorite: bool) -> Self {
        Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            desc: summary.desc.clone(),
            system: summary.system.clone(),
            favorite,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListConditionsRes {
    pub tab: String,
    pub conditions: Vec<ConditionRes>,
    pub favorites_count: usize,
    /// Set when `conditions` is empty: `no-favorites`, `coming-soon`, `no-search-matches` or
    /// `no-conditions`.
    pub empty_reason: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MedicationRes {
    pub name: String,
    pub concentration: Option<String>,
    pub posology: Option<String>,
    pub duration: Option<String>,
    pub mip: bool,
}

impl From<&Medication> for MedicationRes {
    fn from(m: &Medication) -> Self {
        Self {
            name: m.name.clone(),
            concentration: m.concentration.clone(),
            posology: m.posology.clone(),
            duration: m.duration.clone(),
            mip: m.mip,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDetailRes {
    pub id: String,
    /// Display name of the owning system.
    pub system: String,
    pub name: String,
    pub definition: String,
    pub causes: Vec<String>,
    pub objectives: Vec<String>,
    pub symptoms: Vec<String>,
    pub alert_signs: Vec<String>,
    pub referral_criteria: Vec<String>,
    pub medications: Vec<MedicationRes>,
    pub non_pharmacological: Vec<String>,
    pub general_guidance: Vec<String>,
    pub favorite: bool,
}

impl ConditionDetailRes {
    pub fn new(id: &str, detail: &ConditionDetail, favorite: bool) -> Self {
        Self {
            id: id.to_string(),
            system: detail.system.clone(),
            name: detail.name.clone(),
            definition: detail.definition.clone(),
            causes: detail.causes.clone(),
            objectives: detail.objectives.clone(),
            symptoms: detail.symptoms.clone(),
            alert_signs: detail.alert_signs.clone(),
            referral_criteria: detail.referral_criteria.clone(),
            medications: detail.medications.iter().map(MedicationRes::from).collect(),
            non_pharmacological: detail.non_pharmacological.clone(),
            general_guidance: detail.general_guidance.clone(),
            favorite,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoritesRes {
    pub ids: Vec<String>,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleFavoriteRes {
    pub id: String,
    pub favorite: bool,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReloadRes {
    pub systems: usize,
    pub conditions: usize,
}
