//! Raw gateway rows to view-ready catalog structures.
//!
//! [`normalize`] is pure: it performs no I/O and yields the same [`CatalogData`] for the same
//! input. It is only called once both catalog queries have succeeded, so a failed load never
//! produces a partial result.
//!
//! Systems counts are computed by scanning the kept condition index once per system, so skipped
//! rows are never counted. The catalog holds tens to low hundreds of rows so no index is built.

use crate::models::{
    CatalogData, ConditionDetail, ConditionSummary, Medication, RawCondition, RawMedication,
    RawSystem, System,
};
use std::collections::BTreeMap;

/// Builds the systems summary, the flat condition index and the detail map.
///
/// Condition order follows the order of `raw_conditions`. Rows without an owning system and
/// rows repeating an earlier slug are skipped (and logged), so the summary ids and the detail
/// keys always match.
pub fn normalize(raw_systems: &[RawSystem], raw_conditions: &[RawCondition]) -> CatalogData {
    let mut conditions: Vec<ConditionSummary> = Vec::with_capacity(raw_conditions.len());
    let mut details = BTreeMap::new();

    for raw in raw_conditions {
        let Some(owner) = raw.systems.as_ref() else {
            tracing::warn!("skipping condition without owning system: {}", raw.slug);
            continue;
        };

        if details.contains_key(&raw.slug) {
            tracing::warn!("skipping duplicate condition slug: {}", raw.slug);
            continue;
        }

        conditions.push(ConditionSummary {
            id: raw.slug.clone(),
            name: raw.name.clone(),
            desc: raw.short_description.clone().unwrap_or_default(),
            system: owner.slug.clone(),
        });

        details.insert(raw.slug.clone(), detail_from_raw(raw, &owner.name));
    }

    let systems = raw_systems
        .iter()
        .map(|s| System {
            id: s.slug.clone(),
            name: s.name.clone(),
            icon: s.icon.clone().unwrap_or_default(),
            color: s.color.clone().unwrap_or_default(),
            count: conditions.iter().filter(|c| c.system == s.slug).count(),
        })
        .collect();

    CatalogData {
        systems,
        conditions,
        details,
    }
}

fn detail_from_raw(raw: &RawCondition, system_name: &str) -> ConditionDetail {
    fn list(field: &Option<Vec<String>>) -> Vec<String> {
        field.clone().unwrap_or_default()
    }

    ConditionDetail {
        system: system_name.to_string(),
        name: raw.name.clone(),
        definition: raw.definition.clone().unwrap_or_default(),
        causes: list(&raw.causes),
        objectives: list(&raw.objectives),
        symptoms: list(&raw.symptoms),
        alert_signs: list(&raw.alert_signs),
        referral_criteria: list(&raw.referral_criteria),
        medications: raw
            .medications
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(medication_from_raw)
            .collect(),
        non_pharmacological: list(&raw.non_pharmacological),
        general_guidance: list(&raw.general_guidance),
    }
}

fn medication_from_raw(raw: &RawMedication) -> Medication {
    Medication {
        name: raw.name.clone(),
        concentration: raw.concentration.clone(),
        posology: raw.posology.clone(),
        duration: raw.duration.clone(),
        mip: raw.is_mip.unwrap_or(false),
    }
}
