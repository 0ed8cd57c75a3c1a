//! Catalog data model.
//!
//! Two families of types live here:
//!
//! - **Raw rows** (`Raw*`), deserialised exactly as the data gateway returns them. Nullable
//!   columns are `Option` so a `null` never fails decoding.
//! - **View-ready records** ([`System`], [`ConditionSummary`], [`ConditionDetail`]) produced by
//!   the normaliser. These carry no optional collections: absent clinical lists become empty
//!   vectors.

use crate::slug::slugify;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// RAW GATEWAY ROWS
// ============================================================================

fn default_active() -> bool {
    true
}

/// A row of the `systems` relation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSystem {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub order_index: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// The owning system embedded in a condition row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawConditionSystem {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A medication embedded in a condition row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawMedication {
    pub name: String,
    #[serde(default)]
    pub concentration: Option<String>,
    #[serde(default)]
    pub posology: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub is_mip: Option<bool>,
}

/// A row of the `conditions` relation with its embedded system and medications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCondition {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub causes: Option<Vec<String>>,
    #[serde(default)]
    pub objectives: Option<Vec<String>>,
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub alert_signs: Option<Vec<String>>,
    #[serde(default)]
    pub referral_criteria: Option<Vec<String>>,
    #[serde(default)]
    pub non_pharmacological: Option<Vec<String>>,
    #[serde(default)]
    pub general_guidance: Option<Vec<String>>,
    #[serde(default)]
    pub systems: Option<RawConditionSystem>,
    #[serde(default)]
    pub medications: Option<Vec<RawMedication>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl RawCondition {
    /// Slug of the owning system, if the row carries one.
    pub fn system_slug(&self) -> Option<&str> {
        self.systems.as_ref().map(|s| s.slug.as_str())
    }
}

// ============================================================================
// VIEW-READY RECORDS
// ============================================================================

/// A body system with the number of active conditions it groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub count: usize,
}

/// Entry of the flat condition index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub id: String,
    pub name: String,
    pub desc: String,
    /// Id of the owning system.
    pub system: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub concentration: Option<String>,
    pub posology: Option<String>,
    pub duration: Option<String>,
    /// Available without prescription.
    pub mip: bool,
}

/// Full clinical record of a condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDetail {
    /// Display name of the owning system (not its slug).
    pub system: String,
    pub name: String,
    pub definition: String,
    pub causes: Vec<String>,
    pub objectives: Vec<String>,
    pub symptoms: Vec<String>,
    pub alert_signs: Vec<String>,
    pub referral_criteria: Vec<String>,
    pub medications: Vec<Medication>,
    pub non_pharmacological: Vec<String>,
    pub general_guidance: Vec<String>,
}

/// The three derived structures produced by one catalog load.
///
/// `conditions` and `details` always hold the same id set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogData {
    pub systems: Vec<System>,
    pub conditions: Vec<ConditionSummary>,
    pub details: BTreeMap<String, ConditionDetail>,
}

impl CatalogData {
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty() && self.conditions.is_empty()
    }

    pub fn detail(&self, id: &str) -> Option<&ConditionDetail> {
        self.details.get(id)
    }

    pub fn system(&self, id: &str) -> Option<&System> {
        self.systems.iter().find(|s| s.id == id)
    }

    /// Resolve user input to a condition id.
    ///
    /// Accepts an exact id, a display name or any text whose slug matches an id or a name.
    pub fn resolve_condition_id(&self, input: &str) -> Option<&str> {
        if let Some((id, _)) = self.details.get_key_value(input) {
            return Some(id.as_str());
        }

        let wanted = slugify(input);
        if wanted.is_empty() {
            return None;
        }

        self.conditions
            .iter()
            .find(|c| c.id == wanted || slugify(&c.name) == wanted)
            .map(|c| c.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> CatalogData {
        let conditions = vec![
            ConditionSummary {
                id: "infeccao-urinaria".into(),
                name: "Infecção urinária".into(),
                desc: String::new(),
                system: "urinario".into(),
            },
            ConditionSummary {
                id: "cond-42".into(),
                name: "Dor de Cabeça".into(),
                desc: String::new(),
                system: "neurologico".into(),
            },
        ];
        let details = conditions
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    ConditionDetail {
                        system: c.system.clone(),
                        name: c.name.clone(),
                        definition: String::new(),
                        causes: vec![],
                        objectives: vec![],
                        symptoms: vec![],
                        alert_signs: vec![],
                        referral_criteria: vec![],
                        medications: vec![],
                        non_pharmacological: vec![],
                        general_guidance: vec![],
                    },
                )
            })
            .collect();

        CatalogData {
            systems: vec![],
            conditions,
            details,
        }
    }

    #[test]
    fn test_resolve_condition_id_by_id_name_or_slug() {
        let data = data();

        assert_eq!(data.resolve_condition_id("cond-42"), Some("cond-42"));
        assert_eq!(
            data.resolve_condition_id("Infecção Urinária"),
            Some("infeccao-urinaria")
        );
        assert_eq!(data.resolve_condition_id("dor de cabeca"), Some("cond-42"));
        assert_eq!(data.resolve_condition_id("gripe"), None);
        assert_eq!(data.resolve_condition_id("  "), None);
    }
}
