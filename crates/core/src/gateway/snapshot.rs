//! Offline snapshot gateway.
//!
//! Reads `systems.json` and `conditions.json` exported from the hosted service. Exports contain
//! inactive rows and arbitrary ordering, so the hosted query semantics are reapplied here:
//! inactive rows are dropped, systems are ordered by `order_index` and conditions by `name`.
//! Names are compared case- and accent-insensitively (see [`sort_key`]), which approximates the
//! hosted database collation. Both sorts are stable.

use super::CatalogGateway;
use crate::constants::{CONDITIONS_SNAPSHOT_FILENAME, SYSTEMS_SNAPSHOT_FILENAME};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{RawCondition, RawSystem};
use crate::slug::sort_key;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct SnapshotGateway {
    dir: PathBuf,
}

impl SnapshotGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_rows<T: DeserializeOwned>(&self, filename: &str) -> CatalogResult<Vec<T>> {
        let path = self.dir.join(filename);
        let contents = fs::read_to_string(&path).map_err(|source| CatalogError::SnapshotRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| CatalogError::SnapshotParse { path, source })
    }
}

impl CatalogGateway for SnapshotGateway {
    fn fetch_systems(&self) -> CatalogResult<Vec<RawSystem>> {
        let mut rows: Vec<RawSystem> = self.read_rows(SYSTEMS_SNAPSHOT_FILENAME)?;
        rows.retain(|s| s.active);
        // Rows without an explicit position sort last.
        rows.sort_by_key(|s| s.order_index.unwrap_or(i64::MAX));
        Ok(rows)
    }

    fn fetch_conditions(&self) -> CatalogResult<Vec<RawCondition>> {
        let mut rows: Vec<RawCondition> = self.read_rows(CONDITIONS_SNAPSHOT_FILENAME)?;
        rows.retain(|c| c.active);
        rows.sort_by_cached_key(|c| sort_key(&c.name));
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn write_snapshot(dir: &Path) {
        let systems = serde_json::json!([
            { "slug": "digestivo", "name": "Digestivo", "icon": "🍽️", "color": "#f59e0b", "order_index": 2, "active": true },
            { "slug": "respiratorio", "name": "Respiratório", "icon": "🫁", "color": "#3b82f6", "order_index": 1, "active": true },
            { "slug": "antigo", "name": "Antigo", "icon": "", "color": "", "order_index": 0, "active": false }
        ]);
        let conditions = serde_json::json!([
            {
                "slug": "rinite", "name": "Rinite", "short_description": "Inflamação alérgica nasal",
                "definition": "Inflamação da mucosa nasal", "causes": ["Ácaros"], "active": true,
                "systems": { "slug": "respiratorio", "name": "Respiratório", "icon": "🫁" },
                "medications": [{ "name": "Loratadina", "concentration": "10 mg", "posology": "1x ao dia", "duration": "7 dias", "is_mip": true }]
            },
            {
                "slug": "asma", "name": "Asma", "short_description": "Crise de falta de ar",
                "definition": "Doença inflamatória crônica", "causes": null, "active": true,
                "systems": { "slug": "respiratorio", "name": "Respiratório", "icon": "🫁" },
                "medications": []
            },
            {
                "slug": "azia", "name": "Azia", "short_description": "Queimação retroesternal",
                "definition": "Sensação de queimação", "active": true,
                "systems": { "slug": "digestivo", "name": "Digestivo", "icon": "🍽️" },
                "medications": [{ "name": "Hidróxido de alumínio", "is_mip": true }]
            },
            {
                "slug": "retirada", "name": "Retirada", "short_description": "", "active": false,
                "systems": { "slug": "digestivo", "name": "Digestivo", "icon": "🍽️" },
                "medications": []
            }
        ]);

        fs::write(
            dir.join(SYSTEMS_SNAPSHOT_FILENAME),
            serde_json::to_string_pretty(&systems).expect("systems should serialize"),
        )
        .expect("should write systems snapshot");
        fs::write(
            dir.join(CONDITIONS_SNAPSHOT_FILENAME),
            serde_json::to_string_pretty(&conditions).expect("conditions should serialize"),
        )
        .expect("should write conditions snapshot");
    }

    #[test]
    fn test_systems_are_active_and_ordered() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_snapshot(temp_dir.path());

        let systems = SnapshotGateway::new(temp_dir.path())
            .fetch_systems()
            .expect("fetch_systems should succeed");

        let slugs: Vec<&str> = systems.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["respiratorio", "digestivo"]);
    }

    #[test]
    fn test_conditions_are_active_and_ordered_by_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_snapshot(temp_dir.path());

        let conditions = SnapshotGateway::new(temp_dir.path())
            .fetch_conditions()
            .expect("fetch_conditions should succeed");

        let slugs: Vec<&str> = conditions.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["asma", "azia", "rinite"]);
    }

    #[test]
    fn test_condition_order_ignores_case_and_accents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let owner = serde_json::json!({ "slug": "digestivo", "name": "Digestivo" });
        let conditions = serde_json::json!([
            { "slug": "zumbido", "name": "Zumbido", "systems": owner },
            { "slug": "ulcera", "name": "Úlcera", "systems": owner },
            { "slug": "azia", "name": "azia", "systems": owner },
            { "slug": "diarreia", "name": "Diarreia", "systems": owner }
        ]);
        fs::write(
            temp_dir.path().join(CONDITIONS_SNAPSHOT_FILENAME),
            conditions.to_string(),
        )
        .expect("should write conditions snapshot");

        let rows = SnapshotGateway::new(temp_dir.path())
            .fetch_conditions()
            .expect("fetch_conditions should succeed");

        let slugs: Vec<&str> = rows.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["azia", "diarreia", "ulcera", "zumbido"]);
    }

    #[test]
    fn test_missing_file_is_a_query_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let err = SnapshotGateway::new(temp_dir.path())
            .fetch_systems()
            .expect_err("fetch should fail without a snapshot");

        assert!(matches!(err, CatalogError::SnapshotRead { .. }));
        assert!(err.is_gateway_query());
    }

    #[test]
    fn test_malformed_file_is_a_query_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(CONDITIONS_SNAPSHOT_FILENAME), "[{\"slug\": 1}]")
            .expect("should write snapshot");

        let err = SnapshotGateway::new(temp_dir.path())
            .fetch_conditions()
            .expect_err("fetch should fail on malformed rows");

        assert!(matches!(err, CatalogError::SnapshotParse { .. }));
    }
}
