//! Project file export/import with versioning and migration.
//!
//! Uses JSON with a schema version field for forward-compatible persistence.

use harmonic_core::{HarmonicError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::project::Project;
use crate::store::ProjectStore;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned project file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Schema version for migration.
    pub version: u32,
    /// The exported projects.
    pub projects: Vec<Project>,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl ProjectFile {
    /// Create a new project file from a list of projects.
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            version: CURRENT_VERSION,
            projects,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Export every project in a store.
    pub fn from_store(store: &ProjectStore) -> Self {
        Self::new(store.list().to_vec())
    }

    /// Validate every project and load them into a fresh store.
    pub fn into_store(self) -> Result<ProjectStore> {
        let mut store = ProjectStore::new();
        for project in self.projects {
            store.insert(project)?;
        }
        Ok(store)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            HarmonicError::Serialization(format!("Failed to serialize projects: {}", e))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| HarmonicError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

        if version > CURRENT_VERSION {
            return Err(HarmonicError::Serialization(format!(
                "Project file version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;

        serde_json::from_value(migrated)
            .map_err(|e| HarmonicError::Serialization(format!("Failed to parse projects: {}", e)))
    }

    /// Save to a file path.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        debug!(path = %path.display(), projects = self.projects.len(), "Project file written");
        Ok(())
    }

    /// Load from a file path.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 was a bare array of projects, or a single project object.
                let projects = match data {
                    serde_json::Value::Array(_) => data,
                    serde_json::Value::Object(_) => serde_json::Value::Array(vec![data]),
                    other => {
                        return Err(HarmonicError::Serialization(format!(
                            "Unrecognized v0 project file: expected array or object, got {}",
                            other
                        )))
                    }
                };
                data = serde_json::json!({
                    "version": 1,
                    "projects": projects,
                    "app_version": "0.0.0",
                });
                version = 1;
            }
            _ => {
                return Err(HarmonicError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}
