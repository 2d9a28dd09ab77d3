//! Store file format and schema migration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tb_core::error::{ForumError, Result};
use tb_core::gateway::{StoreState, Table};
use tb_core::types::SchemaVersion;
use tracing::debug;

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: SchemaVersion = SchemaVersion { major: 1, minor: 1 };

/// On-disk wrapper around the store contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFile {
    /// "major.minor"
    pub schema_version: String,
    pub saved_at: DateTime<Utc>,
    pub state: StoreState,
    /// Unknown top-level fields, kept for forward compatibility
    #[serde(flatten, default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl StoreFile {
    /// Wrap `state` with the current schema version
    pub fn new(state: StoreState) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            state,
            extra: HashMap::new(),
        }
    }

    pub fn version(&self) -> Option<SchemaVersion> {
        SchemaVersion::parse(&self.schema_version)
    }

    pub fn into_state(self) -> StoreState {
        self.state
    }
}

/// Brings older store files up to the current schema
pub struct StoreMigrator;

impl StoreMigrator {
    /// Check if a file was written with a different schema version
    pub fn needs_migration(file: &StoreFile) -> bool {
        file.version().as_ref() != Some(&CURRENT_SCHEMA_VERSION)
    }

    /// Migrate a store file to the current schema version
    pub fn migrate(mut file: StoreFile) -> Result<StoreFile> {
        let version = file.version().ok_or_else(|| {
            ForumError::UnsupportedSchemaVersion(format!(
                "'{}' is not a valid version",
                file.schema_version
            ))
        })?;
        if !version.is_compatible(&CURRENT_SCHEMA_VERSION) {
            return Err(ForumError::UnsupportedSchemaVersion(format!(
                "{} (expected {}.x)",
                version, CURRENT_SCHEMA_VERSION.major
            )));
        }

        if version.minor < 1 {
            file = migrate_1_0_to_1_1(file);
        }
        // Files from a newer 1.x keep their version string; unknown columns
        // survive in the loose row maps.
        Ok(file)
    }
}

/// 1.0 posts predate the downvote counter
fn migrate_1_0_to_1_1(mut file: StoreFile) -> StoreFile {
    let mut patched = 0;
    if let Some(posts) = file.state.tables.get_mut(&Table::Posts) {
        for post in posts.iter_mut() {
            if !post.contains_key("downvotes") {
                post.insert("downvotes".to_string(), serde_json::Value::from(0));
                patched += 1;
            }
        }
    }
    debug!(patched, "added downvote counters to posts");
    file.schema_version = "1.1".to_string();
    file
}
