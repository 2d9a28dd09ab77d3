//! Configuration management for threadboard

use crate::comment::SortOrder;
use crate::error::{ForumError, Result};
use crate::post::PostSort;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings
    pub storage: StorageConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Post settings
    pub posts: PostsConfig,
    /// Comment settings
    pub comments: CommentsConfig,
    /// UI settings
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ForumError::Io(e).with_context(format!("Failed to read {}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| ForumError::Toml(e.to_string()))
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Write configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ForumError::Toml(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.auth.min_password_length == 0 {
            return Err(ForumError::Config(
                "auth.min_password_length must be at least 1".to_string(),
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ForumError::Config(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if self.comments.max_length == 0 || self.posts.max_title_length == 0 {
            return Err(ForumError::Config(
                "maximum lengths must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the data directory
    pub data_dir: Option<PathBuf>,
}

/// Authentication-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Minimum accepted password length
    pub min_password_length: usize,
    /// bcrypt work factor for stored password hashes
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            bcrypt_cost: 10,
        }
    }
}

/// Post-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    /// Sort applied by `post list` when none is given
    pub default_sort: PostSort,
    /// Maximum title length
    pub max_title_length: usize,
    /// Maximum description length
    pub max_description_length: usize,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            default_sort: PostSort::CreatedAtDesc,
            max_title_length: 300,
            max_description_length: 40_000,
        }
    }
}

/// Comment-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// Order of top-level comments
    pub default_order: SortOrder,
    /// Maximum comment content length
    pub max_length: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            default_order: SortOrder::NewestFirst,
            max_length: 10_000,
        }
    }
}

/// UI-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// chrono format string for timestamps
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: "%b %e, %Y %H:%M".to_string(),
        }
    }
}
