//! Shared state for commands that touch the forum

use super::GlobalArgs;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tb_core::config::Config;
use tb_core::gateway::{AuthGateway, DataGateway};
use tb_core::session::SessionContext;
use tb_core::view::Confirmation;
use tb_core::ForumError;
use tb_storage::FileSystemBackend;
use tracing::debug;

/// Loaded configuration, opened store and current session
pub struct AppContext {
    pub config: Config,
    backend: Arc<FileSystemBackend>,
    session: SessionContext,
}

impl AppContext {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config_path = global.config_path();
        let config = Config::load_or_default(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        config.validate()?;

        let data_dir = data_dir(global, &config);
        debug!("Using data directory {:?}", data_dir);
        let backend = Arc::new(
            FileSystemBackend::open(&data_dir, config.auth.clone())
                .with_context(|| format!("Failed to open store in {}", data_dir.display()))?,
        );
        let session = SessionContext::attach(backend.as_ref())?;

        Ok(Self {
            config,
            backend,
            session,
        })
    }

    pub fn data(&self) -> Arc<dyn DataGateway> {
        self.backend.clone()
    }

    pub fn auth(&self) -> Arc<dyn AuthGateway> {
        self.backend.clone()
    }

    pub fn session(&self) -> SessionContext {
        self.session.clone()
    }
}

/// `--data-dir`, then `[storage] data_dir`, then the platform default
pub fn data_dir(global: &GlobalArgs, config: &Config) -> PathBuf {
    global
        .data_dir
        .clone()
        .or_else(|| config.storage.data_dir.clone())
        .unwrap_or_else(FileSystemBackend::default_dir)
}

/// Turn a view error into the message its banner shows
pub fn fail(err: ForumError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

/// Ask before a destructive action unless `--yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<Confirmation> {
    if yes {
        return Ok(Confirmation::Confirmed);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(Confirmation::from(confirmed))
}
