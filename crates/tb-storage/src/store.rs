//! File system backed forum store

use crate::schema::{StoreFile, StoreMigrator, CURRENT_SCHEMA_VERSION};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tb_core::config::AuthConfig;
use tb_core::error::{ForumError, Result};
use tb_core::gateway::{
    AuthEvent, AuthGateway, AuthSession, AuthUser, DataGateway, Filter, MemoryBackend, Query,
    Record, StoreState, Subscription, Table,
};
use tracing::{debug, info};

const STORE_FILE: &str = "store.json";

/// Forum store persisted as a single JSON snapshot
///
/// Reads are served from memory. Every successful mutation rewrites the
/// snapshot; a failed write is reported to the caller even though the
/// in-memory change has already been made.
pub struct FileSystemBackend {
    inner: MemoryBackend,
    base_dir: PathBuf,
    store_path: PathBuf,
    save_lock: Mutex<()>,
}

impl FileSystemBackend {
    /// Open (or create) the store under `base_dir`
    pub fn open(base_dir: impl Into<PathBuf>, auth: AuthConfig) -> Result<Self> {
        let base_dir = base_dir.into();
        let store_path = base_dir.join(STORE_FILE);

        fs::create_dir_all(&base_dir).map_err(|e| {
            ForumError::Io(e).with_context(format!(
                "Failed to create data directory {}",
                base_dir.display()
            ))
        })?;

        let state = if store_path.exists() {
            Self::read_state(&store_path)?
        } else {
            debug!("No store at {:?}, starting empty", store_path);
            StoreState::default()
        };

        Ok(Self {
            inner: MemoryBackend::from_snapshot(state).with_auth_config(auth),
            base_dir,
            store_path,
            save_lock: Mutex::new(()),
        })
    }

    /// Open the store in the platform data directory
    pub fn default_location(auth: AuthConfig) -> Result<Self> {
        Self::open(Self::default_dir(), auth)
    }

    /// Platform data directory, falling back to `~/.threadboard`
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("org", "threadboard", "threadboard")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".threadboard")
            })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn read_state(path: &Path) -> Result<StoreState> {
        let file = fs::File::open(path).map_err(|e| {
            ForumError::Io(e).with_context(format!("Failed to open {}", path.display()))
        })?;
        let store_file: StoreFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ForumError::Serde(e).with_context(format!("Corrupt store file {}", path.display())))?;

        let store_file = if StoreMigrator::needs_migration(&store_file) {
            info!(
                "Migrating store from version {} to {}",
                store_file.schema_version, CURRENT_SCHEMA_VERSION
            );
            StoreMigrator::migrate(store_file)?
        } else {
            store_file
        };
        debug!("Loaded store from {:?}", path);
        Ok(store_file.into_state())
    }

    fn temp_path(&self) -> PathBuf {
        self.base_dir.join(format!(".{}.tmp", STORE_FILE))
    }

    /// Write the current snapshot atomically (temp file, then rename)
    fn persist(&self) -> Result<()> {
        let _guard: MutexGuard<'_, ()> = self
            .save_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let file = StoreFile::new(self.inner.snapshot()?);
        let temp_path = self.temp_path();

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            ForumError::Io(e).with_context("Failed to create temp file")
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, &file)?;
        writer.flush()?;

        fs::rename(&temp_path, &self.store_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ForumError::Io(e).with_context("Failed to replace store file")
        })?;

        debug!("Saved store to {:?}", self.store_path);
        Ok(())
    }

    /// Copy of the full store contents
    pub fn snapshot(&self) -> Result<StoreState> {
        self.inner.snapshot()
    }
}

impl DataGateway for FileSystemBackend {
    fn select(&self, query: &Query) -> Result<Vec<Record>> {
        self.inner.select(query)
    }

    fn insert(&self, table: Table, record: Record) -> Result<Record> {
        let inserted = self.inner.insert(table, record)?;
        self.persist()?;
        Ok(inserted)
    }

    fn update(&self, table: Table, filters: &[Filter], changes: Record) -> Result<usize> {
        let count = self.inner.update(table, filters, changes)?;
        if count > 0 {
            self.persist()?;
        }
        Ok(count)
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize> {
        let count = self.inner.delete(table, filters)?;
        if count > 0 {
            self.persist()?;
        }
        Ok(count)
    }

    fn subscribe(&self, table: Table, filter: Option<Filter>) -> Result<Subscription> {
        DataGateway::subscribe(&self.inner, table, filter)
    }

    fn unsubscribe(&self, subscription: Subscription) -> Result<()> {
        self.inner.unsubscribe(subscription)
    }
}

impl AuthGateway for FileSystemBackend {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = self.inner.sign_up(email, password)?;
        self.persist()?;
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.inner.sign_in(email, password)?;
        self.persist()?;
        Ok(session)
    }

    fn sign_out(&self) -> Result<()> {
        self.inner.sign_out()?;
        self.persist()
    }

    fn current_session(&self) -> Result<Option<AuthSession>> {
        self.inner.current_session()
    }

    fn subscribe(&self) -> std::sync::mpsc::Receiver<AuthEvent> {
        AuthGateway::subscribe(&self.inner)
    }
}
