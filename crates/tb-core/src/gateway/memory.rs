//! In-memory forum store
//!
//! Implements both gateways over plain tables behind a lock. Tests use it
//! directly; the file-system backend wraps it and persists its snapshot.

use super::auth::{AuthEvent, AuthGateway, AuthSession, AuthUser};
use super::data::{
    matches_all, ChangeEvent, ChangeKind, DataGateway, Filter, Query, Record, Subscription,
    SubscriptionId, Table,
};
use crate::config::AuthConfig;
use crate::error::{ForumError, Result};
use crate::types::{is_valid_email, AuthToken, UserId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    fn user(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Serializable contents of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    /// Rows per table, in insertion order
    pub tables: BTreeMap<Table, Vec<Record>>,
    /// Last id handed out per table
    pub last_ids: BTreeMap<Table, i64>,
    pub accounts: Vec<Account>,
    /// Session of the signed-in account
    pub session: Option<AuthSession>,
}

impl StoreState {
    pub fn rows(&self, table: Table) -> &[Record] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Record> {
        self.tables.entry(table).or_default()
    }

    fn next_id(&mut self, table: Table) -> i64 {
        let last = self.last_ids.entry(table).or_insert(0);
        *last += 1;
        *last
    }

    fn contains_id(&self, table: Table, id: &Value) -> bool {
        self.rows(table).iter().any(|row| row.get("id") == Some(id))
    }

    /// Remove and return every row of `table` matching `pred`
    fn take_where(&mut self, table: Table, pred: impl Fn(&Record) -> bool) -> Vec<Record> {
        let rows = self.rows_mut(table);
        let (taken, kept): (Vec<Record>, Vec<Record>) =
            std::mem::take(rows).into_iter().partition(|row| pred(row));
        *rows = kept;
        taken
    }

    fn find_account(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    // Snapshots written before `last_ids` existed still hand out fresh ids
    fn reconcile_ids(&mut self) {
        for (table, rows) in &self.tables {
            let max = rows
                .iter()
                .filter_map(|row| row.get("id").and_then(Value::as_i64))
                .max()
                .unwrap_or(0);
            let last = self.last_ids.entry(*table).or_insert(0);
            *last = (*last).max(max);
        }
    }
}

struct Feed {
    id: SubscriptionId,
    table: Table,
    filter: Option<Filter>,
    sender: Sender<ChangeEvent>,
}

impl Feed {
    fn wants(&self, event: &ChangeEvent) -> bool {
        self.table == event.table && self.filter.as_ref().map_or(true, |f| event.matches(f))
    }
}

/// Forum store held entirely in memory
pub struct MemoryBackend {
    state: RwLock<StoreState>,
    feeds: Mutex<Vec<Feed>>,
    auth_feeds: Mutex<Vec<Sender<AuthEvent>>>,
    next_subscription: AtomicU64,
    auth: AuthConfig,
}

impl MemoryBackend {
    /// Create an empty store
    pub fn new() -> Self {
        Self::from_snapshot(StoreState::default())
    }

    /// Create a store from previously captured state
    pub fn from_snapshot(mut state: StoreState) -> Self {
        state.reconcile_ids();
        Self {
            state: RwLock::new(state),
            feeds: Mutex::new(Vec::new()),
            auth_feeds: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            auth: AuthConfig::default(),
        }
    }

    /// Use the given password policy and bcrypt cost
    pub fn with_auth_config(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Copy of the full store contents
    pub fn snapshot(&self) -> Result<StoreState> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| ForumError::Remote("Store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| ForumError::Remote("Store lock poisoned".to_string()))
    }

    /// Deliver events to matching feeds, dropping feeds whose receiver is gone
    fn publish(&self, events: Vec<ChangeEvent>) {
        if events.is_empty() {
            return;
        }
        let mut feeds = lock(&self.feeds);
        for event in events {
            feeds.retain(|feed| {
                if !feed.wants(&event) {
                    return true;
                }
                let delivered = feed.sender.send(event.clone()).is_ok();
                if !delivered {
                    debug!(subscription = feed.id.0, "pruning closed change feed");
                }
                delivered
            });
        }
    }

    fn broadcast_auth(&self, event: AuthEvent) {
        lock(&self.auth_feeds).retain(|sender| sender.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    fn feed_count(&self) -> usize {
        lock(&self.feeds).len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn apply_defaults(table: Table, record: &mut Record) {
    let defaults: Vec<(&str, Value)> = match table {
        Table::Posts => vec![("upvotes", Value::from(0)), ("downvotes", Value::from(0))],
        Table::Comments => vec![("parent_id", Value::Null)],
        Table::PostVotes => Vec::new(),
    };
    for (field, value) in defaults {
        record.entry(field.to_string()).or_insert(value);
    }
}

fn require_reference(state: &StoreState, record: &Record, field: &str, target: Table) -> Result<()> {
    match record.get(field) {
        Some(id) if state.contains_id(target, id) => Ok(()),
        _ => Err(ForumError::Remote(format!(
            "{} does not reference an existing row of {}",
            field, target
        ))),
    }
}

/// Reference and uniqueness checks; `own_id` names the row being replaced, if any
fn check_constraints(
    state: &StoreState,
    table: Table,
    record: &Record,
    own_id: Option<&Value>,
) -> Result<()> {
    match table {
        Table::Posts => Ok(()),
        Table::Comments => {
            require_reference(state, record, "post_id", Table::Posts)?;
            match record.get("parent_id") {
                None | Some(Value::Null) => Ok(()),
                Some(_) => require_reference(state, record, "parent_id", Table::Comments),
            }
        }
        Table::PostVotes => {
            require_reference(state, record, "post_id", Table::Posts)?;
            let duplicate = state.rows(Table::PostVotes).iter().any(|row| {
                (own_id.is_none() || row.get("id") != own_id)
                    && row.get("post_id") == record.get("post_id")
                    && row.get("user_email") == record.get("user_email")
            });
            if duplicate {
                return Err(ForumError::Remote(
                    "duplicate key value violates unique constraint (post_id, user_email)"
                        .to_string(),
                ));
            }
            Ok(())
        }
    }
}

impl DataGateway for MemoryBackend {
    fn select(&self, query: &Query) -> Result<Vec<Record>> {
        let state = self.read()?;
        let mut rows: Vec<Record> = state
            .rows(query.table)
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        query.sort(&mut rows);
        Ok(rows)
    }

    fn insert(&self, table: Table, mut record: Record) -> Result<Record> {
        let inserted = {
            let mut state = self.write()?;
            check_constraints(&state, table, &record, None)?;
            let id = state.next_id(table);
            record.insert("id".to_string(), Value::from(id));
            if record.get("created_at").map_or(true, Value::is_null) {
                record.insert("created_at".to_string(), Value::String(now_timestamp()));
            }
            apply_defaults(table, &mut record);
            state.rows_mut(table).push(record.clone());
            record
        };
        debug!(table = %table, id = ?inserted.get("id"), "inserted row");
        self.publish(vec![ChangeEvent {
            kind: ChangeKind::Insert,
            table,
            new: Some(inserted.clone()),
            old: None,
        }]);
        Ok(inserted)
    }

    fn update(&self, table: Table, filters: &[Filter], mut changes: Record) -> Result<usize> {
        changes.remove("id");
        let events: Vec<ChangeEvent> = {
            let mut state = self.write()?;
            let mut merged_rows = Vec::new();
            for (i, row) in state.rows(table).iter().enumerate() {
                if !matches_all(filters, row) {
                    continue;
                }
                let mut merged = row.clone();
                for (field, value) in &changes {
                    merged.insert(field.clone(), value.clone());
                }
                check_constraints(&state, table, &merged, row.get("id"))?;
                merged_rows.push((i, merged));
            }

            let rows = state.rows_mut(table);
            merged_rows
                .into_iter()
                .map(|(i, merged)| {
                    let old = std::mem::replace(&mut rows[i], merged.clone());
                    ChangeEvent {
                        kind: ChangeKind::Update,
                        table,
                        new: Some(merged),
                        old: Some(old),
                    }
                })
                .collect()
        };
        let count = events.len();
        debug!(table = %table, count, "updated rows");
        self.publish(events);
        Ok(count)
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize> {
        let (count, removed) = {
            let mut state = self.write()?;
            let mut removed: Vec<(Table, Record)> = state
                .take_where(table, |row| matches_all(filters, row))
                .into_iter()
                .map(|row| (table, row))
                .collect();
            let count = removed.len();

            // Dependents are appended as they are found, so the loop also
            // reaches replies of replies.
            let mut i = 0;
            while i < removed.len() {
                let parent_table = removed[i].0;
                let id = removed[i].1.get("id").cloned().unwrap_or(Value::Null);
                i += 1;
                if id.is_null() {
                    continue;
                }
                match parent_table {
                    Table::Posts => {
                        for dependent in [Table::Comments, Table::PostVotes] {
                            let rows =
                                state.take_where(dependent, |row| row.get("post_id") == Some(&id));
                            removed.extend(rows.into_iter().map(|row| (dependent, row)));
                        }
                    }
                    Table::Comments => {
                        let rows = state
                            .take_where(Table::Comments, |row| row.get("parent_id") == Some(&id));
                        removed.extend(rows.into_iter().map(|row| (Table::Comments, row)));
                    }
                    Table::PostVotes => {}
                }
            }
            (count, removed)
        };
        if removed.len() > count {
            info!(
                table = %table,
                cascaded = removed.len() - count,
                "cascading delete removed dependent rows"
            );
        }
        debug!(table = %table, count, "deleted rows");
        self.publish(
            removed
                .into_iter()
                .map(|(table, old)| ChangeEvent {
                    kind: ChangeKind::Delete,
                    table,
                    new: None,
                    old: Some(old),
                })
                .collect(),
        );
        Ok(count)
    }

    fn subscribe(&self, table: Table, filter: Option<Filter>) -> Result<Subscription> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel();
        lock(&self.feeds).push(Feed {
            id,
            table,
            filter,
            sender,
        });
        debug!(subscription = id.0, table = %table, "subscribed to changes");
        Ok(Subscription::new(id, table, receiver))
    }

    fn unsubscribe(&self, subscription: Subscription) -> Result<()> {
        let id = subscription.id();
        lock(&self.feeds).retain(|feed| feed.id != id);
        debug!(subscription = id.0, "unsubscribed");
        Ok(())
    }
}

fn invalid_credentials() -> ForumError {
    ForumError::Remote("Invalid login credentials".to_string())
}

fn already_registered() -> ForumError {
    ForumError::Remote("User already registered".to_string())
}

impl AuthGateway for MemoryBackend {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(ForumError::Remote(
                "Unable to validate email address: invalid format".to_string(),
            ));
        }
        if password.chars().count() < self.auth.min_password_length {
            return Err(ForumError::Remote(format!(
                "Password should be at least {} characters",
                self.auth.min_password_length
            )));
        }
        if self.read()?.find_account(email).is_some() {
            return Err(already_registered());
        }

        // Hash outside the lock; bcrypt is slow on purpose
        let password_hash = bcrypt::hash(password, self.auth.bcrypt_cost)
            .map_err(|e| ForumError::Remote(format!("Failed to hash password: {}", e)))?;
        let account = Account {
            id: UserId::new(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        let user = account.user();

        let mut state = self.write()?;
        if state.find_account(email).is_some() {
            return Err(already_registered());
        }
        state.accounts.push(account);
        info!(user = %user.id, "registered account");
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let account = self
            .read()?
            .find_account(email.trim())
            .cloned()
            .ok_or_else(invalid_credentials)?;
        let verified = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| ForumError::Remote(format!("Failed to verify password: {}", e)))?;
        if !verified {
            return Err(invalid_credentials());
        }

        let session = AuthSession {
            token: AuthToken::generate(),
            user: account.user(),
            created_at: Utc::now(),
        };
        self.write()?.session = Some(session.clone());
        info!(user = %session.user.id, "signed in");
        self.broadcast_auth(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    fn sign_out(&self) -> Result<()> {
        if let Some(previous) = self.write()?.session.take() {
            info!(user = %previous.user.id, "signed out");
        }
        self.broadcast_auth(AuthEvent::SignedOut);
        Ok(())
    }

    fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.read()?.session.clone())
    }

    fn subscribe(&self) -> Receiver<AuthEvent> {
        let (sender, receiver) = mpsc::channel();
        lock(&self.auth_feeds).push(sender);
        receiver
    }
}
