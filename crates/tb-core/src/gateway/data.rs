//! Data gateway abstractions
//!
//! Records travel as loose JSON objects, the way a hosted relational store
//! hands them out. Typed models are converted at the edges with
//! [`to_record`] and [`from_record`].

use crate::error::{ForumError, Result};
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::mpsc::Receiver;

/// A row of a remote table
pub type Record = serde_json::Map<String, Value>;

/// Tables of the forum store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    Posts,
    Comments,
    PostVotes,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Posts, Table::Comments, Table::PostVotes];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Posts => "Posts",
            Table::Comments => "Comments",
            Table::PostVotes => "PostVotes",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality predicate on one field
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// A missing field matches a `null` value
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field).unwrap_or(&Value::Null) == &self.value
    }
}

/// Ordering applied to a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

/// A select against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
}

impl Query {
    /// Select every row of `table`
    pub fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Add an equality predicate
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(field, value));
        self
    }

    /// Order results by `field`
    pub fn order_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            ascending,
        });
        self
    }

    /// Check a record against every predicate
    pub fn matches(&self, record: &Record) -> bool {
        matches_all(&self.filters, record)
    }

    /// Stable-sort `records` by the query's ordering, if any
    pub fn sort(&self, records: &mut [Record]) {
        if let Some(order) = &self.order {
            records.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.field), b.get(&order.field));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
    }
}

/// Check a record against a set of predicates
pub fn matches_all(filters: &[Filter], record: &Record) -> bool {
    filters.iter().all(|f| f.matches(record))
}

// Nulls first; timestamps compared as instants; other strings lexicographically
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let is_null = |v: Option<&Value>| matches!(v, None | Some(Value::Null));
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => match (is_null(a), is_null(b)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        },
    }
}

/// Kind of a row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change delivered on a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub table: Table,
    /// Row after the change; absent for deletes
    pub new: Option<Record>,
    /// Row before the change; absent for inserts
    pub old: Option<Record>,
}

impl ChangeEvent {
    /// The most recent image of the row
    pub fn record(&self) -> Option<&Record> {
        self.new.as_ref().or(self.old.as_ref())
    }

    /// Whether `filter` matches either image of the row
    pub fn matches(&self, filter: &Filter) -> bool {
        self.new.as_ref().is_some_and(|r| filter.matches(r))
            || self.old.as_ref().is_some_and(|r| filter.matches(r))
    }
}

/// Identifier of a change subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Receiving end of a change feed
///
/// Events queue up until drained. Hand the subscription back to
/// [`DataGateway::unsubscribe`] to stop delivery.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    table: Table,
    receiver: Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, table: Table, receiver: Receiver<ChangeEvent>) -> Self {
        Self {
            id,
            table,
            receiver,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Next queued event, if any
    pub fn try_next(&self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Take every queued event
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Query/insert/update/delete access to remote tables, plus change feeds
pub trait DataGateway: Send + Sync {
    /// Rows matching the query
    fn select(&self, query: &Query) -> Result<Vec<Record>>;

    /// Insert one row; the store fills in `id`, `created_at` and table defaults
    fn insert(&self, table: Table, record: Record) -> Result<Record>;

    /// Merge `changes` into every matching row, returning the number changed
    fn update(&self, table: Table, filters: &[Filter], changes: Record) -> Result<usize>;

    /// Delete every matching row, returning the number removed
    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize>;

    /// Start receiving change events for `table`, optionally filtered
    fn subscribe(&self, table: Table, filter: Option<Filter>) -> Result<Subscription>;

    /// Stop delivery to a subscription
    fn unsubscribe(&self, subscription: Subscription) -> Result<()>;
}

/// Serialize a model into a record
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ForumError::Validation(format!(
            "Expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize a record into a model
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Deserialize a batch of records
pub fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>> {
    records.into_iter().map(from_record).collect()
}
