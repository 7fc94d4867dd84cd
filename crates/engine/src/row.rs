//! Row access trait and the map-backed row used in tests and small grids.
//!
//! Rows are externally owned; the engine only ever reads and writes named
//! fields through this trait and clones a row before its first write. A row's
//! `id` must stay stable for its whole lifetime: staging, selection snapshots
//! and history all key on it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability interface over one externally-owned row.
pub trait GridRow: Clone {
    /// Stable string identity.
    fn id(&self) -> &str;

    /// Raw stored value for a column key. `Value::Null` when the field is
    /// absent.
    fn field(&self, key: &str) -> Value;

    /// Write a field. `Value::Null` clears it.
    fn set_field(&mut self, key: &str, value: Value);

    /// Human-readable rendering of a field, used when serializing cells to
    /// clipboard text and when repeating values during fill.
    fn display_field(&self, key: &str) -> String {
        display_value(&self.field(key))
    }
}

/// Render a stored value the way the grid shows it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// True when a stored value counts as empty for clear/move bookkeeping.
pub fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A row backed by an ordered field map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRow {
    id: String,
    fields: BTreeMap<String, Value>,
}

impl MapRow {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

impl GridRow for MapRow {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Value {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }

    fn set_field(&mut self, key: &str, value: Value) {
        if value.is_null() {
            self.fields.remove(key);
        } else {
            self.fields.insert(key.to_string(), value);
        }
    }
}
