//! Copy-on-write row staging.
//!
//! Every bulk mutation runs against a `RowStaging` built over the committed
//! row collection: the first write to a row clones it, later reads and writes
//! for that identity hit the clone, and `commit` produces the new collection
//! in the original order. Rows never touched pass through unchanged, and a
//! mutation that applies nothing simply drops the staging without committing.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::row::{value_is_empty, GridRow};

/// Outcome of clearing one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The field held a value and is now empty.
    Cleared,
    /// The field was already empty; nothing changed.
    Noop,
    /// No row with that identity exists.
    MissingRow,
}

/// Staging layer over a borrowed row collection.
///
/// Invariant: a row is cloned at most once per mutation, on its first write.
pub struct RowStaging<'a, R: GridRow> {
    source: &'a [R],
    index_by_id: FxHashMap<String, usize>,
    staged: FxHashMap<String, R>,
}

impl<'a, R: GridRow> RowStaging<'a, R> {
    pub fn new(source: &'a [R]) -> Self {
        let index_by_id = source
            .iter()
            .enumerate()
            .map(|(i, row)| (row.id().to_string(), i))
            .collect();
        Self {
            source,
            index_by_id,
            staged: FxHashMap::default(),
        }
    }

    pub fn has_row(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    /// Read a field, preferring the staged clone when one exists.
    ///
    /// Returns `None` when no row with that identity exists.
    pub fn read(&self, id: &str, key: &str) -> Option<Value> {
        if let Some(row) = self.staged.get(id) {
            return Some(row.field(key));
        }
        let index = *self.index_by_id.get(id)?;
        Some(self.source[index].field(key))
    }

    /// Write a field, cloning the row on its first write.
    ///
    /// Returns `false` when no row with that identity exists.
    pub fn write(&mut self, id: &str, key: &str, value: Value) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        let row = self
            .staged
            .entry(id.to_string())
            .or_insert_with(|| self.source[index].clone());
        row.set_field(key, value);
        true
    }

    /// Clear a field, reporting whether anything actually changed.
    ///
    /// An already-empty field is a `Noop` and does not clone the row.
    pub fn clear(&mut self, id: &str, key: &str) -> ClearOutcome {
        match self.read(id, key) {
            None => ClearOutcome::MissingRow,
            Some(current) if value_is_empty(&current) => ClearOutcome::Noop,
            Some(_) => {
                self.write(id, key, Value::Null);
                ClearOutcome::Cleared
            }
        }
    }

    /// Number of rows cloned so far.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Produce the post-mutation collection: the source order, with staged
    /// clones substituted where they exist.
    pub fn commit(self) -> Vec<R> {
        let mut staged = self.staged;
        self.source
            .iter()
            .map(|row| staged.remove(row.id()).unwrap_or_else(|| row.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::MapRow;
    use serde_json::json;

    fn rows() -> Vec<MapRow> {
        vec![
            MapRow::new("a").with_field("owner", json!("alice")),
            MapRow::new("b").with_field("owner", json!("bob")),
            MapRow::new("c"),
        ]
    }

    #[test]
    fn test_read_prefers_staged_clone() {
        let rows = rows();
        let mut staging = RowStaging::new(&rows);
        assert_eq!(staging.read("a", "owner"), Some(json!("alice")));
        staging.write("a", "owner", json!("amy"));
        assert_eq!(staging.read("a", "owner"), Some(json!("amy")));
        // The source collection is untouched until commit.
        assert_eq!(rows[0].field("owner"), json!("alice"));
    }

    #[test]
    fn test_row_cloned_once_across_writes() {
        let rows = rows();
        let mut staging = RowStaging::new(&rows);
        staging.write("a", "owner", json!("amy"));
        staging.write("a", "note", json!("moved"));
        assert_eq!(staging.staged_count(), 1);
        let committed = staging.commit();
        assert_eq!(committed[0].field("owner"), json!("amy"));
        assert_eq!(committed[0].field("note"), json!("moved"));
    }

    #[test]
    fn test_missing_row_is_reported() {
        let rows = rows();
        let mut staging = RowStaging::new(&rows);
        assert_eq!(staging.read("zz", "owner"), None);
        assert!(!staging.write("zz", "owner", json!("x")));
        assert_eq!(staging.clear("zz", "owner"), ClearOutcome::MissingRow);
        assert!(!staging.is_dirty());
    }

    #[test]
    fn test_clear_reports_noop_without_cloning() {
        let rows = rows();
        let mut staging = RowStaging::new(&rows);
        assert_eq!(staging.clear("c", "owner"), ClearOutcome::Noop);
        assert_eq!(staging.staged_count(), 0);
        assert_eq!(staging.clear("b", "owner"), ClearOutcome::Cleared);
        assert_eq!(staging.read("b", "owner"), Some(json!(null)));
        assert_eq!(staging.staged_count(), 1);
    }

    #[test]
    fn test_commit_preserves_order() {
        let rows = rows();
        let mut staging = RowStaging::new(&rows);
        staging.write("b", "owner", json!("beth"));
        let committed = staging.commit();
        let ids: Vec<&str> = committed.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(committed[1].field("owner"), json!("beth"));
        assert_eq!(committed[0].field("owner"), json!("alice"));
    }
}
