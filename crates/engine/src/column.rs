//! Column descriptors and value coercion.
//!
//! Columns decide what bulk mutations may touch: `editable` gates writes,
//! `bulk_ops` and the `Marker` kind exclude structural columns (row-selection
//! checkboxes and the like) from move/fill/paste/clear entirely, and
//! `selectable` feeds the navigable-column ordering used by cursor movement.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a column holds, and therefore what paste will accept for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Free-form text. Accepts any payload.
    Text,
    /// Numeric. Accepts payloads that parse as a finite number.
    Number,
    /// One of a fixed option list. Accepts members, matched case-insensitively
    /// and coerced to the canonical option spelling.
    Select(Vec<String>),
    /// Structural column with no data cell (selection checkbox, drag grip).
    /// Never read or written by bulk mutations.
    Marker,
}

/// A column of the grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Column {
    /// Stable field key rows are read/written by.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Current width in pixels.
    pub width: f32,
    /// Whether cell values may be written.
    pub editable: bool,
    /// Whether the cursor may land on this column.
    pub selectable: bool,
    /// Whether bulk mutations (move/fill/paste/clear/cut) may touch it.
    pub bulk_ops: bool,
    pub kind: ColumnKind,
}

impl Column {
    /// Narrowest a resize gesture may make a column.
    pub const MIN_WIDTH: f32 = 40.0;

    const DEFAULT_WIDTH: f32 = 120.0;

    pub fn text(key: &str, label: &str) -> Self {
        Self::with_kind(key, label, ColumnKind::Text)
    }

    pub fn number(key: &str, label: &str) -> Self {
        Self::with_kind(key, label, ColumnKind::Number)
    }

    pub fn select(key: &str, label: &str, options: Vec<String>) -> Self {
        Self::with_kind(key, label, ColumnKind::Select(options))
    }

    /// A structural column: not navigable, not editable, excluded from bulk
    /// mutation.
    pub fn marker(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: String::new(),
            width: Self::MIN_WIDTH,
            editable: false,
            selectable: false,
            bulk_ops: false,
            kind: ColumnKind::Marker,
        }
    }

    fn with_kind(key: &str, label: &str, kind: ColumnKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            width: Self::DEFAULT_WIDTH,
            editable: true,
            selectable: true,
            bulk_ops: true,
            kind,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// True when bulk mutations must skip this column.
    pub fn excluded_from_bulk(&self) -> bool {
        !self.bulk_ops || matches!(self.kind, ColumnKind::Marker)
    }

    /// Whether `raw` is a value this column would accept on paste.
    ///
    /// The empty string is always acceptable for writable kinds: pasting an
    /// empty cell clears the target.
    pub fn can_apply(&self, raw: &str) -> bool {
        if matches!(self.kind, ColumnKind::Marker) {
            return false;
        }
        if raw.is_empty() {
            return true;
        }
        match &self.kind {
            ColumnKind::Text => true,
            ColumnKind::Number => raw.trim().parse::<f64>().is_ok_and(|n| n.is_finite()),
            ColumnKind::Select(options) => {
                options.iter().any(|opt| opt.eq_ignore_ascii_case(raw))
            }
            ColumnKind::Marker => false,
        }
    }

    /// Coerce a raw clipboard string into the stored representation.
    ///
    /// Returns `None` when the value would not apply; callers must treat that
    /// as a blocked cell, not an error.
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        if !self.can_apply(raw) {
            return None;
        }
        if raw.is_empty() {
            return Some(Value::Null);
        }
        match &self.kind {
            ColumnKind::Text => Some(Value::String(raw.to_string())),
            ColumnKind::Number => {
                let trimmed = raw.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    Some(Value::Number(i.into()))
                } else {
                    let f = trimmed.parse::<f64>().ok()?;
                    serde_json::Number::from_f64(f).map(Value::Number)
                }
            }
            ColumnKind::Select(options) => options
                .iter()
                .find(|opt| opt.eq_ignore_ascii_case(raw))
                .map(|opt| Value::String(opt.clone())),
            ColumnKind::Marker => None,
        }
    }
}

/// Resolve the index of the column carrying `key`.
pub fn index_for_key(columns: &[Column], key: &str) -> Option<usize> {
    columns.iter().position(|c| c.key == key)
}

/// Resolve the field key of the column at `index`.
pub fn key_at_index(columns: &[Column], index: usize) -> Option<&str> {
    columns.get(index).map(|c| c.key.as_str())
}

/// Ordered list of column indexes the cursor may land on.
pub fn navigable_indexes(columns: &[Column]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.selectable)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_column() -> Column {
        Column::select(
            "status",
            "Status",
            vec!["Open".to_string(), "Closed".to_string()],
        )
    }

    #[test]
    fn test_text_accepts_anything() {
        let col = Column::text("name", "Name");
        assert!(col.can_apply("hello"));
        assert!(col.can_apply(""));
        assert_eq!(col.coerce("hello"), Some(json!("hello")));
        assert_eq!(col.coerce(""), Some(Value::Null));
    }

    #[test]
    fn test_number_rejects_non_numeric() {
        let col = Column::number("count", "Count");
        assert!(col.can_apply("42"));
        assert!(col.can_apply(" 3.5 "));
        assert!(!col.can_apply("forty-two"));
        assert!(!col.can_apply("NaN"));
        assert!(!col.can_apply("inf"));
        assert_eq!(col.coerce("42"), Some(json!(42)));
        assert_eq!(col.coerce("3.5"), Some(json!(3.5)));
        assert_eq!(col.coerce("x"), None);
    }

    #[test]
    fn test_select_canonicalizes_case() {
        let col = status_column();
        assert!(col.can_apply("open"));
        assert!(col.can_apply("CLOSED"));
        assert!(!col.can_apply("pending"));
        assert_eq!(col.coerce("open"), Some(json!("Open")));
        assert_eq!(col.coerce("pending"), None);
    }

    #[test]
    fn test_marker_never_applies() {
        let col = Column::marker("_sel");
        assert!(!col.can_apply("x"));
        assert!(!col.can_apply(""));
        assert_eq!(col.coerce("x"), None);
        assert!(col.excluded_from_bulk());
    }

    #[test]
    fn test_bulk_ops_flag_excludes() {
        let mut col = Column::text("id", "Id");
        assert!(!col.excluded_from_bulk());
        col.bulk_ops = false;
        assert!(col.excluded_from_bulk());
    }

    #[test]
    fn test_column_lookup_helpers() {
        let cols = vec![
            Column::marker("_sel"),
            Column::text("name", "Name"),
            Column::number("count", "Count"),
        ];
        assert_eq!(index_for_key(&cols, "count"), Some(2));
        assert_eq!(index_for_key(&cols, "missing"), None);
        assert_eq!(key_at_index(&cols, 1), Some("name"));
        assert_eq!(key_at_index(&cols, 9), None);
        assert_eq!(navigable_indexes(&cols), vec![1, 2]);
    }
}
