//! Undo/redo history over intent-tagged transactions.
//!
//! Each transaction carries deep-independent before/after snapshots of the
//! full grid state. The history only moves transactions between stacks;
//! replaying a snapshot against live state is the caller's job, so the stacks
//! stay correct even when an apply attempt fails downstream.

use serde::{Deserialize, Serialize};

/// Semantic name of the operation a transaction records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Move,
    Fill,
    Paste,
    Clear,
    Cut,
    Edit,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Move => "move",
            Intent::Fill => "fill",
            Intent::Paste => "paste",
            Intent::Clear => "clear",
            Intent::Cut => "cut",
            Intent::Edit => "edit",
        }
    }
}

/// One undoable unit of work.
///
/// `before` is captured prior to the mutation, `after` once it committed.
/// Undo replays `before`, redo replays `after`.
#[derive(Clone, Debug)]
pub struct Transaction<S> {
    pub id: u64,
    pub intent: Intent,
    pub label: String,
    pub before: S,
    pub after: S,
}

/// Direction for `run_history_action`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

pub struct History<S> {
    undo_stack: Vec<Transaction<S>>,
    redo_stack: Vec<Transaction<S>>,
    next_id: u64,
    max_entries: usize,
}

impl<S: Clone> History<S> {
    pub fn new() -> Self {
        Self::with_depth(100)
    }

    pub fn with_depth(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_id: 1,
            max_entries,
        }
    }

    /// Record a completed mutation and return its transaction id.
    ///
    /// Recording invalidates everything on the redo stack.
    pub fn record(&mut self, intent: Intent, label: impl Into<String>, before: S, after: S) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.undo_stack.push(Transaction {
            id,
            intent,
            label: label.into(),
            before,
            after,
        });
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
        id
    }

    /// Pop the most recent transaction for undo; its `before` snapshot is the
    /// state to replay.
    pub fn undo(&mut self) -> Option<Transaction<S>> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.clone());
        Some(entry)
    }

    /// Pop the most recently undone transaction for redo; its `after`
    /// snapshot is the state to replay.
    pub fn redo(&mut self) -> Option<Transaction<S>> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.clone());
        Some(entry)
    }

    /// Put an undone transaction back on the undo stack without touching
    /// redo. Used when replaying its snapshot failed and the stacks must
    /// return to their prior shape.
    pub fn rollback_undo(&mut self) {
        if let Some(entry) = self.redo_stack.pop() {
            self.undo_stack.push(entry);
        }
    }

    /// Counterpart of `rollback_undo` for a failed redo.
    pub fn rollback_redo(&mut self) {
        if let Some(entry) = self.undo_stack.pop() {
            self.redo_stack.push(entry);
        }
    }

    /// The transaction the next undo would replay, without popping it.
    pub fn peek_undo(&self) -> Option<&Transaction<S>> {
        self.undo_stack.last()
    }

    /// The transaction the next redo would replay, without popping it.
    pub fn peek_redo(&self) -> Option<&Transaction<S>> {
        self.redo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<S: Clone> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}
