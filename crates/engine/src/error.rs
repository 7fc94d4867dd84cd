//! Engine error types.
//!
//! Blocked cells are not errors: bulk mutations account for them and report
//! through the status sink. `EngineError` covers the injected seams that can
//! genuinely fail (clipboard transport, snapshot replay); callers catch these
//! at the operation boundary and translate them into status messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The external clipboard transport rejected a read or write.
    #[error("clipboard transport: {0}")]
    Clipboard(String),

    /// A history snapshot could not be replayed against live state.
    #[error("snapshot replay: {0}")]
    Snapshot(String),
}
