// Error types shared across the page.
// Most mirror failures are silent no-ops; these cover the cases a caller can act on.

use thiserror::Error;

use crate::state::TabId;

/// Errors raised when a discard request cannot be issued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscardError {
    /// A discard is still waiting for its result; only one may be in flight.
    #[error("discard of tab {pending} still in flight, refusing to discard tab {requested}")]
    AlreadyPending { pending: TabId, requested: TabId },
    /// The browser has no discard support.
    #[error("tab discarding is not supported by this browser")]
    Unsupported,
}

/// Reasons a drop does not produce a move request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DropError {
    #[error("drop received without a drag in progress")]
    NotDragging,
    /// The element under the pointer carries no usable tab index.
    #[error("no tab index under the drop point")]
    UnparseableIndex,
    #[error("no window found under the drop point")]
    NoTargetWindow,
}

/// Errors from reading or writing the settings record.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings record is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// Errors from loading a replay scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scenario refers to unknown tab {0}")]
    UnknownTab(TabId),
}
