//! Engine error type.

use thiserror::Error;

use multichat_layout::LayoutError;

/// Errors surfaced by engine operations. Most failures in the engine
/// are swallowed as best-effort; these are the ones a caller can act
/// on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no active companion session")]
    NoActiveSession,

    #[error("no tab is currently watched")]
    NoWatchedTab,

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
