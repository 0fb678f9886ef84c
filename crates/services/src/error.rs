//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{LeaderboardError, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no resumable session found")]
    NoResumableSession,

    #[error("no active session")]
    NoActiveSession,

    #[error(transparent)]
    Session(#[from] SessionStateError),

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
