use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::{
    Leaderboard, LeaderboardEntry, LeaderboardError, SessionState, SessionStateError, Unlock,
};

/// Errors surfaced by storage adapters.
///
/// Missing or malformed documents are not errors: they read as absent,
/// per the recovery contract of the persisted-document store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

/// Persisted shape of an in-flight session: one JSON document per quiz.
///
/// Field names mirror the original progress document, so serialized
/// bodies read `{"currentIndex": …, "remainingTime": …, "quizId": …}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub quiz_id: String,
    pub current_index: usize,
    pub answers: Vec<Option<usize>>,
    pub score: u32,
    pub remaining_time: u32,
    pub player_name: String,
    pub unlocked: Vec<Unlock>,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_state(state: &SessionState, quiz_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            quiz_id: quiz_id.to_owned(),
            current_index: state.index(),
            answers: state.answers().to_vec(),
            score: state.score(),
            remaining_time: state.remaining_seconds(),
            player_name: state.player_name().to_owned(),
            unlocked: state.unlocked().to_vec(),
            completed: state.is_complete(),
            timestamp,
        }
    }

    /// Rebuild the domain session from this record.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` when the stored fields violate session
    /// invariants; callers treat such a record as absent.
    pub fn into_state(self) -> Result<SessionState, SessionStateError> {
        let question_count = self.answers.len();
        SessionState::from_persisted(
            self.player_name,
            question_count,
            self.current_index,
            self.score,
            self.remaining_time,
            self.answers,
            self.unlocked,
            self.completed,
        )
    }
}

/// Persisted shape of one leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryRecord {
    pub name: String,
    pub score: u32,
    pub total: u32,
    pub time_used: u32,
    pub date: DateTime<Utc>,
}

impl LeaderboardEntryRecord {
    #[must_use]
    pub fn from_entry(entry: &LeaderboardEntry) -> Self {
        Self {
            name: entry.name().to_owned(),
            score: entry.score(),
            total: entry.total(),
            time_used: entry.time_used_seconds(),
            date: entry.date(),
        }
    }

    /// Convert the record back into a domain entry.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` when the stored row is inconsistent.
    pub fn into_entry(self) -> Result<LeaderboardEntry, LeaderboardError> {
        LeaderboardEntry::new(self.name, self.score, self.total, self.time_used, self.date)
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for the persisted session progress document.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the progress document for a quiz.
    ///
    /// Missing and malformed documents both read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for infrastructure failures.
    async fn load_progress(&self, quiz_id: &str) -> Result<Option<ProgressRecord>, StorageError>;

    /// Write the progress document, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Delete the progress document. Deleting an absent document is fine.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for infrastructure failures.
    async fn delete_progress(&self, quiz_id: &str) -> Result<(), StorageError>;
}

/// Repository contract for the persisted leaderboard document.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Load the ranked entries for a quiz.
    ///
    /// Missing and malformed documents both read as an empty list;
    /// individual rows that fail validation are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for infrastructure failures.
    async fn load_leaderboard(&self, quiz_id: &str)
    -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Write the full board, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn save_leaderboard(
        &self,
        quiz_id: &str,
        board: &Leaderboard,
    ) -> Result<(), StorageError>;

    /// Delete the leaderboard document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for infrastructure failures.
    async fn clear_leaderboard(&self, quiz_id: &str) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<String, ProgressRecord>>>,
    boards: Arc<Mutex<HashMap<String, Vec<LeaderboardEntryRecord>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, quiz_id: &str) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(quiz_id).cloned())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.quiz_id.clone(), record.clone());
        Ok(())
    }

    async fn delete_progress(&self, quiz_id: &str) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(quiz_id);
        Ok(())
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn load_leaderboard(
        &self,
        quiz_id: &str,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let guard = self
            .boards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let records = guard.get(quiz_id).cloned().unwrap_or_default();
        Ok(records
            .into_iter()
            .filter_map(|record| record.into_entry().ok())
            .collect())
    }

    async fn save_leaderboard(
        &self,
        quiz_id: &str,
        board: &Leaderboard,
    ) -> Result<(), StorageError> {
        let records = board
            .entries()
            .iter()
            .map(LeaderboardEntryRecord::from_entry)
            .collect();
        let mut guard = self
            .boards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(quiz_id.to_owned(), records);
        Ok(())
    }

    async fn clear_leaderboard(&self, quiz_id: &str) -> Result<(), StorageError> {
        let mut guard = self
            .boards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(quiz_id);
        Ok(())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the document repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub leaderboards: Arc<dyn LeaderboardRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let leaderboards: Arc<dyn LeaderboardRepository> = Arc::new(repo);
        Self {
            progress,
            leaderboards,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
