use async_trait::async_trait;

use quiz_core::model::{Leaderboard, LeaderboardEntry};

use super::{SqliteRepository, documents};
use crate::repository::{LeaderboardEntryRecord, LeaderboardRepository, StorageError};

fn leaderboard_key(quiz_id: &str) -> String {
    format!("{quiz_id}.leaderboard")
}

#[async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn load_leaderboard(
        &self,
        quiz_id: &str,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let Some(body) = documents::get(self.pool(), &leaderboard_key(quiz_id)).await? else {
            return Ok(Vec::new());
        };

        let records: Vec<LeaderboardEntryRecord> = match serde_json::from_str(&body) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(quiz_id, %err, "discarding malformed leaderboard document");
                return Ok(Vec::new());
            }
        };

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            match record.into_entry() {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    tracing::warn!(quiz_id, %err, "skipping inconsistent leaderboard row");
                }
            }
        }
        Ok(entries)
    }

    async fn save_leaderboard(
        &self,
        quiz_id: &str,
        board: &Leaderboard,
    ) -> Result<(), StorageError> {
        let records: Vec<LeaderboardEntryRecord> = board
            .entries()
            .iter()
            .map(LeaderboardEntryRecord::from_entry)
            .collect();
        let body = serde_json::to_string(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        documents::put(self.pool(), &leaderboard_key(quiz_id), &body).await
    }

    async fn clear_leaderboard(&self, quiz_id: &str) -> Result<(), StorageError> {
        documents::delete(self.pool(), &leaderboard_key(quiz_id)).await
    }
}
