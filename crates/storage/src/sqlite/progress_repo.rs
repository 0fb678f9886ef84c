use async_trait::async_trait;

use super::{SqliteRepository, documents};
use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

fn progress_key(quiz_id: &str) -> String {
    format!("{quiz_id}.progress")
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self, quiz_id: &str) -> Result<Option<ProgressRecord>, StorageError> {
        let Some(body) = documents::get(self.pool(), &progress_key(quiz_id)).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&body) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(quiz_id, %err, "discarding malformed progress document");
                Ok(None)
            }
        }
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let body = serde_json::to_string(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        documents::put(self.pool(), &progress_key(&record.quiz_id), &body).await
    }

    async fn delete_progress(&self, quiz_id: &str) -> Result<(), StorageError> {
        documents::delete(self.pool(), &progress_key(quiz_id)).await
    }
}
