use std::sync::Arc;

use quiz_core::model::LeaderboardEntry;
use storage::repository::LeaderboardRepository;

use crate::error::QuizError;

/// Presentation-facing leaderboard facade that hides the repository.
///
/// Ranked writes happen in the session workflow at completion; this
/// service covers the read and clear surface.
#[derive(Clone)]
pub struct LeaderboardService {
    quiz_id: String,
    boards: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(quiz_id: impl Into<String>, boards: Arc<dyn LeaderboardRepository>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            boards,
        }
    }

    /// The persisted ranked sequence, empty if none exists.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` on repository failures.
    pub async fn list(&self) -> Result<Vec<LeaderboardEntry>, QuizError> {
        Ok(self.boards.load_leaderboard(&self.quiz_id).await?)
    }

    /// Delete the persisted leaderboard document.
    ///
    /// Confirmation is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` on repository failures.
    pub async fn clear(&self) -> Result<(), QuizError> {
        self.boards.clear_leaderboard(&self.quiz_id).await?;
        tracing::info!(quiz = %self.quiz_id, "leaderboard cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Leaderboard;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn list_is_empty_without_a_document() {
        let service = LeaderboardService::new(
            "eco-quiz-challenge",
            Arc::new(InMemoryRepository::new()),
        );
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_the_ranked_entries_and_clear_empties() {
        let repo = InMemoryRepository::new();
        let mut board = Leaderboard::new();
        board.submit(LeaderboardEntry::new("Ava", 9, 12, 42, fixed_now()).unwrap());
        board.submit(LeaderboardEntry::new("Ben", 11, 12, 60, fixed_now()).unwrap());
        repo.save_leaderboard("eco-quiz-challenge", &board)
            .await
            .unwrap();

        let service = LeaderboardService::new("eco-quiz-challenge", Arc::new(repo));
        let entries = service.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), "Ben");

        service.clear().await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
