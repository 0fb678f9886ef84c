use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::QuestionBank;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::leaderboard_service::LeaderboardService;
use crate::presenter::QuizPresenter;
use crate::sessions::QuizLoopService;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    leaderboard: Arc<LeaderboardService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        bank: QuestionBank,
        presenter: Arc<dyn QuizPresenter>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, bank, presenter))
    }

    /// Build services over an already-initialized storage aggregate.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        bank: QuestionBank,
        presenter: Arc<dyn QuizPresenter>,
    ) -> Self {
        let bank = Arc::new(bank);
        let leaderboard = Arc::new(LeaderboardService::new(
            bank.quiz_id(),
            Arc::clone(&storage.leaderboards),
        ));
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            bank,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.leaderboards),
            presenter,
        ));
        Self {
            quiz_loop,
            leaderboard,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::NullPresenter;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn services_share_one_storage_scope() {
        let storage = Storage::in_memory();
        let services = AppServices::from_storage(
            &storage,
            Clock::fixed(fixed_now()),
            QuestionBank::eco_challenge(),
            Arc::new(NullPresenter),
        );

        let quiz = services.quiz_loop();
        quiz.start("Ava").await.unwrap();
        quiz.answer(0).await.unwrap();
        quiz.finish().await.unwrap();

        let entries = services.leaderboard().list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "Ava");
    }
}
