use std::sync::Arc;

use tokio::sync::Mutex;

use quiz_core::Clock;
use quiz_core::model::{
    AdvanceOutcome as StateAdvance, AnswerOutcome, Leaderboard, LeaderboardEntry, QuestionBank,
    SessionState, SessionStateError, TickOutcome,
};
use storage::repository::{LeaderboardRepository, ProgressRecord, ProgressRepository};

use super::progress::SessionProgress;
use super::views::{AdvanceOutcome, AnswerFeedback, QuestionView, ResultSummaryView, TickStatus};
use crate::error::QuizError;
use crate::presenter::QuizPresenter;

/// Orchestrates the quiz session lifecycle with persisted write-through.
///
/// One service owns at most one active session. The mutex serializes
/// user-driven calls against countdown ticks, so no two mutations of the
/// session ever run concurrently.
pub struct QuizLoopService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    progress: Arc<dyn ProgressRepository>,
    boards: Arc<dyn LeaderboardRepository>,
    presenter: Arc<dyn QuizPresenter>,
    active: Mutex<Option<SessionState>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<QuestionBank>,
        progress: Arc<dyn ProgressRepository>,
        boards: Arc<dyn LeaderboardRepository>,
        presenter: Arc<dyn QuizPresenter>,
    ) -> Self {
        Self {
            clock,
            bank,
            progress,
            boards,
            presenter,
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Start a fresh session for `player_name`, replacing any active one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for an empty name and
    /// `QuizError::Storage` for persistence failures.
    pub async fn start(&self, player_name: &str) -> Result<QuestionView, QuizError> {
        let mut active = self.active.lock().await;
        let state = SessionState::new(player_name, self.bank.len())?;
        self.persist(&state).await?;

        tracing::info!(
            player = state.player_name(),
            questions = self.bank.len(),
            "session started"
        );
        let view = Self::question_view(&self.bank, &state)
            .ok_or(QuizError::Session(SessionStateError::Completed))?;
        *active = Some(state);
        self.presenter.render_question(&view);
        Ok(view)
    }

    /// Resume the persisted, non-completed session for this bank's quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoResumableSession` when no usable progress
    /// document exists.
    pub async fn resume(&self) -> Result<QuestionView, QuizError> {
        let mut active = self.active.lock().await;
        let state = self
            .load_resumable()
            .await?
            .ok_or(QuizError::NoResumableSession)?;

        tracing::info!(
            player = state.player_name(),
            index = state.index(),
            remaining = state.remaining_seconds(),
            "session resumed"
        );
        let view = Self::question_view(&self.bank, &state)
            .ok_or(QuizError::Session(SessionStateError::Completed))?;
        *active = Some(state);
        self.presenter.render_question(&view);
        Ok(view)
    }

    /// True when a valid, non-completed progress document exists.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for repository failures.
    pub async fn has_resumable(&self) -> Result<bool, QuizError> {
        Ok(self.load_resumable().await?.is_some())
    }

    /// Record an answer for the current question.
    ///
    /// Idempotent against double submission: a second call for the same
    /// question reports the stored choice without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` without a session and
    /// `QuizError::Session` for terminal or out-of-range submissions.
    pub async fn answer(&self, choice: usize) -> Result<AnswerFeedback, QuizError> {
        let mut active = self.active.lock().await;
        let state = active.as_mut().ok_or(QuizError::NoActiveSession)?;
        let question = self
            .bank
            .question(state.index())
            .ok_or(QuizError::Session(SessionStateError::Completed))?;

        let feedback = match state.answer(question, choice)? {
            AnswerOutcome::Recorded(record) => {
                self.persist(state).await?;
                AnswerFeedback {
                    choice: record.choice,
                    correct_index: record.correct_index,
                    is_correct: record.is_correct,
                    unlock: record.unlock,
                    newly_recorded: true,
                }
            }
            AnswerOutcome::AlreadyAnswered { choice: recorded } => AnswerFeedback {
                choice: recorded,
                correct_index: question.correct(),
                is_correct: question.is_correct(recorded),
                unlock: None,
                newly_recorded: false,
            },
        };

        self.presenter.render_feedback(&feedback);
        self.presenter.render_unlocks(state.unlocked());
        Ok(feedback)
    }

    /// Move past the current question, finishing the session on the last
    /// one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when the current question has no
    /// recorded answer or the session is terminal.
    pub async fn advance(&self) -> Result<AdvanceOutcome, QuizError> {
        let mut active = self.active.lock().await;
        let state = active.as_mut().ok_or(QuizError::NoActiveSession)?;

        match state.advance()? {
            StateAdvance::Next(_) => {
                self.persist(state).await?;
                let view = Self::question_view(&self.bank, state)
                    .ok_or(QuizError::Session(SessionStateError::Completed))?;
                self.presenter.render_question(&view);
                Ok(AdvanceOutcome::Next(view))
            }
            StateAdvance::Finished => {
                let summary = self.finalize(state).await?;
                Ok(AdvanceOutcome::Finished(summary))
            }
        }
    }

    /// Advance the countdown by one logical second.
    ///
    /// Total over every service state: without an active, unfinished
    /// session the tick reports `Stopped` and mutates nothing, which is
    /// what makes a stale tick racing a finish harmless.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the forced finish cannot persist.
    pub async fn tick(&self) -> Result<TickStatus, QuizError> {
        let mut active = self.active.lock().await;
        let Some(state) = active.as_mut() else {
            return Ok(TickStatus::Stopped);
        };

        match state.tick() {
            TickOutcome::Idle => Ok(TickStatus::Stopped),
            TickOutcome::Running(remaining) => Ok(TickStatus::Running(remaining)),
            TickOutcome::Expired => {
                tracing::info!(player = state.player_name(), "countdown expired");
                let summary = self.finalize(state).await?;
                Ok(TickStatus::Expired(summary))
            }
        }
    }

    /// Force the terminal transition.
    ///
    /// Idempotent: repeated calls neither error nor submit a second
    /// leaderboard entry.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` without a session and
    /// `QuizError::Storage` for persistence failures.
    pub async fn finish(&self) -> Result<ResultSummaryView, QuizError> {
        let mut active = self.active.lock().await;
        let state = active.as_mut().ok_or(QuizError::NoActiveSession)?;

        if state.finish() {
            self.finalize(state).await
        } else {
            Ok(Self::result_summary(state))
        }
    }

    /// Persist the current state without finishing and deactivate the
    /// session; the countdown observes the deactivation and stops.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` without a session.
    pub async fn save_and_exit(&self) -> Result<(), QuizError> {
        let mut active = self.active.lock().await;
        let state = active.as_mut().ok_or(QuizError::NoActiveSession)?;
        self.persist(state).await?;
        tracing::info!(
            player = state.player_name(),
            index = state.index(),
            "session saved for later"
        );
        *active = None;
        Ok(())
    }

    /// Delete saved progress and deactivate any live session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` for repository failures.
    pub async fn reset(&self) -> Result<(), QuizError> {
        let mut active = self.active.lock().await;
        self.progress.delete_progress(self.bank.quiz_id()).await?;
        *active = None;
        tracing::info!(quiz = self.bank.quiz_id(), "progress cleared");
        Ok(())
    }

    /// Snapshot of the active session, `None` when idle.
    pub async fn progress(&self) -> Option<SessionProgress> {
        let active = self.active.lock().await;
        active.as_ref().map(|state| SessionProgress {
            total: state.question_count(),
            answered: state.answered_count(),
            score: state.score(),
            remaining_seconds: state.remaining_seconds(),
            is_complete: state.is_complete(),
        })
    }

    async fn load_resumable(&self) -> Result<Option<SessionState>, QuizError> {
        let Some(record) = self.progress.load_progress(self.bank.quiz_id()).await? else {
            return Ok(None);
        };
        if record.quiz_id != self.bank.quiz_id() || record.answers.len() != self.bank.len() {
            tracing::warn!(
                quiz = self.bank.quiz_id(),
                "stored progress does not match the configured bank; ignoring"
            );
            return Ok(None);
        }
        if record.completed {
            return Ok(None);
        }
        match record.into_state() {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                tracing::warn!(%err, "stored progress violates session invariants; ignoring");
                Ok(None)
            }
        }
    }

    /// Submit the leaderboard entry and persist the terminal state.
    ///
    /// Callers reach this exactly once per session, on the fresh terminal
    /// transition reported by the core machine.
    async fn finalize(&self, state: &SessionState) -> Result<ResultSummaryView, QuizError> {
        let total = u32::try_from(state.question_count()).unwrap_or(u32::MAX);
        let entry = LeaderboardEntry::new(
            state.player_name(),
            state.score(),
            total,
            state.elapsed_seconds(),
            self.clock.now(),
        )?;

        let quiz_id = self.bank.quiz_id();
        let mut board = Leaderboard::from_entries(self.boards.load_leaderboard(quiz_id).await?);
        board.submit(entry);
        self.boards.save_leaderboard(quiz_id, &board).await?;
        self.persist(state).await?;

        tracing::info!(
            player = state.player_name(),
            score = state.score(),
            time_used = state.elapsed_seconds(),
            "session finished"
        );
        let summary = Self::result_summary(state);
        self.presenter.render_result_summary(&summary);
        self.presenter.render_leaderboard(board.entries());
        Ok(summary)
    }

    async fn persist(&self, state: &SessionState) -> Result<(), QuizError> {
        let record = ProgressRecord::from_state(state, self.bank.quiz_id(), self.clock.now());
        self.progress.save_progress(&record).await?;
        Ok(())
    }

    fn question_view(bank: &QuestionBank, state: &SessionState) -> Option<QuestionView> {
        let question = bank.question(state.index())?;
        Some(QuestionView {
            index: state.index(),
            total: state.question_count(),
            prompt: question.prompt().to_owned(),
            options: question.options().to_vec(),
            recorded_choice: state.current_answer(),
            score: state.score(),
            remaining_seconds: state.remaining_seconds(),
        })
    }

    fn result_summary(state: &SessionState) -> ResultSummaryView {
        ResultSummaryView {
            player_name: state.player_name().to_owned(),
            score: state.score(),
            total: state.question_count(),
            accuracy_percent: state.accuracy_percent(),
            time_used_seconds: state.elapsed_seconds(),
            unlock_count: state.unlocked().len(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::TIME_LIMIT_SECONDS;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    use crate::presenter::NullPresenter;

    fn service_with_repo(repo: InMemoryRepository) -> QuizLoopService {
        QuizLoopService::new(
            Clock::fixed(fixed_now()),
            Arc::new(QuestionBank::eco_challenge()),
            Arc::new(repo.clone()),
            Arc::new(repo),
            Arc::new(NullPresenter),
        )
    }

    fn service() -> QuizLoopService {
        service_with_repo(InMemoryRepository::new())
    }

    #[tokio::test]
    async fn start_requires_a_name() {
        let service = service();
        let err = service.start("   ").await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::Session(SessionStateError::EmptyPlayerName)
        ));
        assert!(service.progress().await.is_none());
    }

    #[tokio::test]
    async fn start_renders_the_first_question_and_persists() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());

        let view = service.start("Ava").await.unwrap();
        assert_eq!(view.index, 0);
        assert_eq!(view.total, 12);
        assert_eq!(view.remaining_seconds, TIME_LIMIT_SECONDS);

        use storage::repository::ProgressRepository;
        let record = repo
            .load_progress("eco-quiz-challenge")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.player_name, "Ava");
        assert_eq!(record.current_index, 0);
        assert!(!record.completed);
    }

    #[tokio::test]
    async fn answer_twice_records_once() {
        let service = service();
        service.start("Ava").await.unwrap();

        let first = service.answer(0).await.unwrap();
        assert!(first.newly_recorded);
        assert!(first.is_correct);
        assert!(first.unlock.is_some());

        let second = service.answer(3).await.unwrap();
        assert!(!second.newly_recorded);
        assert_eq!(second.choice, 0);
        assert!(second.unlock.is_none());

        let progress = service.progress().await.unwrap();
        assert_eq!(progress.score, 1);
        assert_eq!(progress.answered, 1);
    }

    #[tokio::test]
    async fn scenario_two_answers_two_advances() {
        let service = service();
        service.start("Ava").await.unwrap();

        // Question 0 answered correctly: score 1, one fact unlocked.
        let feedback = service.answer(0).await.unwrap();
        assert!(feedback.is_correct);
        let next = service.advance().await.unwrap();
        assert!(matches!(next, AdvanceOutcome::Next(ref view) if view.index == 1));

        // Question 1 answered incorrectly: score stays 1, one tip unlocked.
        let feedback = service.answer(0).await.unwrap();
        assert!(!feedback.is_correct);
        let next = service.advance().await.unwrap();
        assert!(matches!(next, AdvanceOutcome::Next(ref view) if view.index == 2));

        let progress = service.progress().await.unwrap();
        assert_eq!(progress.score, 1);
        assert_eq!(progress.answered, 2);
        assert!(!progress.is_complete);
    }

    #[tokio::test]
    async fn advance_without_answer_is_rejected() {
        let service = service();
        service.start("Ava").await.unwrap();
        let err = service.advance().await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::Session(SessionStateError::NotAnswered)
        ));
    }

    #[tokio::test]
    async fn ticking_to_zero_finishes_and_submits_one_entry() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());
        service.start("Ava").await.unwrap();
        service.answer(0).await.unwrap();

        let mut expired = false;
        for _ in 0..TIME_LIMIT_SECONDS {
            match service.tick().await.unwrap() {
                TickStatus::Running(_) => {}
                TickStatus::Expired(summary) => {
                    expired = true;
                    assert_eq!(summary.score, 1);
                    assert_eq!(summary.time_used_seconds, TIME_LIMIT_SECONDS);
                }
                TickStatus::Stopped => panic!("countdown stopped early"),
            }
        }
        assert!(expired);

        let progress = service.progress().await.unwrap();
        assert!(progress.is_complete);

        use storage::repository::LeaderboardRepository;
        let entries = repo.load_leaderboard("eco-quiz-challenge").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score(), 1);
        assert_eq!(entries[0].missed(), 11);

        // Ticks after the terminal transition report Stopped and change nothing.
        assert!(matches!(
            service.tick().await.unwrap(),
            TickStatus::Stopped
        ));
        let entries = repo.load_leaderboard("eco-quiz-challenge").await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn finishing_twice_submits_exactly_one_entry() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());
        service.start("Ava").await.unwrap();
        service.answer(0).await.unwrap();

        let first = service.finish().await.unwrap();
        let second = service.finish().await.unwrap();
        assert_eq!(first, second);

        use storage::repository::LeaderboardRepository;
        let entries = repo.load_leaderboard("eco-quiz-challenge").await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn completing_the_last_question_finishes_the_session() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());
        let bank = QuestionBank::eco_challenge();
        service.start("Ava").await.unwrap();

        for i in 0..bank.len() {
            let correct = bank.question(i).unwrap().correct();
            service.answer(correct).await.unwrap();
            let outcome = service.advance().await.unwrap();
            if i + 1 == bank.len() {
                let AdvanceOutcome::Finished(summary) = outcome else {
                    panic!("expected the session to finish");
                };
                assert_eq!(summary.score, 12);
                assert_eq!(summary.accuracy_percent, 100);
            }
        }

        assert!(service.progress().await.unwrap().is_complete);
        let err = service.answer(0).await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::Session(SessionStateError::Completed)
        ));
    }

    #[tokio::test]
    async fn save_and_exit_then_resume_round_trips() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());

        service.start("Ava").await.unwrap();
        service.answer(0).await.unwrap();
        service.advance().await.unwrap();
        for _ in 0..10 {
            service.tick().await.unwrap();
        }
        let before = service.progress().await.unwrap();
        service.save_and_exit().await.unwrap();
        assert!(service.progress().await.is_none());

        // A fresh service over the same storage picks the session up.
        let revived = service_with_repo(repo);
        assert!(revived.has_resumable().await.unwrap());
        let view = revived.resume().await.unwrap();
        assert_eq!(view.index, 1);
        assert_eq!(view.remaining_seconds, TIME_LIMIT_SECONDS - 10);
        assert_eq!(revived.progress().await.unwrap(), before);
    }

    #[tokio::test]
    async fn reset_then_resume_signals_nothing_to_resume() {
        let service = service();
        service.start("Ava").await.unwrap();
        service.reset().await.unwrap();

        assert!(!service.has_resumable().await.unwrap());
        let err = service.resume().await.unwrap_err();
        assert!(matches!(err, QuizError::NoResumableSession));
    }

    #[tokio::test]
    async fn completed_progress_is_not_resumable() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());
        service.start("Ava").await.unwrap();
        service.answer(0).await.unwrap();
        service.finish().await.unwrap();

        let revived = service_with_repo(repo);
        assert!(!revived.has_resumable().await.unwrap());
        assert!(matches!(
            revived.resume().await.unwrap_err(),
            QuizError::NoResumableSession
        ));
    }

    #[tokio::test]
    async fn invariant_violating_progress_reads_as_absent() {
        use storage::repository::{ProgressRepository, ProgressRecord};

        let repo = InMemoryRepository::new();
        let record = ProgressRecord {
            quiz_id: "eco-quiz-challenge".into(),
            current_index: 3,
            answers: vec![None; 12],
            score: 9,
            remaining_time: 100,
            player_name: "Ava".into(),
            unlocked: Vec::new(),
            completed: false,
            timestamp: fixed_now(),
        };
        repo.save_progress(&record).await.unwrap();

        let service = service_with_repo(repo);
        assert!(!service.has_resumable().await.unwrap());
        assert!(matches!(
            service.resume().await.unwrap_err(),
            QuizError::NoResumableSession
        ));
    }

    #[tokio::test]
    async fn starting_over_supersedes_the_saved_session() {
        let repo = InMemoryRepository::new();
        let service = service_with_repo(repo.clone());

        service.start("Ava").await.unwrap();
        service.answer(0).await.unwrap();
        service.advance().await.unwrap();
        service.save_and_exit().await.unwrap();

        service.start("Ben").await.unwrap();
        use storage::repository::ProgressRepository;
        let record = repo
            .load_progress("eco-quiz-challenge")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.player_name, "Ben");
        assert_eq!(record.current_index, 0);
    }
}
