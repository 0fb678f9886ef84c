use quiz_core::model::{LeaderboardEntry, Unlock};

use crate::sessions::{AnswerFeedback, QuestionView, ResultSummaryView};

/// Output seam between the quiz services and whatever renders them.
///
/// The workflow calls these after every mutating operation. Implementations
/// are pure sinks: nothing they produce feeds back into session state.
pub trait QuizPresenter: Send + Sync {
    fn render_question(&self, view: &QuestionView);
    fn render_feedback(&self, feedback: &AnswerFeedback);
    fn render_unlocks(&self, unlocks: &[Unlock]);
    fn render_leaderboard(&self, rows: &[LeaderboardEntry]);
    fn render_result_summary(&self, summary: &ResultSummaryView);
}

/// Presenter that renders nothing. Useful for tests and headless commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl QuizPresenter for NullPresenter {
    fn render_question(&self, _view: &QuestionView) {}
    fn render_feedback(&self, _feedback: &AnswerFeedback) {}
    fn render_unlocks(&self, _unlocks: &[Unlock]) {}
    fn render_leaderboard(&self, _rows: &[LeaderboardEntry]) {}
    fn render_result_summary(&self, _summary: &ResultSummaryView) {}
}
