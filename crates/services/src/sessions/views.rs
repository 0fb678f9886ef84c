use quiz_core::model::Unlock;

/// Payload for rendering the question at `index`.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings beyond the domain text
/// - no localization assumptions
///
/// The presenter formats counters, timers and option markers as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    /// Previously recorded choice, when re-rendering an answered question.
    pub recorded_choice: Option<usize>,
    pub score: u32,
    pub remaining_seconds: u32,
}

/// Feedback for one answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub choice: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    /// The reward added by this answer; `None` when the text was already
    /// revealed or the call repeated an earlier submission.
    pub unlock: Option<Unlock>,
    /// `false` when the question had already been answered and the call
    /// was an idempotent no-op.
    pub newly_recorded: bool,
}

/// Final figures shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummaryView {
    pub player_name: String,
    pub score: u32,
    pub total: usize,
    pub accuracy_percent: u32,
    pub time_used_seconds: u32,
    pub unlock_count: usize,
}

/// What `advance` led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Next(QuestionView),
    Finished(ResultSummaryView),
}

/// What a countdown tick observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickStatus {
    /// Session still running; seconds remaining.
    Running(u32),
    /// This tick exhausted the timer and finished the session.
    Expired(ResultSummaryView),
    /// No active, unfinished session; the tick source should stop.
    Stopped,
}
