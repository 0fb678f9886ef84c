mod countdown;
mod progress;
mod views;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::QuizError;
pub use countdown::{Countdown, TICK_PERIOD};
pub use progress::SessionProgress;
pub use views::{AdvanceOutcome, AnswerFeedback, QuestionView, ResultSummaryView, TickStatus};
pub use workflow::QuizLoopService;
