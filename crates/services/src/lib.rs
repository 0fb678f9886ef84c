#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod leaderboard_service;
pub mod presenter;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, QuizError};
pub use leaderboard_service::LeaderboardService;
pub use presenter::{NullPresenter, QuizPresenter};

pub use sessions::{
    AdvanceOutcome, AnswerFeedback, Countdown, QuestionView, QuizLoopService, ResultSummaryView,
    SessionProgress, TickStatus,
};
