use thiserror::Error;

use crate::model::{LeaderboardError, QuestionError, SessionStateError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}
