mod leaderboard;
mod question;
mod session;
mod unlock;

pub use leaderboard::{
    FALLBACK_PLAYER_NAME, Leaderboard, LeaderboardEntry, LeaderboardError,
    MAX_LEADERBOARD_ENTRIES,
};
pub use question::{OPTION_COUNT, Question, QuestionBank, QuestionError};
pub use session::{
    AdvanceOutcome, AnswerOutcome, AnswerRecord, SessionState, SessionStateError,
    TIME_LIMIT_SECONDS, TickOutcome,
};
pub use unlock::{Unlock, UnlockKind};
