use thiserror::Error;

use crate::model::question::{OPTION_COUNT, Question};
use crate::model::unlock::{Unlock, UnlockKind};

/// Countdown budget for one session, in seconds.
pub const TIME_LIMIT_SECONDS: u32 = 180;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("player name cannot be empty")]
    EmptyPlayerName,

    #[error("session needs at least one question")]
    NoQuestions,

    #[error("choice index {0} is out of range")]
    InvalidChoice(usize),

    #[error("current question has no recorded answer")]
    NotAnswered,

    #[error("session already completed")]
    Completed,

    #[error("invalid persisted state: {0}")]
    InvalidPersistedState(String),
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What recording an answer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The choice was recorded by this call.
    Recorded(AnswerRecord),
    /// The question was already answered; the stored choice is reported
    /// and nothing changed.
    AlreadyAnswered { choice: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub choice: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    /// The unlock added by this answer, `None` when its text was already
    /// revealed earlier in the session.
    pub unlock: Option<Unlock>,
}

/// What advancing past the current question did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the question at this index.
    Next(usize),
    /// The last question was passed; the session finished.
    Finished,
}

/// What one countdown second did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was already completed; nothing changed.
    Idle,
    /// Seconds still remaining.
    Running(u32),
    /// This tick exhausted the timer and finished the session.
    Expired,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// One attempt at a fixed question sequence.
///
/// `completed` is true exactly when the index has passed the last question
/// or the timer has reached zero. Answering the question at `index` is the
/// only way to advance, and the first recorded answer locks its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    player_name: String,
    question_count: usize,
    index: usize,
    score: u32,
    remaining_seconds: u32,
    answers: Vec<Option<usize>>,
    unlocked: Vec<Unlock>,
    completed: bool,
}

impl SessionState {
    /// Start a fresh session for `player_name` over `question_count`
    /// questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::EmptyPlayerName` or
    /// `SessionStateError::NoQuestions`.
    pub fn new(player_name: &str, question_count: usize) -> Result<Self, SessionStateError> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(SessionStateError::EmptyPlayerName);
        }
        if question_count == 0 {
            return Err(SessionStateError::NoQuestions);
        }

        Ok(Self {
            player_name: player_name.to_owned(),
            question_count,
            index: 0,
            score: 0,
            remaining_seconds: TIME_LIMIT_SECONDS,
            answers: vec![None; question_count],
            unlocked: Vec::new(),
            completed: false,
        })
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidPersistedState` when the stored
    /// fields violate the session invariants, so callers can treat such a
    /// document as absent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        player_name: String,
        question_count: usize,
        index: usize,
        score: u32,
        remaining_seconds: u32,
        answers: Vec<Option<usize>>,
        unlocked: Vec<Unlock>,
        completed: bool,
    ) -> Result<Self, SessionStateError> {
        if player_name.trim().is_empty() {
            return Err(SessionStateError::EmptyPlayerName);
        }
        if question_count == 0 {
            return Err(SessionStateError::NoQuestions);
        }
        if answers.len() != question_count {
            return Err(SessionStateError::InvalidPersistedState(format!(
                "{} answer slots for {question_count} questions",
                answers.len()
            )));
        }
        if index > question_count {
            return Err(SessionStateError::InvalidPersistedState(format!(
                "index {index} out of range"
            )));
        }
        if remaining_seconds > TIME_LIMIT_SECONDS {
            return Err(SessionStateError::InvalidPersistedState(format!(
                "remaining time {remaining_seconds} exceeds the limit"
            )));
        }
        if let Some(choice) = answers.iter().flatten().find(|c| **c >= OPTION_COUNT) {
            return Err(SessionStateError::InvalidPersistedState(format!(
                "recorded answer {choice} out of range"
            )));
        }
        let answered = answers.iter().filter(|slot| slot.is_some()).count();
        if score as usize > answered {
            return Err(SessionStateError::InvalidPersistedState(format!(
                "score {score} exceeds {answered} answered questions"
            )));
        }
        let terminal = index == question_count || remaining_seconds == 0;
        if completed != terminal {
            return Err(SessionStateError::InvalidPersistedState(
                "completed flag does not match index and timer".to_owned(),
            ));
        }

        Ok(Self {
            player_name,
            question_count,
            index,
            score,
            remaining_seconds,
            answers,
            unlocked,
            completed,
        })
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Current question position; equals `question_count` once finished.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    /// Recorded choice for the current question, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.index).copied().flatten()
    }

    /// Unlocked rewards, newest first.
    #[must_use]
    pub fn unlocked(&self) -> &[Unlock] {
        &self.unlocked
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|slot| slot.is_some()).count()
    }

    /// Seconds consumed out of the fixed budget.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        TIME_LIMIT_SECONDS.saturating_sub(self.remaining_seconds)
    }

    /// Correct-answer share in whole percent, rounded half-up.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        let total = u32::try_from(self.question_count).unwrap_or(u32::MAX);
        (self.score * 100 + total / 2) / total
    }

    /// Record `choice` for the current question.
    ///
    /// A correct choice increments the score and reveals the question's
    /// fact; an incorrect one reveals its tip. The first answer locks the
    /// slot: repeated calls are no-ops that report the stored choice.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Completed` once the session is terminal
    /// and `SessionStateError::InvalidChoice` for an out-of-range index.
    pub fn answer(
        &mut self,
        question: &Question,
        choice: usize,
    ) -> Result<AnswerOutcome, SessionStateError> {
        if self.completed {
            return Err(SessionStateError::Completed);
        }
        if choice >= question.options().len() {
            return Err(SessionStateError::InvalidChoice(choice));
        }
        if let Some(existing) = self.answers[self.index] {
            return Ok(AnswerOutcome::AlreadyAnswered { choice: existing });
        }

        self.answers[self.index] = Some(choice);
        let is_correct = question.is_correct(choice);
        let unlock = if is_correct {
            self.score += 1;
            self.record_unlock(UnlockKind::Fact, question.fact())
        } else {
            self.record_unlock(UnlockKind::Tip, question.tip())
        };

        Ok(AnswerOutcome::Recorded(AnswerRecord {
            choice,
            correct_index: question.correct(),
            is_correct,
            unlock,
        }))
    }

    /// Move past the current question, finishing on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NotAnswered` while the current slot is
    /// empty and `SessionStateError::Completed` once terminal.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionStateError> {
        if self.completed {
            return Err(SessionStateError::Completed);
        }
        if self.answers[self.index].is_none() {
            return Err(SessionStateError::NotAnswered);
        }

        if self.index + 1 == self.question_count {
            self.finish();
            return Ok(AdvanceOutcome::Finished);
        }
        self.index += 1;
        Ok(AdvanceOutcome::Next(self.index))
    }

    /// Spend one countdown second; forces the terminal transition at zero.
    ///
    /// Total over every state, so a stale tick arriving after completion
    /// is harmless.
    pub fn tick(&mut self) -> TickOutcome {
        if self.completed {
            return TickOutcome::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.finish();
            return TickOutcome::Expired;
        }
        TickOutcome::Running(self.remaining_seconds)
    }

    /// Terminal transition. Returns `true` only on the transition itself,
    /// letting callers submit the session result exactly once.
    pub fn finish(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.index = self.question_count;
        true
    }

    fn record_unlock(&mut self, kind: UnlockKind, text: &str) -> Option<Unlock> {
        if self.unlocked.iter().any(|unlock| unlock.text == text) {
            return None;
        }
        let unlock = Unlock::new(kind, text);
        self.unlocked.insert(0, unlock.clone());
        Some(unlock)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
