use chrono::{DateTime, Utc};
use thiserror::Error;

/// Ranked entries kept per quiz.
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Display name recorded when a player name is missing at the wire
/// boundary.
pub const FALLBACK_PLAYER_NAME: &str = "Eco Explorer";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error("score ({score}) exceeds question total ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// Ranked historical record of one completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    name: String,
    score: u32,
    total: u32,
    time_used_seconds: u32,
    date: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Build an entry from a completed session's outcome.
    ///
    /// An empty name falls back to [`FALLBACK_PLAYER_NAME`].
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::ScoreExceedsTotal` when score > total.
    pub fn new(
        name: impl Into<String>,
        score: u32,
        total: u32,
        time_used_seconds: u32,
        date: DateTime<Utc>,
    ) -> Result<Self, LeaderboardError> {
        if score > total {
            return Err(LeaderboardError::ScoreExceedsTotal { score, total });
        }
        let name = name.into();
        let name = if name.trim().is_empty() {
            FALLBACK_PLAYER_NAME.to_owned()
        } else {
            name
        };
        Ok(Self {
            name,
            score,
            total,
            time_used_seconds,
            date,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn time_used_seconds(&self) -> u32 {
        self.time_used_seconds
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Questions answered incorrectly or left unanswered.
    #[must_use]
    pub fn missed(&self) -> u32 {
        self.total - self.score
    }
}

/// Bounded ranked list of completed sessions.
///
/// Ordered by score descending, then time used ascending; ties keep
/// insertion order (the sort is stable). Never longer than
/// [`MAX_LEADERBOARD_ENTRIES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries, re-applying rank order and the
    /// size bound.
    #[must_use]
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.rank();
        board
    }

    /// Append an entry and restore the rank invariant.
    pub fn submit(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.rank();
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rank(&mut self) {
        self.entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.time_used_seconds.cmp(&b.time_used_seconds))
        });
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn entry(name: &str, score: u32, time_used: u32) -> LeaderboardEntry {
        LeaderboardEntry::new(name, score, 12, time_used, fixed_now()).unwrap()
    }

    fn is_ranked(board: &Leaderboard) -> bool {
        board.entries().windows(2).all(|pair| {
            pair[0].score() > pair[1].score()
                || (pair[0].score() == pair[1].score()
                    && pair[0].time_used_seconds() <= pair[1].time_used_seconds())
        })
    }

    #[test]
    fn entry_rejects_score_above_total() {
        let err = LeaderboardEntry::new("Ava", 13, 12, 10, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            LeaderboardError::ScoreExceedsTotal {
                score: 13,
                total: 12
            }
        );
    }

    #[test]
    fn empty_name_falls_back() {
        let entry = LeaderboardEntry::new("  ", 5, 12, 10, fixed_now()).unwrap();
        assert_eq!(entry.name(), FALLBACK_PLAYER_NAME);
        assert_eq!(entry.missed(), 7);
    }

    #[test]
    fn submit_keeps_rank_order_and_bound() {
        let mut board = Leaderboard::new();
        for i in 0..15 {
            board.submit(entry(&format!("p{i}"), i % 13, 180 - i));
        }

        assert_eq!(board.len(), MAX_LEADERBOARD_ENTRIES);
        assert!(is_ranked(&board));
    }

    #[test]
    fn faster_time_wins_the_score_tie() {
        let mut board = Leaderboard::new();
        board.submit(entry("slow", 10, 150));
        board.submit(entry("fast", 10, 90));

        assert_eq!(board.entries()[0].name(), "fast");
        assert_eq!(board.entries()[1].name(), "slow");
    }

    #[test]
    fn equal_entries_keep_insertion_order() {
        let mut board = Leaderboard::new();
        board.submit(entry("first", 8, 100));
        board.submit(entry("second", 8, 100));

        assert_eq!(board.entries()[0].name(), "first");
        assert_eq!(board.entries()[1].name(), "second");
    }

    #[test]
    fn from_entries_restores_the_invariant() {
        let board = Leaderboard::from_entries(vec![
            entry("low", 2, 50),
            entry("high", 11, 170),
            entry("mid", 7, 20),
        ]);

        assert_eq!(board.entries()[0].name(), "high");
        assert_eq!(board.entries()[2].name(), "low");
        assert!(is_ranked(&board));
    }
}
