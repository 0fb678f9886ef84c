use std::io::{self, Write as _};
use std::sync::{Arc, Mutex};

use quiz_core::model::{
    LeaderboardEntry, OPTION_COUNT, SessionStateError, Unlock, UnlockKind,
};
use services::{
    AdvanceOutcome, AnswerFeedback, AppServices, Countdown, QuestionView, QuizError,
    QuizLoopService, QuizPresenter, ResultSummaryView,
};

/// Terminal renderer for the quiz presenter seam.
///
/// Remembers the last rendered question so feedback can name the correct
/// option instead of printing its index.
#[derive(Default)]
pub struct TermPresenter {
    last_question: Mutex<Option<QuestionView>>,
}

impl TermPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn option_text(&self, index: usize) -> Option<String> {
        let guard = self.last_question.lock().ok()?;
        guard
            .as_ref()
            .and_then(|view| view.options.get(index).cloned())
    }
}

fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn unlock_label(kind: UnlockKind) -> &'static str {
    match kind {
        UnlockKind::Fact => "Fun Fact",
        UnlockKind::Tip => "Eco Tip",
    }
}

impl QuizPresenter for TermPresenter {
    fn render_question(&self, view: &QuestionView) {
        println!();
        println!(
            "Question {}/{}  ·  score {}  ·  {} left",
            view.index + 1,
            view.total,
            view.score,
            format_clock(view.remaining_seconds)
        );
        println!("{}", view.prompt);
        for (i, option) in view.options.iter().enumerate() {
            let marker = if view.recorded_choice == Some(i) {
                "*"
            } else {
                " "
            };
            println!(" {marker}{}) {option}", i + 1);
        }

        if let Ok(mut guard) = self.last_question.lock() {
            *guard = Some(view.clone());
        }
    }

    fn render_feedback(&self, feedback: &AnswerFeedback) {
        if feedback.is_correct {
            println!("✅ Correct! Great job.");
        } else if let Some(text) = self.option_text(feedback.correct_index) {
            println!("❌ Not quite. Correct answer: {text}");
        } else {
            println!(
                "❌ Not quite. Correct answer: option {}",
                feedback.correct_index + 1
            );
        }

        if let Some(unlock) = &feedback.unlock {
            println!("{}: {}", unlock_label(unlock.kind), unlock.text);
        }
    }

    fn render_unlocks(&self, unlocks: &[Unlock]) {
        if !unlocks.is_empty() {
            println!("({} unlocked so far)", unlocks.len());
        }
    }

    fn render_leaderboard(&self, rows: &[LeaderboardEntry]) {
        println!();
        println!("Leaderboard");
        if rows.is_empty() {
            println!("  No scores yet.");
            return;
        }
        for (i, entry) in rows.iter().enumerate() {
            println!(
                "  {:>2}. {:<20} {:>2}/{:<2}  {:>3}s  {}",
                i + 1,
                entry.name(),
                entry.score(),
                entry.total(),
                entry.time_used_seconds(),
                entry.date().format("%Y-%m-%d")
            );
        }
    }

    fn render_result_summary(&self, summary: &ResultSummaryView) {
        println!();
        println!("— Quiz complete, {} —", summary.player_name);
        println!(
            "Score {}/{}  ·  accuracy {}%  ·  {}s used  ·  {} unlocked",
            summary.score,
            summary.total,
            summary.accuracy_percent,
            summary.time_used_seconds,
            summary.unlock_count
        );
        if summary.accuracy_percent >= 85 {
            println!("🌟 Eco Champion! You really know your stuff.");
        } else if summary.accuracy_percent >= 60 {
            println!("👍 Great effort! Keep growing your eco-knowledge.");
        } else {
            println!("🌱 Nice start! Review the tips and try again.");
        }
    }
}

/// Read one trimmed line from stdin without blocking the runtime.
///
/// Returns `None` on end of input.
async fn read_line() -> io::Result<Option<String>> {
    tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        let read = io::stdin().read_line(&mut buf)?;
        Ok(if read == 0 {
            None
        } else {
            Some(buf.trim().to_owned())
        })
    })
    .await
    .map_err(io::Error::other)?
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{text}");
    io::stdout().flush()
}

async fn confirmed(question: &str) -> io::Result<bool> {
    prompt(question)?;
    let answer = read_line().await?;
    Ok(matches!(answer.as_deref(), Some("y" | "Y" | "yes")))
}

async fn start_fresh(quiz: &Arc<QuizLoopService>) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        prompt("Enter your name to start: ")?;
        let Some(name) = read_line().await? else {
            return Err("no player name given".into());
        };
        match quiz.start(&name).await {
            Ok(_) => return Ok(()),
            Err(QuizError::Session(SessionStateError::EmptyPlayerName)) => {
                println!("Please enter your name to start.");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Interactive session: resume banner, answer loop, countdown.
pub async fn play(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let quiz = services.quiz_loop();

    if quiz.has_resumable().await? && confirmed("Resume your saved session? [y/N] ").await? {
        quiz.resume().await?;
    } else {
        start_fresh(&quiz).await?;
    }

    let countdown = Countdown::spawn(Arc::clone(&quiz));
    println!("Answer with 1-{OPTION_COUNT}, press Enter for the next question, s to save and exit.");

    loop {
        let Some(line) = read_line().await? else {
            // End of input: keep the session around for a later resume.
            quiz.save_and_exit().await?;
            println!("Session saved — resume any time.");
            break;
        };

        let result = match line.as_str() {
            "" | "n" => match quiz.advance().await {
                Ok(AdvanceOutcome::Next(_)) => Ok(()),
                Ok(AdvanceOutcome::Finished(_)) => break,
                Err(err) => Err(err),
            },
            "s" => {
                quiz.save_and_exit().await?;
                println!("Session saved — resume any time.");
                break;
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=OPTION_COUNT).contains(&n) => quiz.answer(n - 1).await.map(drop),
                _ => {
                    println!(
                        "Answer with 1-{OPTION_COUNT}, Enter to continue, s to save and exit."
                    );
                    Ok(())
                }
            },
        };

        if let Err(err) = result {
            match err {
                QuizError::Session(SessionStateError::NotAnswered) => {
                    println!("Please select an option first.");
                }
                QuizError::Session(SessionStateError::Completed) | QuizError::NoActiveSession => {
                    // The countdown finished the session while we waited
                    // for input; the result screen is already rendered.
                    break;
                }
                other => return Err(other.into()),
            }
        }
    }

    countdown.cancel();
    Ok(())
}

/// Confirm, then clear the leaderboard.
pub async fn clear_board(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    if confirmed("Clear the leaderboard? [y/N] ").await? {
        services.leaderboard().clear().await?;
        println!("Leaderboard cleared.");
    } else {
        println!("Leaderboard kept.");
    }
    Ok(())
}
