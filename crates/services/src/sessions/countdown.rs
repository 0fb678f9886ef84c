use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::views::TickStatus;
use super::workflow::QuizLoopService;

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Cancellable one-second tick source driving [`QuizLoopService::tick`].
///
/// The task stops on its own when a tick reports the session expired or
/// deactivated, so a forgotten handle cannot keep ticking against a
/// terminal session; `cancel` (and drop) abort it outright. A tick that
/// is already executing when the handle is cancelled completes normally,
/// which is safe because the workflow's tick is a no-op on terminal
/// sessions.
#[derive(Debug)]
pub struct Countdown {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Spawn the tick task against `service`.
    #[must_use]
    pub fn spawn(service: Arc<QuizLoopService>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let task = tokio::spawn(async move {
            let mut interval = time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately;
            // consume it so the countdown starts a full period from now.
            interval.tick().await;
            loop {
                interval.tick().await;
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                match service.tick().await {
                    Ok(TickStatus::Running(_)) => {}
                    Ok(TickStatus::Expired(_) | TickStatus::Stopped) => break,
                    Err(err) => {
                        tracing::warn!(%err, "countdown tick failed");
                        break;
                    }
                }
            }
        });
        Self { cancelled, task }
    }

    /// Stop the tick source. No further tick will fire after this returns.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.task.abort();
    }

    /// True once the task has stopped, whether by cancellation or on its
    /// own.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Clock;
    use quiz_core::model::{QuestionBank, TIME_LIMIT_SECONDS};
    use quiz_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, LeaderboardRepository};

    use crate::presenter::NullPresenter;

    fn service(repo: &InMemoryRepository) -> Arc<QuizLoopService> {
        Arc::new(QuizLoopService::new(
            Clock::fixed(fixed_now()),
            Arc::new(QuestionBank::eco_challenge()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(NullPresenter),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_decrements_once_per_second() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        service.start("Ava").await.unwrap();

        let countdown = Countdown::spawn(Arc::clone(&service));
        time::sleep(Duration::from_millis(3_100)).await;

        let progress = service.progress().await.unwrap();
        assert_eq!(progress.remaining_seconds, TIME_LIMIT_SECONDS - 3);

        countdown.cancel();
        time::sleep(Duration::from_secs(2)).await;
        assert!(countdown.is_finished());
        let progress = service.progress().await.unwrap();
        assert_eq!(progress.remaining_seconds, TIME_LIMIT_SECONDS - 3);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_stops_after_save_and_exit() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        service.start("Ava").await.unwrap();

        let countdown = Countdown::spawn(Arc::clone(&service));
        time::sleep(Duration::from_millis(2_100)).await;
        service.save_and_exit().await.unwrap();

        // The next tick observes the deactivated session and the task ends.
        time::sleep(Duration::from_secs(2)).await;
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expires_the_session_and_stops() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        service.start("Ava").await.unwrap();
        service.answer(0).await.unwrap();

        let countdown = Countdown::spawn(Arc::clone(&service));
        time::sleep(Duration::from_secs(u64::from(TIME_LIMIT_SECONDS) + 2)).await;

        assert!(countdown.is_finished());
        let progress = service.progress().await.unwrap();
        assert!(progress.is_complete);
        assert_eq!(progress.remaining_seconds, 0);

        let entries = repo.load_leaderboard("eco-quiz-challenge").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time_used_seconds(), TIME_LIMIT_SECONDS);
    }
}
