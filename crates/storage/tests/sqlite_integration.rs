use quiz_core::model::{Leaderboard, LeaderboardEntry, QuestionBank, SessionState};
use quiz_core::time::fixed_now;
use sqlx::Row;
use storage::repository::{LeaderboardRepository, ProgressRecord, ProgressRepository};
use storage::sqlite::SqliteRepository;

const QUIZ_ID: &str = "eco-quiz-challenge";

fn sample_record() -> ProgressRecord {
    let bank = QuestionBank::eco_challenge();
    let mut state = SessionState::new("Ava", bank.len()).unwrap();
    let q0 = bank.question(0).unwrap();
    state.answer(q0, q0.correct()).unwrap();
    state.advance().unwrap();
    ProgressRecord::from_state(&state, QUIZ_ID, fixed_now())
}

#[tokio::test]
async fn sqlite_round_trips_the_progress_document() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_progress(QUIZ_ID).await.unwrap().is_none());

    let record = sample_record();
    repo.save_progress(&record).await.unwrap();
    let loaded = repo.load_progress(QUIZ_ID).await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert_eq!(loaded.into_state().unwrap().score(), 1);

    // Saving again overwrites rather than duplicating.
    let mut updated = record.clone();
    updated.remaining_time = 120;
    repo.save_progress(&updated).await.unwrap();
    assert_eq!(
        repo.load_progress(QUIZ_ID)
            .await
            .unwrap()
            .unwrap()
            .remaining_time,
        120
    );

    repo.delete_progress(QUIZ_ID).await.unwrap();
    assert!(repo.load_progress(QUIZ_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_stores_original_field_names() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_fields?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_progress(&sample_record()).await.unwrap();

    let row = sqlx::query("SELECT body FROM documents WHERE key = ?1")
        .bind(format!("{QUIZ_ID}.progress"))
        .fetch_one(repo.pool())
        .await
        .unwrap();
    let body: String = row.try_get("body").unwrap();
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert!(value.get("currentIndex").is_some());
    assert!(value.get("remainingTime").is_some());
    assert_eq!(value["quizId"], QUIZ_ID);
}

#[tokio::test]
async fn sqlite_round_trips_the_leaderboard_document() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_board?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_leaderboard(QUIZ_ID).await.unwrap().is_empty());

    let mut board = Leaderboard::new();
    board.submit(LeaderboardEntry::new("Ava", 9, 12, 42, fixed_now()).unwrap());
    board.submit(LeaderboardEntry::new("Ben", 11, 12, 60, fixed_now()).unwrap());
    repo.save_leaderboard(QUIZ_ID, &board).await.unwrap();

    let entries = repo.load_leaderboard(QUIZ_ID).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name(), "Ben");
    assert_eq!(entries[1].time_used_seconds(), 42);

    repo.clear_leaderboard(QUIZ_ID).await.unwrap();
    assert!(repo.load_leaderboard(QUIZ_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_documents_read_as_absent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_malformed?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for key in [
        format!("{QUIZ_ID}.progress"),
        format!("{QUIZ_ID}.leaderboard"),
    ] {
        sqlx::query("INSERT INTO documents (key, body, updated_at) VALUES (?1, ?2, ?3)")
            .bind(key)
            .bind("{not json")
            .bind(fixed_now())
            .execute(repo.pool())
            .await
            .unwrap();
    }

    assert!(repo.load_progress(QUIZ_ID).await.unwrap().is_none());
    assert!(repo.load_leaderboard(QUIZ_ID).await.unwrap().is_empty());
}
