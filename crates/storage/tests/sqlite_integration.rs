use std::sync::Arc;

use quiz_core::model::{AnswerMap, Question, QuizId, QuizProgress, QuizSession};
use quiz_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteStore;
use storage::{ProgressStore, SessionStore};

fn quiz_id(raw: &str) -> QuizId {
    QuizId::parse(raw).unwrap().into()
}

fn questions() -> Vec<Question> {
    vec![
        Question::new("2 + 2?", "4", vec!["3".into(), "5".into(), "22".into()]).unwrap(),
        Question::new("Sky colour?", "Blue", vec!["Green".into(), "Red".into(), "Pink".into()])
            .unwrap(),
    ]
}

#[tokio::test]
async fn sqlite_kv_roundtrip_and_overwrite() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    assert_eq!(store.get("missing").await.unwrap(), None);

    store.set("b", "first").await.unwrap();
    store.set("a", "second").await.unwrap();
    store.set("b", "third").await.unwrap();

    assert_eq!(store.get("b").await.unwrap().as_deref(), Some("third"));
    // enumeration follows first insertion, not key order
    assert_eq!(store.keys().await.unwrap(), vec!["b", "a"]);

    store.remove("b").await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["a"]);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = SqliteStore::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("first migrate");
    store.set("k", "v").await.unwrap();
    store.migrate().await.expect("second migrate");
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn record_stores_work_over_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_records?mode=memory&cache=shared")
        .await
        .expect("storage");
    let progress = ProgressStore::new(Arc::clone(&storage.kv));
    let sessions = SessionStore::new(Arc::clone(&storage.kv));
    let id = quiz_id("9-easy-multiple");

    let mut session = QuizSession::start(id.clone(), questions(), fixed_now());
    session.user_answers.record(0, "4");
    session.user_answers.record(1, "Green");
    let score = session.finalize(fixed_now());
    sessions.set(&id, &session).await.unwrap();

    let mut answers = AnswerMap::new();
    answers.record(0, "4");
    answers.record(1, "Green");
    let record = QuizProgress::completed(&session.questions, &answers, score, fixed_now());
    progress.set(&id, &record).await.unwrap();

    assert_eq!(sessions.get(&id).await.unwrap(), Some(session.clone()));
    assert_eq!(progress.get(&id).await.unwrap(), Some(record));

    let listed: Vec<QuizSession> = sessions.list_all().await.unwrap().collect();
    assert_eq!(listed, vec![session]);
}
