use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use quiz_core::model::{
    Category, CategoryId, Difficulty, ProgressStatus, Question, QuestionType, QuizId,
    QuizSelection,
};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    Applied, FlowStep, NextOutcome, NoticeSource, QuizFlow, QuizFlowError, TriviaError,
    TriviaSource,
};
use storage::repository::Storage;
use storage::{ProgressStore, SessionStore};

/// Serves queued question responses, falling back to a fresh batch of ten.
#[derive(Default)]
struct ScriptedTrivia {
    categories_fail: bool,
    responses: Mutex<VecDeque<Result<Vec<Question>, TriviaError>>>,
}

impl ScriptedTrivia {
    fn failing_categories() -> Self {
        Self {
            categories_fail: true,
            ..Self::default()
        }
    }

    fn then(self, response: Result<Vec<Question>, TriviaError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl TriviaSource for ScriptedTrivia {
    async fn fetch_categories(&self) -> Result<Vec<Category>, TriviaError> {
        if self.categories_fail {
            return Err(TriviaError::HttpStatus(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(vec![
            Category::new(CategoryId::new(9), "General Knowledge"),
            Category::new(CategoryId::new(10), "Entertainment: Books"),
        ])
    }

    async fn fetch_questions(
        &self,
        _selection: &QuizSelection,
    ) -> Result<Vec<Question>, TriviaError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ten_questions()))
    }
}

fn ten_questions() -> Vec<Question> {
    (0..10)
        .map(|i| {
            Question::new(
                format!("Question {i}?"),
                format!("right {i}"),
                vec![
                    format!("wrong {i}a"),
                    format!("wrong {i}b"),
                    format!("wrong {i}c"),
                ],
            )
            .unwrap()
        })
        .collect()
}

struct Harness {
    flow: QuizFlow,
    progress: ProgressStore,
    sessions: SessionStore,
}

fn harness(trivia: ScriptedTrivia) -> Harness {
    let storage = Storage::in_memory();
    let progress = ProgressStore::new(Arc::clone(&storage.kv));
    let sessions = SessionStore::new(Arc::clone(&storage.kv));
    let flow = QuizFlow::new(
        fixed_clock(),
        Arc::new(trivia),
        progress.clone(),
        sessions.clone(),
    )
    .with_seed(7);
    Harness {
        flow,
        progress,
        sessions,
    }
}

async fn start_quiz(flow: &mut QuizFlow) {
    assert_eq!(flow.load_categories().await, Applied::Applied);
    flow.select_category(CategoryId::new(9)).unwrap();
    flow.select_difficulty(Difficulty::Easy).unwrap();
    flow.select_type(QuestionType::Multiple).await.unwrap();
    assert_eq!(flow.step(), FlowStep::Quiz);
}

fn quiz_id() -> QuizId {
    QuizId::parse("9-easy-multiple").unwrap().into()
}

#[tokio::test]
async fn one_right_answer_scores_one_of_ten() {
    let Harness {
        mut flow,
        progress,
        sessions,
    } = harness(ScriptedTrivia::default());
    start_quiz(&mut flow).await;
    assert_eq!(flow.quiz_id(), Some(quiz_id()));

    let mut outcome = None;
    for i in 0..10 {
        let answer = if i == 0 {
            "right 0".to_owned()
        } else {
            format!("wrong {i}a")
        };
        flow.record_answer(&answer).await.unwrap();
        outcome = Some(flow.next().await.unwrap());
    }

    let Some(NextOutcome::Completed(results)) = outcome else {
        panic!("quiz should be complete");
    };
    assert_eq!(flow.step(), FlowStep::Results);
    assert_eq!(results.score, 1);
    assert_eq!(results.total, 10);
    assert_eq!(results.accuracy_percent, 10);
    assert_eq!(results.review.len(), 10);
    assert!(results.review[0].is_correct);
    assert!(!results.review[1].is_correct);

    let record = progress.get(&quiz_id()).await.unwrap().unwrap();
    assert_eq!(record.status, ProgressStatus::Completed);
    assert_eq!(record.score, 1);
    assert_eq!(record.total_questions, 10);

    let session = sessions.get(&quiz_id()).await.unwrap().unwrap();
    assert!(session.completed);
    assert_eq!(session.score, Some(1));
    assert_eq!(session.user_answers.len(), 10);
    assert!(session.end_time.is_some());
}

#[tokio::test]
async fn elapsed_time_and_accuracy_are_reported() {
    let Harness { mut flow, .. } = harness(ScriptedTrivia::default().then(Ok(ten_questions()
        .into_iter()
        .take(3)
        .collect())));
    start_quiz(&mut flow).await;

    flow.record_answer("right 0").await.unwrap();
    flow.next().await.unwrap();
    flow.record_answer("right 1").await.unwrap();
    flow.next().await.unwrap();
    flow.record_answer("wrong 2b").await.unwrap();
    flow.clock_mut().advance(Duration::milliseconds(95_400));

    let NextOutcome::Completed(results) = flow.next().await.unwrap() else {
        panic!("expected completion");
    };
    assert_eq!(results.elapsed, "01:35");
    assert_eq!(results.score, 2);
    assert_eq!(results.accuracy_percent, 67);
    assert_eq!(results.started_at, fixed_now());
    assert_eq!(flow.results(), Some(&results));
}

#[tokio::test]
async fn every_answer_updates_the_stored_session() {
    let Harness {
        mut flow, sessions, ..
    } = harness(ScriptedTrivia::default());
    start_quiz(&mut flow).await;

    assert!(sessions.get(&quiz_id()).await.unwrap().is_none());

    flow.record_answer("wrong 0a").await.unwrap();
    let stored = sessions.get(&quiz_id()).await.unwrap().unwrap();
    assert_eq!(stored.user_answers.get(0), Some("wrong 0a"));
    assert!(!stored.completed);
    assert_eq!(stored.questions.len(), 10);

    // answering again overwrites the same index
    flow.record_answer("right 0").await.unwrap();
    let stored = sessions.get(&quiz_id()).await.unwrap().unwrap();
    assert_eq!(stored.user_answers.get(0), Some("right 0"));
    assert_eq!(stored.user_answers.len(), 1);
}

#[tokio::test]
async fn navigation_rules() {
    let Harness { mut flow, .. } = harness(ScriptedTrivia::default());
    start_quiz(&mut flow).await;

    assert!(!flow.can_go_next());
    assert!(!flow.can_go_previous());
    assert!(matches!(flow.next().await, Err(QuizFlowError::Unanswered)));
    assert!(matches!(flow.previous(), Err(QuizFlowError::AtFirstQuestion)));

    // the navigator may jump anywhere regardless of answers
    assert_eq!(flow.jump_to(6).unwrap(), 6);
    assert!(flow.can_go_previous());
    assert_eq!(flow.previous().unwrap(), 5);
    assert_eq!(flow.jump_to(42).unwrap(), 9);

    flow.record_answer("right 9").await.unwrap();
    assert!(flow.can_go_next());
}

#[tokio::test]
async fn choices_are_shuffled_once_per_question() {
    let Harness { mut flow, .. } = harness(ScriptedTrivia::default());
    start_quiz(&mut flow).await;

    let first = flow.choices().unwrap().to_vec();
    assert_eq!(first.len(), 4);
    assert!(first.contains(&"right 0".to_owned()));

    flow.jump_to(3).unwrap();
    let _ = flow.choices().unwrap();
    flow.jump_to(0).unwrap();
    assert_eq!(flow.choices().unwrap(), first.as_slice());

    // the fetched question itself keeps its original order
    assert_eq!(flow.questions()[0].all_answers()[0], "right 0");
}

#[tokio::test]
async fn not_enough_questions_keeps_flow_off_the_quiz() {
    let Harness { mut flow, .. } =
        harness(ScriptedTrivia::default().then(Err(TriviaError::NoResults)));
    flow.load_categories().await;
    flow.select_category(CategoryId::new(9)).unwrap();
    flow.select_difficulty(Difficulty::Hard).unwrap();
    flow.select_type(QuestionType::Boolean).await.unwrap();

    assert_eq!(flow.step(), FlowStep::Type);
    assert_eq!(
        flow.notice().unwrap().message(),
        "Not enough questions available. Try with different options."
    );
    assert_eq!(flow.notice().unwrap().source(), NoticeSource::Questions);
    assert!(!flow.is_loading());

    flow.dismiss_notice();
    assert_eq!(flow.step(), FlowStep::Category);
    assert!(flow.notice().is_none());
}

#[tokio::test]
async fn other_fetch_failures_use_generic_messages() {
    let Harness { mut flow, .. } = harness(
        ScriptedTrivia::default()
            .then(Err(TriviaError::Upstream(4)))
            .then(Err(TriviaError::Malformed("missing results".into()))),
    );
    flow.load_categories().await;
    flow.select_category(CategoryId::new(9)).unwrap();
    flow.select_difficulty(Difficulty::Easy).unwrap();

    flow.select_type(QuestionType::Multiple).await.unwrap();
    assert_eq!(
        flow.notice().unwrap().message(),
        "Something went wrong. Please try again."
    );

    flow.select_type(QuestionType::Multiple).await.unwrap();
    assert_eq!(
        flow.notice().unwrap().message(),
        "Received an unexpected response from the trivia service."
    );
    assert_eq!(flow.step(), FlowStep::Type);
}

#[tokio::test]
async fn category_failure_blocks_selection() {
    let Harness { mut flow, .. } = harness(ScriptedTrivia::failing_categories());
    flow.load_categories().await;

    assert!(flow.categories().is_empty());
    assert_eq!(
        flow.notice().unwrap().message(),
        "Failed to load categories. Please try again."
    );
    assert_eq!(flow.notice().unwrap().source(), NoticeSource::Categories);
    assert!(matches!(
        flow.select_category(CategoryId::new(9)),
        Err(QuizFlowError::UnknownCategory(9))
    ));
}

#[tokio::test]
async fn reset_mid_quiz_keeps_stored_session() {
    let Harness {
        mut flow, sessions, ..
    } = harness(ScriptedTrivia::default());
    start_quiz(&mut flow).await;
    flow.record_answer("right 0").await.unwrap();

    flow.reset();

    assert_eq!(flow.step(), FlowStep::Category);
    assert!(flow.selection().is_none());
    assert!(flow.questions().is_empty());
    assert!(flow.answers().is_empty());
    assert!(flow.started_at().is_none());
    assert_eq!(flow.categories().len(), 2);

    let listed: Vec<_> = sessions.list_all().await.unwrap().collect();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quiz_id, quiz_id());
    assert!(!listed[0].completed);
}

#[tokio::test]
async fn question_response_after_reset_is_discarded() {
    let Harness { mut flow, .. } = harness(ScriptedTrivia::default());
    flow.load_categories().await;
    flow.select_category(CategoryId::new(9)).unwrap();
    flow.select_difficulty(Difficulty::Easy).unwrap();

    let ticket = flow.begin_question_fetch(QuestionType::Multiple).unwrap();
    assert!(flow.is_loading());
    flow.reset();
    assert!(!flow.is_loading());
    flow.select_category(CategoryId::new(10)).unwrap();
    flow.select_difficulty(Difficulty::Hard).unwrap();

    assert_eq!(flow.apply_questions(ticket, Ok(ten_questions())), Applied::Stale);
    assert_eq!(flow.step(), FlowStep::Type);
    assert!(flow.questions().is_empty());

    let fresh = flow.begin_question_fetch(QuestionType::Boolean).unwrap();
    assert_eq!(
        fresh.selection().unwrap().quiz_id().as_str(),
        "10-hard-boolean"
    );
    assert_eq!(flow.apply_questions(fresh, Ok(ten_questions())), Applied::Applied);
    assert_eq!(flow.step(), FlowStep::Quiz);
}

#[tokio::test]
async fn superseded_requests_are_discarded() {
    let Harness { mut flow, .. } = harness(ScriptedTrivia::default());

    let first = flow.begin_category_load();
    let second = flow.begin_category_load();
    assert_eq!(flow.apply_categories(first, Ok(Vec::new())), Applied::Stale);
    assert_eq!(
        flow.apply_categories(
            second,
            Ok(vec![Category::new(CategoryId::new(9), "General Knowledge")])
        ),
        Applied::Applied
    );
    assert_eq!(flow.categories().len(), 1);

    flow.select_category(CategoryId::new(9)).unwrap();
    flow.select_difficulty(Difficulty::Easy).unwrap();
    let older = flow.begin_question_fetch(QuestionType::Multiple).unwrap();
    let newer = flow.begin_question_fetch(QuestionType::Multiple).unwrap();
    assert_eq!(
        flow.apply_questions(older, Err(TriviaError::NoResults)),
        Applied::Stale
    );
    assert!(flow.notice().is_none());
    assert_eq!(flow.apply_questions(newer, Ok(ten_questions())), Applied::Applied);
    assert_eq!(flow.step(), FlowStep::Quiz);
}

#[tokio::test]
async fn retake_overwrites_previous_records() {
    let Harness {
        mut flow,
        progress,
        sessions,
    } = harness(ScriptedTrivia::default());

    start_quiz(&mut flow).await;
    for i in 0..10 {
        flow.record_answer(&format!("right {i}")).await.unwrap();
        flow.next().await.unwrap();
    }
    assert_eq!(progress.get(&quiz_id()).await.unwrap().unwrap().score, 10);

    assert_eq!(flow.start_retake(&quiz_id()).await.unwrap(), Applied::Applied);
    assert_eq!(flow.step(), FlowStep::Quiz);
    assert_eq!(flow.selected_category().unwrap().name(), "General Knowledge");

    flow.record_answer("wrong 0a").await.unwrap();
    let in_progress = sessions.get(&quiz_id()).await.unwrap().unwrap();
    assert!(!in_progress.completed);
    assert_eq!(in_progress.user_answers.len(), 1);

    for i in 0..10 {
        if i > 0 {
            flow.record_answer(&format!("wrong {i}b")).await.unwrap();
        }
        flow.next().await.unwrap();
    }

    let record = progress.get(&quiz_id()).await.unwrap().unwrap();
    assert_eq!(record.score, 0);
    assert_eq!(progress.get_all().await.unwrap().len(), 1);
    assert_eq!(sessions.list_all().await.unwrap().count(), 1);
    assert_eq!(sessions.get(&quiz_id()).await.unwrap().unwrap().score, Some(0));
}
