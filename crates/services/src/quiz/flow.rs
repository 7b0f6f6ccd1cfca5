use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerMap, Category, CategoryId, Difficulty, Question, QuestionType, QuizId, QuizProgress,
    QuizSelection, QuizSession,
};
use quiz_core::scoring;
use quiz_core::shuffle::ShuffleTable;
use quiz_core::time::format_elapsed;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::{ProgressStore, SessionStore};
use tracing::{debug, info, warn};

use super::{Applied, FetchKind, FetchTicket, FlowNotice, FlowStep, NextOutcome, QuizResults};
use crate::Clock;
use crate::error::{QuizFlowError, TriviaError};
use crate::trivia::TriviaSource;

/// Drives one user through category, difficulty and type selection, the
/// question sequence, and the results screen.
///
/// The running attempt is written to the session store on every answer; the
/// progress store is written once, on completion. Nothing here deletes stored
/// records: `reset` only forgets in-memory state.
pub struct QuizFlow {
    clock: Clock,
    trivia: Arc<dyn TriviaSource>,
    progress: ProgressStore,
    sessions: SessionStore,
    rng: StdRng,

    // bumped by `reset` and by every question fetch
    generation: u64,
    category_requests: u64,

    step: FlowStep,
    categories: Vec<Category>,
    category: Option<Category>,
    difficulty: Option<Difficulty>,
    question_type: Option<QuestionType>,

    questions: Vec<Question>,
    current: usize,
    answers: AnswerMap,
    shuffles: ShuffleTable,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    session: Option<QuizSession>,
    results: Option<QuizResults>,

    notice: Option<FlowNotice>,
    loading: bool,
}

impl QuizFlow {
    #[must_use]
    pub fn new(
        clock: Clock,
        trivia: Arc<dyn TriviaSource>,
        progress: ProgressStore,
        sessions: SessionStore,
    ) -> Self {
        Self {
            clock,
            trivia,
            progress,
            sessions,
            rng: StdRng::from_os_rng(),
            generation: 0,
            category_requests: 0,
            step: FlowStep::Category,
            categories: Vec::new(),
            category: None,
            difficulty: None,
            question_type: None,
            questions: Vec::new(),
            current: 0,
            answers: AnswerMap::new(),
            shuffles: ShuffleTable::new(),
            started_at: None,
            completed_at: None,
            session: None,
            results: None,
            notice: None,
            loading: false,
        }
    }

    /// Use a seeded RNG for answer shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn expect_step(&self, expected: FlowStep) -> Result<(), QuizFlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(QuizFlowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    //
    // ─── CATEGORIES ─────────────────────────────────────────────────────────────
    //

    /// Fetch the category list. Failures land in [`QuizFlow::notice`].
    pub async fn load_categories(&mut self) -> Applied {
        let ticket = self.begin_category_load();
        let trivia = Arc::clone(&self.trivia);
        let result = trivia.fetch_categories().await;
        self.apply_categories(ticket, result)
    }

    pub fn begin_category_load(&mut self) -> FetchTicket {
        self.category_requests += 1;
        self.loading = true;
        FetchTicket {
            generation: self.category_requests,
            kind: FetchKind::Categories,
        }
    }

    /// Apply a category response. Responses overtaken by a newer category
    /// request are dropped.
    pub fn apply_categories(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Category>, TriviaError>,
    ) -> Applied {
        if ticket.kind != FetchKind::Categories || ticket.generation != self.category_requests {
            debug!("dropping superseded category response");
            return Applied::Stale;
        }

        self.loading = false;
        match result {
            Ok(categories) => self.categories = categories,
            Err(err) => {
                warn!(error = %err, "failed to load categories");
                self.categories.clear();
                self.notice = Some(FlowNotice::categories_unavailable());
            }
        }
        Applied::Applied
    }

    //
    // ─── SELECTION ──────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `WrongStep` outside the category step and `UnknownCategory`
    /// for ids not in the loaded list.
    pub fn select_category(&mut self, id: CategoryId) -> Result<(), QuizFlowError> {
        self.expect_step(FlowStep::Category)?;
        let category = self
            .categories
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or(QuizFlowError::UnknownCategory(id.value()))?;
        self.category = Some(category);
        self.step = FlowStep::Difficulty;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `WrongStep` outside the difficulty step.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<(), QuizFlowError> {
        self.expect_step(FlowStep::Difficulty)?;
        self.difficulty = Some(difficulty);
        self.step = FlowStep::Type;
        Ok(())
    }

    /// Step back one selection screen: difficulty to category, type to
    /// difficulty. Earlier choices stay selected.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the difficulty and type steps.
    pub fn back(&mut self) -> Result<FlowStep, QuizFlowError> {
        self.step = match self.step {
            FlowStep::Difficulty => FlowStep::Category,
            FlowStep::Type => {
                // a question fetch still in flight no longer applies
                self.generation += 1;
                self.loading = false;
                self.question_type = None;
                FlowStep::Difficulty
            }
            actual => {
                return Err(QuizFlowError::WrongStep {
                    expected: FlowStep::Type,
                    actual,
                });
            }
        };
        Ok(self.step)
    }

    /// Record the question type and fetch the questions.
    ///
    /// A failed fetch keeps the flow at the type step and sets a notice.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the type step.
    pub async fn select_type(
        &mut self,
        question_type: QuestionType,
    ) -> Result<Applied, QuizFlowError> {
        let ticket = self.begin_question_fetch(question_type)?;
        let Some(selection) = ticket.selection().copied() else {
            return Err(QuizFlowError::IncompleteSelection);
        };
        let trivia = Arc::clone(&self.trivia);
        let result = trivia.fetch_questions(&selection).await;
        Ok(self.apply_questions(ticket, result))
    }

    /// Record the question type and hand out a ticket for the question fetch.
    ///
    /// The caller performs the fetch and passes the outcome to
    /// [`QuizFlow::apply_questions`].
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the type step and `IncompleteSelection`
    /// when no category or difficulty was chosen.
    pub fn begin_question_fetch(
        &mut self,
        question_type: QuestionType,
    ) -> Result<FetchTicket, QuizFlowError> {
        self.expect_step(FlowStep::Type)?;
        self.question_type = Some(question_type);
        let selection = self.selection().ok_or(QuizFlowError::IncompleteSelection)?;
        self.generation += 1;
        self.loading = true;
        self.notice = None;
        Ok(FetchTicket {
            generation: self.generation,
            kind: FetchKind::Questions(selection),
        })
    }

    /// Apply a question response if it still belongs to the current request.
    pub fn apply_questions(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Question>, TriviaError>,
    ) -> Applied {
        let FetchKind::Questions(selection) = ticket.kind else {
            return Applied::Stale;
        };
        if ticket.generation != self.generation
            || self.step != FlowStep::Type
            || self.selection() != Some(selection)
        {
            debug!(quiz_id = %selection.quiz_id(), "dropping stale question response");
            return Applied::Stale;
        }

        self.loading = false;
        match result {
            Ok(questions) if questions.is_empty() => {
                self.notice = Some(FlowNotice::questions_unavailable(&TriviaError::NoResults));
            }
            Ok(questions) => self.enter_quiz(questions),
            Err(err) => {
                warn!(quiz_id = %selection.quiz_id(), error = %err, "failed to load questions");
                self.notice = Some(FlowNotice::questions_unavailable(&err));
            }
        }
        Applied::Applied
    }

    /// Start over with the selection encoded in `quiz_id` and fetch a fresh set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuizId` if `quiz_id` cannot be parsed.
    pub async fn start_retake(&mut self, quiz_id: &QuizId) -> Result<Applied, QuizFlowError> {
        let selection = QuizId::parse(quiz_id.as_str())?;
        self.reset();

        let category = self
            .categories
            .iter()
            .find(|c| c.id() == selection.category)
            .cloned()
            .unwrap_or_else(|| {
                Category::new(selection.category, format!("Category {}", selection.category))
            });
        self.category = Some(category);
        self.difficulty = Some(selection.difficulty);
        self.step = FlowStep::Type;
        self.select_type(selection.question_type).await
    }

    fn enter_quiz(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.current = 0;
        self.answers.clear();
        self.shuffles.clear();
        self.started_at = Some(self.clock.now());
        self.completed_at = None;
        self.session = None;
        self.results = None;
        self.step = FlowStep::Quiz;
    }

    //
    // ─── ANSWERING ──────────────────────────────────────────────────────────────
    //

    /// Display order of the current question's answers, shuffled once.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the quiz step.
    pub fn choices(&mut self) -> Result<&[String], QuizFlowError> {
        self.choices_for(self.current)
    }

    /// # Errors
    ///
    /// Returns `WrongStep` outside the quiz step and `OutOfRange` for an
    /// unknown index.
    pub fn choices_for(&mut self, index: usize) -> Result<&[String], QuizFlowError> {
        self.expect_step(FlowStep::Quiz)?;
        let question = self.questions.get(index).ok_or(QuizFlowError::OutOfRange {
            index,
            len: self.questions.len(),
        })?;
        Ok(self.shuffles.choices_for(index, question, &mut self.rng))
    }

    /// Record `answer` for the current question and save the running attempt.
    ///
    /// Answering again replaces the earlier pick. The first answer of an
    /// attempt replaces any session stored for the same quiz id.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the quiz step, `UnknownAnswer` when
    /// `answer` is not one of the question's choices, and `Storage` if the
    /// session cannot be saved (the answer stays recorded in memory).
    pub async fn record_answer(&mut self, answer: &str) -> Result<(), QuizFlowError> {
        self.expect_step(FlowStep::Quiz)?;
        let question = self
            .questions
            .get(self.current)
            .ok_or(QuizFlowError::NoQuestions)?;
        let known = question.is_correct(answer)
            || question.incorrect_answers().iter().any(|a| a == answer);
        if !known {
            return Err(QuizFlowError::UnknownAnswer(answer.to_owned()));
        }

        self.answers.record(self.current, answer);
        self.save_running_session().await
    }

    async fn save_running_session(&mut self) -> Result<(), QuizFlowError> {
        let quiz_id = self.quiz_id().ok_or(QuizFlowError::IncompleteSelection)?;
        if self.session.is_none() {
            let started_at = self.started_at.unwrap_or_else(|| self.clock.now());
            self.session = Some(QuizSession::start(
                quiz_id.clone(),
                self.questions.clone(),
                started_at,
            ));
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.user_answers = self.answers.clone();
        self.sessions.set(&quiz_id, session).await?;
        Ok(())
    }

    //
    // ─── NAVIGATION ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.step == FlowStep::Quiz && self.answers.is_answered(self.current)
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.step == FlowStep::Quiz && self.current > 0
    }

    /// Move to the next question, or finish the quiz from the last one.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the quiz step, `Unanswered` when the
    /// current question has no answer, and `Storage` if the completion writes
    /// fail (the flow is already on the results step by then).
    pub async fn next(&mut self) -> Result<NextOutcome, QuizFlowError> {
        self.expect_step(FlowStep::Quiz)?;
        if !self.answers.is_answered(self.current) {
            return Err(QuizFlowError::Unanswered);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            return Ok(NextOutcome::Advanced {
                index: self.current,
            });
        }

        self.complete().await.map(NextOutcome::Completed)
    }

    /// # Errors
    ///
    /// Returns `WrongStep` outside the quiz step and `AtFirstQuestion` at index 0.
    pub fn previous(&mut self) -> Result<usize, QuizFlowError> {
        self.expect_step(FlowStep::Quiz)?;
        if self.current == 0 {
            return Err(QuizFlowError::AtFirstQuestion);
        }
        self.current -= 1;
        Ok(self.current)
    }

    /// Jump to any question, answered or not. The index is clamped to the
    /// question list.
    ///
    /// # Errors
    ///
    /// Returns `WrongStep` outside the quiz step.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, QuizFlowError> {
        self.expect_step(FlowStep::Quiz)?;
        let last = self
            .questions
            .len()
            .checked_sub(1)
            .ok_or(QuizFlowError::NoQuestions)?;
        self.current = index.min(last);
        Ok(self.current)
    }

    async fn complete(&mut self) -> Result<QuizResults, QuizFlowError> {
        let quiz_id = self.quiz_id().ok_or(QuizFlowError::IncompleteSelection)?;
        let completed_at = self.clock.now();
        let started_at = self.started_at.unwrap_or(completed_at);

        let score = scoring::score(&self.questions, &self.answers);
        let progress = QuizProgress::completed(&self.questions, &self.answers, score, completed_at);
        let results = QuizResults {
            quiz_id: quiz_id.clone(),
            category_name: self.category.as_ref().map(|c| c.name().to_owned()),
            score,
            total: progress.total_questions,
            accuracy_percent: scoring::accuracy_percent(score, progress.total_questions),
            elapsed: format_elapsed(started_at, completed_at),
            started_at,
            completed_at,
            review: progress.answers.clone(),
        };

        self.completed_at = Some(completed_at);
        self.results = Some(results.clone());
        self.step = FlowStep::Results;
        info!(%quiz_id, score, total = results.total, "quiz completed");

        // Two independent writes; a failure in the second leaves the first in place.
        self.progress.set(&quiz_id, &progress).await?;

        if self.session.is_none() {
            self.session = Some(QuizSession::start(
                quiz_id.clone(),
                self.questions.clone(),
                started_at,
            ));
        }
        if let Some(session) = self.session.as_mut() {
            session.user_answers = self.answers.clone();
            session.finalize(completed_at);
            self.sessions.set(&quiz_id, session).await?;
        }

        Ok(results)
    }

    //
    // ─── RESET ──────────────────────────────────────────────────────────────────
    //

    /// Return to the category step and forget the current attempt.
    ///
    /// Loaded categories are kept. Stored sessions and progress are untouched,
    /// and any question fetch still in flight becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.step = FlowStep::Category;
        self.category = None;
        self.difficulty = None;
        self.question_type = None;
        self.questions.clear();
        self.current = 0;
        self.answers.clear();
        self.shuffles.clear();
        self.started_at = None;
        self.completed_at = None;
        self.session = None;
        self.results = None;
        self.notice = None;
        self.loading = false;
    }

    /// The error panel offers a single action: start over.
    pub fn dismiss_notice(&mut self) {
        self.reset();
    }

    //
    // ─── ACCESSORS ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn step(&self) -> FlowStep {
        self.step
    }

    #[must_use]
    pub fn notice(&self) -> Option<&FlowNotice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn selected_category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[must_use]
    pub fn question_type(&self) -> Option<QuestionType> {
        self.question_type
    }

    #[must_use]
    pub fn selection(&self) -> Option<QuizSelection> {
        Some(QuizSelection::new(
            self.category.as_ref()?.id(),
            self.difficulty?,
            self.question_type?,
        ))
    }

    #[must_use]
    pub fn quiz_id(&self) -> Option<QuizId> {
        self.selection().map(QuizId::from)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.step == FlowStep::Quiz {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn results(&self) -> Option<&QuizResults> {
        self.results.as_ref()
    }
}
