use quiz_core::model::ProgressStatus;
use services::{SessionListItem, TrackingError, TrackingService};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn status_label(item: &SessionListItem) -> String {
    match (item.status, item.score) {
        (ProgressStatus::Completed, Some(score)) => format!("{score}/{}", item.total),
        (ProgressStatus::Completed, None) => "completed".into(),
        (ProgressStatus::InProgress, _) => format!("{}/{} answered", item.answered, item.total),
    }
}

/// Print every stored attempt, newest first.
pub async fn list(tracking: &TrackingService) -> Result<(), TrackingError> {
    let items = tracking.list_sessions().await?;
    if items.is_empty() {
        println!("No quizzes played yet.");
        return Ok(());
    }

    println!("{:<24} {:<18} {}", "QUIZ", "STARTED", "RESULT");
    for item in &items {
        println!(
            "{:<24} {:<18} {}",
            item.quiz_id,
            item.started_at.format(TIME_FORMAT),
            status_label(item)
        );
    }
    Ok(())
}

/// Print one attempt with its per-question review when completed.
pub async fn show(tracking: &TrackingService, raw: &str) -> Result<(), TrackingError> {
    let quiz_id = TrackingService::parse_quiz_id(raw)?;
    let Some(session) = tracking.session(&quiz_id).await? else {
        println!("No stored attempt for {quiz_id}.");
        return Ok(());
    };
    let item = SessionListItem::from_session(&session);

    println!("Quiz {quiz_id}");
    println!("Started:  {}", item.started_at.format(TIME_FORMAT));
    if let Some(done) = item.completed_at {
        println!("Finished: {}", done.format(TIME_FORMAT));
    }
    println!("Result:   {}", status_label(&item));

    if let Some(progress) = tracking.progress(&quiz_id).await? {
        println!(
            "Last recorded: {}/{} on {}",
            progress.score,
            progress.total_questions,
            progress.last_attempt.format(TIME_FORMAT)
        );
    }

    match tracking.review(&quiz_id).await? {
        Some(review) => {
            for (i, entry) in review.iter().enumerate() {
                let verdict = if entry.is_correct { "ok " } else { "miss" };
                println!("  {verdict} {}. {}", i + 1, entry.question);
                if !entry.is_correct {
                    println!(
                        "       yours: {}  correct: {}",
                        entry.selected.as_deref().unwrap_or("-"),
                        entry.correct_answer
                    );
                }
            }
        }
        None => println!("Attempt still in progress."),
    }
    Ok(())
}
