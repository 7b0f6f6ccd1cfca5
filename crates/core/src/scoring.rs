use crate::model::{AnswerMap, Question};

/// Number of questions whose recorded answer matches the correct answer exactly.
#[must_use]
pub fn score(questions: &[Question], answers: &AnswerMap) -> u32 {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(idx, q)| answers.get(*idx).is_some_and(|a| q.is_correct(a)))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

/// `round(100 * score / total)`, or 0 for an empty quiz.
#[must_use]
pub fn accuracy_percent(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(score) * 100.0 / f64::from(total)).round();
    // score <= total keeps this within 0..=100
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct as u32;
    pct
}
