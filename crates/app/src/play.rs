use std::io;

use quiz_core::model::{Difficulty, QuestionType};
use services::{FlowStep, NextOutcome, NoticeSource, QuizFlow, QuizFlowError, QuizResults};
use tracing::debug;

use crate::prompt::{menu_index, read_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizInput {
    Answer(usize),
    Next,
    Previous,
    Goto(usize),
    Reset,
    Quit,
}

impl QuizInput {
    fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace();
        let input = match parts.next()? {
            "n" => Self::Next,
            "p" => Self::Previous,
            "r" => Self::Reset,
            "q" => Self::Quit,
            "g" => Self::Goto(menu_index(parts.next()?, usize::MAX)?),
            other => Self::Answer(menu_index(other, usize::MAX)?),
        };
        if parts.next().is_some() {
            return None;
        }
        Some(input)
    }
}

/// Interactive loop over one flow until the user quits or input ends.
pub async fn run(mut flow: QuizFlow) -> io::Result<()> {
    flow.load_categories().await;

    loop {
        let control = if let Some(notice) = flow.notice() {
            let (source, message) = (notice.source(), notice.message().to_owned());
            notice_step(&mut flow, source, &message).await?
        } else {
            match flow.step() {
                FlowStep::Category => category_step(&mut flow)?,
                FlowStep::Difficulty => difficulty_step(&mut flow)?,
                FlowStep::Type => type_step(&mut flow).await?,
                FlowStep::Quiz => quiz_step(&mut flow).await?,
                FlowStep::Results => results_step(&mut flow).await?,
            }
        };
        if control == Control::Quit {
            return Ok(());
        }
    }
}

fn report(err: &QuizFlowError) {
    debug!(error = ?err, "flow rejected input");
    println!("  ! {err}");
}

fn step_back(flow: &mut QuizFlow) {
    if let Err(err) = flow.back() {
        report(&err);
    }
}

async fn notice_step(
    flow: &mut QuizFlow,
    source: NoticeSource,
    message: &str,
) -> io::Result<Control> {
    println!();
    println!("{message}");
    let Some(line) = read_line("Press Enter to start over (q to quit): ")? else {
        return Ok(Control::Quit);
    };
    if line == "q" {
        return Ok(Control::Quit);
    }
    flow.dismiss_notice();
    // categories survive a reset; only a failed category load needs a retry
    if source == NoticeSource::Categories {
        flow.load_categories().await;
    }
    Ok(Control::Continue)
}

fn category_step(flow: &mut QuizFlow) -> io::Result<Control> {
    println!();
    println!("Choose a category:");
    for (i, category) in flow.categories().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, category.name());
    }
    let Some(line) = read_line("category> ")? else {
        return Ok(Control::Quit);
    };
    if line == "q" {
        return Ok(Control::Quit);
    }

    let Some(index) = menu_index(&line, flow.categories().len()) else {
        println!("  ! pick a number from the list");
        return Ok(Control::Continue);
    };
    let id = flow.categories()[index].id();
    if let Err(err) = flow.select_category(id) {
        report(&err);
    }
    Ok(Control::Continue)
}

fn difficulty_step(flow: &mut QuizFlow) -> io::Result<Control> {
    println!();
    if let Some(category) = flow.selected_category() {
        println!("{}", category.name());
    }
    println!("Choose a difficulty:");
    for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, difficulty.label());
    }
    let Some(line) = read_line("difficulty (b back to categories, r to start over)> ")? else {
        return Ok(Control::Quit);
    };
    match line.as_str() {
        "q" => return Ok(Control::Quit),
        "r" => flow.reset(),
        "b" => step_back(flow),
        raw => match menu_index(raw, Difficulty::ALL.len()) {
            Some(i) => {
                if let Err(err) = flow.select_difficulty(Difficulty::ALL[i]) {
                    report(&err);
                }
            }
            None => println!("  ! pick a number from the list"),
        },
    }
    Ok(Control::Continue)
}

async fn type_step(flow: &mut QuizFlow) -> io::Result<Control> {
    println!();
    println!("Choose a question type:");
    for (i, question_type) in QuestionType::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, question_type.label());
    }
    let Some(line) = read_line("type (b back to difficulty, r to start over)> ")? else {
        return Ok(Control::Quit);
    };
    match line.as_str() {
        "q" => return Ok(Control::Quit),
        "r" => flow.reset(),
        "b" => step_back(flow),
        raw => match menu_index(raw, QuestionType::ALL.len()) {
            Some(i) => {
                println!("Loading questions...");
                if let Err(err) = flow.select_type(QuestionType::ALL[i]).await {
                    report(&err);
                }
            }
            None => println!("  ! pick a number from the list"),
        },
    }
    Ok(Control::Continue)
}

fn navigator(flow: &QuizFlow) -> String {
    (0..flow.questions().len())
        .map(|i| {
            let mark = if i == flow.current_index() {
                '>'
            } else if flow.answers().is_answered(i) {
                '*'
            } else {
                ' '
            };
            format!("{mark}{}", i + 1)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn quiz_step(flow: &mut QuizFlow) -> io::Result<Control> {
    let index = flow.current_index();
    let total = flow.questions().len();
    let Some(question) = flow.current_question().map(|q| q.question().to_owned()) else {
        flow.reset();
        return Ok(Control::Continue);
    };
    let choices = match flow.choices() {
        Ok(choices) => choices.to_vec(),
        Err(err) => {
            report(&err);
            flow.reset();
            return Ok(Control::Continue);
        }
    };
    let selected = flow.answers().get(index).map(str::to_owned);

    println!();
    println!("[{}]", navigator(flow));
    println!("Question {} of {total}", index + 1);
    println!("{question}");
    for (i, choice) in choices.iter().enumerate() {
        let mark = if selected.as_deref() == Some(choice.as_str()) {
            'x'
        } else {
            ' '
        };
        println!("  [{mark}] {}. {choice}", i + 1);
    }

    let label = if index + 1 == total {
        "answer # | n finish | p prev | g <k> | r | q> "
    } else {
        "answer # | n next | p prev | g <k> | r | q> "
    };
    let Some(line) = read_line(label)? else {
        return Ok(Control::Quit);
    };
    let Some(input) = QuizInput::parse(&line) else {
        println!("  ! unrecognised input");
        return Ok(Control::Continue);
    };

    let outcome = match input {
        QuizInput::Quit => return Ok(Control::Quit),
        QuizInput::Reset => {
            flow.reset();
            Ok(())
        }
        QuizInput::Answer(i) => match choices.get(i) {
            Some(choice) => flow.record_answer(choice).await,
            None => {
                println!("  ! pick one of the listed answers");
                Ok(())
            }
        },
        QuizInput::Next => flow.next().await.map(|outcome| {
            if let NextOutcome::Advanced { index } = outcome {
                debug!(index, "advanced");
            }
        }),
        QuizInput::Previous => flow.previous().map(|_| ()),
        QuizInput::Goto(k) => flow.jump_to(k).map(|_| ()),
    };
    if let Err(err) = outcome {
        report(&err);
    }
    Ok(Control::Continue)
}

fn print_results(results: &QuizResults) {
    println!();
    println!("Quiz complete: {}", results.quiz_id);
    if let Some(name) = &results.category_name {
        println!("Category: {name}");
    }
    println!(
        "Score: {}/{}  Accuracy: {}%  Time: {}",
        results.score, results.total, results.accuracy_percent, results.elapsed
    );
    println!(
        "Correct: {}  Incorrect: {}",
        results.score,
        results.incorrect()
    );
    for (i, entry) in results.review.iter().enumerate() {
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

async fn results_step(flow: &mut QuizFlow) -> io::Result<Control> {
    let Some(results) = flow.results().cloned() else {
        flow.reset();
        return Ok(Control::Continue);
    };
    print_results(&results);

    let Some(line) = read_line("Enter for a new quiz, t to retake, q to quit> ")? else {
        return Ok(Control::Quit);
    };
    match line.as_str() {
        "q" => return Ok(Control::Quit),
        "t" => {
            println!("Loading questions...");
            if let Err(err) = flow.start_retake(&results.quiz_id).await {
                report(&err);
            }
        }
        _ => flow.reset(),
    }
    Ok(Control::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quiz_commands() {
        assert_eq!(QuizInput::parse("2"), Some(QuizInput::Answer(1)));
        assert_eq!(QuizInput::parse("n"), Some(QuizInput::Next));
        assert_eq!(QuizInput::parse("p"), Some(QuizInput::Previous));
        assert_eq!(QuizInput::parse("g 10"), Some(QuizInput::Goto(9)));
        assert_eq!(QuizInput::parse("r"), Some(QuizInput::Reset));
        assert_eq!(QuizInput::parse("q"), Some(QuizInput::Quit));
    }

    #[test]
    fn rejects_malformed_quiz_commands() {
        assert_eq!(QuizInput::parse(""), None);
        assert_eq!(QuizInput::parse("0"), None);
        assert_eq!(QuizInput::parse("g"), None);
        assert_eq!(QuizInput::parse("g x"), None);
        assert_eq!(QuizInput::parse("n 2"), None);
    }
}
