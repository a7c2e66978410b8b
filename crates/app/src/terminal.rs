//! Line-oriented terminal front end for a quiz session.

use chrono::Local;
use quiz_core::model::{Answers, Attempt, QuestionKind, QuestionSet, option_label};
use quiz_core::scoring;
use quiz_core::validate_answer;
use services::session::TICK_PERIOD;
use services::{AttemptListItem, Countdown, HistorySummary, QuizEvent, QuizLoopService, QuizSession};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

pub fn render_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();

    println!();
    println!(
        "Question {} of {}  ({}s)",
        progress.question_number(),
        progress.total,
        progress.time_remaining
    );
    println!("{}", question.prompt());
    match question.kind() {
        QuestionKind::MultipleChoice { options } => {
            for (index, option) in options.iter().enumerate() {
                let label = option_label(index).unwrap_or('?');
                println!("  {label}. {option}");
            }
            println!("Type a letter and press Enter:");
        }
        QuestionKind::NumericEntry => println!("Type a number and press Enter:"),
    }
}

pub fn render_result(attempt: &Attempt, persisted: bool) {
    println!();
    println!("Quiz complete!");
    println!(
        "Final score: {}/{} ({}% correct)",
        attempt.score(),
        attempt.total_questions(),
        attempt.percent_correct()
    );
    if !persisted {
        println!("(this attempt could not be saved to history)");
    }
}

/// Per-question review: what was given and, for misses, the expected answer.
pub fn render_breakdown(questions: &QuestionSet, answers: &Answers) {
    let marks = scoring::breakdown(questions, answers);
    for (index, (question, correct)) in questions.iter().zip(marks).enumerate() {
        let given = answers
            .get(index)
            .map_or_else(|| "-".to_string(), ToString::to_string);
        if correct {
            println!("  {}. [x] {given}", index + 1);
        } else {
            println!(
                "  {}. [ ] {given} (expected {})",
                index + 1,
                question.correct_answer()
            );
        }
    }
}

pub fn render_history(items: &[AttemptListItem]) {
    println!();
    println!("Attempt history");
    if items.is_empty() {
        println!("  No attempts yet. Start a quiz to see your history!");
        return;
    }
    for item in items {
        println!(
            "  {}  {}/{}  {}%",
            item.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            item.score,
            item.total_questions,
            item.percent_correct
        );
    }
    let summary = HistorySummary::from_items(items);
    if let Some(best) = summary.best_score {
        println!("  Best score: {best} over {} attempts", summary.attempts);
    }
}

/// Run sessions until the user declines another round or closes stdin.
///
/// `history` is the list already shown to the user; attempts that were saved
/// are appended to it so it stays current without re-reading the store.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run_quiz(
    quiz: &QuizLoopService,
    history: &mut Vec<AttemptListItem>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("Interactive Quiz");
    if let Some(best) = HistorySummary::from_items(history).best_score {
        println!("Previous best score: {best}/{}", quiz.questions().total());
    }

    let mut session = quiz.start_session();
    loop {
        let Some((attempt, persisted)) = play_round(quiz, &mut session, &mut input).await? else {
            println!();
            println!("Quiz abandoned; nothing was saved.");
            return Ok(());
        };

        render_result(&attempt, persisted);
        render_breakdown(session.questions(), session.answers());
        if persisted {
            history.push(AttemptListItem::from_attempt(&attempt));
        }
        render_history(history);

        println!();
        println!("Try again? [y/N]");
        match input.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => session.start(),
            _ => return Ok(()),
        }
    }
}

async fn play_round(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    input: &mut Input,
) -> Result<Option<(Attempt, bool)>, Box<dyn std::error::Error>> {
    let mut countdown = Countdown::start(TICK_PERIOD);
    render_question(session);

    loop {
        let event = tokio::select! {
            Some(()) = countdown.tick() => quiz.tick(session).await?,
            line = input.next_line() => {
                let Some(raw) = line? else {
                    return Ok(None);
                };
                let Some(question) = session.current_question() else {
                    continue;
                };
                match validate_answer(question, &raw) {
                    Ok(value) => quiz.submit_answer(session, value).await?,
                    Err(err) => {
                        session.set_pending_input(raw.trim());
                        println!("{err}; you typed {:?}", session.pending_input());
                        continue;
                    }
                }
            }
        };

        match event {
            QuizEvent::Ticked { remaining } => {
                if remaining == 10 || remaining <= 5 {
                    println!("  {remaining}s left");
                }
            }
            QuizEvent::Advanced { timed_out, .. } => {
                countdown.restart();
                if timed_out {
                    println!("Time's up!");
                }
                render_question(session);
            }
            QuizEvent::Finished { attempt, persisted } => {
                countdown.stop();
                return Ok(Some((attempt, persisted)));
            }
        }
    }
}
