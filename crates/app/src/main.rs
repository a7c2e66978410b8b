use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quiz_core::model::{QuestionSet, QuestionSetError};
use services::{AttemptHistoryService, AttemptListItem, Clock, QuizLoopService, SessionConfig};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod terminal;

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeconds { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeconds { raw } => {
                write!(f, "invalid --seconds value: {raw} (expected a whole number >= 1)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    questions: Option<PathBuf>,
    seconds_per_question: u32,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play]  [--db <sqlite_url>] [--questions <file.json>] [--seconds <n>]");
    eprintln!("  quiz history [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --questions <built-in set>");
    eprintln!("  --seconds 30");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTIONS, QUIZ_SECONDS_PER_QUESTION, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

fn parse_seconds(raw: String) -> Result<u32, ArgsError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ArgsError::InvalidSeconds { raw }),
    }
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url =
            normalize_sqlite_url(env("QUIZ_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.into()));
        let mut questions = env("QUIZ_QUESTIONS").map(PathBuf::from);
        let mut seconds_per_question = match env("QUIZ_SECONDS_PER_QUESTION") {
            Some(raw) => parse_seconds(raw)?,
            None => SessionConfig::default().seconds_per_question,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--seconds" => {
                    seconds_per_question = parse_seconds(require_value(args, "--seconds")?)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions,
            seconds_per_question,
        })
    }
}

/// Turn any file-backed URL or bare path into an absolute `sqlite://` URL.
fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_string();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match path_str.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_str, None),
    };
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_questions(path: Option<&Path>) -> Result<QuestionSet, QuestionSetError> {
    match path {
        Some(path) => QuestionSet::from_json_path(path),
        None => Ok(QuestionSet::builtin()),
    }
}

async fn load_history(history: &AttemptHistoryService) -> Vec<AttemptListItem> {
    match history.list_attempts().await {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load attempts");
            Vec::new()
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // The store itself opens lazily; only make sure the file can be created.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url);
    let history_service = AttemptHistoryService::new(Arc::clone(&storage.attempts));
    let mut history = load_history(&history_service).await;

    match cmd {
        Command::History => {
            terminal::render_history(&history);
            Ok(())
        }
        Command::Play => {
            let questions = load_questions(parsed.questions.as_deref())?;
            let quiz = QuizLoopService::new(
                Clock::system(),
                Arc::new(questions),
                Arc::clone(&storage.attempts),
            )
            .with_config(SessionConfig {
                seconds_per_question: parsed.seconds_per_question,
            });

            terminal::run_quiz(&quiz, &mut history).await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter, |key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let args = parse(&[], &[]).unwrap();
        let expected = std::env::current_dir().unwrap().join("quiz.sqlite3");
        assert_eq!(args.db_url, format!("sqlite://{}", expected.display()));
        assert_eq!(args.questions, None);
        assert_eq!(args.seconds_per_question, 30);
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--seconds", "10", "--db", "sqlite::memory:"],
            &[
                ("QUIZ_SECONDS_PER_QUESTION", "45"),
                ("QUIZ_DB_URL", "sqlite:///tmp/env.sqlite3"),
                ("QUIZ_QUESTIONS", "questions.json"),
            ],
        )
        .unwrap();
        assert_eq!(args.seconds_per_question, 10);
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.questions, Some(PathBuf::from("questions.json")));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            parse(&["--seconds", "0"], &[]).unwrap_err(),
            ArgsError::InvalidSeconds { raw: "0".into() }
        );
        assert_eq!(
            parse(&["--db"], &[]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert_eq!(
            parse(&["--verbose"], &[]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
    }

    #[test]
    fn normalizes_sqlite_urls() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/quiz.db".into()),
            "sqlite:///var/quiz.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/quiz.db?mode=rwc".into()),
            "sqlite:///var/quiz.db?mode=rwc"
        );
        assert!(normalize_sqlite_url("quiz.db".into()).starts_with("sqlite:///"));
        assert!(normalize_sqlite_url("sqlite://quiz.db".into()).starts_with("sqlite:///"));
    }

    #[test]
    fn missing_question_file_is_reported() {
        let err = load_questions(Some(Path::new("/nonexistent/quiz-questions.json"))).unwrap_err();
        assert!(matches!(err, QuestionSetError::Io(_)));
        assert!(load_questions(None).is_ok());
    }

    #[test]
    fn commands_parse_by_name() {
        assert_eq!(Command::from_arg("play"), Some(Command::Play));
        assert_eq!(Command::from_arg("history"), Some(Command::History));
        assert_eq!(Command::from_arg("edit"), None);
    }
}
