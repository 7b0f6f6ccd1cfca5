use std::fmt;

use services::{Clock, QuizServices, TriviaConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod history;
mod play;
mod prompt;

const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingQuizId,
    InvalidDbUrl { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingQuizId => write!(f, "show requires a quiz id, e.g. 9-easy-multiple"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play]          [--db <sqlite_url>] [--api <base_url>]");
    eprintln!("  quiz history         [--db <sqlite_url>]");
    eprintln!("  quiz show <quiz-id>  [--db <sqlite_url>]");
    eprintln!("  quiz reset-progress  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL} (relative to the working directory)");
    eprintln!("  --api https://opentdb.com");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_TRIVIA_BASE_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play,
    History,
    Show(String),
    ResetProgress,
}

struct Args {
    command: Command,
    db_url: String,
    trivia: TriviaConfig,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter().peekable();

        // Default behavior: play when no subcommand is provided.
        let first = args.peek().cloned();
        let command = match first.as_deref() {
            Some("play") => {
                args.next();
                Command::Play
            }
            Some("history") => {
                args.next();
                Command::History
            }
            Some("show") => {
                args.next();
                match args.next() {
                    Some(id) if !id.starts_with("--") => Command::Show(id),
                    _ => return Err(ArgsError::MissingQuizId),
                }
            }
            Some("reset-progress") => {
                args.next();
                Command::ResetProgress
            }
            Some(other) if !other.starts_with('-') => {
                return Err(ArgsError::UnknownArg(other.to_owned()));
            }
            _ => Command::Play,
        };

        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.into());
        let mut trivia = TriviaConfig::from_env();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--api" => {
                    let value = require_value(&mut args, "--api")?;
                    if !value.starts_with("http://") && !value.starts_with("https://") {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    trivia = TriviaConfig::new(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url: normalize_sqlite_url(db_url),
            trivia,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

    let path = std::path::Path::new(path);
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
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // The database file plays the role of the browser profile.
    prepare_sqlite_file(&parsed.db_url)?;
    info!(db = %parsed.db_url, api = %parsed.trivia.base_url, "starting");
    let services =
        QuizServices::new_sqlite(&parsed.db_url, Clock::default_clock(), parsed.trivia).await?;

    match parsed.command {
        Command::Play => play::run(services.flow()).await?,
        Command::History => history::list(&services.tracking()).await?,
        Command::Show(raw) => history::show(&services.tracking(), &raw).await?,
        Command::ResetProgress => {
            services.tracking().reset_progress().await?;
            println!("Progress cleared. Saved sessions are kept.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
