use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
pub const DEFAULT_LIMIT: usize = 10;

const MEMORY_URL: &str = "sqlite::memory:";
// A named shared-cache database so every pooled connection sees the same tables.
const SHARED_MEMORY_URL: &str = "sqlite:file:quiz_memdb?mode=memory&cache=shared";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    MissingContent,
    MissingCategory,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingContent => write!(f, "--content (or QUIZ_CONTENT) is required"),
            ArgsError::MissingCategory => write!(f, "--category is required"),
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

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quiz,
    Test,
    Study,
    Categories,
    Leaderboard,
    Users,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "test" => Some(Self::Test),
            "study" => Some(Self::Study),
            "categories" => Some(Self::Categories),
            "leaderboard" => Some(Self::Leaderboard),
            "users" => Some(Self::Users),
            _ => None,
        }
    }

    fn needs_content(self) -> bool {
        matches!(self, Self::Quiz | Self::Test | Self::Study | Self::Categories)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    List,
    Add(String),
    Remove(String),
    Select(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub content: Option<PathBuf>,
    pub user: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
    pub seed: Option<u64>,
    pub user_action: UserAction,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Args),
    Help,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz quiz        --category <id> [--user <name>] [--seed <n>]");
    eprintln!("  quiz test        [--user <name>] [--seed <n>]");
    eprintln!("  quiz study       --category <topic-id>");
    eprintln!("  quiz categories");
    eprintln!("  quiz leaderboard [--category <id>|test] [--limit <n>]");
    eprintln!("  quiz users       [--add <name> | --remove <name> | --select <name>]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>     default {DEFAULT_DB_URL}");
    eprintln!("  --content <path>      quiz content JSON");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CONTENT, QUIZ_USER, QUIZ_LOG (falls back to RUST_LOG)");
}

impl Args {
    /// Parse `argv` (without the program name). `env` supplies defaults that
    /// flags override.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut args = argv.into_iter();
        let command = match args.next() {
            None => return Ok(Parsed::Help),
            Some(first) if first == "--help" || first == "-h" => return Ok(Parsed::Help),
            Some(first) => Command::from_arg(&first).ok_or(ArgsError::UnknownCommand(first))?,
        };

        let mut db_url = env("QUIZ_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_owned(), normalize_sqlite_url);
        let mut content = env("QUIZ_CONTENT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let mut user = env("QUIZ_USER").filter(|v| !v.trim().is_empty());
        let mut category = None;
        let mut limit = DEFAULT_LIMIT;
        let mut seed = None;
        let mut user_action = UserAction::List;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => content = Some(require_value(&mut args, "--content")?.into()),
                "--user" => user = Some(require_value(&mut args, "--user")?),
                "--category" | "--topic" => {
                    category = Some(require_value(&mut args, "--category")?);
                }
                "--limit" => limit = parse_number(require_value(&mut args, "--limit")?, "--limit")?,
                "--seed" => seed = Some(parse_number(require_value(&mut args, "--seed")?, "--seed")?),
                "--add" => user_action = UserAction::Add(require_value(&mut args, "--add")?),
                "--remove" => user_action = UserAction::Remove(require_value(&mut args, "--remove")?),
                "--select" => user_action = UserAction::Select(require_value(&mut args, "--select")?),
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if command.needs_content() && content.is_none() {
            return Err(ArgsError::MissingContent);
        }
        if matches!(command, Command::Quiz | Command::Study) && category.is_none() {
            return Err(ArgsError::MissingCategory);
        }

        Ok(Parsed::Run(Self {
            command,
            db_url,
            content,
            user,
            category,
            limit,
            seed,
            user_action,
        }))
    }
}

/// Turn a bare path or `sqlite:` path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_URL {
        return SHARED_MEMORY_URL.to_owned();
    }
    if trimmed.starts_with("sqlite://") || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory if missing.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
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
