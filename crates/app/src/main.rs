use std::io::{self, Write};
use std::sync::Arc;

use quiz_core::model::{CategoryId, ContentData, SessionId, TopicId, UserIdentity};
use quiz_core::sampler::RandomSource;
use services::{AppServices, Clock, QuizWorkflow, SessionSettings, StudySession, UserService};
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod terminal;

use args::{Args, Command, Parsed, UserAction, prepare_sqlite_file, print_usage};
use terminal::RunEnd;

const DEFAULT_USER: &str = "Guest";

fn init_tracing() {
    let filter = std::env::var("QUIZ_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let content = match &args.content {
        Some(path) => services::load_content(path).await?,
        None => ContentData::default(),
    };
    let app = AppServices::new(Clock::system(), SessionSettings::default(), content, &storage);
    info!(command = ?args.command, db = %args.db_url, "quiz ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.command {
        Command::Quiz | Command::Test => {
            let identity = resolve_identity(&app.users(), args.user.as_deref()).await?;
            match args.seed {
                Some(seed) => play(app.seeded_workflow(seed), &app, &args, &identity, &mut out).await,
                None => play(app.workflow(), &app, &args, &identity, &mut out).await,
            }
        }
        Command::Study => {
            let content = app.content();
            let id = TopicId::new(args.category.clone().unwrap_or_default());
            let topic = content
                .topic(&id)
                .ok_or_else(|| format!("unknown topic: {id}"))?;
            let mut study = StudySession::new();
            study.start(topic);
            terminal::run_study(&mut study, &mut io::stdin().lock(), &mut out)?;
            Ok(())
        }
        Command::Categories => {
            terminal::print_categories(&app.content(), &mut out)?;
            Ok(())
        }
        Command::Leaderboard => {
            let session_id = args
                .category
                .as_deref()
                .map_or_else(SessionId::test, SessionId::new);
            let entries = app.scores().leaderboard(&session_id, args.limit).await?;
            writeln!(out, "Leaderboard for {session_id}:")?;
            terminal::print_leaderboard(&entries, &mut out)?;
            Ok(())
        }
        Command::Users => manage_users(&app.users(), &args.user_action, &mut out).await,
    }
}

async fn play<R: RandomSource>(
    mut workflow: QuizWorkflow<R>,
    app: &AppServices,
    args: &Args,
    identity: &UserIdentity,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = app.content();
    let engine = workflow.engine_mut();
    if args.command == Command::Test {
        engine.start_test(&content.quiz_categories)?;
    } else {
        let id = CategoryId::new(args.category.clone().unwrap_or_default());
        let category = content
            .category(&id)
            .ok_or_else(|| format!("unknown category: {id}"))?;
        engine.start_quiz(category)?;
    }

    let end = terminal::run_session(engine, &mut io::stdin().lock(), out)?;
    if end == RunEnd::Quit {
        writeln!(out, "Session abandoned; nothing saved.")?;
        workflow.engine_mut().reset_session();
        return Ok(());
    }

    let outcome = workflow.complete(identity).await?;
    let seconds = workflow.engine().time_spent_seconds();
    terminal::print_outcome(&outcome, seconds, out)?;
    Ok(())
}

async fn resolve_identity(
    users: &Arc<UserService>,
    name: Option<&str>,
) -> Result<UserIdentity, Box<dyn std::error::Error>> {
    if let Some(name) = name {
        return Ok(users.find_or_create(name).await?.identity());
    }
    if let Some(identity) = users.current_identity().await? {
        return Ok(identity);
    }
    Ok(users.find_or_create(DEFAULT_USER).await?.identity())
}

async fn manage_users(
    users: &Arc<UserService>,
    action: &UserAction,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let find = |name: &str, all: &[quiz_core::model::User]| {
        all.iter()
            .find(|u| u.has_name(name))
            .map(|u| u.id().clone())
            .ok_or_else(|| format!("no user named {name:?}"))
    };

    match action {
        UserAction::List => {}
        UserAction::Add(name) => {
            let user = users.add_user(name).await?;
            writeln!(out, "Added {}", user.name())?;
        }
        UserAction::Remove(name) => {
            let id = find(name, &users.list_users().await?)?;
            users.remove_user(&id).await?;
            writeln!(out, "Removed {name}")?;
        }
        UserAction::Select(name) => {
            let id = find(name, &users.list_users().await?)?;
            let user = users.select_user(&id).await?;
            writeln!(out, "Selected {}", user.name())?;
        }
    }

    let all = users.list_users().await?;
    let current = users.current_user().await?;
    terminal::print_users(&all, current.as_ref(), out)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
