mod client;
mod notify;
mod server;
mod session;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use client::BackendClient;
use notify::ConsoleObserver;
use session::Session;
use zen_core::{
    CalendarDay, DEFAULT_MEDITATION_SECS, Priority, RepeatKind, Task, TaskFilter, TaskUpdate,
    exp_for_next_level, expand_repeats, filter_tasks, next_task_id, now_unix_secs, remove_task,
    task_stats, update_task,
};
use zen_store::{Config, UserStore};

#[derive(Parser)]
#[command(name = "zen", about = "Meditation companion CLI and backend server")]
struct Cli {
    /// Override user auto-detection
    #[arg(long, global = true)]
    user: Option<String>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a completed meditation session
    Meditate {
        /// Session length in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Ask the master a question
    Chat {
        /// Your question
        message: String,
    },

    /// Practice journal
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Show both progression tracks
    Stats,

    /// List practice goals
    Goals,

    /// Planner tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Start the companion backend server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },

    /// Export the profile to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Import a profile from a JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum JournalAction {
    /// Add an entry
    Add { content: String },
    /// List entries, newest first
    List,
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task
    Add {
        title: String,
        /// high, medium, or low
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Due date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Repeat rule: daily, weekly, monthly
        #[arg(long)]
        repeat: Option<String>,
        /// Number of repeat instances to schedule
        #[arg(long, default_value_t = 0)]
        count: u32,
    },
    /// List tasks
    List {
        /// all, today, upcoming, or past
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Mark a task completed
    Done { id: u64 },
    /// Delete a task (with --all, a repeat family goes together)
    Rm {
        id: u64,
        #[arg(long)]
        all: bool,
    },
    /// Show planner stats
    Stats,
}

fn data_dir() -> Option<PathBuf> {
    std::env::var("ZEN_DATA_DIR").ok().map(PathBuf::from)
}

fn open_store(cli: &Cli) -> Result<(UserStore, Config)> {
    let base = data_dir();
    let config = Config::load(base.as_deref().unwrap_or(&zen_store::default_base_dir()));
    let user = cli.user.as_deref().or(config.user.as_deref());
    let store = UserStore::open(user, base.as_deref()).context("failed to open user store")?;
    Ok((store, config))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Meditate { minutes } => cmd_meditate(&cli, *minutes),
        Commands::Chat { message } => cmd_chat(&cli, message).await,
        Commands::Journal { action } => cmd_journal(&cli, action),
        Commands::Stats => cmd_stats(&cli),
        Commands::Goals => cmd_goals(&cli),
        Commands::Tasks { action } => cmd_tasks(&cli, action).await,
        Commands::Serve { port } => cmd_serve(&cli, *port).await,
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Import { path } => cmd_import(&cli, path),
    }
}

// ---------------------------------------------------------------------------
// Advisory pidfile for observability
// ---------------------------------------------------------------------------

fn pidfile_path() -> PathBuf {
    let base = data_dir().unwrap_or_else(zen_store::default_base_dir);
    base.join("zen-serve.pid")
}

/// Check for an existing pidfile and log accordingly, then write our own.
fn acquire_pidfile() -> Option<PathBuf> {
    let path = pidfile_path();
    if let Ok(content) = std::fs::read_to_string(&path)
        && let Ok(pid) = content.trim().parse::<u32>()
    {
        if is_process_alive(pid) {
            tracing::warn!("another zen serve (PID {pid}) is running — coexisting via busy_timeout");
        } else {
            tracing::info!("cleaned up stale pidfile (PID {pid} is dead)");
            let _ = std::fs::remove_file(&path);
        }
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::File::create(&path) {
        Ok(mut f) => {
            let _ = write!(f, "{}", std::process::id());
            tracing::info!("wrote pidfile: {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("failed to write pidfile: {e}");
            None
        }
    }
}

fn release_pidfile(path: &std::path::Path) {
    let _ = std::fs::remove_file(path);
    tracing::info!("removed pidfile: {}", path.display());
}

#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    // kill(pid, 0) checks existence without sending a signal
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    false // conservative: assume dead on non-unix
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_meditate(cli: &Cli, minutes: Option<u32>) -> Result<()> {
    let (store, config) = open_store(cli)?;
    let minutes = minutes
        .or(config.default_minutes)
        .unwrap_or(DEFAULT_MEDITATION_SECS / 60);

    let mut session = Session::new(&store, ConsoleObserver);
    let report = session.complete_meditation(minutes * 60)?;

    println!("坐禅 {minutes} 分钟，功不唐捐。");
    println!(
        "sessions:  {} (level {}, {}%)",
        report.cultivation.meditation_count, report.cultivation.level, report.cultivation.progress
    );
    println!("streak:    {} day(s)", report.cultivation.streak_days);
    println!(
        "realm:     {} · level {} · {}/{} exp",
        report.realm.realm().name,
        report.realm.level,
        report.realm.exp,
        exp_for_next_level(report.realm.level)
    );
    for title in &report.outcome.completed_goals {
        println!("goal completed: {title}");
    }
    Ok(())
}

async fn cmd_chat(cli: &Cli, message: &str) -> Result<()> {
    let (store, config) = open_store(cli)?;
    let mut session = Session::new(&store, ConsoleObserver);

    if let Some(client) = BackendClient::from_config(&config) {
        match client.chat(store.user_id(), message).await {
            Ok(reply) => {
                println!("禅师: {}", reply.response);
                println!("今日剩余对话次数: {}", reply.remaining_chats);
                return session.record_chat(&reply.response);
            }
            Err(e) => {
                // Surface the failure in the transcript, then stay local.
                tracing::warn!("remote master unavailable: {e}");
                println!("与禅师的连接似乎出现了问题，转为离线应答。");
            }
        }
    }

    match session.local_master_reply(message)? {
        Some((reply, remaining)) => {
            println!("禅师: {reply}");
            println!("今日剩余对话次数: {remaining}");
            session.record_chat(&reply)
        }
        None => {
            println!("今日对话次数已用完，明日再来。");
            Ok(())
        }
    }
}

fn cmd_journal(cli: &Cli, action: &JournalAction) -> Result<()> {
    let (store, _config) = open_store(cli)?;
    let mut session = Session::new(&store, ConsoleObserver);

    match action {
        JournalAction::Add { content } => {
            session.add_journal(content)?;
            println!("journal saved");
        }
        JournalAction::List => {
            let cultivation = session.load_cultivation_checked(now_unix_secs())?;
            if cultivation.journals.is_empty() {
                println!("(no journal entries)");
            }
            for entry in &cultivation.journals {
                println!("{}  {}", entry.date, entry.content);
            }
        }
    }
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let (store, _config) = open_store(cli)?;
    let session = Session::new(&store, ConsoleObserver);
    let now = now_unix_secs();

    let cultivation = session.load_cultivation_checked(now)?;
    let realm = store.store().load_realm();
    let mut usage = store.store().load_chat_usage();

    let active_goal = cultivation.goals.iter().find(|g| g.active && !g.completed);
    let completed_goals = cultivation.goals.iter().filter(|g| g.completed).count();

    println!("user:       {}", store.user_id());
    println!(
        "realm:      {} · level {} · {}/{} exp",
        realm.realm().name,
        realm.level,
        realm.exp,
        exp_for_next_level(realm.level)
    );
    println!(
        "level:      {} ({}% of the way)",
        cultivation.level, cultivation.progress
    );
    println!("sessions:   {}", cultivation.meditation_count);
    println!("streak:     {} day(s)", cultivation.streak_days);
    println!(
        "chats:      {} total, {} left today",
        cultivation.chat_count,
        usage.remaining(now)
    );
    match active_goal {
        Some(goal) => println!(
            "goal:       {} ({}/{}), {} completed",
            goal.title, goal.progress, goal.target, completed_goals
        ),
        None => println!("goal:       none active, {completed_goals} completed"),
    }
    println!("journal:    {} entries", cultivation.journals.len());
    Ok(())
}

fn cmd_goals(cli: &Cli) -> Result<()> {
    let (store, _config) = open_store(cli)?;
    let session = Session::new(&store, ConsoleObserver);
    let cultivation = session.load_cultivation_checked(now_unix_secs())?;

    for goal in &cultivation.goals {
        let marker = if goal.completed {
            "done  "
        } else if goal.active {
            "active"
        } else {
            "queued"
        };
        println!(
            "[{marker}] {} ({}/{})",
            goal.title,
            goal.progress.min(goal.target),
            goal.target
        );
    }
    Ok(())
}

async fn cmd_tasks(cli: &Cli, action: &TaskAction) -> Result<()> {
    let (store, config) = open_store(cli)?;
    let mut tasks = store.store().load_tasks();
    let today = CalendarDay::from_unix(now_unix_secs());
    let remote = BackendClient::from_config(&config);

    match action {
        TaskAction::Add {
            title,
            priority,
            date,
            repeat,
            count,
        } => {
            let priority = Priority::parse(priority)
                .with_context(|| format!("unknown priority: {priority}"))?;
            let date = date.clone().unwrap_or_else(|| today.to_string());

            let id = next_task_id(&tasks);
            let mut task = Task::new(id, title, priority, &date);
            if let Some(repeat) = repeat {
                task.repeat = RepeatKind::parse(repeat)
                    .with_context(|| format!("unknown repeat rule: {repeat}"))?;
                task.repeat_count = *count;
            }

            let instances = expand_repeats(&task, id + 1);
            let created = 1 + instances.len();
            tasks.push(task.clone());
            tasks.extend(instances);
            store.store().save_tasks(&tasks)?;
            println!("added task {id} ({created} scheduled)");

            if let Some(client) = &remote {
                if let Err(e) = client.push_task(&task).await {
                    tracing::warn!("task sync failed, keeping local copy only: {e}");
                }
            }
        }
        TaskAction::List { filter } => {
            let filter = TaskFilter::parse(filter);
            let matched = filter_tasks(&tasks, filter, today);
            if matched.is_empty() {
                println!("(no tasks)");
            }
            for task in matched {
                let mark = if task.completed { "x" } else { " " };
                println!(
                    "[{mark}] #{:<4} {}  {:<6}  {}",
                    task.id,
                    task.date,
                    task.priority.as_str(),
                    task.title
                );
            }
        }
        TaskAction::Done { id } => {
            let update = TaskUpdate {
                completed: Some(true),
                ..TaskUpdate::default()
            };
            if !update_task(&mut tasks, *id, &update) {
                anyhow::bail!("task {id} not found");
            }
            store.store().save_tasks(&tasks)?;
            println!("task {id} completed");

            if let (Some(client), Some(task)) = (&remote, tasks.iter().find(|t| t.id == *id)) {
                if let Err(e) = client.push_task_update(task).await {
                    tracing::warn!("task sync failed, keeping local copy only: {e}");
                }
            }
        }
        TaskAction::Rm { id, all } => {
            let removed = remove_task(&mut tasks, *id, *all);
            if removed == 0 {
                anyhow::bail!("task {id} not found");
            }
            store.store().save_tasks(&tasks)?;
            println!("removed {removed} task(s)");

            if let Some(client) = &remote {
                if let Err(e) = client.delete_task(*id).await {
                    tracing::warn!("task sync failed, keeping local copy only: {e}");
                }
            }
        }
        TaskAction::Stats => {
            let stats = task_stats(&tasks, today);
            println!("completed:  {}", stats.completed_total);
            println!("today:      {} pending", stats.today_pending);
            println!("upcoming:   {}", stats.upcoming_total);
            println!(
                "pending:    {} high, {} medium, {} low",
                stats.high_pending, stats.medium_pending, stats.low_pending
            );
        }
    }
    Ok(())
}

async fn cmd_serve(cli: &Cli, port: u16) -> Result<()> {
    let (store, _config) = open_store(cli)?;
    tracing::info!(
        "starting companion backend for user '{}'",
        store.user_id()
    );

    let pidfile = acquire_pidfile();
    server::run(store, port).await?;

    if let Some(path) = pidfile {
        release_pidfile(&path);
    }
    Ok(())
}

fn cmd_export(cli: &Cli, path: &std::path::Path) -> Result<()> {
    let (store, _config) = open_store(cli)?;
    let json = store
        .export_profile(now_unix_secs())
        .context("failed to serialize profile")?;
    std::fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;

    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(cli: &Cli, path: &std::path::Path) -> Result<()> {
    let (store, _config) = open_store(cli)?;
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    store.import_profile(&json).context("failed to import profile")?;

    let cultivation = store.store().load_cultivation();
    let realm = store.store().load_realm();
    println!(
        "imported from {}. sessions={}, level={}, realm level={}",
        path.display(),
        cultivation.meditation_count,
        cultivation.level,
        realm.level
    );
    Ok(())
}
