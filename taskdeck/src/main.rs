//! Taskdeck: task and calendar dashboard with live sync.
//!
//! Runs the dashboard engine against the in-process store and drives it
//! from a line-based prompt. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Start signed out
//! cargo run --bin taskdeck
//!
//! # Sign in on startup
//! cargo run --bin taskdeck -- --email dana@example.com
//!
//! # Or via environment variables
//! TASKDECK_EMAIL=dana@example.com cargo run
//! ```

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use taskdeck::auth::{AuthClient, MemoryAuth};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::dashboard::Dashboard;
use taskdeck::filter::{StatusFilter, TaskFilter};
use taskdeck::notify::{NoticeLevel, Notifier};
use taskdeck::session::Mirror;
use taskdeck::store::memory::MemoryStore;
use taskdeck::theme::ThemeStore;
use taskdeck::view::calendar::EditRequest;
use taskdeck::view::list::ListAction;
use taskdeck_model::{Priority, Task, TaskDraft, TaskId, UserProfile};

/// How long a command waits for its subscription echo before giving up.
const ECHO_WAIT: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    init_logging(&config.log_level);
    tracing::info!("taskdeck starting");

    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(Notifier::new(
        config.success_notice_ttl,
        config.error_notice_ttl,
    ));
    let auth = MemoryAuth::new();
    let (editor, form_requests) = mpsc::unbounded_channel();
    let dashboard = Arc::new(Dashboard::new(
        Arc::clone(&store),
        Arc::clone(&notifier),
        editor,
        &config,
    ));

    let engine = tokio::spawn({
        let dashboard = Arc::clone(&dashboard);
        let auth_state = auth.state();
        async move { dashboard.run(auth_state).await }
    });

    // The prompt has no form widgets; report what a frontend would open.
    tokio::spawn(report_form_requests(form_requests));

    if let Some(email) = config.email.clone() {
        auth.sign_in(UserProfile::with_generated_id(email));
    }

    let theme = theme_store(&config);
    let result = run_prompt(&dashboard, &auth, &notifier, &theme, &config).await;

    engine.abort();
    tracing::info!("taskdeck exiting");
    result
}

/// Logs go to stderr so they never interleave with prompt output.
fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();
}

fn theme_store(config: &ClientConfig) -> ThemeStore {
    if let Some(path) = &config.theme_file {
        return ThemeStore::at(path);
    }
    match ThemeStore::default_location() {
        Ok(store) => store,
        Err(error) => {
            tracing::warn!(%error, "falling back to a temporary theme file");
            ThemeStore::at(std::env::temp_dir().join("taskdeck-theme"))
        }
    }
}

async fn report_form_requests(mut requests: mpsc::UnboundedReceiver<EditRequest>) {
    while let Some(request) = requests.recv().await {
        match request {
            EditRequest::Create(draft) => {
                let due = draft
                    .due_date
                    .map_or_else(|| "no due date".to_string(), |d| d.to_rfc3339());
                println!("[form] create task ({due})");
            }
            EditRequest::Edit(task) => {
                println!(
                    "[form] edit \"{}\" (use: edit {} field=value)",
                    task.title,
                    short_id(task.id)
                );
            }
        }
    }
}

async fn run_prompt(
    dashboard: &Dashboard<MemoryStore>,
    auth: &MemoryAuth,
    notifier: &Notifier,
    theme: &ThemeStore,
    config: &ClientConfig,
) -> std::io::Result<()> {
    println!("taskdeck ready; type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_notice = 0u64;

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "help" => print_help(),
            "login" => {
                if rest.is_empty() {
                    println!("usage: login <email>");
                } else {
                    auth.sign_in(UserProfile::with_generated_id(rest));
                    await_mirror(dashboard, |m| m.user.is_some()).await;
                }
            }
            "logout" => {
                if let Err(error) = auth.sign_out().await {
                    println!("logout failed: {error}");
                } else {
                    await_mirror(dashboard, |m| m.user.is_none()).await;
                    println!("Logged out successfully!");
                }
            }
            "add" => add_task(dashboard, config, rest).await,
            "list" => print_list(dashboard),
            "cal" => print_calendar(dashboard),
            "done" => toggle_task(dashboard, rest).await,
            "edit" => edit_task(dashboard, config, rest).await,
            "rm" => delete_task(dashboard, &mut lines, rest).await?,
            "filter" => set_filter(dashboard, rest),
            "tags" => println!("tags: {}", dashboard.tag_options().join(", ")),
            "stats" => print_stats(dashboard),
            "slot" => select_slot(dashboard, rest),
            "move" => move_task(dashboard, config, rest).await,
            "resize" => resize_task(dashboard, config, rest).await,
            "theme" => match theme.toggle() {
                Ok(next) => println!("theme: {next}"),
                Err(error) => println!("theme error: {error}"),
            },
            "dump" => dump_tasks(dashboard),
            "quit" | "exit" => return Ok(()),
            other => println!("unknown command `{other}`; type `help`"),
        }

        drain_notices(notifier, &mut last_notice);
    }
}

fn print_help() {
    println!(
        "\
commands:
  login <email>            sign in to the demo account
  logout                   sign out
  add <title> [k=v ...]    create a task; fields: due=YYYY-MM-DD prio=high|medium|low tag=<t> repeat=yes
  list                     filtered task list
  cal                      calendar events (never filtered)
  done <id|title>          toggle completion
  edit <id|title> [k=v]    rewrite form fields (title words replace the title)
  rm <id|title>            delete after confirmation
  filter [k=v ...]|clear   list filters: status=pending|completed prio=... tag=...
  tags                     distinct tags in the mirror
  stats                    totals over every task
  slot YYYY-MM-DD          simulate a calendar slot selection
  move <id|title> <when>   drag a task to a new due date
  resize <id|title> <when> stretch a task's end date
  theme                    toggle light/dark
  dump                     raw task JSON
  quit"
    );
}

// -- command handlers -------------------------------------------------

async fn add_task(dashboard: &Dashboard<MemoryStore>, config: &ClientConfig, args: &str) {
    let draft = draft_from_args(TaskDraft::default(), args, config);
    let before = current_mirror(dashboard).revision;
    dashboard.submit_create(draft).await;
    await_mirror(dashboard, move |m| m.revision > before).await;
}

async fn toggle_task(dashboard: &Dashboard<MemoryStore>, needle: &str) {
    let mirror = current_mirror(dashboard);
    let Some(task) = find_task(&mirror.tasks, needle) else {
        return;
    };
    dashboard
        .dispatch_list_action(ListAction::ToggleCompleted(task.id))
        .await;
    await_mirror(dashboard, move |m| m.revision > mirror.revision).await;
}

async fn edit_task(dashboard: &Dashboard<MemoryStore>, config: &ClientConfig, args: &str) {
    let (needle, fields) = args.split_once(' ').unwrap_or((args, ""));
    let mirror = current_mirror(dashboard);
    let Some(task) = find_task(&mirror.tasks, needle) else {
        return;
    };
    let base = TaskDraft {
        title: task.title.clone(),
        description: task.description.clone(),
        due_date: task.due_date,
        end_date: task.end_date,
        priority: task.priority,
        tag: task.tag.clone(),
        repeating: task.repeating,
    };
    let draft = draft_from_args(base, fields, config);
    dashboard.submit_update(task.id, draft).await;
    await_mirror(dashboard, move |m| m.revision > mirror.revision).await;
}

async fn delete_task(
    dashboard: &Dashboard<MemoryStore>,
    lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    needle: &str,
) -> std::io::Result<()> {
    let mirror = current_mirror(dashboard);
    let Some(task) = find_task(&mirror.tasks, needle) else {
        return Ok(());
    };
    let Some(pending) = dashboard
        .dispatch_list_action(ListAction::RequestDelete(task.id))
        .await
    else {
        return Ok(());
    };

    print!("Are you sure you want to delete this task? (y/n) ");
    std::io::stdout().flush()?;
    let answer = lines.next_line().await?.unwrap_or_default();
    if answer.trim().eq_ignore_ascii_case("y") {
        dashboard.confirm_delete(pending).await;
        await_mirror(dashboard, move |m| m.revision > mirror.revision).await;
    } else {
        // Dropping the pending token cancels the delete.
        println!("kept \"{}\"", task.title);
    }
    Ok(())
}

fn set_filter(dashboard: &Dashboard<MemoryStore>, args: &str) {
    if args.is_empty() || args == "clear" {
        dashboard.clear_filters();
        println!("filters cleared");
        return;
    }
    let mut filters = TaskFilter::default();
    for token in args.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            println!("filters look like: status=pending prio=high tag=work");
            return;
        };
        match key {
            "status" => match value {
                "pending" => filters = filters.with_status(StatusFilter::Pending),
                "completed" | "done" => filters = filters.with_status(StatusFilter::Completed),
                other => {
                    println!("unknown status `{other}`");
                    return;
                }
            },
            "prio" => match Priority::parse(value) {
                Some(priority) => filters = filters.with_priority(priority),
                None => {
                    println!("unknown priority `{value}`");
                    return;
                }
            },
            "tag" => filters = filters.with_tag(value),
            other => {
                println!("unknown filter `{other}`");
                return;
            }
        }
    }
    dashboard.set_filters(filters);
    println!("filters set");
}

fn select_slot(dashboard: &Dashboard<MemoryStore>, args: &str) {
    match NaiveDate::parse_from_str(args, "%Y-%m-%d") {
        Ok(day) => dashboard.select_slot(day),
        Err(_) => println!("usage: slot YYYY-MM-DD"),
    }
}

async fn move_task(dashboard: &Dashboard<MemoryStore>, config: &ClientConfig, args: &str) {
    let Some((needle, when)) = args.rsplit_once(' ') else {
        println!("usage: move <id|title> YYYY-MM-DD");
        return;
    };
    let mirror = current_mirror(dashboard);
    let Some(task) = find_task(&mirror.tasks, needle.trim()) else {
        return;
    };
    let Some(start) = parse_when(when, config.default_due_time()) else {
        println!("could not parse `{when}` as a date");
        return;
    };
    dashboard.move_event(task.id, start).await;
    await_mirror(dashboard, move |m| m.revision > mirror.revision).await;
}

async fn resize_task(dashboard: &Dashboard<MemoryStore>, config: &ClientConfig, args: &str) {
    let Some((needle, when)) = args.rsplit_once(' ') else {
        println!("usage: resize <id|title> YYYY-MM-DD");
        return;
    };
    let mirror = current_mirror(dashboard);
    let Some(task) = find_task(&mirror.tasks, needle.trim()) else {
        return;
    };
    let Some(end) = parse_when(when, config.default_due_time()) else {
        println!("could not parse `{when}` as a date");
        return;
    };
    dashboard.resize_event(task.id, end).await;
    await_mirror(dashboard, move |m| m.revision > mirror.revision).await;
}

// -- printers ---------------------------------------------------------

fn print_list(dashboard: &Dashboard<MemoryStore>) {
    let view = dashboard.list_view(Utc::now());
    println!("{}", view.summary);
    for item in &view.items {
        let check = if item.completed { "[x]" } else { "[ ]" };
        let mut line = format!("{check} {} {}", short_id(item.id), item.title);
        if let Some(due) = &item.due_label {
            line.push_str(&format!("  due {due}"));
            if item.overdue {
                line.push_str(" (overdue)");
            }
        }
        line.push_str(&format!("  {}", item.priority.as_str()));
        if let Some(badge) = &item.tag {
            line.push_str(&format!("  #{}", badge.name));
        }
        if item.repeating {
            line.push_str("  (repeats)");
        }
        println!("{line}");
    }
}

fn print_calendar(dashboard: &Dashboard<MemoryStore>) {
    let events = dashboard.calendar_events();
    if events.is_empty() {
        println!("no dated tasks");
        return;
    }
    for event in &events {
        let span = if event.all_day {
            event.start.format("%Y-%m-%d (all day)").to_string()
        } else if event.end > event.start {
            format!(
                "{} -> {}",
                event.start.format("%Y-%m-%d %H:%M"),
                event.end.format("%Y-%m-%d %H:%M")
            )
        } else {
            event.start.format("%Y-%m-%d %H:%M").to_string()
        };
        let done = if event.completed { "  done" } else { "" };
        println!("{} {span}  {} {}{done}", short_id(event.id), event.title, event.color);
    }
}

fn print_stats(dashboard: &Dashboard<MemoryStore>) {
    let stats = dashboard.stats();
    println!(
        "total {}  completed {}  pending {}  high priority {}",
        stats.total, stats.completed, stats.pending, stats.high_priority
    );
}

fn dump_tasks(dashboard: &Dashboard<MemoryStore>) {
    let mirror = current_mirror(dashboard);
    match serde_json::to_string_pretty(&*mirror.tasks) {
        Ok(json) => println!("{json}"),
        Err(error) => println!("could not serialize tasks: {error}"),
    }
}

fn drain_notices(notifier: &Notifier, last_seen: &mut u64) {
    for notice in notifier.active() {
        if notice.id < *last_seen {
            continue;
        }
        *last_seen = notice.id + 1;
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "err",
            NoticeLevel::Info => "info",
        };
        println!("[{tag}] {}", notice.message);
    }
}

// -- helpers ----------------------------------------------------------

fn current_mirror(dashboard: &Dashboard<MemoryStore>) -> Mirror {
    dashboard.mirror().borrow().clone()
}

/// Waits briefly for the mirror to satisfy `pred`, so command output
/// reflects the subscription echo instead of racing it.
async fn await_mirror(dashboard: &Dashboard<MemoryStore>, pred: impl Fn(&Mirror) -> bool) {
    let mut mirror = dashboard.mirror();
    let _ = tokio::time::timeout(ECHO_WAIT, async {
        loop {
            if pred(&mirror.borrow_and_update()) {
                return;
            }
            if mirror.changed().await.is_err() {
                return;
            }
        }
    })
    .await;
}

/// Resolves a task by id prefix or exact title (case-insensitive).
fn find_task(tasks: &[Task], needle: &str) -> Option<Task> {
    if needle.is_empty() {
        println!("which task? give an id prefix or exact title");
        return None;
    }
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            task.id.to_string().starts_with(needle) || task.title.eq_ignore_ascii_case(needle)
        })
        .collect();
    match matches.as_slice() {
        [] => {
            println!("no task matches `{needle}`");
            None
        }
        [one] => Some((*one).clone()),
        many => {
            println!(
                "`{needle}` is ambiguous ({} matches); use a longer id prefix",
                many.len()
            );
            None
        }
    }
}

/// Applies `key=value` tokens to a draft; bare words become the title.
fn draft_from_args(mut draft: TaskDraft, args: &str, config: &ClientConfig) -> TaskDraft {
    let mut title_words: Vec<&str> = Vec::new();
    for token in args.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            match key {
                "due" => draft.due_date = parse_when(value, config.default_due_time()),
                "end" => draft.end_date = parse_when(value, config.default_due_time()),
                "prio" => draft.priority = Priority::parse(value),
                "tag" => draft.tag = (!value.is_empty()).then(|| value.to_string()),
                "desc" => draft.description = (!value.is_empty()).then(|| value.to_string()),
                "repeat" => draft.repeating = value == "yes" || value == "true",
                other => println!("unknown field `{other}`"),
            }
        } else {
            title_words.push(token);
        }
    }
    if !title_words.is_empty() {
        draft.title = title_words.join(" ");
    }
    draft
}

/// Accepts `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD` (at the configured hour).
fn parse_when(value: &str, default_time: NaiveTime) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(stamp.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(default_time).and_utc())
}

fn short_id(id: TaskId) -> String {
    id.to_string().chars().take(8).collect()
}
