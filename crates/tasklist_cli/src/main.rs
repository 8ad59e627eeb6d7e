use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use tasklist_cli::cli::{
    BoardCommand, Cli, Command, PlannerCommand, collect_config_overrides,
};
use tasklist_cli::render;
use tasklist_core::config::{self, Config, Palette};
use tasklist_core::error::AppError;
use tasklist_core::model::{PlannerTask, PriorityTask, TaskRecord};
use tasklist_core::notify;
use tasklist_core::overdue::{self, OverdueReport};
use tasklist_core::storage::{self, FileStore};
use tasklist_core::store::Store;
use tasklist_core::task_api::{self, BoardEdit, PlannerEdit};
use tasklist_core::view::ViewQuery;

/// Stores opened by the current process. Interactive mode keeps them for the
/// whole session, so the planner overdue check runs once per session.
struct Session {
    config: Config,
    store_path: PathBuf,
    interactive: bool,
    board: Option<Store<PriorityTask, FileStore>>,
    planner: Option<Store<PlannerTask, FileStore>>,
}

impl Session {
    fn new(config: Config, interactive: bool) -> Result<Self, AppError> {
        let store_path = storage::store_path(config.store_path.as_deref())?;
        log::debug!("using storage file {}", store_path.display());
        Ok(Self {
            config,
            store_path,
            interactive,
            board: None,
            planner: None,
        })
    }

    fn board(&mut self) -> &mut Store<PriorityTask, FileStore> {
        let path = &self.store_path;
        self.board
            .get_or_insert_with(|| task_api::open_board(FileStore::new(path)))
    }

    fn planner(&mut self) -> &mut Store<PlannerTask, FileStore> {
        self.open_planner(true)
    }

    /// Opens the planner on first use. `print_warning` is off when the
    /// command itself prints the overdue list.
    fn open_planner(&mut self, print_warning: bool) -> &mut Store<PlannerTask, FileStore> {
        let path = &self.store_path;
        let config = &self.config;
        self.planner.get_or_insert_with(|| {
            let startup =
                task_api::open_planner(FileStore::new(path), overdue::today_local());
            if let Some(report) = startup.overdue.as_ref() {
                announce_overdue(config, report, print_warning);
            }
            startup.store
        })
    }

    fn theme(&self) -> Option<String> {
        config::stored_theme(&FileStore::new(&self.store_path))
            .or_else(|| self.config.theme.clone())
    }

    fn palette(&self) -> Palette {
        config::palette_for_theme(self.theme().as_deref())
    }

    fn query(
        &self,
        filter: Option<String>,
        sort: Option<String>,
        search: Option<String>,
    ) -> Result<ViewQuery, AppError> {
        let filter = match filter {
            Some(raw) => raw.parse()?,
            None => self.config.default_filter.unwrap_or_default(),
        };
        let sort = match sort {
            Some(raw) => Some(raw.parse()?),
            None => self.config.default_sort,
        };
        Ok(ViewQuery {
            filter,
            sort,
            search: search.unwrap_or_default(),
        })
    }
}

/// Prints the load-time overdue batch once and hands it to the desktop
/// notifier.
fn announce_overdue(config: &Config, report: &OverdueReport, print_warning: bool) {
    if print_warning {
        eprintln!("WARNING: Overdue tasks detected:");
        eprintln!("{}", render::overdue_lines(report));
    }

    match notify::notifier_from_env(config.notifications) {
        Ok(notifier) => {
            if let Err(err) = notifier.notify_overdue(report) {
                log::warn!("overdue notification failed: {err}");
            }
        }
        Err(err) => log::warn!("no notifier available: {err}"),
    }
}

fn print_json(value: serde_json::Value) {
    println!("{value}");
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    print!("{prompt} [y/N] ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// A failed write after `create` leaves the new task in memory. Interactive
/// sessions can still reach it, so its id is worth printing.
fn note_unsaved<R: TaskRecord>(
    err: AppError,
    store: &Store<R, FileStore>,
    interactive: bool,
) -> AppError {
    if interactive
        && matches!(err, AppError::Persistence(_))
        && let Some(task) = store.tasks().last()
    {
        eprintln!("NOTE: unsaved task {} ({})", task.title(), task.id());
    }
    err
}

/// JSON output has no prompt, so clearing there needs `--yes`.
fn confirm_clear(yes: bool, json: bool, prompt: &str) -> Result<bool, AppError> {
    if yes {
        return Ok(true);
    }
    if json {
        return Err(AppError::validation("clear needs --yes when output is JSON"));
    }
    confirm(prompt)
}

fn run_board(session: &mut Session, command: BoardCommand, json: bool) -> Result<(), AppError> {
    let palette = session.palette();

    match command {
        BoardCommand::Add {
            title,
            priority,
            deadline,
            description,
        } => {
            let interactive = session.interactive;
            let task = task_api::add_board_task(
                session.board(),
                title.as_deref().unwrap_or_default(),
                priority.as_deref(),
                deadline.as_deref(),
                description.as_deref(),
            )
            .map_err(|err| note_unsaved(err, session.board(), interactive))?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!("{} {} ({})", palette.accentize("Added task:"), task.title, task.id);
            }
        }
        BoardCommand::Edit {
            id,
            title,
            priority,
            deadline,
            no_deadline,
            description,
        } => {
            let edit = BoardEdit {
                title,
                description,
                priority,
                deadline,
                clear_deadline: no_deadline,
            };
            let task = task_api::edit_board_task(session.board(), &id, edit)?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!("{} {} ({})", palette.accentize("Updated task:"), task.title, task.id);
            }
        }
        BoardCommand::Toggle { id } => {
            let task = task_api::toggle_board_task(session.board(), &id)?;
            if json {
                print_json(serde_json::json!(task));
            } else if task.completed {
                println!("{} {} ({})", palette.accentize("Completed task:"), task.title, task.id);
            } else {
                println!("{} {} ({})", palette.accentize("Reopened task:"), task.title, task.id);
            }
        }
        BoardCommand::Delete { id } => {
            let deleted = task_api::delete_task(session.board(), &id)?;
            print_deleted(deleted.map(|task| (task.id, task.title)), &id, json, &palette);
        }
        BoardCommand::Show { id } => {
            let task = task_api::get_task(session.board(), &id)?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!("{}", render::board_details(&task));
            }
        }
        BoardCommand::Clear { yes } => {
            if !confirm_clear(yes, json, "Clear all board tasks? This cannot be undone.")? {
                println!("Clear cancelled.");
                return Ok(());
            }
            let removed = task_api::clear_tasks(session.board())?;
            print_cleared(removed, json, &palette);
        }
        BoardCommand::List { filter, search } => {
            let query = session.query(filter, None, search)?;
            let result = task_api::list_tasks(session.board(), &query);
            if json {
                print_json(serde_json::json!({
                    "tasks": result.tasks,
                    "stats": result.stats,
                }));
            } else {
                println!("{}", render::board_table(&result.tasks));
                println!("{}", palette.mutedize(&render::board_stats_line(&result.stats)));
            }
        }
        BoardCommand::Stats => {
            let result = task_api::list_tasks(session.board(), &ViewQuery::default());
            if json {
                print_json(serde_json::json!(result.stats));
            } else {
                println!("{}", render::board_stats_line(&result.stats));
            }
        }
    }

    Ok(())
}

fn run_planner(
    session: &mut Session,
    command: PlannerCommand,
    json: bool,
) -> Result<(), AppError> {
    let palette = session.palette();
    let today = overdue::today_local();

    match command {
        PlannerCommand::Add {
            title,
            deadline,
            status,
            description,
        } => {
            let interactive = session.interactive;
            let task = task_api::add_planner_task(
                session.planner(),
                title.as_deref().unwrap_or_default(),
                description.as_deref(),
                deadline.as_deref().unwrap_or_default(),
                status.as_deref(),
            )
            .map_err(|err| note_unsaved(err, session.planner(), interactive))?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!("{} {} ({})", palette.accentize("Added task:"), task.title, task.id);
            }
        }
        PlannerCommand::Edit {
            id,
            title,
            deadline,
            status,
            description,
        } => {
            let edit = PlannerEdit {
                title,
                description,
                deadline,
                status,
            };
            let task = task_api::edit_planner_task(session.planner(), &id, edit)?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!("{} {} ({})", palette.accentize("Updated task:"), task.title, task.id);
            }
        }
        PlannerCommand::Status { id, status } => {
            let task = task_api::set_planner_status(session.planner(), &id, &status)?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!(
                    "{} {} ({}) is now {}",
                    palette.accentize("Updated task:"),
                    task.title,
                    task.id,
                    task.status
                );
            }
        }
        PlannerCommand::Delete { id } => {
            let deleted = task_api::delete_task(session.planner(), &id)?;
            print_deleted(deleted.map(|task| (task.id, task.title)), &id, json, &palette);
        }
        PlannerCommand::Show { id } => {
            let task = task_api::get_task(session.planner(), &id)?;
            if json {
                print_json(serde_json::json!(task));
            } else {
                println!("{}", render::planner_details(&task, today));
            }
        }
        PlannerCommand::Clear { yes } => {
            if !confirm_clear(yes, json, "Clear all planner tasks? This cannot be undone.")? {
                println!("Clear cancelled.");
                return Ok(());
            }
            let removed = task_api::clear_tasks(session.planner())?;
            print_cleared(removed, json, &palette);
        }
        PlannerCommand::List {
            filter,
            sort,
            search,
        } => {
            let query = session.query(filter, sort, search)?;
            let result = task_api::list_tasks(session.planner(), &query);
            if json {
                print_json(serde_json::json!({
                    "tasks": result.tasks,
                    "stats": result.stats,
                }));
            } else {
                println!("{}", render::planner_table(&result.tasks, today));
                println!(
                    "{}",
                    palette.mutedize(&render::planner_progress_line(&result.stats))
                );
            }
        }
        PlannerCommand::Stats => {
            let result = task_api::list_tasks(session.planner(), &ViewQuery::default());
            if json {
                print_json(serde_json::json!(result.stats));
            } else {
                println!("{}", render::planner_progress_line(&result.stats));
            }
        }
        PlannerCommand::Overdue => {
            let report = overdue::find_overdue(session.open_planner(false).tasks(), today);
            if json {
                let entries = report.map(|report| report.entries).unwrap_or_default();
                print_json(serde_json::json!({ "overdue": entries }));
            } else {
                match report {
                    Some(report) => {
                        println!("{}", palette.accentize(&notify::headline(&report)));
                        println!("{}", render::overdue_lines(&report));
                    }
                    None => println!("No overdue tasks."),
                }
            }
        }
    }

    Ok(())
}

fn print_deleted(deleted: Option<(String, String)>, requested: &str, json: bool, palette: &Palette) {
    match (deleted, json) {
        (Some((id, title)), true) => {
            print_json(serde_json::json!({ "deleted": { "id": id, "title": title } }))
        }
        (None, true) => print_json(serde_json::json!({ "deleted": null })),
        (Some((id, title)), false) => {
            println!("{} {} ({})", palette.accentize("Deleted task:"), title, id)
        }
        (None, false) => println!("No task with id {}; nothing deleted.", requested.trim()),
    }
}

fn print_cleared(removed: usize, json: bool, palette: &Palette) {
    if json {
        print_json(serde_json::json!({ "cleared": removed }));
    } else {
        println!("{} {removed} task(s)", palette.accentize("Cleared"));
    }
}

fn run_theme(session: &Session, mode: Option<String>, json: bool) -> Result<(), AppError> {
    let currently_dark = config::is_dark_theme(session.theme().as_deref());
    let dark = match mode.as_deref().map(|raw| raw.trim().to_ascii_lowercase()) {
        None => {
            let name = if currently_dark { "dark" } else { "light" };
            if json {
                print_json(serde_json::json!({ "theme": name }));
            } else {
                println!("Theme: {name}");
            }
            return Ok(());
        }
        Some(mode) => match mode.as_str() {
            "dark" => true,
            "light" => false,
            "toggle" => !currently_dark,
            other => {
                return Err(AppError::validation(format!(
                    "theme must be light, dark or toggle, got '{other}'"
                )));
            }
        },
    };

    let mut kv = FileStore::new(&session.store_path);
    config::store_theme(&mut kv, dark)?;
    let name = if dark { "dark" } else { "light" };
    if json {
        print_json(serde_json::json!({ "theme": name }));
    } else {
        let palette = config::palette_for_theme(Some(name));
        println!("{} {name}", palette.accentize("Theme set to"));
    }
    Ok(())
}

fn run_command(session: &mut Session, cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Board { command } => run_board(session, command, cli.json),
        Command::Planner { command } => run_planner(session, command, cli.json),
        Command::Theme { mode } => run_theme(session, mode, cli.json),
    }
}

fn report_error(err: &AppError, interactive: bool) {
    eprintln!("ERROR: {err}");
    if matches!(err, AppError::Persistence(_)) {
        if interactive {
            eprintln!("WARNING: the change is kept in memory and saving is retried on exit");
        } else {
            eprintln!("WARNING: the change was not saved");
        }
    }
}

fn is_help_request(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
    )
}

/// Retries every store holding unsaved changes and returns the first
/// failure, after all of them were attempted.
fn persist_dirty(session: &mut Session) -> Result<(), AppError> {
    let mut results = Vec::new();
    if let Some(store) = session.board.as_mut().filter(|store| store.is_dirty()) {
        results.push(store.persist());
    }
    if let Some(store) = session.planner.as_mut().filter(|store| store.is_dirty()) {
        results.push(store.persist());
    }

    let mut first_error = None;
    for result in results {
        if let Err(err) = result {
            log::warn!("saving on exit failed: {err}");
            first_error.get_or_insert(err);
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        log::warn!("using default config: {err}");
    }
    let overrides = collect_config_overrides(raw_overrides).map_err(AppError::validation)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn run_interactive() -> Result<(), AppError> {
    let mut session = Session::new(load_config(&[])?, true)?;
    let mut input = String::new();

    loop {
        input.clear();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                report_error(&err, true);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_help_request(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                report_error(&normalize_parse_error(err), true);
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            log::warn!("config overrides are ignored in interactive mode");
        }

        if let Err(err) = run_command(&mut session, cli) {
            report_error(&err, true);
        }
    }

    persist_dirty(&mut session)
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

fn main() {
    setup_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            report_error(&err, false);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_help_request(&err) => err.exit(),
        Err(err) => {
            report_error(&normalize_parse_error(err), false);
            std::process::exit(1);
        }
    };

    let result = load_config(&cli.config_override)
        .and_then(|config| Session::new(config, false))
        .and_then(|mut session| run_command(&mut session, cli));
    if let Err(err) = result {
        report_error(&err, false);
        std::process::exit(1);
    }
}
