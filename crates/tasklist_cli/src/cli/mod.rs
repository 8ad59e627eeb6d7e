use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasklist_core::config::ConfigOverrides;
use tasklist_core::view::{Filter, SortOrder};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Priority board: tasks with a priority and a done flag
    ///
    /// Example: tasklist board add "Buy milk" --priority high
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },
    /// Deadline planner: tasks with a status and a required deadline
    ///
    /// Example: tasklist planner add "Write report" --deadline 2024-01-01
    Planner {
        #[command(subcommand)]
        command: PlannerCommand,
    },
    /// Show or change the remembered theme
    ///
    /// Example: tasklist theme dark
    /// Example: tasklist theme toggle
    Theme { mode: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Add a task
    ///
    /// Example: tasklist board add "Buy milk" --priority high --deadline 2024-02-01
    Add {
        title: Option<String>,
        #[arg(long, short = 'p')]
        priority: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit fields of a task
    ///
    /// Example: tasklist board edit task-1 --title "Buy oat milk" --no-deadline
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short = 'p')]
        priority: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        no_deadline: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a task done, or undo it
    ///
    /// Example: tasklist board toggle task-1
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: tasklist board delete task-1
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: tasklist board show task-1
    Show { id: String },
    /// Delete every task
    ///
    /// Example: tasklist board clear --yes
    Clear {
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List tasks
    ///
    /// Example: tasklist board list --filter active --search milk
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show task counts
    ///
    /// Example: tasklist board stats
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum PlannerCommand {
    /// Add a task
    ///
    /// Example: tasklist planner add "Write report" --deadline 2024-01-01 --status inprogress
    Add {
        title: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit fields of a task
    ///
    /// Example: tasklist planner edit task-1 --deadline 2024-02-01
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change the status of a task
    ///
    /// Example: tasklist planner status task-1 completed
    Status { id: String, status: String },
    /// Delete a task
    ///
    /// Example: tasklist planner delete task-1
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: tasklist planner show task-1
    Show { id: String },
    /// Delete every task
    ///
    /// Example: tasklist planner clear --yes
    Clear {
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List tasks
    ///
    /// Example: tasklist planner list --filter pending --sort deadline_asc
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show completion progress
    ///
    /// Example: tasklist planner stats
    Stats,
    /// List tasks past their deadline
    ///
    /// Example: tasklist planner overdue
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    StorePath,
    DefaultFilter,
    DefaultSort,
    Notifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        "default_filter" | "filter" => ConfigOverrideTarget::DefaultFilter,
        "default_sort" | "sort" => ConfigOverrideTarget::DefaultSort,
        "notifications" | "notify" => ConfigOverrideTarget::Notifications,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override '{canonical_field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` argument into one set of overrides. Later
/// arguments win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value))
            }
            ConfigOverrideTarget::DefaultFilter => {
                let filter = parsed
                    .value
                    .parse::<Filter>()
                    .map_err(|err| err.message().to_string())?;
                overrides.default_filter = Some(filter);
            }
            ConfigOverrideTarget::DefaultSort => {
                let sort = parsed
                    .value
                    .parse::<SortOrder>()
                    .map_err(|err| err.message().to_string())?;
                overrides.default_sort = Some(sort);
            }
            ConfigOverrideTarget::Notifications => {
                overrides.notifications = Some(parse_switch(&parsed.value)?);
            }
        }
    }

    Ok(overrides)
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
