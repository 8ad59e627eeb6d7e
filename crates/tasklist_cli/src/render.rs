use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::model::task::format_date;
use tasklist_core::model::{PlannerTask, PriorityTask, TaskRecord};
use tasklist_core::overdue::OverdueReport;
use tasklist_core::view::Stats;
use time::Date;

pub const NO_TASKS: &str = "No tasks found.";

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Done")]
    done: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Added")]
    added: String,
}

#[derive(Tabled)]
struct PlannerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Added")]
    added: String,
}

pub fn board_table(tasks: &[PriorityTask]) -> String {
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }

    let rows = tasks.iter().map(|task| BoardRow {
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority.to_string(),
        done: if task.completed { "yes" } else { "no" }.to_string(),
        deadline: task.deadline.map(format_date).unwrap_or_else(|| "-".to_string()),
        added: format_date(task.created_at.date()),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Planner rows mark tasks that are past their deadline on `today`.
pub fn planner_table(tasks: &[PlannerTask], today: Date) -> String {
    if tasks.is_empty() {
        return NO_TASKS.to_string();
    }

    let rows = tasks.iter().map(|task| PlannerRow {
        id: task.id.clone(),
        title: task.title.clone(),
        status: status_label(task, today),
        deadline: format_date(task.deadline),
        added: format_date(task.created_at.date()),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn status_label(task: &PlannerTask, today: Date) -> String {
    if !task.is_completed() && task.deadline < today {
        format!("{} (overdue)", task.status)
    } else {
        task.status.to_string()
    }
}

pub fn board_details(task: &PriorityTask) -> String {
    let deadline = task.deadline.map(format_date).unwrap_or_else(|| "-".to_string());
    let mut lines = vec![
        format!("ID: {}", task.id),
        format!("Title: {}", task.title),
        format!("Priority: {}", task.priority),
        format!("Done: {}", if task.completed { "yes" } else { "no" }),
        format!("Deadline: {deadline}"),
        format!("Added: {}", format_date(task.created_at.date())),
    ];
    if !task.description.is_empty() {
        lines.push(format!("Description: {}", task.description));
    }
    lines.join("\n")
}

pub fn planner_details(task: &PlannerTask, today: Date) -> String {
    let mut lines = vec![
        format!("ID: {}", task.id),
        format!("Title: {}", task.title),
        format!("Status: {}", status_label(task, today)),
        format!("Deadline: {}", format_date(task.deadline)),
        format!("Added: {}", format_date(task.created_at.date())),
    ];
    if !task.description.is_empty() {
        lines.push(format!("Description: {}", task.description));
    }
    lines.join("\n")
}

pub fn board_stats_line(stats: &Stats) -> String {
    format!(
        "Total: {} | Active: {} | Completed: {}",
        stats.total, stats.active, stats.completed
    )
}

pub fn planner_progress_line(stats: &Stats) -> String {
    format!(
        "{}/{} tasks completed ({}%)",
        stats.completed, stats.total, stats.percent_complete
    )
}

pub fn overdue_lines(report: &OverdueReport) -> String {
    report
        .lines()
        .iter()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
