use crate::error::AppError;
use crate::model::{TaskRecord, TaskStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
    Pending,
    InProgress,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
        }
    }

    pub fn matches<R: TaskRecord>(self, task: &R) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_completed(),
            Self::Completed => task.is_completed(),
            Self::Pending => task.status() == TaskStatus::Pending,
            Self::InProgress => task.status() == TaskStatus::InProgress,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "inprogress" | "in_progress" | "in-progress" => Ok(Self::InProgress),
            other => Err(AppError::validation(format!(
                "filter must be all, active, completed, pending or inprogress, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    DeadlineAsc,
    DeadlineDesc,
    Status,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeadlineAsc => "deadline_asc",
            Self::DeadlineDesc => "deadline_desc",
            Self::Status => "status",
        }
    }

    fn compare<R: TaskRecord>(self, left: &R, right: &R) -> Ordering {
        match self {
            Self::DeadlineAsc => compare_deadlines(left, right, false),
            Self::DeadlineDesc => compare_deadlines(left, right, true),
            Self::Status => left.status().rank().cmp(&right.status().rank()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "deadline_asc" | "deadline" => Ok(Self::DeadlineAsc),
            "deadline_desc" => Ok(Self::DeadlineDesc),
            "status" => Ok(Self::Status),
            other => Err(AppError::validation(format!(
                "sort must be deadline_asc, deadline_desc or status, got '{other}'"
            ))),
        }
    }
}

/// Tasks without a deadline go after every dated task.
fn compare_deadlines<R: TaskRecord>(left: &R, right: &R, descending: bool) -> Ordering {
    match (left.deadline(), right.deadline()) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: Filter,
    pub sort: Option<SortOrder>,
    pub search: String,
}

/// Ordered selection of `tasks` to display. Filtering runs first, then the
/// case-insensitive title search, then a stable sort for schemas that
/// support one.
pub fn project<'a, R: TaskRecord>(tasks: &'a [R], query: &ViewQuery) -> Vec<&'a R> {
    let needle = query.search.trim().to_lowercase();
    let mut visible: Vec<&R> = tasks
        .iter()
        .filter(|task| query.filter.matches(*task))
        .filter(|task| needle.is_empty() || task.title().to_lowercase().contains(&needle))
        .collect();

    if R::SORTABLE
        && let Some(order) = query.sort
    {
        visible.sort_by(|left, right| order.compare(*left, *right));
    }

    visible
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub percent_complete: u32,
}

impl Stats {
    pub fn from_tasks<R: TaskRecord>(tasks: &[R]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.is_completed()).count();
        Self {
            total,
            completed,
            active: total - completed,
            percent_complete: percent(completed, total),
        }
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // Integer form of round(part / total * 100) with halves rounded up.
    ((part * 200 + total) / (total * 2)) as u32
}

#[cfg(test)]
mod tests {
    use super::{Filter, SortOrder, Stats, ViewQuery, project};
    use crate::model::{PlannerTask, Priority, PriorityTask, TaskStatus};
    use time::macros::date;
    use time::{Date, OffsetDateTime};

    fn planner(id: &str, title: &str, deadline: Date, status: TaskStatus) -> PlannerTask {
        PlannerTask {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            deadline,
            status,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn board(id: &str, title: &str, completed: bool) -> PriorityTask {
        PriorityTask {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            completed,
            deadline: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn ids<R: crate::model::TaskRecord>(tasks: &[&R]) -> Vec<String> {
        tasks.iter().map(|task| task.id().to_string()).collect()
    }

    fn mixed_planner() -> Vec<PlannerTask> {
        vec![
            planner("a", "Alpha", date!(2024-03-01), TaskStatus::Completed),
            planner("b", "Beta", date!(2024-01-01), TaskStatus::Pending),
            planner("c", "Gamma", date!(2024-02-01), TaskStatus::Completed),
            planner("d", "Delta", date!(2024-01-01), TaskStatus::Pending),
            planner("e", "Epsilon", date!(2024-05-01), TaskStatus::Completed),
        ]
    }

    #[test]
    fn filter_counts_follow_completion() {
        let tasks = mixed_planner();
        let count = |filter| {
            project(
                &tasks,
                &ViewQuery {
                    filter,
                    ..ViewQuery::default()
                },
            )
            .len()
        };

        assert_eq!(count(Filter::Completed), 3);
        assert_eq!(count(Filter::Active), 2);
        assert_eq!(count(Filter::Pending), 2);
        assert_eq!(count(Filter::InProgress), 0);
        assert_eq!(count(Filter::All), 5);
    }

    #[test]
    fn board_filters_use_completed_flag() {
        let tasks = vec![
            board("1", "one", true),
            board("2", "two", false),
            board("3", "three", true),
        ];
        let active = project(
            &tasks,
            &ViewQuery {
                filter: Filter::Active,
                ..ViewQuery::default()
            },
        );
        assert_eq!(ids(&active), vec!["2"]);

        let pending = project(
            &tasks,
            &ViewQuery {
                filter: Filter::Pending,
                ..ViewQuery::default()
            },
        );
        assert_eq!(ids(&pending), vec!["2"]);
    }

    #[test]
    fn search_is_case_insensitive_and_applied_after_filter() {
        let tasks = mixed_planner();
        let found = project(
            &tasks,
            &ViewQuery {
                filter: Filter::Completed,
                sort: None,
                search: "  A ".to_string(),
            },
        );

        assert_eq!(ids(&found), vec!["a", "c"]);
    }

    #[test]
    fn no_sort_keeps_store_order() {
        let tasks = mixed_planner();
        let all = project(&tasks, &ViewQuery::default());
        assert_eq!(ids(&all), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn deadline_sorts_are_stable() {
        let tasks = mixed_planner();
        let ascending = project(
            &tasks,
            &ViewQuery {
                sort: Some(SortOrder::DeadlineAsc),
                ..ViewQuery::default()
            },
        );
        assert_eq!(ids(&ascending), vec!["b", "d", "c", "a", "e"]);

        let descending = project(
            &tasks,
            &ViewQuery {
                sort: Some(SortOrder::DeadlineDesc),
                ..ViewQuery::default()
            },
        );
        assert_eq!(ids(&descending), vec!["e", "a", "c", "b", "d"]);
    }

    #[test]
    fn status_sort_puts_completed_first_and_keeps_ties_in_order() {
        let tasks = vec![
            planner("p1", "p1", date!(2024-01-01), TaskStatus::Pending),
            planner("i1", "i1", date!(2024-01-01), TaskStatus::InProgress),
            planner("c1", "c1", date!(2024-01-01), TaskStatus::Completed),
            planner("p2", "p2", date!(2024-01-01), TaskStatus::Pending),
            planner("u1", "u1", date!(2024-01-01), TaskStatus::Unknown),
            planner("c2", "c2", date!(2024-01-01), TaskStatus::Completed),
        ];

        let sorted = project(
            &tasks,
            &ViewQuery {
                sort: Some(SortOrder::Status),
                ..ViewQuery::default()
            },
        );

        assert_eq!(ids(&sorted), vec!["c1", "c2", "i1", "p1", "p2", "u1"]);
    }

    #[test]
    fn board_ignores_sort_requests() {
        let tasks = vec![board("1", "one", false), board("2", "two", true)];
        let sorted = project(
            &tasks,
            &ViewQuery {
                sort: Some(SortOrder::Status),
                ..ViewQuery::default()
            },
        );

        assert_eq!(ids(&sorted), vec!["1", "2"]);
    }

    #[test]
    fn stats_report_rounded_percentage() {
        let tasks = vec![
            planner("a", "a", date!(2024-01-01), TaskStatus::Completed),
            planner("b", "b", date!(2024-01-01), TaskStatus::Pending),
            planner("c", "c", date!(2024-01-01), TaskStatus::InProgress),
            planner("d", "d", date!(2024-01-01), TaskStatus::Pending),
        ];

        let stats = Stats::from_tasks(&tasks);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.percent_complete, 25);
    }

    #[test]
    fn stats_for_empty_store_are_zero() {
        let stats = Stats::from_tasks::<PlannerTask>(&[]);
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn stats_round_to_nearest() {
        let tasks = vec![
            board("1", "one", true),
            board("2", "two", true),
            board("3", "three", false),
        ];
        assert_eq!(Stats::from_tasks(&tasks).percent_complete, 67);

        let tasks = vec![board("1", "one", true), board("2", "two", false), board("3", "three", false)];
        assert_eq!(Stats::from_tasks(&tasks).percent_complete, 33);
    }

    #[test]
    fn parses_filter_and_sort_names() {
        assert_eq!("Active".parse::<Filter>().unwrap(), Filter::Active);
        assert_eq!("in-progress".parse::<Filter>().unwrap(), Filter::InProgress);
        assert_eq!("deadline-desc".parse::<SortOrder>().unwrap(), SortOrder::DeadlineDesc);
        assert_eq!("random".parse::<SortOrder>().unwrap_err().code(), "invalid_input");
    }
}
