mod board;
mod planner;
pub mod task;

pub use board::{BoardDraft, BoardPatch, Priority, PriorityTask};
pub use planner::{PlannerDraft, PlannerPatch, PlannerTask, TaskStatus};
pub use task::TaskRecord;
