pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod overdue;
pub mod storage;
pub mod store;
pub mod task_api;
pub mod view;
