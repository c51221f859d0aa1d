//! Storage for the task manager: the `topic`/`task` schema, its migrations
//! and the operations the application runs against it.

pub mod config;
pub mod db;
pub mod error;
pub mod log_config;

pub use config::Config;
pub use db::task_manager::{DbOperations, DefaultTopic, Task, TaskUpdate, Topic};
pub use db::{prepare_database, DbPool};
pub use error::{ConfigError, StoreError, StoreResult};
