pub mod models;
pub mod operations;

pub use models::{DefaultTopic, NewTask, NewTopic, Task, TaskUpdate, Topic};
pub use operations::DbOperations;
