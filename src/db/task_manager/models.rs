use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::schema::{task, topic};

/// Storage format of `created_at` / `updated_at`. Lexicographic order matches
/// chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// The topics seeded by the initial migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultTopic {
    /// Virtual view over every task flagged as favourite.
    Favourites,
    /// Catch-all topic; its view lists every task.
    Default,
}

impl DefaultTopic {
    pub const ALL: [DefaultTopic; 2] = [DefaultTopic::Favourites, DefaultTopic::Default];

    pub fn name(self) -> &'static str {
        match self {
            DefaultTopic::Favourites => "Favourites",
            DefaultTopic::Default => "Default",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DefaultTopic::Favourites => "Favourite tasks",
            DefaultTopic::Default => "All tasks",
        }
    }

    pub fn from_name(name: &str) -> Option<DefaultTopic> {
        DefaultTopic::ALL.into_iter().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = topic)]
pub struct Topic {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Topic {
    pub fn default_kind(&self) -> Option<DefaultTopic> {
        DefaultTopic::from_name(&self.name)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = topic)]
pub struct NewTopic<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(table_name = task)]
#[diesel(belongs_to(Topic))]
pub struct Task {
    pub id: i32,
    pub topic_id: i32,
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub favourite: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// `completed` and `favourite` are left to the column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task)]
pub struct NewTask<'a> {
    pub topic_id: i32,
    pub name: &'a str,
    pub description: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Partial update; `None` fields keep their stored value. `updated_at` is
/// stamped by the store when the update is applied.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = task)]
pub struct TaskUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub completed: Option<bool>,
    pub favourite: Option<bool>,
}
