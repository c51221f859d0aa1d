use diesel::prelude::*;
use slog::{debug, info, o, warn, Logger};

use crate::db::schema::{task, topic};
use crate::db::task_manager::models::{
    now_timestamp, DefaultTopic, NewTask, NewTopic, Task, TaskUpdate, Topic,
};
use crate::db::DbPool;
use crate::error::{StoreError, StoreResult};

pub struct DbOperations {
    pub pool: DbPool,
    log: Logger,
}

impl DbOperations {
    pub fn new(pool: DbPool, log: &Logger) -> Self {
        Self {
            pool,
            log: log.new(o!("component" => "db_ops")),
        }
    }

    pub fn is_special_topic(&self, name: &str) -> bool {
        DefaultTopic::from_name(name).is_some()
    }

    // Topic Operations
    pub fn load_topics(&self) -> StoreResult<Vec<Topic>> {
        let mut conn = self.pool.get()?;

        Ok(topic::table.order_by(topic::id).load::<Topic>(&mut conn)?)
    }

    pub fn find_topic_by_name(&self, name: &str) -> StoreResult<Option<Topic>> {
        let mut conn = self.pool.get()?;

        Ok(topic::table
            .filter(topic::name.eq(name))
            .order_by(topic::id)
            .first::<Topic>(&mut conn)
            .optional()?)
    }

    pub fn add_topic(&self, name: &str, description: &str) -> StoreResult<Topic> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        // The default topics are views over all tasks; a second one would
        // shadow them and could never be deleted.
        if self.is_special_topic(name) {
            return Err(StoreError::ProtectedTopic(name.to_string()));
        }

        let now = now_timestamp();
        let new_topic = NewTopic {
            name,
            description,
            created_at: &now,
            updated_at: &now,
        };

        let mut conn = self.pool.get()?;
        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(topic::table)
                .values(&new_topic)
                .execute(conn)?;

            topic::table
                .order_by(topic::id.desc())
                .first::<Topic>(conn)
        })?;

        info!(self.log, "Added topic"; "id" => created.id, "name" => &created.name);
        Ok(created)
    }

    /// Delete a topic and, through the cascading foreign key, its tasks.
    /// Default topics are kept and `Ok(0)` is returned.
    pub fn delete_topic(&self, topic_id: i32) -> StoreResult<usize> {
        let mut conn = self.pool.get()?;

        let topic: Topic = topic::table
            .find(topic_id)
            .first(&mut conn)
            .optional()?
            .ok_or(StoreError::TopicNotFound(topic_id))?;

        if self.is_special_topic(&topic.name) {
            warn!(self.log, "Refusing to delete default topic"; "name" => &topic.name);
            return Ok(0);
        }

        let deleted = diesel::delete(topic::table.find(topic_id)).execute(&mut conn)?;
        info!(self.log, "Deleted topic"; "id" => topic_id);
        Ok(deleted)
    }

    // Task Operations

    /// Tasks shown under `current_topic`. "Favourites" and "Default" are
    /// views across all topics.
    pub fn load_tasks(&self, current_topic: &Topic) -> StoreResult<Vec<Task>> {
        let mut conn = self.pool.get()?;

        let tasks = match current_topic.default_kind() {
            Some(DefaultTopic::Favourites) => task::table
                .filter(task::favourite.eq(true))
                .order_by(task::id)
                .load::<Task>(&mut conn)?,
            Some(DefaultTopic::Default) => task::table.order_by(task::id).load::<Task>(&mut conn)?,
            None => Task::belonging_to(current_topic)
                .order_by(task::id)
                .load::<Task>(&mut conn)?,
        };
        debug!(self.log, "Loaded tasks"; "topic" => &current_topic.name, "count" => tasks.len());
        Ok(tasks)
    }

    pub fn add_task(&self, topic_id: i32, name: &str, description: &str) -> StoreResult<Task> {
        let now = now_timestamp();
        let new_task = NewTask {
            topic_id,
            name,
            description,
            created_at: &now,
            updated_at: &now,
        };

        let mut conn = self.pool.get()?;
        let created = conn.transaction::<_, StoreError, _>(|conn| {
            let target: Topic = topic::table
                .find(topic_id)
                .first(conn)
                .optional()?
                .ok_or(StoreError::TopicNotFound(topic_id))?;

            // Favourites is a flag, not a place tasks live in.
            if target.default_kind() == Some(DefaultTopic::Favourites) {
                return Err(StoreError::ProtectedTopic(target.name));
            }

            diesel::insert_into(task::table)
                .values(&new_task)
                .execute(conn)?;

            Ok(task::table.order_by(task::id.desc()).first::<Task>(conn)?)
        })?;

        info!(self.log, "Added task"; "id" => created.id, "topic_id" => topic_id);
        Ok(created)
    }

    /// Apply `update` and stamp `updated_at` with the current time.
    pub fn update_task(&self, task_id: i32, update: TaskUpdate) -> StoreResult<Task> {
        let now = now_timestamp();
        let mut conn = self.pool.get()?;

        let updated = diesel::update(task::table.find(task_id))
            .set((update, task::updated_at.eq(&now)))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(StoreError::TaskNotFound(task_id));
        }

        Ok(task::table.find(task_id).get_result::<Task>(&mut conn)?)
    }

    pub fn toggle_task_completion(&self, task_id: i32) -> StoreResult<Task> {
        self.toggle(task_id, |current| TaskUpdate {
            completed: Some(!current.completed),
            ..Default::default()
        })
    }

    pub fn toggle_task_favourite(&self, task_id: i32) -> StoreResult<Task> {
        self.toggle(task_id, |current| TaskUpdate {
            favourite: Some(!current.favourite),
            ..Default::default()
        })
    }

    /// Read-modify-write of one task inside a transaction.
    fn toggle<F>(&self, task_id: i32, change: F) -> StoreResult<Task>
    where
        F: Fn(&Task) -> TaskUpdate<'static>,
    {
        let now = now_timestamp();
        let mut conn = self.pool.get()?;

        let task = conn.transaction::<_, StoreError, _>(|conn| {
            let current = task::table
                .find(task_id)
                .get_result::<Task>(conn)
                .optional()?
                .ok_or(StoreError::TaskNotFound(task_id))?;

            diesel::update(task::table.find(task_id))
                .set((change(&current), task::updated_at.eq(&now)))
                .execute(conn)?;

            Ok(task::table.find(task_id).get_result::<Task>(conn)?)
        })?;

        info!(self.log, "Toggled task";
            "id" => task.id, "completed" => task.completed, "favourite" => task.favourite);
        Ok(task)
    }

    pub fn delete_task(&self, task_id: i32) -> StoreResult<usize> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(task::table.find(task_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(StoreError::TaskNotFound(task_id));
        }
        info!(self.log, "Deleted task"; "id" => task_id);
        Ok(deleted)
    }
}
