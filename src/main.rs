use slog::{error, info, o, Logger};
use std::env;
use std::error::Error;
use std::fs;

use task_manager_store::config::Config;
use task_manager_store::db::{self, task_manager::DbOperations};
use task_manager_store::log_config;

const USAGE: &str = "usage: task_manager_store [migrate|status|revert]";

fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    let log = log_config::init_logger(&config.log_dir, &config.log_filter)?;
    info!(log, "Starting task manager store");

    let command = env::args().nth(1).unwrap_or_else(|| "migrate".to_string());
    let result = match command.as_str() {
        "migrate" => migrate(&config, log),
        "status" => status(&config, log),
        "revert" => revert(&config, log),
        other => {
            error!(log, "Unknown command"; "command" => other);
            return Err(USAGE.into());
        }
    };

    if let Err(e) = &result {
        error!(log, "Command failed"; "command" => &command, "error" => %e);
    }
    result
}

fn migrate(config: &Config, log: &Logger) -> Result<(), Box<dyn Error>> {
    let pool = db::prepare_database(config, log)?;
    let ops = DbOperations::new(pool, log);

    for topic in ops.load_topics()? {
        let tasks = ops.load_tasks(&topic)?;
        info!(log, "Topic";
            "id" => topic.id, "name" => &topic.name, "tasks" => tasks.len());
    }
    Ok(())
}

fn status(config: &Config, log: &Logger) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&config.db_dir)?;
    let pool = db::establish_connection_pool(&config.database_url(), 1)?;
    let mut conn = pool.get()?;

    let pending = db::pending_migrations(&mut conn)?;
    info!(log, "Migration status";
        "db_path" => config.database_url(), "pending" => pending.join(","));
    Ok(())
}

fn revert(config: &Config, log: &Logger) -> Result<(), Box<dyn Error>> {
    let log = log.new(o!("db_path" => config.database_url()));
    let pool = db::establish_connection_pool(&config.database_url(), 1)?;
    let mut conn = pool.get()?;

    db::revert_migrations(&mut conn, &log)?;
    Ok(())
}
