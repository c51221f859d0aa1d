pub mod schema;
pub mod task_manager;

use diesel::connection::SimpleConnection;
use diesel::migration::Migration;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::sql_types::{Integer, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use slog::{error, info, o, Logger};
use std::fs;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};

// Type alias for the database connection pool
pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/migrations");

/// Columns every table must carry, in declaration order.
const EXPECTED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "topic",
        &["id", "name", "description", "created_at", "updated_at"],
    ),
    (
        "task",
        &[
            "id",
            "topic_id",
            "name",
            "description",
            "completed",
            "favourite",
            "created_at",
            "updated_at",
        ],
    ),
];

/// Per-connection SQLite settings. Foreign keys are off by default in SQLite
/// and the setting is not stored in the file, so it is applied to each new
/// connection the pool opens.
#[derive(Debug)]
struct SqlitePragmas;

impl ::r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Initialize the database connection pool
pub fn establish_connection_pool(database_url: &str, max_size: u32) -> StoreResult<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;

    Ok(pool)
}

/// Apply every pending migration. Each migration runs in its own transaction.
///
/// Tables that already exist are checked first: `CREATE TABLE IF NOT EXISTS`
/// would keep a conflicting table and the migration would still be recorded.
pub fn run_migrations(conn: &mut SqliteConnection, log: &Logger) -> StoreResult<Vec<String>> {
    check_tables(conn, false).map_err(|e| {
        error!(log, "Existing schema conflicts with migrations"; "error" => %e);
        e
    })?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| {
            error!(log, "Migration failed"; "error" => %e);
            StoreError::Migration(e)
        })?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();

    if applied.is_empty() {
        info!(log, "Schema is up to date");
    } else {
        info!(log, "Applied migrations"; "versions" => applied.join(","));
    }
    Ok(applied)
}

/// Revert every applied migration, newest first.
pub fn revert_migrations(conn: &mut SqliteConnection, log: &Logger) -> StoreResult<Vec<String>> {
    let reverted = conn
        .revert_all_migrations(MIGRATIONS)
        .map_err(StoreError::Migration)?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();

    info!(log, "Reverted migrations"; "count" => reverted.len());
    Ok(reverted)
}

pub fn pending_migrations(conn: &mut SqliteConnection) -> StoreResult<Vec<String>> {
    let pending = conn
        .pending_migrations(MIGRATIONS)
        .map_err(StoreError::Migration)?;

    Ok(pending.iter().map(|m| m.name().version().to_string()).collect())
}

#[derive(QueryableByName)]
struct TableInfoRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Integer)]
    notnull: i32,
    #[diesel(sql_type = Integer)]
    pk: i32,
}

/// Check that `topic` and `task` exist and carry every expected column.
pub fn verify_schema(conn: &mut SqliteConnection) -> StoreResult<()> {
    check_tables(conn, true)
}

fn check_tables(conn: &mut SqliteConnection, require_present: bool) -> StoreResult<()> {
    for (table, columns) in EXPECTED_COLUMNS {
        let found = diesel::sql_query(format!("PRAGMA table_info({table})"))
            .load::<TableInfoRow>(conn)?;

        if found.is_empty() {
            if !require_present {
                continue;
            }
            return Err(StoreError::SchemaMismatch {
                table: table.to_string(),
                detail: "table is missing".to_string(),
            });
        }

        for column in columns.iter() {
            match found.iter().find(|row| row.name == *column) {
                None => {
                    return Err(StoreError::SchemaMismatch {
                        table: table.to_string(),
                        detail: format!("column `{column}` is missing"),
                    })
                }
                // A rowid alias can never hold NULL, whatever `notnull` says.
                Some(row) if row.notnull == 0 && row.pk == 0 => {
                    return Err(StoreError::SchemaMismatch {
                        table: table.to_string(),
                        detail: format!("column `{column}` is nullable"),
                    })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Create the database directory, open the pool, migrate and verify.
/// Any failure aborts, so callers never see a half-built schema.
pub fn prepare_database(config: &Config, log: &Logger) -> StoreResult<DbPool> {
    let log = log.new(o!("db_path" => config.database_url()));

    fs::create_dir_all(&config.db_dir)?;
    let pool = establish_connection_pool(&config.database_url(), config.pool_size)?;

    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn, &log)?;
        verify_schema(&mut conn)?;
    }

    info!(log, "Database ready");
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use slog::Discard;

    pub fn discard_logger() -> Logger {
        Logger::root(Discard, o!())
    }

    /// In-memory databases live per connection, so the pool is capped at one.
    pub fn memory_pool() -> DbPool {
        establish_connection_pool(":memory:", 1).unwrap()
    }

    pub fn migrated_pool() -> DbPool {
        let pool = memory_pool();
        {
            let mut conn = pool.get().unwrap();
            run_migrations(&mut conn, &discard_logger()).unwrap();
        }
        pool
    }
}
