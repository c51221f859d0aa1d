use std::path::PathBuf;

use crate::error::ConfigError;

pub const DB_DIR_VAR: &str = "TASK_MANAGER_DB_DIR";
pub const DB_FILENAME_VAR: &str = "TASK_MANAGER_DB_FILENAME";
pub const LOG_DIR_VAR: &str = "TASK_MANAGER_LOG_DIR";
pub const POOL_SIZE_VAR: &str = "TASK_MANAGER_POOL_SIZE";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_DB_FILENAME: &str = "task_manager.db";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_POOL_SIZE: u32 = 4;
const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings for the store, usually read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_dir: PathBuf,
    pub db_filename: String,
    pub log_dir: PathBuf,
    pub pool_size: u32,
    pub log_filter: String,
}

impl Config {
    /// Read the configuration from process environment variables.
    ///
    /// Call `dotenv::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_dir = match non_empty(lookup(DB_DIR_VAR)) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("task_manager"),
        };

        let db_filename = match non_empty(lookup(DB_FILENAME_VAR)) {
            Some(name) if name.contains(['/', '\\']) => {
                return Err(ConfigError::InvalidValue {
                    key: DB_FILENAME_VAR,
                    value: name,
                    reason: "must be a file name, not a path".to_string(),
                })
            }
            Some(name) => name,
            None => DEFAULT_DB_FILENAME.to_string(),
        };

        let log_dir = non_empty(lookup(LOG_DIR_VAR))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let pool_size = match non_empty(lookup(POOL_SIZE_VAR)) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: POOL_SIZE_VAR,
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        key: POOL_SIZE_VAR,
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        let log_filter =
            non_empty(lookup(LOG_FILTER_VAR)).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Config {
            db_dir,
            db_filename,
            log_dir,
            pool_size,
            log_filter,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(&self.db_filename)
    }

    /// Connection string handed to diesel.
    pub fn database_url(&self) -> String {
        self.db_path().to_string_lossy().into_owned()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn explicit_values_are_used() {
        let config = Config::from_lookup(lookup_from(&[
            (DB_DIR_VAR, "/tmp/tasks"),
            (DB_FILENAME_VAR, "mine.db"),
            (LOG_DIR_VAR, "/tmp/tasks/logs"),
            (POOL_SIZE_VAR, "2"),
            (LOG_FILTER_VAR, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.db_dir, PathBuf::from("/tmp/tasks"));
        assert_eq!(config.db_filename, "mine.db");
        assert_eq!(config.log_dir, PathBuf::from("/tmp/tasks/logs"));
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/tasks/mine.db"));
        assert_eq!(config.database_url(), "/tmp/tasks/mine.db");
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[(DB_DIR_VAR, "/tmp/tasks")])).unwrap();

        assert_eq!(config.db_filename, DEFAULT_DB_FILENAME);
        assert_eq!(config.log_dir, PathBuf::from(DEFAULT_LOG_DIR));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config =
            Config::from_lookup(lookup_from(&[(DB_DIR_VAR, "/tmp/tasks"), (DB_FILENAME_VAR, "  ")]))
                .unwrap();
        assert_eq!(config.db_filename, DEFAULT_DB_FILENAME);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(DB_DIR_VAR, "/tmp"), (POOL_SIZE_VAR, "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: POOL_SIZE_VAR,
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_pool_size_is_rejected() {
        let err =
            Config::from_lookup(lookup_from(&[(DB_DIR_VAR, "/tmp"), (POOL_SIZE_VAR, "many")]))
                .unwrap_err();
        assert!(err.to_string().contains(POOL_SIZE_VAR));
    }

    #[test]
    fn filename_with_separator_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            (DB_DIR_VAR, "/tmp"),
            (DB_FILENAME_VAR, "nested/task.db"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: DB_FILENAME_VAR,
                ..
            }
        ));
    }
}
