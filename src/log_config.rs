use slog::{o, Discard, Drain, Logger};
use slog_envlogger::LogBuilder;
use std::fs::{create_dir_all, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();
static DISCARD: OnceLock<Logger> = OnceLock::new();

/// Set up the root logger: compact output on the terminal and JSON lines in
/// `<log_dir>/app.log`, both filtered by `filter` (`RUST_LOG` syntax).
///
/// Only the first call builds the logger; later calls return it unchanged.
pub fn init_logger(log_dir: &Path, filter: &str) -> io::Result<&'static Logger> {
    if let Some(logger) = LOGGER.get() {
        return Ok(logger);
    }

    if !log_dir.exists() {
        create_dir_all(log_dir)?;
    }

    // Terminal drain
    let decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let term_drain = slog_async::Async::new(term_drain).build().fuse();

    // File drain (JSON)
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))?;
    let file_drain = slog_json::Json::default(file).fuse();
    let file_drain = slog_async::Async::new(file_drain).build().fuse();

    let combined_drain = slog::Duplicate::new(term_drain, file_drain).fuse();
    let env_drain = LogBuilder::new(combined_drain).parse(filter).build().fuse();

    let logger = Logger::root(env_drain, o!("version" => env!("CARGO_PKG_VERSION")));
    Ok(LOGGER.get_or_init(|| logger))
}

/// The root logger, or a logger that drops everything if `init_logger` has
/// not run (library use, tests).
pub fn get_logger() -> &'static Logger {
    LOGGER
        .get()
        .unwrap_or_else(|| DISCARD.get_or_init(|| Logger::root(Discard, o!())))
}
