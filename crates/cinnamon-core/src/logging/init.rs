use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::{enable_debug_mode, set_logging_level, CinnamonFormat, LogLevel, SINK_TARGET};
use crate::config::logging_config::LoggingConfig;
use crate::config::paths::ProjectPaths;

const MAX_LOG_SIZE: u64 = 1024 * 1024; // 1MB

/// Install the global subscriber and apply the configured sink level.
///
/// Console lines are always written to stdout. With `file = true` a second,
/// non-blocking layer appends to `<data_dir>/logs/cinnamon.log`; the returned
/// guard must be kept alive for the duration of the program.
pub fn init_logging(config: &LoggingConfig) -> io::Result<Option<WorkerGuard>> {
    set_logging_level(config.level);

    let base_level = if config.debug {
        LogLevel::Debug
    } else {
        config.level
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // The sink does its own level check, so let everything on its target through
        EnvFilter::new(format!(
            "{},{}=trace",
            base_level.filter_directive(),
            SINK_TARGET
        ))
    });

    let console = fmt::layer()
        .with_writer(io::stdout)
        .event_format(CinnamonFormat::default());

    let guard = if config.file {
        let log_path = get_log_directory()?.join("cinnamon.log");
        let (writer, guard) = open_log_file(&log_path)?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            )
            .try_init()
            .map_err(io::Error::other)?;

        tracing::info!(target: "cinnamon::logging", "Logging to file: {}", log_path.display());
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .try_init()
            .map_err(io::Error::other)?;
        None
    };

    if config.debug {
        enable_debug_mode();
    }

    Ok(guard)
}

fn open_log_file(
    log_path: &Path,
) -> io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    truncate_if_needed(log_path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    Ok(tracing_appender::non_blocking(BufWriter::new(file)))
}

/// Get the log directory path.
fn get_log_directory() -> io::Result<PathBuf> {
    let proj_paths = ProjectPaths::new("cinnamon")
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Failed to find home directory"))?;

    Ok(proj_paths.data_dir().join("logs"))
}

/// Truncate log file if it exceeds MAX_LOG_SIZE.
fn truncate_if_needed(log_path: &Path) -> io::Result<()> {
    if log_path.exists() && fs::metadata(log_path)?.len() > MAX_LOG_SIZE {
        File::create(log_path)?.set_len(0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_small_log_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cinnamon.log");
        fs::write(&path, b"keep me\n").unwrap();

        truncate_if_needed(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
    }

    #[test]
    fn test_oversized_log_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cinnamon.log");
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![b'x'; (MAX_LOG_SIZE + 1) as usize]).unwrap();
        drop(file);

        truncate_if_needed(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_missing_log_is_not_created_by_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");
        truncate_if_needed(&path).unwrap();
        assert!(!path.exists());
    }
}
