//! Run log.
//!
//! Pipeline progress is emitted as `tracing` events through the helpers
//! below. [`setup_logger`] installs the subscriber: a stderr layer in verbose
//! mode and a daily-rolling file layer when a log file is configured. The
//! level filter can be overridden with the `DOBBY_LOG` environment variable
//! (`EnvFilter` syntax, e.g. `DOBBY_LOG=dobby=trace`).

use std::fmt::Display;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{LogError, LogResult};

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "DOBBY_LOG";

/// Rolled files kept next to the current one.
pub const MAX_LOG_FILES: usize = 7;

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "dobby=debug"
    } else {
        "dobby=info"
    }
}

/// Filter from `DOBBY_LOG`, falling back to info (debug when verbose).
pub fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Daily-rolling appender for `path`.
///
/// `logs/dobby.log` becomes `logs/dobby.YYYY-MM-DD.log`; the directory is
/// created on first write.
pub fn file_appender(path: &Path) -> LogResult<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path.file_stem().and_then(|s| s.to_str()).unwrap_or("dobby");

    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(MAX_LOG_FILES);
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        builder = builder.filename_suffix(ext);
    }
    builder.build(dir).map_err(|source| LogError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the whole run.
pub fn setup_logger(verbose: bool, log_file: Option<&Path>) -> LogResult<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = verbose.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

pub fn log_debug(msg: impl Display) {
    tracing::debug!("{}", msg);
}

pub fn log_info(msg: impl Display) {
    tracing::info!("{}", msg);
}

/// Info event tagged `outcome="success"`.
pub fn log_success(msg: impl Display) {
    tracing::info!(outcome = "success", "{}", msg);
}

pub fn log_warning(msg: impl Display) {
    tracing::warn!("{}", msg);
}

pub fn log_error(msg: impl Display) {
    tracing::error!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn written(dir: &Path) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| {
                let path: PathBuf = entry.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                (name, fs::read_to_string(&path).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_file_layer_writes_events() {
        let dir = tempfile::tempdir().unwrap();
        let appender = file_appender(&dir.path().join("logs").join("dobby.log")).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(appender));

        tracing::subscriber::with_default(subscriber, || {
            log_info("Loaded 2 rows");
            log_warning("1 invalid RUT");
            log_success("Saved 2 rows");
        });

        let files = written(&dir.path().join("logs"));
        assert_eq!(files.len(), 1);
        let (name, content) = &files[0];
        assert!(name.starts_with("dobby."));
        assert!(name.ends_with(".log"));

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("INFO") && lines[0].ends_with("Loaded 2 rows"));
        assert!(lines[1].contains("WARN") && lines[1].ends_with("1 invalid RUT"));
        assert!(lines[2].contains("outcome=\"success\""));
    }

    #[test]
    fn test_default_filter_hides_debug() {
        let dir = tempfile::tempdir().unwrap();
        let appender = file_appender(&dir.path().join("run.log")).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(default_directive(false)))
            .with(fmt::layer().with_ansi(false).with_writer(appender));

        tracing::subscriber::with_default(subscriber, || {
            log_debug("stage detail");
            log_error("Transformation failed");
        });

        let files = written(dir.path());
        assert_eq!(files.len(), 1);
        assert!(!files[0].1.contains("stage detail"));
        assert!(files[0].1.contains("Transformation failed"));
    }

    #[test]
    fn test_verbose_filter_keeps_debug() {
        let dir = tempfile::tempdir().unwrap();
        let appender = file_appender(&dir.path().join("run.log")).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(default_directive(true)))
            .with(fmt::layer().with_ansi(false).with_writer(appender));

        tracing::subscriber::with_default(subscriber, || log_debug("stage detail"));

        let files = written(dir.path());
        assert!(files[0].1.contains("DEBUG"));
    }

    #[test]
    fn test_log_file_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let appender = file_appender(&dir.path().join("dobby")).unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(appender));

        tracing::subscriber::with_default(subscriber, || log_info("hello"));

        let files = written(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].0.starts_with("dobby."));
        assert!(!files[0].0.ends_with(".log"));
    }
}
