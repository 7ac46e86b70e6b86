use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging to `file`. The terminal is owned by the UI, so log
/// lines never go to stdout or stderr.
///
/// Without `debug` the level is fixed at `info`. With it the default is
/// `debug` and `RUST_LOG` may override it. Keep the returned guard alive
/// until exit so buffered lines are flushed. Returns `None`, leaving the
/// tool without logs, when the file cannot be opened.
pub fn init(debug: bool, file: &Path) -> Option<WorkerGuard> {
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let (writer, guard) = tracing_appender::non_blocking(file_appender(file)?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

/// A non-rotating appender writing exactly to `file`.
fn file_appender(file: &Path) -> Option<RollingFileAppender> {
    let dir = file.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = file.file_name()?.to_str()?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("help-layer-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn appender_creates_the_named_file() {
        let dir = scratch("ok");
        let file = dir.join("tour.log");
        assert!(file_appender(&file).is_some());
        assert!(file.exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unwritable_location_disables_logging() {
        let dir = scratch("blocked");
        // A regular file where the log directory should be.
        let blocker = dir.join("not-a-dir");
        let _ = fs::write(&blocker, b"");
        assert!(file_appender(&blocker.join("tour.log")).is_none());
        assert!(init(false, &blocker.join("tour.log")).is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
