//! Log output
//!
//! Every line goes to stdout and is mirrored into an append-only file that
//! the log shipper tails. The file is never rotated by this process.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LogFormat;
use crate::error::StartupError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Open `path` for appending, creating it and its parent directory if needed
pub fn open_log_file(path: &Path) -> Result<Arc<File>, StartupError> {
    let to_error = |source| StartupError::LogFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;

    Ok(Arc::new(file))
}

/// Install the global subscriber: stdout, the mirrored log file and an
/// optional extra layer (the OTel bridge). `RUST_LOG` overrides the default
/// `info` filter.
pub fn init_logging<L>(
    format: LogFormat,
    log_file: Arc<File>,
    extra: Option<L>,
) -> Result<(), StartupError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let mut layers: Vec<BoxedLayer> = match format {
        LogFormat::Text => vec![
            fmt::layer().boxed(),
            fmt::layer().with_ansi(false).with_writer(log_file).boxed(),
        ],
        LogFormat::Json => vec![
            fmt::layer().json().boxed(),
            fmt::layer().json().with_writer(log_file).boxed(),
        ],
    };

    if let Some(layer) = extra {
        layers.push(layer.boxed());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| StartupError::Logging(e.to_string()))
}

/// Dispatcher writing to `writer` alone, for failures reported before
/// [`init_logging`] has installed the global subscriber
pub fn early_dispatch<W>(format: LogFormat, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer: BoxedLayer = match format {
        LogFormat::Text => fmt::layer().with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };
    Dispatch::new(tracing_subscriber::registry().with(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/modern-app/app.log");

        let file = open_log_file(&path).unwrap();
        (&*file).write_all(b"first\n").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "existing\n").unwrap();

        let file = open_log_file(&path).unwrap();
        (&*file).write_all(b"appended\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nappended\n");
    }

    #[test]
    fn test_unwritable_path_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as the log file
        let result = open_log_file(dir.path());

        assert!(matches!(result, Err(StartupError::LogFile { .. })));
    }

    #[test]
    fn test_early_dispatch_reports_without_global_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("early.log");
        let sink = open_log_file(&path).unwrap();

        tracing::dispatcher::with_default(&early_dispatch(LogFormat::Json, sink), || {
            tracing::error!(error = "permission denied", "Failed to open log file");
        });

        let contents = fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
        assert_eq!(line["level"], "ERROR");
        assert_eq!(line["fields"]["message"], "Failed to open log file");
        assert_eq!(line["fields"]["error"], "permission denied");
    }
}
