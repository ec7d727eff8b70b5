//! Error logging collaborator.
//!
//! The dispatcher reports every request failure through [`ErrorLogger`].
//! Implementations must not panic or propagate their own I/O errors.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &dyn Error);
}

/// Logs failures as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorLogger;

impl ErrorLogger for TracingErrorLogger {
    fn log_error(&self, error: &dyn Error) {
        tracing::error!(error = %error, "Request failed");
    }
}

/// Appends `[timestamp] message` lines to an error log file.
#[derive(Debug)]
pub struct FileErrorLogger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileErrorLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl ErrorLogger for FileErrorLogger {
    fn log_error(&self, error: &dyn Error) {
        tracing::error!(error = %error, "Request failed");

        let line = format!(
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            error
        );
        if let Err(e) = self.append(&line) {
            tracing::warn!(path = ?self.path, error = %e, "Failed to write error log");
        }
    }
}
