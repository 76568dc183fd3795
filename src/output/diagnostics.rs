use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ConfigError;

/// Operator-facing event log.
///
/// Every note goes to `tracing` and, when a file is configured, is appended as
/// a single-column row to the shared diagnostics CSV.
pub struct Diagnostics {
    writer: Option<csv::Writer<File>>,
    path: Option<PathBuf>,
}

impl Diagnostics {
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ConfigError::OutputDir {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            writer: Some(csv::Writer::from_writer(file)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Log-only sink.
    pub fn disabled() -> Self {
        Self {
            writer: None,
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn note(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{}", message);
        self.append(message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!("{}", message);
        self.append(message);
    }

    fn append(&mut self, message: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let result = writer
            .write_record([message])
            .map_err(anyhow::Error::from)
            .and_then(|_| writer.flush().map_err(anyhow::Error::from));
        if let Err(e) = result {
            // Losing a diagnostics row never stops a run
            warn!("Failed to append to diagnostics file: {}", e);
        }
    }
}
