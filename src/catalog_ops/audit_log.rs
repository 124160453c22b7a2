//! Append-only audit trail of planned and executed catalog edits.
//!
//! Every line is appended synchronously to a plain text file which is opened
//! per write and never truncated. Lines are mirrored to `tracing` under the
//! `audit` target.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub const DEFAULT_LOG_PATH: &str = "output.log";

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH)
    }
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn line(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        if !message.is_empty() {
            info!(target = "audit", "{message}");
        }
        self.append(message);
    }

    /// Same as [`AuditLog::line`] but mirrored at warn level.
    pub fn failure(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!(target = "audit", "{message}");
        self.append(message);
    }

    fn append(&self, message: &str) {
        let res = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{message}"));
        if let Err(err) = res {
            warn!(target = "audit", path = %self.path.display(), error = %err, "audit log append failed");
        }
    }
}
