//! Gateway that appends messages to a JSON-lines log file.
//!
//! Useful offline and in tests: each message becomes one line
//! `{"timestamp": ..., "recipient": ..., "message": ...}`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Delivery, MessageGateway};

/// One line of the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedMessage {
    pub timestamp: DateTime<Utc>,
    pub recipient: String,
    pub message: String,
}

/// Appends every message to a log file.
#[derive(Debug)]
pub struct LogFileGateway {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LogFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &LoggedMessage) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    /// Read back every logged message, oldest first.
    pub fn read_all(&self) -> std::io::Result<Vec<LoggedMessage>> {
        read_log(&self.path)
    }
}

impl MessageGateway for LogFileGateway {
    fn send(&self, message: &str, recipient: &str) -> Delivery {
        let entry = LoggedMessage {
            timestamp: Utc::now(),
            recipient: recipient.to_string(),
            message: message.to_string(),
        };
        match self.append(&entry) {
            Ok(()) => Delivery::delivered(format!("Message written to {}", self.path.display())),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "message log write failed");
                Delivery::failed(format!("Failed to write message log: {}", err))
            }
        }
    }
}

/// Parse a message log file.
pub fn read_log(path: &Path) -> std::io::Result<Vec<LoggedMessage>> {
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(std::io::Error::from))
        .collect()
}
