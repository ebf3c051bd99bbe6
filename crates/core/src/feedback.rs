//! Append-only user feedback log.
//!
//! Feedback is the one piece of mutable state in the system. Rows are only
//! ever appended, a single writer is assumed, and a process-wide mutex
//! serialises writes so concurrent submissions cannot interleave lines.

use crate::constants::{FEEDBACK_HEADER, FEEDBACK_TIMESTAMP_FORMAT};
use crate::{AnalysisError, AnalysisResult};
use chrono::Local;
use npay_types::NonEmptyText;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Service for appending `(timestamp, feedback)` rows to a local CSV log.
///
/// The file is created with a header row on first write; later appends never
/// repeat the header.
#[derive(Debug)]
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one feedback entry with the current local timestamp.
    ///
    /// Whitespace-only text is rejected with [`AnalysisError::EmptyFeedback`]
    /// and the file is not touched; callers surface that as a warning, not a
    /// failure. Accepted text is written exactly as submitted, surrounding
    /// whitespace included.
    pub fn append(&self, text: &str) -> AnalysisResult<()> {
        NonEmptyText::new(text).map_err(|_| AnalysisError::EmptyFeedback)?;
        let timestamp = Local::now().format(FEEDBACK_TIMESTAMP_FORMAT).to_string();
        self.append_row(&timestamp, text)
    }

    fn append_row(&self, timestamp: &str, text: &str) -> AnalysisResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let is_new = !self.path.is_file();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(AnalysisError::FeedbackOpen)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer
                .write_record(FEEDBACK_HEADER)
                .map_err(|e| AnalysisError::FeedbackWrite(csv_io_error(e)))?;
        }
        writer
            .write_record([timestamp, text])
            .map_err(|e| AnalysisError::FeedbackWrite(csv_io_error(e)))?;
        writer
            .flush()
            .map_err(AnalysisError::FeedbackWrite)?;

        tracing::info!(path = %self.path.display(), "feedback appended");
        Ok(())
    }
}

fn csv_io_error(error: csv::Error) -> std::io::Error {
    match error.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::other(format!("csv write failed: {other:?}")),
    }
}
