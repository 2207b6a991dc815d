//! Append-only transition log.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hoverintent_common::error::{HoverIntentError, HoverIntentResult};
use hoverintent_pointer_model::transition::{IntentTransition, TransitionLogHeader};

/// Flush after this many transitions even if the buffer is not full.
const FLUSH_EVERY: u64 = 64;

/// Writes transitions to a JSONL file, one per line, after a `# ` header line.
pub struct TransitionWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    transitions_written: u64,
}

impl TransitionWriter {
    /// Create (or truncate) the log at `path` and write the header.
    pub fn create(path: impl AsRef<Path>, header: &TransitionLogHeader) -> HoverIntentResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}").map_err(|e| {
            HoverIntentError::transition_log(format!("Failed to write header: {e}"))
        })?;

        Ok(Self {
            writer,
            path,
            transitions_written: 0,
        })
    }

    pub fn write(&mut self, transition: &IntentTransition) -> HoverIntentResult<()> {
        let json = serde_json::to_string(transition)?;
        writeln!(self.writer, "{json}").map_err(|e| {
            HoverIntentError::transition_log(format!("Failed to write transition: {e}"))
        })?;
        self.transitions_written += 1;

        if self.transitions_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> HoverIntentResult<()> {
        self.writer.flush().map_err(|e| {
            HoverIntentError::transition_log(format!("Failed to flush transitions: {e}"))
        })
    }

    pub fn transitions_written(&self) -> u64 {
        self.transitions_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransitionWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
