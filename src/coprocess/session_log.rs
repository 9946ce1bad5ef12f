//! Timestamped session log for log mode.
//!
//! The file is opened in append mode for the whole session and bracketed by start/end
//! markers. Every line is flushed as it is written. [`SessionLog::close`] writes the end
//! marker exactly once; it runs on drop and from the interrupt hook, whichever comes first.

use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn marker_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub struct SessionLog {
    path: PathBuf,
    file: Option<File>,
    lines: u64,
}

impl SessionLog {
    /// Open (or create) the log file, creating missing parent directories, and write the
    /// session-start marker.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "\n--- Session started {} ---\n", marker_time())?;
        file.flush()?;
        log::info!("Session log opened: {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            lines: 0,
        })
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append one timestamped line. A no-op once the log has been closed.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        writeln!(file, "[{}] {}", Utc::now().format("%H:%M:%S%.3f"), line)?;
        file.flush()?;
        self.lines += 1;
        Ok(())
    }

    /// Write the session-end marker and release the file. Idempotent.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            writeln!(file, "--- Session ended {} ---", marker_time())?;
            file.flush()?;
            log::info!(
                "Session log closed: {:?} ({} lines)",
                self.path,
                self.lines
            );
        }
        Ok(())
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close session log {:?}: {}", self.path, e);
        }
    }
}
