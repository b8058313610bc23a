//! Append-only ingestion log.
//!
//! One line per event: `<timestamp> <LEVEL>: <message>`. The log is an
//! explicit value owned by the caller and handed to the orchestrator, so
//! tests can capture it in memory with [`IngestLog::in_memory`].

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use chrono::format::{Item, StrftimeItems};

use crate::io::config::DEFAULT_TIMESTAMP_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct IngestLog {
    writer: Box<dyn Write + Send>,
    timestamp_format: String,
}

impl fmt::Debug for IngestLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestLog")
            .field("timestamp_format", &self.timestamp_format)
            .finish_non_exhaustive()
    }
}

impl IngestLog {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// Open `path` for appending, creating it (and its parent directory) if needed.
    pub fn append_to(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log {}", path.display()))?;
        Ok(Self::new(file))
    }

    /// Log backed by a shared in-memory buffer.
    pub fn in_memory() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Use a custom `strftime` pattern for line timestamps.
    ///
    /// Errors if the pattern cannot be rendered.
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        validate_timestamp_format(&format)?;
        self.timestamp_format = format;
        Ok(self)
    }

    pub fn info(&mut self, message: impl fmt::Display) -> Result<()> {
        self.write_line(LogLevel::Info, message)
    }

    pub fn error(&mut self, message: impl fmt::Display) -> Result<()> {
        self.write_line(LogLevel::Error, message)
    }

    fn write_line(&mut self, level: LogLevel, message: impl fmt::Display) -> Result<()> {
        let timestamp = Local::now().format(&self.timestamp_format);
        writeln!(self.writer, "{timestamp} {level}: {message}").context("write log line")?;
        self.writer.flush().context("flush log")?;
        Ok(())
    }
}

/// Check that `format` is a non-empty, well-formed `strftime` pattern.
pub fn validate_timestamp_format(format: &str) -> Result<()> {
    if format.trim().is_empty() {
        return Err(anyhow!("timestamp_format must be non-empty"));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(anyhow!(
            "timestamp_format '{format}' is not a valid strftime pattern"
        ));
    }
    Ok(())
}

/// Shared byte buffer that an in-memory [`IngestLog`] writes into.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Level and message of every line, timestamps stripped.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.contents().lines().filter_map(parse_line).collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log buffer lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Split a log line into level and message.
pub fn parse_line(line: &str) -> Option<(LogLevel, String)> {
    [LogLevel::Info, LogLevel::Error]
        .into_iter()
        .filter_map(|level| {
            let marker = format!(" {level}: ");
            line.find(&marker)
                .map(|index| (index, level, line[index + marker.len()..].to_string()))
        })
        .min_by_key(|(index, _, _)| *index)
        .map(|(_, level, message)| (level, message))
}
