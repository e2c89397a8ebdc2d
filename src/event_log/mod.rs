mod lines;

use core::fmt::{self, Write as _};

use log::{info, warn};

pub use lines::{LogLine, LogLines};

use crate::{
    config::{LOG_FILE_MAX, LOG_LINE_MAX, LOG_PATH_MAX, LOG_SUFFIX, NOTE_TEXT_MAX},
    storage::{read_exact, StorageError, Volume},
    types::DateTime,
};

pub type LogPath = heapless::String<LOG_PATH_MAX>;

/// Where the log for `trap_name` lives. Recomputed on every use so a rename can
/// never leave a stale path behind.
pub fn log_identity(trap_name: &str) -> LogPath {
    let mut path = LogPath::new();
    let _ = write!(path, "/{}{}", trap_name, LOG_SUFFIX);
    path
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogMessage<'a> {
    Triggered,
    KnockDetected,
    TrapActivation,
    Note(&'a str),
}

impl<'a> LogMessage<'a> {
    /// Builds a note, cutting the text at `NOTE_TEXT_MAX` bytes on a char boundary.
    pub fn note(text: &'a str) -> Self {
        Self::Note(truncate_str(text, NOTE_TEXT_MAX))
    }
}

impl fmt::Display for LogMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triggered => f.write_str("TRIGGERED"),
            Self::KnockDetected => f.write_str("KNOCK DETECTED"),
            Self::TrapActivation => f.write_str("TRAP ACTIVATION"),
            Self::Note(text) => {
                f.write_str("NOTE ")?;
                // One entry is one line, whatever the note carries.
                for ch in text.chars() {
                    f.write_char(if ch.is_control() { ' ' } else { ch })?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogEntry<'a> {
    pub trap_name: &'a str,
    pub timestamp: DateTime,
    pub message: LogMessage<'a>,
    pub temperature: Option<f32>,
}

impl fmt::Display for LogEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.trap_name, self.timestamp, self.message)?;
        if let Some(celsius) = self.temperature {
            write!(f, " - {:.2}C", celsius)?;
        }
        Ok(())
    }
}

/// Append-only text log with a line-count cap.
///
/// Trimming needs the whole file in RAM once, so the log keeps a scratch buffer
/// sized to the largest file the volume can hold.
pub struct EventLog {
    scratch: heapless::Vec<u8, LOG_FILE_MAX>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub const fn new() -> Self {
        Self {
            scratch: heapless::Vec::new(),
        }
    }

    pub fn append<V: Volume>(
        &mut self,
        volume: &mut V,
        entry: &LogEntry<'_>,
        max_lines: u32,
    ) -> Result<(), StorageError> {
        let path = log_identity(entry.trap_name);
        let mut line = heapless::String::<{ LOG_LINE_MAX + 1 }>::new();
        if write!(line, "{}", entry).is_err() || line.len() > LOG_LINE_MAX {
            warn!("log: entry does not fit one line, truncating");
            let cut = truncate_str(line.as_str(), LOG_LINE_MAX).len();
            line.truncate(cut);
        }
        let _ = line.push('\n');

        let stored = volume.len(&path)?.unwrap_or(0);
        let appended = if stored + line.len() > self.capacity(volume) {
            self.evict_and_append(volume, &path, stored, line.as_bytes())
        } else {
            volume.append(&path, line.as_bytes())
        };
        if let Err(err) = appended {
            warn!("log: append to {} failed: {}", path, err);
            return Err(err);
        }
        // The entry is stored; a failed trim is retried on the next append.
        if let Err(err) = self.enforce_retention(volume, entry.trap_name, max_lines) {
            warn!("log: retention on {} failed: {}", path, err);
        }
        Ok(())
    }

    /// Bytes one log file may occupy: the volume's limit, bounded by the scratch buffer.
    fn capacity<V: Volume>(&self, volume: &V) -> usize {
        volume.file_capacity().min(LOG_FILE_MAX)
    }

    /// The file is full: drops the oldest lines until `line` fits, then replaces
    /// the file with what is left plus `line` in one write.
    fn evict_and_append<V: Volume>(
        &mut self,
        volume: &mut V,
        path: &str,
        stored: usize,
        line: &[u8],
    ) -> Result<(), StorageError> {
        let budget = self
            .capacity(volume)
            .checked_sub(line.len())
            .ok_or(StorageError::Full)?;
        self.scratch.clear();
        self.scratch
            .resize(stored, 0)
            .map_err(|_| StorageError::Full)?;
        read_exact(volume, path, &mut self.scratch)?;

        let mut start = 0;
        while self.scratch.len() - start > budget {
            start = next_line_start(&self.scratch, start);
        }
        let evicted = count_lines(&self.scratch[..start]);
        self.scratch.copy_within(start.., 0);
        self.scratch.truncate(stored - start);
        self.scratch
            .extend_from_slice(line)
            .map_err(|_| StorageError::Full)?;
        volume.write(path, &self.scratch)?;
        info!("log: {} full, evicted {} oldest lines", path, evicted);
        Ok(())
    }

    /// `Ok(None)` when there is nothing to show.
    pub fn read_all<'v, V: Volume>(
        volume: &'v mut V,
        trap_name: &str,
    ) -> Result<Option<LogLines<'v, V>>, StorageError> {
        let path = log_identity(trap_name);
        match volume.len(&path)? {
            None | Some(0) => Ok(None),
            Some(len) => Ok(Some(LogLines::new(volume, path, len))),
        }
    }

    pub fn clear<V: Volume>(volume: &mut V, trap_name: &str) -> Result<(), StorageError> {
        let path = log_identity(trap_name);
        volume.remove(&path)?;
        info!("log: cleared {}", path);
        Ok(())
    }

    /// Drops the history kept under the previous name; the new name starts empty.
    pub fn rebind<V: Volume>(volume: &mut V, old_name: &str) -> Result<(), StorageError> {
        Self::clear(volume, old_name)
    }

    /// Keeps the last `max_lines` lines. Returns how many lines remain.
    pub fn enforce_retention<V: Volume>(
        &mut self,
        volume: &mut V,
        trap_name: &str,
        max_lines: u32,
    ) -> Result<usize, StorageError> {
        let path = log_identity(trap_name);
        let Some(len) = volume.len(&path)? else {
            return Ok(0);
        };

        self.scratch.clear();
        self.scratch
            .resize(len, 0)
            .map_err(|_| StorageError::Full)?;
        read_exact(volume, &path, &mut self.scratch)?;

        let total = count_lines(&self.scratch);
        let keep = max_lines as usize;
        if total <= keep {
            return Ok(total);
        }

        let start = line_start(&self.scratch, total - keep);
        volume.write(&path, &self.scratch[start..])?;
        info!("log: trimmed {} of {} lines in {}", total - keep, total, path);
        Ok(keep)
    }
}

/// A newline ends a line; bytes after the last newline form one more line.
pub(crate) fn count_lines(bytes: &[u8]) -> usize {
    let terminated = bytes.iter().filter(|&&byte| byte == b'\n').count();
    match bytes.last() {
        Some(&last) if last != b'\n' => terminated + 1,
        _ => terminated,
    }
}

/// Byte offset where line number `skip` (zero-based) begins.
fn line_start(bytes: &[u8], skip: usize) -> usize {
    if skip == 0 {
        return 0;
    }
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &byte)| byte == b'\n')
        .nth(skip - 1)
        .map_or(bytes.len(), |(idx, _)| idx + 1)
}

/// Offset just past the newline that ends the line starting at `from`.
fn next_line_start(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(bytes.len(), |idx| from + idx + 1)
}

pub(crate) fn truncate_str(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}
