use super::LogPath;
use crate::{
    config::LOG_LINE_MAX,
    storage::{StorageError, Volume},
};

pub type LogLine = heapless::String<LOG_LINE_MAX>;

const CHUNK_LEN: usize = LOG_LINE_MAX + 1;

/// Single pass over a log file, one chunk read per line.
///
/// Lines longer than `LOG_LINE_MAX` come out truncated and the remainder up to the
/// next newline is skipped. A read error ends the iteration after being yielded once.
pub struct LogLines<'v, V> {
    volume: &'v mut V,
    path: LogPath,
    offset: usize,
    len: usize,
    chunk: [u8; CHUNK_LEN],
    failed: bool,
}

impl<'v, V: Volume> LogLines<'v, V> {
    pub(super) fn new(volume: &'v mut V, path: LogPath, len: usize) -> Self {
        Self {
            volume,
            path,
            offset: 0,
            len,
            chunk: [0; CHUNK_LEN],
            failed: false,
        }
    }

    fn skip_past_newline(&mut self, mut from: usize) -> Result<usize, StorageError> {
        while from < self.len {
            let read = self.volume.read(&self.path, from, &mut self.chunk)?;
            if read == 0 {
                return Ok(self.len);
            }
            if let Some(idx) = self.chunk[..read].iter().position(|&byte| byte == b'\n') {
                return Ok(from + idx + 1);
            }
            from += read;
        }
        Ok(self.len)
    }

    fn next_line(&mut self) -> Result<Option<LogLine>, StorageError> {
        if self.offset >= self.len {
            return Ok(None);
        }
        let read = self.volume.read(&self.path, self.offset, &mut self.chunk)?;
        if read == 0 {
            self.offset = self.len;
            return Ok(None);
        }

        let window = &self.chunk[..read];
        let (line, next_offset) = match window.iter().position(|&byte| byte == b'\n') {
            Some(idx) => (to_line(&window[..idx]), self.offset + idx + 1),
            None if self.offset + read >= self.len => (to_line(window), self.len),
            None => {
                let line = to_line(&window[..LOG_LINE_MAX.min(read)]);
                let resume = self.skip_past_newline(self.offset + read)?;
                (line, resume)
            }
        };
        self.offset = next_offset;
        Ok(Some(line))
    }
}

impl<V: Volume> Iterator for LogLines<'_, V> {
    type Item = Result<LogLine, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_line() {
            Ok(line) => line.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn to_line(bytes: &[u8]) -> LogLine {
    let text = match core::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => match core::str::from_utf8(&bytes[..err.valid_up_to()]) {
            Ok(valid) => valid,
            Err(_) => "",
        },
    };
    let text = super::truncate_str(text.trim_end_matches('\r'), LOG_LINE_MAX);
    let mut line = LogLine::new();
    let _ = line.push_str(text);
    line
}
