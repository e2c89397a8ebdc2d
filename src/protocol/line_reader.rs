use heapless::Vec;

use crate::config::COMMAND_LINE_MAX;

pub enum LineReadEvent<'a> {
    None,
    Complete(&'a [u8]),
    /// The current line outgrew the buffer. Reported once; the rest of the line
    /// up to its `\n` is discarded.
    Overflow,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Framing {
    Collecting,
    /// The last line was handed out and is still in the buffer.
    Delivered,
    Discarding,
}

/// Byte-at-a-time framing: `\n` ends a line, `\r` is dropped wherever it appears,
/// and empty lines produce nothing.
pub struct LineReader {
    pending: Vec<u8, COMMAND_LINE_MAX>,
    framing: Framing,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            framing: Framing::Collecting,
        }
    }

    pub fn push_byte(&mut self, byte: u8) -> LineReadEvent<'_> {
        if byte == b'\r' {
            return LineReadEvent::None;
        }
        if self.framing == Framing::Delivered {
            self.pending.clear();
            self.framing = Framing::Collecting;
        }

        match (byte, self.framing) {
            (b'\n', Framing::Discarding) => {
                self.framing = Framing::Collecting;
                LineReadEvent::None
            }
            (b'\n', _) if self.pending.is_empty() => LineReadEvent::None,
            (b'\n', _) => {
                self.framing = Framing::Delivered;
                LineReadEvent::Complete(&self.pending)
            }
            (_, Framing::Discarding) => LineReadEvent::None,
            (_, _) => {
                if self.pending.push(byte).is_ok() {
                    return LineReadEvent::None;
                }
                self.pending.clear();
                self.framing = Framing::Discarding;
                LineReadEvent::Overflow
            }
        }
    }
}
