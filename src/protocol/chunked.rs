use core::fmt;

/// `fmt::Write` front for transports with a payload limit. Text is buffered and
/// handed to `send` in pieces of at most `N` bytes; call `flush` at the end of a
/// response. A piece may split a multi-byte character, the peer reassembles bytes.
pub struct ChunkedWriter<F, const N: usize> {
    send: F,
    buf: heapless::Vec<u8, N>,
}

impl<F, E, const N: usize> ChunkedWriter<F, N>
where
    F: FnMut(&[u8]) -> Result<(), E>,
{
    pub fn new(send: F) -> Self {
        Self {
            send,
            buf: heapless::Vec::new(),
        }
    }

    pub fn flush(&mut self) -> Result<(), E> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = (self.send)(&self.buf);
        self.buf.clear();
        result
    }
}

impl<F, E, const N: usize> fmt::Write for ChunkedWriter<F, N>
where
    F: FnMut(&[u8]) -> Result<(), E>,
{
    fn write_str(&mut self, text: &str) -> fmt::Result {
        let mut rest = text.as_bytes();
        while !rest.is_empty() {
            let room = N - self.buf.len();
            let (head, tail) = rest.split_at(room.min(rest.len()));
            // `head` fits by construction.
            let _ = self.buf.extend_from_slice(head);
            rest = tail;
            if self.buf.len() == N {
                self.flush().map_err(|_| fmt::Error)?;
            }
        }
        Ok(())
    }
}
