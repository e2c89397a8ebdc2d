use embedded_storage::{ReadStorage, Storage};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemFlashError {
    OutOfBounds,
    WriteFailed,
}

/// RAM-backed stand-in for the flash chip. Existing contents are kept, so a
/// buffer can be mounted again to model a reboot.
///
/// `fail_after(n)` lets `n` more writes through and fails every write after that,
/// which is how tests cut power in the middle of a multi-step update.
pub struct MemFlash<'a> {
    bytes: &'a mut [u8],
    writes_left: Option<u32>,
}

impl<'a> MemFlash<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self {
            bytes,
            writes_left: None,
        }
    }

    pub fn fail_after(&mut self, writes: u32) {
        self.writes_left = Some(writes);
    }

    pub fn heal(&mut self) {
        self.writes_left = None;
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, MemFlashError> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(MemFlashError::OutOfBounds)?;
        if end > self.bytes.len() {
            return Err(MemFlashError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl ReadStorage for MemFlash<'_> {
    type Error = MemFlashError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for MemFlash<'_> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(MemFlashError::WriteFailed);
            }
            *left -= 1;
        }
        self.bytes[range].copy_from_slice(bytes);
        Ok(())
    }
}
