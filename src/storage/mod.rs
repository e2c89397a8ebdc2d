mod flash_volume;
mod mem_flash;

use core::fmt;

pub use flash_volume::FlashVolume;
pub use mem_flash::{MemFlash, MemFlashError};

use crate::config::LOG_PATH_MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    Flash,
    InvalidPath,
    Corrupt,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
            Self::Full => f.write_str("volume full"),
            Self::Flash => f.write_str("flash access failed"),
            Self::InvalidPath => f.write_str("invalid path"),
            Self::Corrupt => f.write_str("corrupt record"),
        }
    }
}

/// Flat file namespace backing the config record and the event log.
pub trait Volume {
    /// Length of `path`, or `None` when it does not exist.
    fn len(&mut self, path: &str) -> Result<Option<usize>, StorageError>;

    /// Reads from `offset`; returns the number of bytes copied, 0 at end of file.
    fn read(&mut self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Replaces the whole file. Readers see the old or the new content, never a mix.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Appends to the file, creating it when absent.
    fn append(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Removes the file. Removing an absent file succeeds.
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;

    /// Largest file the volume can hold.
    fn file_capacity(&self) -> usize;
}

pub(crate) fn validate_path(path: &str) -> Result<&[u8], StorageError> {
    let bytes = path.as_bytes();
    if bytes.is_empty() || bytes.len() > LOG_PATH_MAX || bytes[0] != b'/' {
        return Err(StorageError::InvalidPath);
    }
    Ok(bytes)
}

/// Reads `buf.len()` bytes from the start of `path`, failing on a short file.
pub(crate) fn read_exact<V: Volume>(volume: &mut V, path: &str, buf: &mut [u8]) -> Result<(), StorageError> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = volume.read(path, filled, &mut buf[filled..])?;
        if read == 0 {
            return Err(StorageError::Corrupt);
        }
        filled += read;
    }
    Ok(())
}
