use core::fmt;

use embedded_storage::Storage;
use log::warn;

use super::{validate_path, StorageError, Volume};
use crate::config::{LOG_PATH_MAX, VOLUME_HEADER_LEN, VOLUME_MAGIC, VOLUME_SLOT_SIZE, VOLUME_VERSION};

const PATH_LEN_OFFSET: usize = 5;
const PATH_OFFSET: usize = 6;
const SEQ_OFFSET: usize = PATH_OFFSET + LOG_PATH_MAX;
const LEN_OFFSET: usize = SEQ_OFFSET + 4;
const CHECKSUM_OFFSET: usize = VOLUME_HEADER_LEN - 1;
const SLOT_DATA_MAX: usize = VOLUME_SLOT_SIZE as usize - VOLUME_HEADER_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SlotHeader {
    path: [u8; LOG_PATH_MAX],
    path_len: u8,
    seq: u32,
    len: u32,
}

impl SlotHeader {
    fn new(path: &[u8], seq: u32, len: u32) -> Self {
        let mut stored = [0u8; LOG_PATH_MAX];
        stored[..path.len()].copy_from_slice(path);
        Self {
            path: stored,
            path_len: path.len() as u8,
            seq,
            len,
        }
    }

    fn path(&self) -> &[u8] {
        &self.path[..usize::from(self.path_len)]
    }

    fn encode(&self) -> [u8; VOLUME_HEADER_LEN] {
        let mut raw = [0xFFu8; VOLUME_HEADER_LEN];
        raw[0..4].copy_from_slice(&VOLUME_MAGIC.to_le_bytes());
        raw[4] = VOLUME_VERSION;
        raw[PATH_LEN_OFFSET] = self.path_len;
        raw[PATH_OFFSET..SEQ_OFFSET].copy_from_slice(&self.path);
        raw[SEQ_OFFSET..LEN_OFFSET].copy_from_slice(&self.seq.to_le_bytes());
        raw[LEN_OFFSET..LEN_OFFSET + 4].copy_from_slice(&self.len.to_le_bytes());
        raw[CHECKSUM_OFFSET] = checksum8(&raw[..CHECKSUM_OFFSET]);
        raw
    }

    fn decode(raw: &[u8; VOLUME_HEADER_LEN]) -> Option<Self> {
        if u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) != VOLUME_MAGIC {
            return None;
        }
        if raw[4] != VOLUME_VERSION || raw[CHECKSUM_OFFSET] != checksum8(&raw[..CHECKSUM_OFFSET]) {
            return None;
        }
        let path_len = raw[PATH_LEN_OFFSET];
        if path_len == 0 || usize::from(path_len) > LOG_PATH_MAX {
            return None;
        }
        let len = u32::from_le_bytes([
            raw[LEN_OFFSET],
            raw[LEN_OFFSET + 1],
            raw[LEN_OFFSET + 2],
            raw[LEN_OFFSET + 3],
        ]);
        if len as usize > SLOT_DATA_MAX {
            return None;
        }
        let mut path = [0u8; LOG_PATH_MAX];
        path.copy_from_slice(&raw[PATH_OFFSET..SEQ_OFFSET]);
        Some(Self {
            path,
            path_len,
            seq: u32::from_le_bytes([
                raw[SEQ_OFFSET],
                raw[SEQ_OFFSET + 1],
                raw[SEQ_OFFSET + 2],
                raw[SEQ_OFFSET + 3],
            ]),
            len,
        })
    }
}

/// Files in fixed-size flash slots.
///
/// Every slot starts with a header naming the file it holds. A replace goes to a
/// free slot and only then retires the old one, so a power cut leaves either the
/// previous copy or the new one. After such a cut two slots may name the same
/// file; the higher sequence number wins and `mount` retires the other.
pub struct FlashVolume<S> {
    flash: S,
    base: u32,
    slot_count: u8,
    next_seq: u32,
}

impl<S> FlashVolume<S>
where
    S: Storage,
    S::Error: fmt::Debug,
{
    pub fn mount(flash: S, base: u32, slot_count: u8) -> Result<Self, StorageError> {
        let end = u64::from(base) + u64::from(slot_count) * u64::from(VOLUME_SLOT_SIZE);
        if slot_count < 2 || end > flash.capacity() as u64 {
            return Err(StorageError::Flash);
        }

        let mut volume = Self {
            flash,
            base,
            slot_count,
            next_seq: 1,
        };
        for slot in 0..slot_count {
            if let Some(header) = volume.scan_header(slot) {
                volume.next_seq = volume.next_seq.max(header.seq.wrapping_add(1));
            }
        }
        for slot in 0..slot_count {
            let Some(header) = volume.scan_header(slot) else {
                continue;
            };
            if let Ok(Some((winner, _))) = volume.find(header.path()) {
                if winner != slot {
                    warn!("volume: retiring stale slot {}", slot);
                    // A failed retire is retried on the next mount.
                    let _ = volume.invalidate(slot);
                }
            }
        }
        Ok(volume)
    }

    pub fn flash_mut(&mut self) -> &mut S {
        &mut self.flash
    }

    pub fn release(self) -> S {
        self.flash
    }

    fn slot_offset(&self, slot: u8) -> u32 {
        self.base + u32::from(slot) * VOLUME_SLOT_SIZE
    }

    fn read_header(&mut self, slot: u8) -> Result<Option<SlotHeader>, StorageError> {
        let mut raw = [0u8; VOLUME_HEADER_LEN];
        let offset = self.slot_offset(slot);
        self.flash.read(offset, &mut raw).map_err(|err| {
            warn!("volume: header read failed at {:#x}: {:?}", offset, err);
            StorageError::Flash
        })?;
        Ok(SlotHeader::decode(&raw))
    }

    fn scan_header(&mut self, slot: u8) -> Option<SlotHeader> {
        self.read_header(slot).ok().flatten()
    }

    fn write_header(&mut self, slot: u8, header: &SlotHeader) -> Result<(), StorageError> {
        let offset = self.slot_offset(slot);
        self.flash.write(offset, &header.encode()).map_err(|err| {
            warn!("volume: header write failed at {:#x}: {:?}", offset, err);
            StorageError::Flash
        })
    }

    fn invalidate(&mut self, slot: u8) -> Result<(), StorageError> {
        let offset = self.slot_offset(slot);
        self.flash
            .write(offset, &[0u8; VOLUME_HEADER_LEN])
            .map_err(|err| {
                warn!("volume: slot retire failed at {:#x}: {:?}", offset, err);
                StorageError::Flash
            })
    }

    fn write_data(&mut self, slot: u8, at: usize, data: &[u8]) -> Result<(), StorageError> {
        let offset = self.slot_offset(slot) + (VOLUME_HEADER_LEN + at) as u32;
        self.flash.write(offset, data).map_err(|err| {
            warn!("volume: data write failed at {:#x}: {:?}", offset, err);
            StorageError::Flash
        })
    }

    fn find(&mut self, path: &[u8]) -> Result<Option<(u8, SlotHeader)>, StorageError> {
        let mut best: Option<(u8, SlotHeader)> = None;
        for slot in 0..self.slot_count {
            let Some(header) = self.read_header(slot)? else {
                continue;
            };
            if header.path() != path {
                continue;
            }
            match best {
                Some((_, current)) if current.seq >= header.seq => {}
                _ => best = Some((slot, header)),
            }
        }
        Ok(best)
    }

    fn free_slot(&mut self) -> Result<Option<u8>, StorageError> {
        for slot in 0..self.slot_count {
            if self.read_header(slot)?.is_none() {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }
}

impl<S> Volume for FlashVolume<S>
where
    S: Storage,
    S::Error: fmt::Debug,
{
    fn len(&mut self, path: &str) -> Result<Option<usize>, StorageError> {
        let path = validate_path(path)?;
        Ok(self.find(path)?.map(|(_, header)| header.len as usize))
    }

    fn read(&mut self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, StorageError> {
        let path = validate_path(path)?;
        let (slot, header) = self.find(path)?.ok_or(StorageError::NotFound)?;
        let len = header.len as usize;
        if offset >= len || buf.is_empty() {
            return Ok(0);
        }
        let count = buf.len().min(len - offset);
        let at = self.slot_offset(slot) + (VOLUME_HEADER_LEN + offset) as u32;
        self.flash.read(at, &mut buf[..count]).map_err(|err| {
            warn!("volume: data read failed at {:#x}: {:?}", at, err);
            StorageError::Flash
        })?;
        Ok(count)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = validate_path(path)?;
        if data.len() > SLOT_DATA_MAX {
            return Err(StorageError::Full);
        }
        let previous = self.find(path)?;
        let slot = self.free_slot()?.ok_or(StorageError::Full)?;

        if !data.is_empty() {
            self.write_data(slot, 0, data)?;
        }
        let header = SlotHeader::new(path, self.next_seq, data.len() as u32);
        self.write_header(slot, &header)?;
        self.next_seq = self.next_seq.wrapping_add(1);

        if let Some((old, _)) = previous {
            // The new copy is committed; a stale slot is retired on the next mount.
            if let Err(err) = self.invalidate(old) {
                warn!("volume: old copy left in slot {}: {}", old, err);
            }
        }
        Ok(())
    }

    fn append(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path_bytes = validate_path(path)?;
        let Some((slot, mut header)) = self.find(path_bytes)? else {
            return self.write(path, data);
        };
        let len = header.len as usize;
        if len + data.len() > SLOT_DATA_MAX {
            return Err(StorageError::Full);
        }
        if data.is_empty() {
            return Ok(());
        }
        self.write_data(slot, len, data)?;
        header.len += data.len() as u32;
        self.write_header(slot, &header)
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        let path = validate_path(path)?;
        for slot in 0..self.slot_count {
            let Some(header) = self.read_header(slot)? else {
                continue;
            };
            if header.path() == path {
                self.invalidate(slot)?;
            }
        }
        Ok(())
    }

    fn file_capacity(&self) -> usize {
        SLOT_DATA_MAX
    }
}

fn checksum8(bytes: &[u8]) -> u8 {
    let mut acc = 0x5Au8;
    for &byte in bytes {
        acc ^= byte.rotate_left(1);
    }
    acc
}
