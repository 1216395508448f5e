// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Block-device access seam.
//!
//! The unlock engine never touches storage directly; it reads whole sectors
//! through [`BlockDevice`]. Implementations wrap whatever the embedding
//! environment provides (raw partition file, loop device, firmware block
//! driver). Tests use an in-memory vector of sectors.

use std::io;

use crate::error::{Result, UnlockError};

/// Read capability for a sector-addressed device.
pub trait BlockDevice {
    /// Device block size in bytes. Must be a power of two, at least 512.
    fn block_size(&self) -> u32;

    /// Reads `count` blocks starting at `start` into `buf` and returns the
    /// number of blocks actually read. `buf` is at least
    /// `count * block_size()` bytes.
    fn read(&mut self, start: u64, count: u32, buf: &mut [u8]) -> io::Result<u32>;
}

/// Location of the LUKS2 partition on the device, in device blocks.
#[derive(Debug, Clone, Copy)]
pub struct PartitionInfo {
    /// First block of the partition.
    pub start: u64,
    /// Partition length in blocks.
    pub size: u64,
}

/// Reads exactly `count` blocks at `start`, treating a short read as I/O
/// failure. Returns a freshly allocated buffer of `count * block_size` bytes.
pub(crate) fn read_blocks_exact<D: BlockDevice>(
    device: &mut D,
    start: u64,
    count: u32,
) -> Result<Vec<u8>> {
    let blksz = device.block_size() as usize;
    let mut buf = vec![0u8; count as usize * blksz];
    let got = device.read(start, count, &mut buf)?;
    if got != count {
        log::debug!("short read at block {start}: wanted {count}, got {got}");
        return Err(UnlockError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("read {got} of {count} blocks at {start}"),
        )));
    }
    Ok(buf)
}
