// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! LUKS2 header and metadata reading.
//!
//! A LUKS2 partition starts with a 4096-byte binary header followed by a
//! UTF-8 JSON metadata area; the header's big-endian `hdr_size` field gives
//! the total size of both. This module reads that region off the block
//! device, validates the binary header, and hands the JSON area to
//! [`tree::MetadataTree`].

pub mod descriptor;
pub mod tree;

use zeroize::Zeroizing;

use crate::config::{UnlockConfig, BINARY_HEADER_SIZE, LUKS_MAGIC};
use crate::device::{read_blocks_exact, BlockDevice, PartitionInfo};
use crate::error::{Result, UnlockError};
use tree::MetadataTree;

/// LUKS on-disk format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuksVersion {
    /// LUKS1 (binary keyslot table; not unlockable by this crate).
    Luks1,
    /// LUKS2 (JSON metadata).
    Luks2,
}

/// Decoded fields of the fixed-size LUKS2 binary header.
///
/// Read once per unlock attempt and discarded after the metadata tree is
/// built; also exposed standalone for informational display.
#[derive(Debug, Clone)]
pub struct HeaderInfo {
    /// Format version (2 for every header this parses fully).
    pub version: u16,
    /// Total size of binary header + JSON area in bytes.
    pub hdr_size: u64,
    /// Header sequence ID, bumped on every metadata update.
    pub seqid: u64,
    /// Volume label, may be empty.
    pub label: String,
    /// Header checksum algorithm name (e.g. "sha256").
    pub csum_alg: String,
    /// Volume UUID string.
    pub uuid: String,
    /// Subsystem label, may be empty.
    pub subsystem: String,
}

// Field offsets within struct luks2_hdr.
const OFF_VERSION: usize = 6;
const OFF_HDR_SIZE: usize = 8;
const OFF_SEQID: usize = 16;
const OFF_LABEL: usize = 24;
const OFF_CSUM_ALG: usize = 72;
const OFF_UUID: usize = 168;
const OFF_SUBSYSTEM: usize = 208;
const MIN_HEADER_BYTES: usize = 256;

fn fixed_str(buf: &[u8], off: usize, len: usize) -> String {
    let field = &buf[off..off + len];
    let end = field.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn be16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

fn be64(buf: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    u64::from_be_bytes(b)
}

/// Parses the binary header from the first device block of the partition.
fn parse_header(block: &[u8]) -> Result<HeaderInfo> {
    if block.len() < MIN_HEADER_BYTES {
        return Err(UnlockError::Format("header block too small".into()));
    }
    if &block[..LUKS_MAGIC.len()] != LUKS_MAGIC {
        return Err(UnlockError::Format("LUKS magic not found".into()));
    }
    Ok(HeaderInfo {
        version: be16(block, OFF_VERSION),
        hdr_size: be64(block, OFF_HDR_SIZE),
        seqid: be64(block, OFF_SEQID),
        label: fixed_str(block, OFF_LABEL, 48),
        csum_alg: fixed_str(block, OFF_CSUM_ALG, 32),
        uuid: fixed_str(block, OFF_UUID, 40),
        subsystem: fixed_str(block, OFF_SUBSYSTEM, 48),
    })
}

/// Detects the LUKS version of a partition.
///
/// Reads the partition's first block and checks the magic and the big-endian
/// version field at offset 6. Fails with [`UnlockError::Format`] when the
/// magic is absent or the version is unknown.
pub fn probe<D: BlockDevice>(device: &mut D, part: &PartitionInfo) -> Result<LuksVersion> {
    let block = read_blocks_exact(device, part.start, 1)?;
    if block.len() < LUKS_MAGIC.len() + 2 || &block[..LUKS_MAGIC.len()] != LUKS_MAGIC {
        return Err(UnlockError::Format("LUKS magic not found".into()));
    }
    match be16(&block, OFF_VERSION) {
        1 => Ok(LuksVersion::Luks1),
        2 => Ok(LuksVersion::Luks2),
        v => Err(UnlockError::Format(format!("unknown LUKS version {v}"))),
    }
}

/// Reads and decodes the binary header fields for display purposes.
pub fn read_header_info<D: BlockDevice>(
    device: &mut D,
    part: &PartitionInfo,
) -> Result<HeaderInfo> {
    let block = read_blocks_exact(device, part.start, 1)?;
    parse_header(&block)
}

/// Reads the full header + JSON region and builds the metadata tree.
///
/// The region buffer holds the plaintext JSON. It is not secret, but it is
/// wiped on every return path like every other working buffer here.
pub(crate) fn read_metadata<D: BlockDevice>(
    device: &mut D,
    part: &PartitionInfo,
    config: &UnlockConfig,
) -> Result<MetadataTree> {
    let blksz = device.block_size() as u64;

    let block = read_blocks_exact(device, part.start, 1)?;
    let hdr = parse_header(&block)?;
    if hdr.version != 2 {
        return Err(UnlockError::Format(format!(
            "LUKS version {} not supported for unlock",
            hdr.version
        )));
    }
    log::debug!("LUKS2 header size {} bytes, seqid {}", hdr.hdr_size, hdr.seqid);

    if hdr.hdr_size <= BINARY_HEADER_SIZE as u64 || hdr.hdr_size > config.max_header_size {
        return Err(UnlockError::Format(format!(
            "implausible header size {}",
            hdr.hdr_size
        )));
    }

    let count = hdr.hdr_size.div_ceil(blksz) as u32;
    let region = Zeroizing::new(read_blocks_exact(device, part.start, count)?);

    // JSON text occupies [4096, hdr_size) of the region.
    let json = &region[BINARY_HEADER_SIZE..hdr.hdr_size as usize];
    MetadataTree::from_json(json)
}
