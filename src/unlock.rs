// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Passphrase unlock: the keyslot trial loop.
//!
//! Every enabled keyslot is tried in turn: derive the area key from the
//! passphrase, decrypt the keyslot's key material, merge the anti-forensic
//! stripes, and check the candidate against the volume digest. The first
//! keyslot whose candidate verifies wins. Failures inside one trial skip to
//! the next keyslot; only I/O errors abort the loop.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::UnlockConfig;
use crate::crypto::{af, area, kdf};
use crate::device::{read_blocks_exact, BlockDevice, PartitionInfo};
use crate::error::{Result, UnlockError};
use crate::metadata::descriptor::{DigestDescriptor, KeyslotDescriptor};
use crate::metadata::{self, tree::MetadataNode};

/// A recovered volume master key.
///
/// Holds the only long-lived copy of the key; the buffer is wiped when the
/// value is dropped, and `Debug` never prints key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: Vec<u8>,
}

impl MasterKey {
    /// Key bytes, for handing to the data-area decryption layer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("len", &self.key.len())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Unlocks a LUKS2 partition with the given passphrase, using default
/// limits. See [`unlock_with_config`].
pub fn unlock<D: BlockDevice>(
    device: &mut D,
    part: &PartitionInfo,
    passphrase: &[u8],
) -> Result<MasterKey> {
    unlock_with_config(device, part, passphrase, &UnlockConfig::default())
}

/// Unlocks a LUKS2 partition with the given passphrase.
///
/// Reads and validates the metadata, then tries every keyslot against the
/// passphrase. Metadata and digest problems are fatal; per-keyslot problems
/// (unsupported KDF or cipher, malformed slot, failed verification) skip the
/// slot. When no keyslot verifies, the result is
/// [`UnlockError::AccessDenied`], whether the passphrase was wrong or no
/// keyslot was usable at all.
pub fn unlock_with_config<D: BlockDevice>(
    device: &mut D,
    part: &PartitionInfo,
    passphrase: &[u8],
    config: &UnlockConfig,
) -> Result<MasterKey> {
    let tree = metadata::read_metadata(device, part, config)?;
    let root = tree.root();

    let digest_node = root
        .find_child("digests")
        .and_then(|d| d.find_child("0"))
        .ok_or_else(|| UnlockError::missing("digests.0"))?;
    let digest = DigestDescriptor::from_node(&digest_node)?;

    let keyslots = root
        .find_child("keyslots")
        .ok_or_else(|| UnlockError::missing("keyslots"))?;

    for (name, slot) in keyslots.children() {
        match try_keyslot(device, part, config, &digest, &slot, passphrase) {
            Ok(key) => {
                log::debug!("keyslot {name} unlocked the volume");
                return Ok(key);
            }
            // Device trouble will not get better on the next slot.
            Err(UnlockError::Io(e)) => return Err(UnlockError::Io(e)),
            Err(e) => log::debug!("keyslot {name}: {e}"),
        }
    }
    Err(UnlockError::AccessDenied)
}

/// Tries one keyslot. Any error means this slot did not produce the master
/// key; the caller decides whether that is fatal.
fn try_keyslot<D: BlockDevice>(
    device: &mut D,
    part: &PartitionInfo,
    config: &UnlockConfig,
    digest: &DigestDescriptor,
    slot: &MetadataNode,
    passphrase: &[u8],
) -> Result<MasterKey> {
    let desc = KeyslotDescriptor::from_node(slot, &digest.hash)?;

    if desc.af.stripes == 0 || desc.af.stripes > config.max_stripes {
        return Err(UnlockError::Format(format!(
            "stripe count {} out of range",
            desc.af.stripes
        )));
    }
    let split_size = desc.key_size as usize * desc.af.stripes as usize;
    if desc.area.size < split_size as u64 {
        return Err(UnlockError::Format(format!(
            "area size {} too small for {split_size} bytes of key material",
            desc.area.size
        )));
    }

    // The passphrase unlocks the area key, not the master key directly.
    let area_key = kdf::derive(
        passphrase,
        &desc.kdf.salt,
        &desc.kdf.cost,
        &digest.hash,
        desc.area.key_size as usize,
    )?;

    let blksz = device.block_size() as u64;
    let km_start = part.start + desc.area.offset / blksz;
    let km_blocks = (split_size as u64).div_ceil(blksz) as u32;
    let material = Zeroizing::new(read_blocks_exact(device, km_start, km_blocks)?);

    let split = decrypt_area(&area_key, &desc.area.encryption, &material[..split_size])?;
    let candidate = af::merge(&split, desc.key_size as usize, desc.af.stripes, &desc.af.hash)?;

    if !verify_master_key(digest, &candidate) {
        return Err(UnlockError::AccessDenied);
    }
    Ok(MasterKey {
        key: candidate.to_vec(),
    })
}

/// Dispatches on the dm-crypt mode string. XTS and CBC (plain or ESSIV) are
/// the modes cryptsetup emits for keyslot areas.
fn decrypt_area(key: &[u8], encryption: &str, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if encryption.contains("xts") {
        area::decrypt_xts(key, ciphertext)
    } else if encryption.contains("cbc") {
        area::decrypt_cbc(key, encryption, ciphertext)
    } else {
        Err(UnlockError::UnsupportedCipher(encryption.to_string()))
    }
}

/// Checks a candidate master key against the volume digest: re-derive with
/// the digest's own KDF parameters and compare in constant time. A KDF
/// failure counts as a mismatch, not a fatal error.
fn verify_master_key(digest: &DigestDescriptor, candidate: &[u8]) -> bool {
    match kdf::derive(
        candidate,
        &digest.salt,
        &digest.cost,
        &digest.hash,
        digest.digest.len(),
    ) {
        Ok(computed) => computed.as_slice().ct_eq(&digest.digest).into(),
        Err(e) => {
            log::debug!("digest check failed to derive: {e}");
            false
        }
    }
}
