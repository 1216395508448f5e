// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Typed digest and keyslot descriptors.
//!
//! Converts raw metadata tree nodes into the structures the trial loop
//! consumes. Per-keyslot parse failures are reported as errors and the
//! caller skips the slot; nothing here aborts the overall unlock except
//! through the digest path, which is parsed once and is required.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::{DEFAULT_AF_STRIPES, MAX_DIGEST_LEN, MAX_KEY_SIZE, MAX_SALT_LEN};
use crate::error::{Result, UnlockError};
use crate::metadata::tree::MetadataNode;

/// Argon2 variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argon2Variant {
    Argon2i,
    Argon2id,
}

/// Cost parameters of a key derivation function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KdfCost {
    /// PBKDF2-HMAC; the hash algorithm comes from the digest's `hash` field.
    Pbkdf2 { iterations: u32 },
    /// Argon2i or Argon2id.
    Argon2 {
        variant: Argon2Variant,
        time_cost: u32,
        memory_kib: u32,
        lanes: u32,
    },
}

/// How to verify a candidate master key, parsed from `digests.0`.
#[derive(Debug, Clone)]
pub struct DigestDescriptor {
    /// Hash algorithm name, also inherited by keyslot PBKDF2 and AF merge.
    pub hash: String,
    /// KDF cost for re-deriving the digest from a candidate key.
    pub cost: KdfCost,
    /// Decoded salt, 1..=64 bytes.
    pub salt: Vec<u8>,
    /// Decoded expected digest value, 1..=128 bytes.
    pub digest: Vec<u8>,
}

/// Passphrase KDF parameters of one keyslot.
#[derive(Debug, Clone)]
pub struct KdfParams {
    pub cost: KdfCost,
    pub salt: Vec<u8>,
}

/// Anti-forensic parameters of one keyslot.
#[derive(Debug, Clone)]
pub struct AfParams {
    /// Stripe count; defaults to 4000 when absent from metadata.
    pub stripes: u32,
    /// Diffusion hash, inherited from the digest.
    pub hash: String,
}

/// Encrypted key-material area geometry of one keyslot.
#[derive(Debug, Clone)]
pub struct AreaParams {
    /// Byte offset of the area from the partition start.
    pub offset: u64,
    /// Area size in bytes.
    pub size: u64,
    /// dm-crypt encryption spec, e.g. "aes-xts-plain64".
    pub encryption: String,
    /// Area encryption key size in bytes.
    pub key_size: u32,
}

/// One candidate key repository, parsed fresh for every trial.
#[derive(Debug, Clone)]
pub struct KeyslotDescriptor {
    /// Master key size in bytes.
    pub key_size: u32,
    pub kdf: KdfParams,
    pub af: AfParams,
    pub area: AreaParams,
}

fn parse_cost(node: &MetadataNode) -> Result<KdfCost> {
    let type_str = node
        .read_string("type")
        .ok_or_else(|| UnlockError::missing("type"))?;
    match type_str {
        "pbkdf2" => Ok(KdfCost::Pbkdf2 {
            iterations: node
                .read_u32("iterations")
                .ok_or_else(|| UnlockError::missing("iterations"))?,
        }),
        "argon2i" | "argon2id" => {
            if !cfg!(feature = "argon2") {
                log::debug!("Argon2 keyslot present but support is compiled out");
                return Err(UnlockError::UnsupportedKdf(type_str.to_string()));
            }
            let variant = if type_str == "argon2i" {
                Argon2Variant::Argon2i
            } else {
                Argon2Variant::Argon2id
            };
            Ok(KdfCost::Argon2 {
                variant,
                time_cost: node
                    .read_u32("time")
                    .ok_or_else(|| UnlockError::missing("time"))?,
                memory_kib: node
                    .read_u32("memory")
                    .ok_or_else(|| UnlockError::missing("memory"))?,
                lanes: node
                    .read_u32("cpus")
                    .ok_or_else(|| UnlockError::missing("cpus"))?,
            })
        }
        other => {
            log::debug!("unsupported KDF type {other}");
            Err(UnlockError::UnsupportedKdf(other.to_string()))
        }
    }
}

/// Decodes a base64 property, enforcing 1..=`max` decoded bytes.
fn read_base64(node: &MetadataNode, key: &str, max: usize) -> Result<Vec<u8>> {
    let b64 = node
        .read_string(key)
        .ok_or_else(|| UnlockError::missing(key))?;
    let decoded = BASE64
        .decode(b64)
        .map_err(|e| UnlockError::Format(format!("bad base64 in '{key}': {e}")))?;
    if decoded.is_empty() || decoded.len() > max {
        return Err(UnlockError::Format(format!(
            "decoded '{key}' length {} out of range",
            decoded.len()
        )));
    }
    Ok(decoded)
}

/// Parses a base-10 decimal string property (LUKS2 stores area geometry as
/// JSON strings, not numbers).
fn read_decimal_u64(node: &MetadataNode, key: &str) -> Result<u64> {
    let s = node
        .read_string(key)
        .ok_or_else(|| UnlockError::missing(key))?;
    s.parse::<u64>()
        .map_err(|_| UnlockError::Format(format!("invalid decimal string in '{key}'")))
}

impl DigestDescriptor {
    /// Reads the digest descriptor from its tree node.
    pub fn from_node(node: &MetadataNode) -> Result<Self> {
        let cost = parse_cost(node)?;
        let hash = node
            .read_string("hash")
            .ok_or_else(|| UnlockError::missing("hash"))?
            .to_string();
        // The digest hash drives every later stage (keyslot PBKDF2, AF
        // diffusion, verification); an unknown name fails here, fatally.
        crate::crypto::HashAlg::from_name(&hash)?;
        let salt = read_base64(node, "salt", MAX_SALT_LEN)?;
        let digest = read_base64(node, "digest", MAX_DIGEST_LEN)?;
        Ok(Self {
            hash,
            cost,
            salt,
            digest,
        })
    }
}

impl KeyslotDescriptor {
    /// Reads one keyslot descriptor from its tree node.
    ///
    /// `digest_hash` is the hash algorithm name from the digest descriptor;
    /// it supplies both the keyslot PBKDF2 hash and the AF diffusion hash
    /// (the keyslot node does not re-declare them in the supported layouts).
    pub fn from_node(node: &MetadataNode, digest_hash: &str) -> Result<Self> {
        let type_str = node
            .read_string("type")
            .ok_or_else(|| UnlockError::missing("type"))?;
        if type_str != "luks2" {
            return Err(UnlockError::Format(format!(
                "keyslot type '{type_str}' is not luks2"
            )));
        }

        let key_size = node
            .read_u32("key_size")
            .ok_or_else(|| UnlockError::missing("key_size"))?;
        if key_size == 0 || key_size as usize > MAX_KEY_SIZE {
            return Err(UnlockError::Format(format!(
                "key_size {key_size} out of range"
            )));
        }

        let kdf_node = node
            .find_child("kdf")
            .ok_or_else(|| UnlockError::missing("kdf"))?;
        let kdf = KdfParams {
            cost: parse_cost(&kdf_node)?,
            salt: read_base64(&kdf_node, "salt", MAX_SALT_LEN)?,
        };

        let af_node = node
            .find_child("af")
            .ok_or_else(|| UnlockError::missing("af"))?;
        let af = AfParams {
            stripes: af_node.read_u32("stripes").unwrap_or(DEFAULT_AF_STRIPES),
            hash: digest_hash.to_string(),
        };

        let area_node = node
            .find_child("area")
            .ok_or_else(|| UnlockError::missing("area"))?;
        let area = AreaParams {
            offset: read_decimal_u64(&area_node, "offset")?,
            size: read_decimal_u64(&area_node, "size")?,
            encryption: area_node
                .read_string("encryption")
                .ok_or_else(|| UnlockError::missing("encryption"))?
                .to_string(),
            key_size: area_node
                .read_u32("key_size")
                .ok_or_else(|| UnlockError::missing("key_size"))?,
        };

        Ok(Self {
            key_size,
            kdf,
            af,
            area,
        })
    }
}
