// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Anti-forensic information splitter, merge direction only.
//!
//! The stored key is split into `stripes` blocks of `key_size` bytes so
//! that every bit of key material must survive on disk for recovery to
//! work. Merging XORs the stripes together, diffusing the accumulator
//! with a hash after every stripe except the last.

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::crypto::HashAlg;
use crate::error::{Result, UnlockError};

/// Recovers the split key from `split`, which must hold exactly
/// `key_size * stripes` bytes.
pub fn merge(split: &[u8], key_size: usize, stripes: u32, hash: &str) -> Result<Zeroizing<Vec<u8>>> {
    if stripes == 0 {
        return Err(UnlockError::Format("AF stripe count is zero".to_string()));
    }
    let stripes = stripes as usize;
    let expected = key_size
        .checked_mul(stripes)
        .ok_or_else(|| UnlockError::Format("AF split size overflow".to_string()))?;
    if split.len() != expected {
        return Err(UnlockError::Format(format!(
            "AF split is {} bytes, expected {expected}",
            split.len()
        )));
    }
    let merged = match HashAlg::from_name(hash)? {
        HashAlg::Sha1 => merge_with::<Sha1>(split, key_size, stripes),
        HashAlg::Sha256 => merge_with::<Sha256>(split, key_size, stripes),
        HashAlg::Sha512 => merge_with::<Sha512>(split, key_size, stripes),
    };
    Ok(merged)
}

fn merge_with<D: Digest>(split: &[u8], key_size: usize, stripes: usize) -> Zeroizing<Vec<u8>> {
    let mut acc = Zeroizing::new(vec![0u8; key_size]);
    for stripe in split.chunks(key_size).take(stripes - 1) {
        xor_into(&mut acc, stripe);
        diffuse::<D>(&mut acc);
    }
    // Final stripe is XORed without diffusion.
    xor_into(&mut acc, &split[(stripes - 1) * key_size..]);
    acc
}

fn xor_into(acc: &mut [u8], stripe: &[u8]) {
    for (a, s) in acc.iter_mut().zip(stripe) {
        *a ^= s;
    }
}

/// Replaces each digest-sized chunk of `buf` with H(chunk_index_be32 ‖
/// chunk), truncating the hash over a short final chunk.
fn diffuse<D: Digest>(buf: &mut [u8]) {
    let block = <D as Digest>::output_size();
    for (index, chunk) in buf.chunks_mut(block).enumerate() {
        let mut hasher = D::new();
        hasher.update((index as u32).to_be_bytes());
        hasher.update(&*chunk);
        let digest = hasher.finalize();
        let n = chunk.len();
        chunk.copy_from_slice(&digest[..n]);
    }
}

/// Builds a split buffer that merges back to `key`. Test-only inverse of
/// [`merge`].
#[cfg(test)]
pub(crate) fn split_for_test<D: Digest>(key: &[u8], stripes: usize) -> Vec<u8> {
    let key_size = key.len();
    let mut split = vec![0u8; key_size * stripes];
    // Deterministic filler stripes, then solve for the last one.
    for (i, byte) in split[..key_size * (stripes - 1)].iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(31).wrapping_add(7);
    }
    let mut acc = vec![0u8; key_size];
    for stripe in split.chunks(key_size).take(stripes - 1) {
        xor_into(&mut acc, stripe);
        diffuse::<D>(&mut acc);
    }
    let last = &mut split[key_size * (stripes - 1)..];
    for (i, byte) in last.iter_mut().enumerate() {
        *byte = acc[i] ^ key[i];
    }
    split
}
