// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Passphrase and digest key derivation.
//!
//! One entry point covers both uses in the unlock flow: deriving the
//! keyslot-area key from the user passphrase, and re-deriving the digest
//! value from a candidate master key. Derivation is a pure function of its
//! inputs; no state is carried between calls.

use hmac::Hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

use crate::crypto::HashAlg;
use crate::error::{Result, UnlockError};
use crate::metadata::descriptor::KdfCost;
#[cfg(feature = "argon2")]
use crate::metadata::descriptor::Argon2Variant;

/// Derives `out_len` bytes from `password` and `salt` per the given cost.
///
/// `hash` is the digest's hash algorithm name; it selects the PBKDF2 PRF
/// (Argon2 fixes its own internal hash). For the keyslot step `out_len` is
/// the area key size, not the master key size.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    cost: &KdfCost,
    hash: &str,
    out_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut out = Zeroizing::new(vec![0u8; out_len]);
    match cost {
        KdfCost::Pbkdf2 { iterations } => {
            derive_pbkdf2(hash, password, salt, *iterations, &mut out)?;
        }
        #[cfg(feature = "argon2")]
        KdfCost::Argon2 {
            variant,
            time_cost,
            memory_kib,
            lanes,
        } => {
            derive_argon2(
                *variant, *time_cost, *memory_kib, *lanes, password, salt, &mut out,
            )?;
        }
        #[cfg(not(feature = "argon2"))]
        KdfCost::Argon2 { .. } => {
            return Err(UnlockError::UnsupportedKdf("argon2".to_string()));
        }
    }
    Ok(out)
}

fn derive_pbkdf2(
    hash: &str,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    out: &mut [u8],
) -> Result<()> {
    let run = match HashAlg::from_name(hash)? {
        HashAlg::Sha1 => pbkdf2::pbkdf2::<Hmac<Sha1>>,
        HashAlg::Sha256 => pbkdf2::pbkdf2::<Hmac<Sha256>>,
        HashAlg::Sha512 => pbkdf2::pbkdf2::<Hmac<Sha512>>,
    };
    run(password, salt, iterations, out)
        .map_err(|e| UnlockError::Crypto(format!("PBKDF2-HMAC-{hash}: {e}")))
}

#[cfg(feature = "argon2")]
fn derive_argon2(
    variant: Argon2Variant,
    time_cost: u32,
    memory_kib: u32,
    lanes: u32,
    password: &[u8],
    salt: &[u8],
    out: &mut [u8],
) -> Result<()> {
    let algorithm = match variant {
        Argon2Variant::Argon2i => argon2::Algorithm::Argon2i,
        Argon2Variant::Argon2id => argon2::Algorithm::Argon2id,
    };
    let params = argon2::Params::new(memory_kib, time_cost, lanes, Some(out.len()))
        .map_err(|e| UnlockError::Crypto(format!("Argon2 params: {e}")))?;
    let argon = argon2::Argon2::new(algorithm, argon2::Version::V0x13, params);
    argon
        .hash_password_into(password, salt, out)
        .map_err(|e| UnlockError::Crypto(format!("Argon2: {e}")))
}
