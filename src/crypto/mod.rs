// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Cryptographic building blocks of the unlock pipeline: passphrase KDF,
//! key-material area decryption, and the anti-forensic merge.

pub mod af;
pub mod area;
pub mod kdf;

use crate::error::{Result, UnlockError};

/// Hash algorithms accepted for PBKDF2 and AF diffusion.
///
/// LUKS2 metadata names the algorithm as a string; everything it can name
/// that this crate supports is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HashAlg {
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlg {
    pub(crate) fn from_name(name: &str) -> Result<Self> {
        match name {
            "sha1" => Ok(HashAlg::Sha1),
            "sha256" => Ok(HashAlg::Sha256),
            "sha512" => Ok(HashAlg::Sha512),
            _ => Err(UnlockError::UnsupportedKdf(format!("hash '{name}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_names() {
        assert_eq!(HashAlg::from_name("sha256").unwrap(), HashAlg::Sha256);
        assert_eq!(HashAlg::from_name("sha512").unwrap(), HashAlg::Sha512);
        assert_eq!(HashAlg::from_name("sha1").unwrap(), HashAlg::Sha1);
        assert!(HashAlg::from_name("whirlpool").is_err());
        assert!(HashAlg::from_name("SHA256").is_err());
    }
}
