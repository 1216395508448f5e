// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Error types for the LUKS2 unlock engine.
//!
//! A single error enum covers the whole unlock pipeline. Which variants are
//! fatal depends on where they occur: during metadata read and digest parsing
//! every error aborts the attempt, while inside the per-keyslot trial loop
//! everything except I/O failure just skips to the next keyslot.

use thiserror::Error;

/// Main error type for all unlock operations.
#[derive(Error, Debug)]
pub enum UnlockError {
    /// A block read failed or returned fewer sectors than requested.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or incomplete LUKS2 metadata (bad magic, missing field,
    /// invalid base64, unparsable numeric string).
    #[error("Invalid LUKS2 metadata: {0}")]
    Format(String),

    /// KDF type not recognized, or recognized but compiled out
    /// (Argon2 with the `argon2` feature disabled).
    #[error("Unsupported KDF: {0}")]
    UnsupportedKdf(String),

    /// Cipher mode or key size not supported for the keyslot area.
    #[error("Unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// An underlying KDF, cipher, or hash primitive reported failure.
    #[error("Cryptography error: {0}")]
    Crypto(String),

    /// No keyslot both decrypted and verified against the digest. Returned
    /// for a wrong passphrase and for a volume with no usable keyslots; the
    /// two are deliberately not distinguished here.
    #[error("Access denied: passphrase did not unlock any keyslot")]
    AccessDenied,
}

/// Type alias for Results using UnlockError.
pub type Result<T> = std::result::Result<T, UnlockError>;

impl UnlockError {
    /// Convenience constructor for a missing-field format error.
    pub(crate) fn missing(field: &str) -> Self {
        UnlockError::Format(format!("missing field '{field}'"))
    }
}
