// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Keyslot-area decryption.
//!
//! Key material on disk is encrypted with the key derived from the
//! passphrase, using either AES-XTS or AES-CBC. Both modes operate on
//! independent 512-byte sectors; CBC additionally supports ESSIV sector
//! tweaking, selected by the mode string (`aes-cbc-essiv:sha256`).

use aes::cipher::{
    block_padding::NoPadding, generic_array::GenericArray, BlockCipher, BlockDecrypt,
    BlockDecryptMut, BlockEncrypt, KeyInit, KeyIvInit,
};
use aes::{Aes128, Aes192, Aes256};
use sha2::{Digest, Sha256};
use xts_mode::{get_tweak_default, Xts128};
use zeroize::Zeroizing;

use crate::config::SECTOR_SIZE;
use crate::error::{Result, UnlockError};

/// Decrypts `ciphertext` with AES-XTS over 512-byte sectors starting at
/// sector 0. The key carries both XTS halves, so only 32-byte (aes-128) and
/// 64-byte (aes-256) keys are valid.
pub fn decrypt_xts(key: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() % 16 != 0 {
        return Err(UnlockError::Crypto(format!(
            "XTS ciphertext length {} is not block-aligned",
            ciphertext.len()
        )));
    }
    let mut out = Zeroizing::new(ciphertext.to_vec());
    match key.len() {
        32 => {
            let xts = Xts128::new(init_cipher::<Aes128>(&key[..16])?, init_cipher::<Aes128>(&key[16..])?);
            xts.decrypt_area(&mut out, SECTOR_SIZE, 0, get_tweak_default);
        }
        64 => {
            let xts = Xts128::new(init_cipher::<Aes256>(&key[..32])?, init_cipher::<Aes256>(&key[32..])?);
            xts.decrypt_area(&mut out, SECTOR_SIZE, 0, get_tweak_default);
        }
        n => {
            return Err(UnlockError::UnsupportedCipher(format!(
                "aes-xts with {n}-byte key"
            )))
        }
    }
    Ok(out)
}

/// Decrypts `ciphertext` with AES-CBC. When `mode` requests ESSIV, each
/// 512-byte sector gets its own IV derived from the SHA-256 of the key;
/// otherwise the whole buffer is one CBC stream with a zero IV.
pub fn decrypt_cbc(key: &[u8], mode: &str, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() % 16 != 0 {
        return Err(UnlockError::Crypto(format!(
            "CBC ciphertext length {} is not block-aligned",
            ciphertext.len()
        )));
    }
    if key.len() != 16 && key.len() != 24 && key.len() != 32 {
        return Err(UnlockError::UnsupportedCipher(format!(
            "aes-cbc with {}-byte key",
            key.len()
        )));
    }
    let mut out = Zeroizing::new(ciphertext.to_vec());
    if mode.contains("essiv") {
        let essiv_key: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(key).into());
        let tweak = init_cipher::<Aes256>(essiv_key.as_slice())?;
        for (sector, chunk) in out.chunks_mut(SECTOR_SIZE).enumerate() {
            let iv = essiv_iv(&tweak, sector as u32);
            cbc_decrypt(key, &iv, chunk)?;
        }
    } else {
        cbc_decrypt(key, &[0u8; 16], &mut out)?;
    }
    Ok(out)
}

fn init_cipher<C: KeyInit>(key: &[u8]) -> Result<C> {
    C::new_from_slice(key).map_err(|e| UnlockError::Crypto(format!("cipher init: {e}")))
}

/// In-place CBC decryption, dispatched on key length. Key material is not
/// padded, so NoPadding.
fn cbc_decrypt(key: &[u8], iv: &[u8; 16], buf: &mut [u8]) -> Result<()> {
    match key.len() {
        16 => cbc_decrypt_with::<Aes128>(key, iv, buf),
        24 => cbc_decrypt_with::<Aes192>(key, iv, buf),
        _ => cbc_decrypt_with::<Aes256>(key, iv, buf),
    }
}

fn cbc_decrypt_with<C>(key: &[u8], iv: &[u8; 16], buf: &mut [u8]) -> Result<()>
where
    C: BlockCipher + BlockDecrypt + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| UnlockError::Crypto(format!("AES-CBC init: {e}")))?;
    dec.decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|e| UnlockError::Crypto(format!("AES-CBC: {e}")))?;
    Ok(())
}

/// ESSIV IV for a sector: AES-256 encryption of the little-endian sector
/// number, zero-padded to one block, under the hashed area key.
fn essiv_iv(tweak: &Aes256, sector: u32) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[..4].copy_from_slice(&sector.to_le_bytes());
    let mut ga = GenericArray::from(block);
    tweak.encrypt_block(&mut ga);
    ga.into()
}
