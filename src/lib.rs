// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! LUKS2 disk-unlock engine.
//!
//! Recovers the volume master key of a LUKS2-formatted partition from a
//! passphrase. The crate reads the binary header and JSON metadata through
//! a caller-supplied [`BlockDevice`], then runs the keyslot trial loop:
//! passphrase KDF (PBKDF2, Argon2i, Argon2id), keyslot-area decryption
//! (AES-XTS or AES-CBC with optional ESSIV), anti-forensic stripe merge,
//! and constant-time digest verification. It does not decrypt the data
//! area; the returned [`MasterKey`] is the input for that next layer.
//!
//! All intermediate secrets (derived keys, key material, candidate keys)
//! are zeroized on every path, success or failure.
//!
//! # Features
//!
//! * `argon2` (default) - Argon2i/Argon2id keyslot and digest support.
//!   Without it such keyslots are skipped and PBKDF2 remains available.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{Read, Seek, SeekFrom};
//!
//! use luks2_unlock::{unlock, BlockDevice, PartitionInfo};
//!
//! /// 512-byte-sector device over a partition image file.
//! struct FileDevice(File);
//!
//! impl BlockDevice for FileDevice {
//!     fn block_size(&self) -> u32 {
//!         512
//!     }
//!
//!     fn read(&mut self, start: u64, count: u32, buf: &mut [u8]) -> std::io::Result<u32> {
//!         self.0.seek(SeekFrom::Start(start * 512))?;
//!         let n = count as usize * 512;
//!         self.0.read_exact(&mut buf[..n])?;
//!         Ok(count)
//!     }
//! }
//!
//! # fn main() -> luks2_unlock::Result<()> {
//! let mut dev = FileDevice(File::open("/dev/sda2")?);
//! let part = PartitionInfo { start: 0, size: 1 << 21 };
//! let key = unlock(&mut dev, &part, b"correct horse battery staple")?;
//! println!("recovered {}-byte master key", key.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod device;
pub mod error;
pub mod metadata;
pub mod unlock;

pub use config::UnlockConfig;
pub use device::{BlockDevice, PartitionInfo};
pub use error::{Result, UnlockError};
pub use metadata::{probe, read_header_info, HeaderInfo, LuksVersion};
pub use unlock::{unlock, unlock_with_config, MasterKey};
