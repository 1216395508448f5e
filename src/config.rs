// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! On-disk format constants and unlock bounds.
//!
//! The size caps here replace the fixed stack buffers of classic LUKS
//! implementations: every length read from metadata is validated against
//! these bounds before a buffer is sized from it.

/// LUKS magic bytes: "LUKS" followed by 0xba 0xbe.
pub const LUKS_MAGIC: &[u8; 6] = b"LUKS\xba\xbe";

/// Size of the binary portion of the LUKS2 header; JSON metadata follows it.
pub const BINARY_HEADER_SIZE: usize = 4096;

/// Logical sector size used for keyslot-area encryption (XTS data units and
/// ESSIV IV numbering). Independent of the device block size.
pub const SECTOR_SIZE: usize = 512;

/// Maximum decoded salt length accepted from metadata.
pub const MAX_SALT_LEN: usize = 64;

/// Maximum decoded digest length accepted from metadata.
pub const MAX_DIGEST_LEN: usize = 128;

/// Maximum master-key size in bytes.
pub const MAX_KEY_SIZE: usize = 128;

/// Anti-forensic stripe count used when `af.stripes` is absent.
pub const DEFAULT_AF_STRIPES: u32 = 4000;

/// Bounds applied while reading a volume's metadata.
///
/// All limits are generous for real volumes; they exist so a corrupt or
/// hostile header cannot drive allocation sizes.
#[derive(Debug, Clone, Copy)]
pub struct UnlockConfig {
    /// Largest accepted `hdr_size` (binary header + JSON area) in bytes.
    /// The LUKS2 format itself caps the header at 4 MiB.
    pub max_header_size: u64,
    /// Largest accepted anti-forensic stripe count.
    pub max_stripes: u32,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            max_header_size: 4 * 1024 * 1024,
            max_stripes: 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UnlockConfig::default();
        assert_eq!(config.max_header_size, 4 * 1024 * 1024);
        assert_eq!(config.max_stripes, DEFAULT_AF_STRIPES);
    }

    #[test]
    fn test_constants() {
        assert_eq!(LUKS_MAGIC.len(), 6);
        assert_eq!(&LUKS_MAGIC[..4], b"LUKS");
        assert_eq!(BINARY_HEADER_SIZE, 4096);
        assert_eq!(SECTOR_SIZE, 512);
    }
}
