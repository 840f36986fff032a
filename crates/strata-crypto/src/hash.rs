// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hash function implementations
//!
//! SHA-256 for CDI derivation, certificate digests and signatures, backed
//! by the `sha2` crate.

use sha2::{Digest, Sha256 as Sha256Impl};
use strata_common::constants::DIGEST_SIZE;
use strata_common::HashAlgorithm;
use zeroize::Zeroize;

use crate::traits::Hash;

/// SHA-256 hash output
#[derive(Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct Sha256Output([u8; DIGEST_SIZE]);

impl Sha256Output {
    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the digest bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Sha256Output {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for Sha256Output {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Debug for Sha256Output {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// SHA-256 hasher
pub struct Sha256 {
    inner: Sha256Impl,
}

impl Hash for Sha256 {
    const ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;
    const OUTPUT_SIZE: usize = DIGEST_SIZE;
    const BLOCK_SIZE: usize = 64;

    type Output = Sha256Output;

    fn hash(message: &[u8]) -> Self::Output {
        let result = Sha256Impl::digest(message);
        let mut output = [0u8; DIGEST_SIZE];
        output.copy_from_slice(&result);
        Sha256Output(output)
    }

    fn new() -> Self {
        Self {
            inner: Sha256Impl::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize(self) -> Self::Output {
        let result = self.inner.finalize();
        let mut output = [0u8; DIGEST_SIZE];
        output.copy_from_slice(&result);
        Sha256Output(output)
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of a single buffer
#[must_use]
pub fn sha256(data: &[u8]) -> Sha256Output {
    Sha256::hash(data)
}

/// SHA-256 over the concatenation of several regions
#[must_use]
pub fn sha256_regions(regions: &[&[u8]]) -> Sha256Output {
    Sha256::hash_regions(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty() {
        let expected = [
            0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
            0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
            0x78, 0x52, 0xb8, 0x55,
        ];
        assert_eq!(sha256(b"").as_bytes(), &expected);
    }

    #[test]
    fn test_regions_match_concatenation() {
        assert_eq!(sha256_regions(&[b"ab", b"", b"c"]), sha256(b"abc"));
    }

    #[test]
    fn test_incremental_reset() {
        let mut h = Sha256::new();
        h.update(b"garbage");
        h.reset();
        h.update(b"abc");
        assert_eq!(h.finalize(), sha256(b"abc"));
    }
}
