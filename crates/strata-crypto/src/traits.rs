// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Core cryptographic traits
//!
//! # Design Principles
//!
//! 1. **Constant-time**: comparisons of secret-derived data use `subtle`
//! 2. **Zeroization**: secret data must be zeroized after use
//! 3. **no_std**: all traits are no_std compatible

use strata_common::HashAlgorithm;

/// Hash function trait
pub trait Hash: Sized {
    /// Algorithm identifier for this hash function
    const ALGORITHM: HashAlgorithm;
    /// Output size in bytes
    const OUTPUT_SIZE: usize;
    /// Block size in bytes
    const BLOCK_SIZE: usize;

    /// Output type
    type Output: AsRef<[u8]> + Clone;

    /// Hash a message in one shot
    fn hash(message: &[u8]) -> Self::Output;

    /// Hash the concatenation of `regions` without copying them together
    fn hash_regions(regions: &[&[u8]]) -> Self::Output {
        let mut hasher = Self::new();
        for region in regions {
            hasher.update(region);
        }
        hasher.finalize()
    }

    /// Create a new incremental hasher
    fn new() -> Self;

    /// Update the hasher with data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the hash
    fn finalize(self) -> Self::Output;

    /// Reset the hasher for reuse
    fn reset(&mut self);
}

/// Compare two byte slices in constant time
///
/// Slices of different length compare unequal immediately; the length is
/// not secret.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
