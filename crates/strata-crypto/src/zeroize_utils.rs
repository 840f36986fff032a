// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Secure memory utilities
//!
//! Zeroization of caller-owned regions and a fixed-size buffer that wipes
//! itself on drop.

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};
use zeroize::Zeroize;

/// Securely zero memory, preventing compiler optimization
///
/// Used for the output regions, which are plain `&mut [u8]` owned by the
/// caller and must read back as all-zero after a failed build.
#[inline(never)]
pub fn secure_zero(data: &mut [u8]) {
    for byte in data.iter_mut() {
        // SAFETY: We're writing to valid memory that we have mutable access to
        unsafe {
            ptr::write_volatile(byte, 0);
        }
    }

    // Memory barrier to ensure writes complete before returning
    compiler_fence(Ordering::SeqCst);
}

/// Check whether every byte of `data` is zero
///
/// Runs over the whole slice regardless of content.
#[must_use]
pub fn is_zeroed(data: &[u8]) -> bool {
    data.iter().fold(0u8, |acc, b| acc | b) == 0
}

/// Secure buffer that zeroizes on drop
#[derive(Clone)]
pub struct SecureBuffer<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> SecureBuffer<N> {
    /// Create a new zeroed secure buffer
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0u8; N] }
    }

    /// Create from a byte slice
    ///
    /// Returns `None` if the slice length doesn't match N.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != N {
            return None;
        }
        let mut buf = Self::new();
        buf.data.copy_from_slice(slice);
        Some(buf)
    }

    /// Get the data as a fixed-size array
    #[must_use]
    pub const fn as_array(&self) -> &[u8; N] {
        &self.data
    }

    /// Get the data as a mutable fixed-size array
    pub fn as_mut_array(&mut self) -> &mut [u8; N] {
        &mut self.data
    }

    /// Get the buffer size
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if buffer is empty (always false for N > 0)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> Default for SecureBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AsRef<[u8]> for SecureBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> AsMut<[u8]> for SecureBuffer<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> Zeroize for SecureBuffer<N> {
    fn zeroize(&mut self) {
        secure_zero(&mut self.data);
    }
}

impl<const N: usize> Drop for SecureBuffer<N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<const N: usize> core::fmt::Debug for SecureBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecureBuffer<{N}>([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_zero() {
        let mut data = [0xFFu8; 40];
        secure_zero(&mut data);
        assert!(is_zeroed(&data));
    }

    #[test]
    fn test_secure_buffer_zeroize() {
        let mut buf = SecureBuffer::<8>::from_slice(&[7u8; 8]).unwrap();
        assert!(!is_zeroed(buf.as_ref()));
        buf.zeroize();
        assert!(is_zeroed(buf.as_ref()));
    }

    #[test]
    fn test_from_slice_length_mismatch() {
        assert!(SecureBuffer::<8>::from_slice(&[0u8; 7]).is_none());
    }
}
