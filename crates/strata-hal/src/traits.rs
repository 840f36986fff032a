// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL trait definitions
//!
//! The attestation pipeline consumes exactly two services from the
//! platform: the hardware secret source (with its one-way roll-forward)
//! and a random number generator used to scrub buffers.

use strata_common::constants::HARDWARE_SECRET_SIZE;
use strata_common::SecurityState;

use crate::error::{HalError, HalResult};

/// Outcome of a roll-forward request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollForward {
    /// The state moved to `Normal` during this call
    Performed,
    /// The state was already `Normal`; nothing was written
    AlreadyNormal,
}

/// Hardware-unique secret source
pub trait SecretSource {
    /// Read the current security state from the platform registers
    fn security_state(&self) -> SecurityState;

    /// Read the hardware secret into `out`
    ///
    /// Implementations do not gate on the security state; callers must
    /// check [`SecurityState::permits_secret_read`] first. After a
    /// roll-forward, hardware returns a different, non-identifying key.
    fn read_secret(&mut self, out: &mut [u8; HARDWARE_SECRET_SIZE]) -> HalResult<()>;

    /// Perform the one-way transition to `Normal`
    fn roll_forward(&mut self) -> HalResult<RollForward>;

    /// Whether secure boot enforcement is enabled on this device
    fn secure_boot_enforced(&self) -> bool;

    /// Copy the public key that authenticated the running stage into `out`
    ///
    /// Returns the key length. Platforms that cannot report the key return
    /// `NotSupported`; with secure boot disabled there is no such key and
    /// `SecureBootDisabled` is returned.
    fn stage_auth_key(&self, out: &mut [u8]) -> HalResult<usize> {
        let _ = out;
        Err(HalError::NotSupported)
    }
}

/// Random number generator interface
pub trait RngInterface {
    /// Initialize the RNG
    fn init(&mut self) -> HalResult<()> {
        Ok(())
    }

    /// Fill buffer with random bytes
    fn fill_bytes(&mut self, buffer: &mut [u8]) -> HalResult<()>;

    /// Generate a random u32
    fn next_u32(&mut self) -> HalResult<u32> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Generate a random u64
    fn next_u64(&mut self) -> HalResult<u64> {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Check if RNG is ready
    fn is_ready(&self) -> bool;
}

/// Everything the chain builder needs from the board
pub trait AttestationPlatform: SecretSource + RngInterface {}

impl<T: SecretSource + RngInterface> AttestationPlatform for T {}

/// Pairs a secret source with a separate RNG peripheral
#[derive(Debug)]
pub struct Board<S, R> {
    /// Secret source
    pub secrets: S,
    /// Random number generator
    pub rng: R,
}

impl<S, R> Board<S, R> {
    /// Combine a secret source and an RNG
    pub const fn new(secrets: S, rng: R) -> Self {
        Self { secrets, rng }
    }
}

impl<S: SecretSource, R> SecretSource for Board<S, R> {
    fn security_state(&self) -> SecurityState {
        self.secrets.security_state()
    }

    fn read_secret(&mut self, out: &mut [u8; HARDWARE_SECRET_SIZE]) -> HalResult<()> {
        self.secrets.read_secret(out)
    }

    fn roll_forward(&mut self) -> HalResult<RollForward> {
        self.secrets.roll_forward()
    }

    fn secure_boot_enforced(&self) -> bool {
        self.secrets.secure_boot_enforced()
    }

    fn stage_auth_key(&self, out: &mut [u8]) -> HalResult<usize> {
        self.secrets.stage_auth_key(out)
    }
}

impl<S, R: RngInterface> RngInterface for Board<S, R> {
    fn init(&mut self) -> HalResult<()> {
        self.rng.init()
    }

    fn fill_bytes(&mut self, buffer: &mut [u8]) -> HalResult<()> {
        self.rng.fill_bytes(buffer)
    }

    fn is_ready(&self) -> bool {
        self.rng.is_ready()
    }
}
