// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Simulated platform for host-side testing
//!
//! [`SimulatedPlatform`] models a secret source whose master key becomes
//! unreadable after roll-forward, plus a deterministic RNG. It records
//! every read and roll-forward so tests can assert the call discipline of
//! the attestation pipeline, and it can be told to fail individual
//! operations.
//!
//! [`SimRegisters`] is an array-backed register block for exercising the
//! CAAM/SNVS decoding without hardware.

use strata_common::constants::HARDWARE_SECRET_SIZE;
use strata_common::SecurityState;
use zeroize::Zeroize;

use crate::caam::RegisterAccess;
use crate::error::{HalError, HalResult};
use crate::traits::{RngInterface, RollForward, SecretSource};

/// Value XOR-ed into the master key once the platform has rolled forward
const ROLLED_KEY_MASK: u8 = 0xA5;

/// Instrumented fake secret source and RNG
pub struct SimulatedPlatform {
    state: SecurityState,
    master_key: [u8; HARDWARE_SECRET_SIZE],
    secure_boot: bool,
    stage_auth_key: Option<&'static [u8]>,
    rng_state: u64,
    fail_read: bool,
    fail_roll_forward: bool,
    fail_rng: bool,
    reads: u32,
    roll_forward_calls: u32,
    transitions: u32,
}

impl SimulatedPlatform {
    /// Create a platform in `state` holding `master_key`
    #[must_use]
    pub const fn new(state: SecurityState, master_key: [u8; HARDWARE_SECRET_SIZE]) -> Self {
        Self {
            state,
            master_key,
            secure_boot: true,
            stage_auth_key: None,
            rng_state: 0x5EED_0F5E_C12E_7000,
            fail_read: false,
            fail_roll_forward: false,
            fail_rng: false,
            reads: 0,
            roll_forward_calls: 0,
            transitions: 0,
        }
    }

    /// Create a trusted platform with a fixed test key
    #[must_use]
    pub const fn trusted(master_key: [u8; HARDWARE_SECRET_SIZE]) -> Self {
        Self::new(SecurityState::Trusted, master_key)
    }

    /// Set the reported secure boot status
    #[must_use]
    pub const fn with_secure_boot(mut self, enforced: bool) -> Self {
        self.secure_boot = enforced;
        self
    }

    /// Report `key` as the key that authenticated the running stage
    #[must_use]
    pub const fn with_stage_auth_key(mut self, key: &'static [u8]) -> Self {
        self.stage_auth_key = Some(key);
        self
    }

    /// Make every secret read fail
    #[must_use]
    pub const fn failing_reads(mut self) -> Self {
        self.fail_read = true;
        self
    }

    /// Make every roll-forward fail
    #[must_use]
    pub const fn failing_roll_forward(mut self) -> Self {
        self.fail_roll_forward = true;
        self
    }

    /// Make the RNG fail
    #[must_use]
    pub const fn failing_rng(mut self) -> Self {
        self.fail_rng = true;
        self
    }

    /// Force the security state
    pub fn set_state(&mut self, state: SecurityState) {
        self.state = state;
    }

    /// The raw master key, for pattern checks in tests
    #[must_use]
    pub const fn master_key(&self) -> &[u8; HARDWARE_SECRET_SIZE] {
        &self.master_key
    }

    /// Number of secret reads attempted
    #[must_use]
    pub const fn reads(&self) -> u32 {
        self.reads
    }

    /// Number of roll-forward calls, including no-ops
    #[must_use]
    pub const fn roll_forward_calls(&self) -> u32 {
        self.roll_forward_calls
    }

    /// Number of real `-> Normal` transitions
    #[must_use]
    pub const fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Whether the platform is now in `Normal`
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.state.is_rolled_forward()
    }

    fn next_word(&mut self) -> u64 {
        // splitmix64
        self.rng_state = self.rng_state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.rng_state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl SecretSource for SimulatedPlatform {
    fn security_state(&self) -> SecurityState {
        self.state
    }

    fn read_secret(&mut self, out: &mut [u8; HARDWARE_SECRET_SIZE]) -> HalResult<()> {
        self.reads += 1;
        if self.fail_read {
            return Err(HalError::SecretReadFailed);
        }
        match self.state {
            SecurityState::Trusted | SecurityState::Secure => {
                out.copy_from_slice(&self.master_key);
                Ok(())
            }
            SecurityState::Normal => {
                for (o, k) in out.iter_mut().zip(self.master_key.iter()) {
                    *o = k ^ ROLLED_KEY_MASK;
                }
                Ok(())
            }
            SecurityState::Unknown => Err(HalError::SecretLocked),
        }
    }

    fn roll_forward(&mut self) -> HalResult<RollForward> {
        self.roll_forward_calls += 1;
        if self.fail_roll_forward {
            return Err(HalError::RollForwardFailed);
        }
        if self.state.is_rolled_forward() {
            return Ok(RollForward::AlreadyNormal);
        }
        self.state = SecurityState::Normal;
        self.transitions += 1;
        Ok(RollForward::Performed)
    }

    fn secure_boot_enforced(&self) -> bool {
        self.secure_boot
    }

    fn stage_auth_key(&self, out: &mut [u8]) -> HalResult<usize> {
        let key = self.stage_auth_key.ok_or(HalError::NotSupported)?;
        if !self.secure_boot {
            return Err(HalError::SecureBootDisabled);
        }
        out.get_mut(..key.len())
            .ok_or(HalError::InvalidParameter)?
            .copy_from_slice(key);
        Ok(key.len())
    }
}

impl RngInterface for SimulatedPlatform {
    fn fill_bytes(&mut self, buffer: &mut [u8]) -> HalResult<()> {
        if self.fail_rng {
            return Err(HalError::RngError);
        }
        for chunk in buffer.chunks_mut(8) {
            let word = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        !self.fail_rng
    }
}

impl Drop for SimulatedPlatform {
    fn drop(&mut self) {
        self.master_key.zeroize();
    }
}

/// Array-backed register block addressed by byte offset
#[derive(Debug, Clone)]
pub struct SimRegisters<const N: usize> {
    words: [u32; N],
    writes: u32,
}

impl<const N: usize> SimRegisters<N> {
    /// Create a block with every register reading zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words: [0; N],
            writes: 0,
        }
    }

    /// Preset a register value
    #[must_use]
    pub fn with(mut self, offset: usize, value: u32) -> Self {
        self.words[offset / 4] = value;
        self
    }

    /// Number of register writes performed
    #[must_use]
    pub const fn writes(&self) -> u32 {
        self.writes
    }
}

impl<const N: usize> Default for SimRegisters<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RegisterAccess for SimRegisters<N> {
    fn read32(&self, offset: usize) -> u32 {
        self.words.get(offset / 4).copied().unwrap_or(0)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        if let Some(word) = self.words.get_mut(offset / 4) {
            *word = value;
            self.writes += 1;
        }
    }
}

/// Master key reader returning a fixed key, or a rolled key once PRIBLOB is normal
#[derive(Debug, Clone)]
pub struct SimMasterKey {
    key: [u8; HARDWARE_SECRET_SIZE],
    reads: u32,
}

impl SimMasterKey {
    /// Create a reader for `key`
    #[must_use]
    pub const fn new(key: [u8; HARDWARE_SECRET_SIZE]) -> Self {
        Self { key, reads: 0 }
    }

    /// Number of key reads
    #[must_use]
    pub const fn reads(&self) -> u32 {
        self.reads
    }
}

impl crate::caam::MasterKeyReader for SimMasterKey {
    fn read_master_key(&mut self, priblob: u32, out: &mut [u8; HARDWARE_SECRET_SIZE]) -> HalResult<()> {
        self.reads += 1;
        out.copy_from_slice(&self.key);
        if priblob == crate::caam::PRIBLOB_NORMAL {
            for b in out.iter_mut() {
                *b ^= ROLLED_KEY_MASK;
            }
        }
        Ok(())
    }
}
