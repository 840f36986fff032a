// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware secret acquisition
//!
//! The secret is read at most once per boot, and only while the platform
//! reports `Trusted` or `Secure`. When the state check fails the
//! configured [`SecurityPolicy`](strata_common::SecurityPolicy) decides
//! whether to abort or to continue with a fixed, non-secret identity.

use core::fmt;

use strata_common::constants::HARDWARE_SECRET_SIZE;
use strata_common::{log_debug, log_error, log_warn};
use strata_common::{Error, IdentityConfig, LogSink, Result, SecurityState};
use strata_hal::{RngInterface, SecretSource};
use zeroize::{Zeroize, ZeroizeOnDrop};

const MODULE: &str = "acquire";

/// Identity used when the fail-open policy is selected
///
/// Published and therefore worthless as a secret. Devices running on it
/// produce chains that only test infrastructure should accept.
pub const TEST_PLACEHOLDER_SECRET: [u8; HARDWARE_SECRET_SIZE] =
    *b"STRATA-NON-SECRET-TEST-IDENTITY!";

/// Raw hardware-unique secret
///
/// Zeroized on drop. Never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HardwareSecret([u8; HARDWARE_SECRET_SIZE]);

impl HardwareSecret {
    /// Size of the secret in bytes
    pub const SIZE: usize = HARDWARE_SECRET_SIZE;

    /// All-zero secret buffer to be filled by the platform
    #[must_use]
    pub const fn empty() -> Self {
        Self([0u8; HARDWARE_SECRET_SIZE])
    }

    /// Wrap secret bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; HARDWARE_SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the secret bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HARDWARE_SECRET_SIZE] {
        &self.0
    }

    /// Overwrite the secret with random bytes, then with zeros
    ///
    /// An RNG failure still leaves the buffer zeroed.
    pub fn scrub<R: RngInterface + ?Sized>(&mut self, rng: &mut R) {
        let _ = rng.fill_bytes(&mut self.0);
        self.0.zeroize();
    }

    fn as_mut_array(&mut self) -> &mut [u8; HARDWARE_SECRET_SIZE] {
        &mut self.0
    }
}

impl fmt::Debug for HardwareSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HardwareSecret([REDACTED])")
    }
}

/// Where an acquired secret came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretProvenance {
    /// Read from the hardware secret source
    Hardware,
    /// Fixed placeholder substituted under the fail-open policy
    TestPlaceholder,
}

impl SecretProvenance {
    /// Whether the identity derived from this secret is device-unique
    #[must_use]
    pub const fn is_hardware(&self) -> bool {
        matches!(self, Self::Hardware)
    }
}

/// Read the platform security state
///
/// This is the one predicate every caller uses to decide whether the
/// secret may be read.
pub fn check_security_state<S: SecretSource + ?Sized>(source: &S) -> SecurityState {
    source.security_state()
}

/// Read the hardware secret into `secret`, applying the configured
/// security policy
///
/// The caller owns the buffer so the secret is never moved through
/// intermediate stack slots. On error the buffer is left zeroed.
///
/// # Errors
///
/// - `HardwareUnavailable` if the state does not permit reading and the
///   policy is fail-closed
/// - `SecretReadFailure` if the platform read itself fails
pub fn read_secret<S, L>(
    source: &mut S,
    secret: &mut HardwareSecret,
    config: &IdentityConfig,
    log: &mut L,
) -> Result<SecretProvenance>
where
    S: SecretSource + ?Sized,
    L: LogSink + ?Sized,
{
    let state = check_security_state(source);
    if !state.permits_secret_read() {
        return degrade(state, secret, config, log);
    }

    match source.read_secret(secret.as_mut_array()) {
        Ok(()) => {
            log_debug!(log, MODULE, "secret read in {} state", state);
            Ok(SecretProvenance::Hardware)
        }
        Err(e) => {
            secret.zeroize();
            match Error::from(e) {
                Error::HardwareUnavailable => degrade(state, secret, config, log),
                err => {
                    log_error!(log, MODULE, "secret read failed: {}", e);
                    Err(err)
                }
            }
        }
    }
}

fn degrade<L: LogSink + ?Sized>(
    state: SecurityState,
    secret: &mut HardwareSecret,
    config: &IdentityConfig,
    log: &mut L,
) -> Result<SecretProvenance> {
    if config.allows_fallback() {
        log_warn!(
            log,
            MODULE,
            "state {} forbids secret read; continuing with non-secret testing identity",
            state
        );
        secret.as_mut_array().copy_from_slice(&TEST_PLACEHOLDER_SECRET);
        Ok(SecretProvenance::TestPlaceholder)
    } else {
        log_error!(log, MODULE, "state {} forbids secret read", state);
        Err(Error::HardwareUnavailable)
    }
}
