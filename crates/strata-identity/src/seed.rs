// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Identity-seed record
//!
//! The tagged record a later stage reads to obtain the device identity
//! without access to the hardware secret.
//!
//! # Layout (little-endian, 73 bytes)
//!
//! | Offset | Size | Field          |
//! |--------|------|----------------|
//! | 0      | 4    | magic "CCDI"   |
//! | 4      | 4    | version        |
//! | 8      | 32   | CDI            |
//! | 40     | 32   | extended CDI   |
//! | 72     | 1    | CDI valid flag |

use core::fmt;

use strata_common::constants::{DIGEST_SIZE, IDENTITY_SEED_MAGIC, IDENTITY_SEED_VERSION};
use strata_common::{log_error, log_info, log_warn};
use strata_common::{Error, IdentityConfig, LogSink, Result};
use strata_hal::AttestationPlatform;
use zeroize::Zeroize;

use crate::acquisition::{read_secret, HardwareSecret};
use crate::cdi::{derive_cdi, extend_cdi, Cdi};
use crate::hider::{HideGuard, HideOutcome};

const MODULE: &str = "seed";

/// Serialized size of an [`IdentitySeed`]
pub const IDENTITY_SEED_SIZE: usize = 4 + 4 + DIGEST_SIZE + DIGEST_SIZE + 1;

/// Device identity record handed to later stages
#[derive(Clone, Zeroize)]
pub struct IdentitySeed {
    magic: u32,
    version: u32,
    cdi: [u8; DIGEST_SIZE],
    extended_cdi: [u8; DIGEST_SIZE],
    cdi_valid: bool,
}

impl IdentitySeed {
    /// Empty record with the current magic and version
    #[must_use]
    pub const fn new() -> Self {
        Self {
            magic: IDENTITY_SEED_MAGIC,
            version: IDENTITY_SEED_VERSION,
            cdi: [0u8; DIGEST_SIZE],
            extended_cdi: [0u8; DIGEST_SIZE],
            cdi_valid: false,
        }
    }

    /// Record format version
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// The recorded CDI
    #[must_use]
    pub fn cdi(&self) -> Cdi {
        Cdi::from_bytes(self.cdi)
    }

    /// The extended CDI (all zero until a measurement is saved)
    #[must_use]
    pub const fn extended_cdi(&self) -> &[u8; DIGEST_SIZE] {
        &self.extended_cdi
    }

    /// Whether the CDI came from hardware on a secure-boot-enforcing device
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.cdi_valid
    }

    /// Fold a later stage's measurement into the extended CDI
    ///
    /// The extension always starts from the base CDI, so saving twice
    /// replaces rather than chains.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `measurement` is empty.
    pub fn save_measurement(&mut self, measurement: &[u8]) -> Result<()> {
        if measurement.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let cdi = self.cdi();
        self.extended_cdi = *extend_cdi(&cdi, measurement).as_bytes();
        Ok(())
    }

    /// Serialize the record
    #[must_use]
    pub fn to_bytes(&self) -> [u8; IDENTITY_SEED_SIZE] {
        let mut out = [0u8; IDENTITY_SEED_SIZE];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..40].copy_from_slice(&self.cdi);
        out[40..72].copy_from_slice(&self.extended_cdi);
        out[72] = u8::from(self.cdi_valid);
        out
    }

    /// Parse a serialized record
    ///
    /// # Errors
    ///
    /// `InvalidIdentitySeed` on a short buffer, wrong magic or version, or
    /// a validity flag other than 0 or 1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IDENTITY_SEED_SIZE {
            return Err(Error::InvalidIdentitySeed);
        }
        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if magic != IDENTITY_SEED_MAGIC || version != IDENTITY_SEED_VERSION {
            return Err(Error::InvalidIdentitySeed);
        }
        let cdi_valid = match bytes[72] {
            0 => false,
            1 => true,
            _ => return Err(Error::InvalidIdentitySeed),
        };

        let mut seed = Self::new();
        seed.cdi.copy_from_slice(&bytes[8..40]);
        seed.extended_cdi.copy_from_slice(&bytes[40..72]);
        seed.cdi_valid = cdi_valid;
        Ok(seed)
    }
}

impl Default for IdentitySeed {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IdentitySeed {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for IdentitySeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySeed")
            .field("magic", &format_args!("{:#010X}", self.magic))
            .field("version", &self.version)
            .field("cdi_valid", &self.cdi_valid)
            .finish_non_exhaustive()
    }
}

/// Read the secret, hide it and record the CDI
///
/// The secret is hidden and scrubbed on every path, including errors.
/// The seed is only marked valid when the secret came from hardware and
/// the platform confirms secure boot enforcement.
///
/// # Errors
///
/// - Acquisition errors from [`read_secret`]
/// - `SecretHideFailure` if the roll-forward failed
pub fn provision_identity_seed<P, L>(
    platform: &mut P,
    config: &IdentityConfig,
    log: &mut L,
) -> Result<IdentitySeed>
where
    P: AttestationPlatform + ?Sized,
    L: LogSink + ?Sized,
{
    let mut guard = HideGuard::new(platform);
    let mut secret = HardwareSecret::empty();
    let provenance = read_secret(guard.source(), &mut secret, config, log)?;

    let secure_boot = guard.source().secure_boot_enforced();
    let cdi = derive_cdi(&secret);
    secret.scrub(guard.source());

    match guard.finish() {
        Ok(HideOutcome::Hidden) => {}
        Ok(HideOutcome::AlreadyHidden) => {
            log_warn!(log, MODULE, "secret was already hidden before provisioning");
        }
        Err(e) => {
            log_error!(log, MODULE, "failed to hide secret: {}", e);
            return Err(e);
        }
    }

    let mut seed = IdentitySeed::new();
    seed.cdi = *cdi.as_bytes();
    seed.cdi_valid = provenance.is_hardware() && secure_boot;
    if !secure_boot {
        log_warn!(log, MODULE, "secure boot not enforced; identity seed marked invalid");
    }
    log_info!(log, MODULE, "identity seed provisioned (valid: {})", seed.cdi_valid);
    Ok(seed)
}
