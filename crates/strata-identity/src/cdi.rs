// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Composite Device Identity derivation
//!
//! `CDI = SHA256(secret)`; `ExtendedCDI = SHA256(CDI || measurement)`.

use core::fmt;

use strata_common::constants::DIGEST_SIZE;
use strata_crypto::constant_time_eq;
use strata_crypto::hash::{sha256, sha256_regions};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::acquisition::HardwareSecret;

/// Composite Device Identity
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Cdi([u8; DIGEST_SIZE]);

impl Cdi {
    /// Wrap a stored CDI
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the CDI bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl PartialEq for Cdi {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for Cdi {}

impl fmt::Debug for Cdi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cdi([REDACTED])")
    }
}

/// CDI with a later stage's measurement folded in
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedCdi([u8; DIGEST_SIZE]);

impl ExtendedCdi {
    /// Borrow the extended CDI bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl PartialEq for ExtendedCdi {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Eq for ExtendedCdi {}

impl fmt::Debug for ExtendedCdi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtendedCdi([REDACTED])")
    }
}

/// Derive the CDI from the hardware secret
#[must_use]
pub fn derive_cdi(secret: &HardwareSecret) -> Cdi {
    let digest = sha256(secret.as_bytes());
    Cdi(*digest.as_bytes())
}

/// Fold a measurement into the CDI
#[must_use]
pub fn extend_cdi(cdi: &Cdi, measurement: &[u8]) -> ExtendedCdi {
    let digest = sha256_regions(&[cdi.as_bytes().as_slice(), measurement]);
    ExtendedCdi(*digest.as_bytes())
}
