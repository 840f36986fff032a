// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Common types for Qbitel Strata
//!
//! This module defines the platform security state, the algorithm
//! identifiers shared by the signature engine and the manifest, and the
//! description of the next boot stage handed over by the image loader.

use core::fmt;

use crate::constants::{
    DIGEST_SIZE, ECC_NIST_P256_ID, ECC_NIST_P256_NAME, MAX_CERT_DIGEST_SIZE, MAX_CERT_KEY_SIZE,
    MAX_NAME_LEN, SHA256_NAME,
};
use crate::errors::{Error, Result};

/// Platform security state as reported by the security monitor
///
/// The raw hardware secret is readable only while the state is `Trusted`
/// or `Secure`. The transition to `Normal` is one-way for the rest of the
/// power cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SecurityState {
    /// State could not be determined (treated as untrusted)
    Unknown = 0,
    /// Trusted mode: secret readable
    Trusted = 1,
    /// Secure mode: secret readable
    Secure = 2,
    /// Rolled forward: secret hidden until the next power-on reset
    Normal = 3,
}

impl SecurityState {
    /// Convert from a raw byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Trusted,
            2 => Self::Secure,
            3 => Self::Normal,
            _ => Self::Unknown,
        }
    }

    /// Whether the hardware secret may be read in this state
    ///
    /// This is the single predicate every caller must use.
    #[must_use]
    pub const fn permits_secret_read(&self) -> bool {
        matches!(self, Self::Trusted | Self::Secure)
    }

    /// Whether the secret has already been hidden
    #[must_use]
    pub const fn is_rolled_forward(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Get the state name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Trusted => "trusted",
            Self::Secure => "secure",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for SecurityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elliptic curve identifier as carried in manifest key nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveId {
    /// NIST P-256 (prime256v1)
    NistP256,
}

impl CurveId {
    /// Numeric identifier stored in key nodes
    #[must_use]
    pub const fn id(&self) -> u32 {
        match self {
            Self::NistP256 => ECC_NIST_P256_ID,
        }
    }

    /// Look up a curve by its numeric identifier
    #[must_use]
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            ECC_NIST_P256_ID => Some(Self::NistP256),
            _ => None,
        }
    }

    /// Curve name used in algorithm strings
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NistP256 => ECC_NIST_P256_NAME,
        }
    }

    /// Look up a curve by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == ECC_NIST_P256_NAME {
            Some(Self::NistP256)
        } else {
            None
        }
    }
}

/// Hash algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256, the only algorithm accepted for ECC signatures
    Sha256,
}

impl HashAlgorithm {
    /// Algorithm name as used in `<hash>,<curve>` strings
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => SHA256_NAME,
        }
    }

    /// Digest length in bytes
    #[must_use]
    pub const fn output_size(&self) -> usize {
        match self {
            Self::Sha256 => DIGEST_SIZE,
        }
    }

    /// Look up an algorithm by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == SHA256_NAME {
            Some(Self::Sha256)
        } else {
            None
        }
    }
}

/// Description of the next boot stage, supplied by the image loader
///
/// The name becomes the alias certificate subject, the digest its subject
/// digest and the authentication key its subject public key.
#[derive(Debug, Clone, Copy)]
pub struct NextImage<'a> {
    /// Image name (alias certificate subject)
    pub name: &'a str,
    /// Measurement of the loaded image
    pub digest: &'a [u8],
    /// Public key that authenticated the image
    pub auth_key: &'a [u8],
}

impl<'a> NextImage<'a> {
    /// Create a new next-stage description
    #[must_use]
    pub const fn new(name: &'a str, digest: &'a [u8], auth_key: &'a [u8]) -> Self {
        Self {
            name,
            digest,
            auth_key,
        }
    }

    /// Validate field lengths against the certificate limits
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if any field is empty or too long.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_LEN {
            return Err(Error::InvalidParameter);
        }
        if self.digest.is_empty() || self.digest.len() > MAX_CERT_DIGEST_SIZE {
            return Err(Error::InvalidParameter);
        }
        if self.auth_key.is_empty() || self.auth_key.len() > MAX_CERT_KEY_SIZE {
            return Err(Error::InvalidParameter);
        }
        Ok(())
    }
}
