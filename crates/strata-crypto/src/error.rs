// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cryptographic error types
//!
//! `CryptoError` covers hashing, key derivation and signing. Verification
//! reports its own [`VerifyFailure`] so callers can tell the rejection
//! reasons apart; neither is ever treated as partial success.

use core::fmt;

/// Error type for cryptographic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key format or size
    InvalidKey,
    /// Signature is not valid DER
    MalformedSignature,
    /// Signing operation failed
    SigningFailed,
    /// Key derivation failed
    KeyDerivationFailed,
    /// Curve other than NIST P-256
    UnsupportedCurve,
    /// Hash algorithm other than SHA-256
    UnsupportedHash,
    /// Algorithm string is not `<hash>,<curve>`
    UnsupportedAlgorithm,
    /// Buffer is too small for the operation
    BufferTooSmall,
    /// Key manifest has no room for another node
    ManifestFull,
    /// Random number generator failure
    RngFailure,
    /// Internal error (should not occur)
    InternalError,
}

impl CryptoError {
    /// Get error code for logging/debugging
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidKey => 0x0501,
            Self::MalformedSignature => 0x0502,
            Self::SigningFailed => 0x0503,
            Self::KeyDerivationFailed => 0x0504,
            Self::UnsupportedCurve => 0x0505,
            Self::UnsupportedHash => 0x0506,
            Self::UnsupportedAlgorithm => 0x0507,
            Self::BufferTooSmall => 0x0508,
            Self::ManifestFull => 0x0509,
            Self::RngFailure => 0x050A,
            Self::InternalError => 0x05FF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid key",
            Self::MalformedSignature => "malformed signature",
            Self::SigningFailed => "signing operation failed",
            Self::KeyDerivationFailed => "key derivation failed",
            Self::UnsupportedCurve => "unsupported curve",
            Self::UnsupportedHash => "unsupported hash algorithm",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::BufferTooSmall => "buffer too small",
            Self::ManifestFull => "key manifest full",
            Self::RngFailure => "RNG failure",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CryptoError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<CryptoError> for strata_common::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKey | CryptoError::UnsupportedAlgorithm => Self::InvalidParameter,
            CryptoError::MalformedSignature => Self::VerifyMalformedSignature,
            CryptoError::SigningFailed => Self::SignatureFailure,
            CryptoError::KeyDerivationFailed => Self::KeyDerivationFailure,
            CryptoError::UnsupportedCurve => Self::VerifyUnsupportedCurve,
            CryptoError::UnsupportedHash => Self::VerifyUnsupportedHash,
            CryptoError::BufferTooSmall | CryptoError::ManifestFull => Self::BufferTooSmall,
            CryptoError::RngFailure => Self::RngFailure,
            CryptoError::InternalError => Self::InternalError,
        }
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Reason a signature was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    /// No key in the manifest verified the signature
    NoMatchingKey,
    /// Signature is not valid DER
    MalformedSignature,
    /// No candidate key was on a supported curve
    UnsupportedCurve,
    /// Checksum algorithm other than SHA-256
    UnsupportedHash,
    /// The only usable key did not verify the digest
    HashMismatch,
}

impl VerifyFailure {
    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NoMatchingKey => "no matching key",
            Self::MalformedSignature => "malformed signature",
            Self::UnsupportedCurve => "unsupported curve",
            Self::UnsupportedHash => "unsupported hash algorithm",
            Self::HashMismatch => "signature does not match digest",
        }
    }
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<VerifyFailure> for strata_common::Error {
    fn from(e: VerifyFailure) -> Self {
        match e {
            VerifyFailure::NoMatchingKey => Self::VerifyNoMatchingKey,
            VerifyFailure::MalformedSignature => Self::VerifyMalformedSignature,
            VerifyFailure::UnsupportedCurve => Self::VerifyUnsupportedCurve,
            VerifyFailure::UnsupportedHash => Self::VerifyUnsupportedHash,
            VerifyFailure::HashMismatch => Self::VerifyHashMismatch,
        }
    }
}
