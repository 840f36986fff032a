// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for Qbitel Strata
//!
//! This module defines the unified error type returned by every stage of the
//! attestation pipeline. All errors are `Copy`, carry a stable numeric code
//! and never hold key material, so they can be logged or handed back to the
//! boot ROM as a plain integer.

use core::fmt;

/// Result type alias for Qbitel Strata operations
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for Qbitel Strata
///
/// Every error in the `0x02xx` range is fatal to the current chain build and
/// triggers a full rollback of the output regions. `HardwareUnavailable` is
/// only fatal when the configured security policy is fail-closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Identity Errors (0x01xx)
    // =========================================================================
    /// Security state does not permit reading the hardware secret
    HardwareUnavailable,
    /// Reading the hardware secret failed
    SecretReadFailure,
    /// The one-way roll-forward transition could not be performed
    SecretHideFailure,
    /// Identity seed record is malformed
    InvalidIdentitySeed,

    // =========================================================================
    // Chain Errors (0x02xx)
    // =========================================================================
    /// Certificate chain region could not be initialized
    ChainInitFailure,
    /// Certificate does not fit in the remaining chain capacity
    CertInsertOverflow,
    /// Requested chain is deeper than the configured path length allows
    ChainDepthExceeded,
    /// Signing a certificate failed
    SignatureFailure,
    /// Key blob could not be written
    KeyBlobWriteFailure,
    /// Key pair derivation failed
    KeyDerivationFailure,
    /// Certificate or chain encoding is malformed
    MalformedCertificate,
    /// Certificate chain linkage or signature check failed
    ChainVerificationFailed,
    /// Key blob header, key or check digest is invalid
    InvalidKeyBlob,

    // =========================================================================
    // Verification Errors (0x03xx)
    // =========================================================================
    /// No key in the manifest verifies the signature
    VerifyNoMatchingKey,
    /// Signature is not valid DER
    VerifyMalformedSignature,
    /// Key node uses a curve other than NIST P-256
    VerifyUnsupportedCurve,
    /// Hash algorithm other than SHA-256 requested
    VerifyUnsupportedHash,
    /// Signature does not match the computed digest
    VerifyHashMismatch,

    // =========================================================================
    // HAL Errors (0x04xx)
    // =========================================================================
    /// Platform hardware fault
    HardwareFault,
    /// Random number generator failure
    RngFailure,

    // =========================================================================
    // General Errors (0xFFxx)
    // =========================================================================
    /// Buffer is too small for operation
    BufferTooSmall,
    /// Invalid parameter provided
    InvalidParameter,
    /// Invalid configuration
    InvalidConfig,
    /// Operation not valid in current state
    InvalidState,
    /// Internal error (should not occur)
    InternalError,
}

impl Error {
    /// Get the numeric error code
    ///
    /// The code is never zero, so it can be used directly as a non-success
    /// boot return value.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            // Identity errors
            Self::HardwareUnavailable => 0x0101,
            Self::SecretReadFailure => 0x0102,
            Self::SecretHideFailure => 0x0103,
            Self::InvalidIdentitySeed => 0x0104,

            // Chain errors
            Self::ChainInitFailure => 0x0201,
            Self::CertInsertOverflow => 0x0202,
            Self::ChainDepthExceeded => 0x0203,
            Self::SignatureFailure => 0x0204,
            Self::KeyBlobWriteFailure => 0x0205,
            Self::KeyDerivationFailure => 0x0206,
            Self::MalformedCertificate => 0x0207,
            Self::ChainVerificationFailed => 0x0208,
            Self::InvalidKeyBlob => 0x0209,

            // Verification errors
            Self::VerifyNoMatchingKey => 0x0301,
            Self::VerifyMalformedSignature => 0x0302,
            Self::VerifyUnsupportedCurve => 0x0303,
            Self::VerifyUnsupportedHash => 0x0304,
            Self::VerifyHashMismatch => 0x0305,

            // HAL errors
            Self::HardwareFault => 0x0401,
            Self::RngFailure => 0x0402,

            // General errors
            Self::BufferTooSmall => 0xFF01,
            Self::InvalidParameter => 0xFF02,
            Self::InvalidConfig => 0xFF03,
            Self::InvalidState => 0xFF04,
            Self::InternalError => 0xFFFF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::HardwareUnavailable => "hardware secret unavailable in current security state",
            Self::SecretReadFailure => "hardware secret read failed",
            Self::SecretHideFailure => "hardware secret roll-forward failed",
            Self::InvalidIdentitySeed => "invalid identity seed record",
            Self::ChainInitFailure => "certificate chain init failed",
            Self::CertInsertOverflow => "certificate chain capacity exceeded",
            Self::ChainDepthExceeded => "certificate chain depth exceeded",
            Self::SignatureFailure => "signature generation failed",
            Self::KeyBlobWriteFailure => "key blob write failed",
            Self::KeyDerivationFailure => "key pair derivation failed",
            Self::MalformedCertificate => "malformed certificate",
            Self::ChainVerificationFailed => "certificate chain verification failed",
            Self::InvalidKeyBlob => "invalid key blob",
            Self::VerifyNoMatchingKey => "no matching key",
            Self::VerifyMalformedSignature => "malformed signature",
            Self::VerifyUnsupportedCurve => "unsupported curve",
            Self::VerifyUnsupportedHash => "unsupported hash algorithm",
            Self::VerifyHashMismatch => "signature does not match digest",
            Self::HardwareFault => "hardware fault",
            Self::RngFailure => "RNG failure",
            Self::BufferTooSmall => "buffer too small",
            Self::InvalidParameter => "invalid parameter",
            Self::InvalidConfig => "invalid configuration",
            Self::InvalidState => "invalid state",
            Self::InternalError => "internal error",
        }
    }

    /// Check whether this error aborts a chain build
    ///
    /// Every error except `HardwareUnavailable` is fatal; that one degrades
    /// according to the configured security policy.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::HardwareUnavailable)
    }

    /// Check whether this error came out of signature verification
    #[must_use]
    pub const fn is_verify_failure(&self) -> bool {
        self.code() & 0xFF00 == 0x0300
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
