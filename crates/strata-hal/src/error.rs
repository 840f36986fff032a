// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL error types

use core::fmt;

/// HAL error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Hardware not initialized
    NotInitialized,
    /// Security state does not allow reading the secret
    SecretLocked,
    /// Secret read failed
    SecretReadFailed,
    /// Roll-forward register write did not take effect
    RollForwardFailed,
    /// Master key selector is locked to a non-OTP source
    KeySourceLocked,
    /// Secure boot is not enabled, so no authenticating key exists
    SecureBootDisabled,
    /// CSF header barker code or key table is invalid
    InvalidCsf,
    /// RNG failure
    RngError,
    /// Invalid parameter
    InvalidParameter,
    /// Operation not supported
    NotSupported,
    /// Hardware fault detected
    HardwareFault,
}

impl HalError {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotInitialized => 0x0801,
            Self::SecretLocked => 0x0810,
            Self::SecretReadFailed => 0x0811,
            Self::RollForwardFailed => 0x0812,
            Self::KeySourceLocked => 0x0813,
            Self::SecureBootDisabled => 0x0830,
            Self::InvalidCsf => 0x0831,
            Self::RngError => 0x0820,
            Self::InvalidParameter => 0x08F0,
            Self::NotSupported => 0x08FF,
            Self::HardwareFault => 0x08D0,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not initialized",
            Self::SecretLocked => "secret locked by security state",
            Self::SecretReadFailed => "secret read failed",
            Self::RollForwardFailed => "roll-forward failed",
            Self::KeySourceLocked => "master key source locked",
            Self::SecureBootDisabled => "secure boot disabled",
            Self::InvalidCsf => "invalid CSF header",
            Self::RngError => "RNG error",
            Self::InvalidParameter => "invalid parameter",
            Self::NotSupported => "not supported",
            Self::HardwareFault => "hardware fault detected",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<HalError> for strata_common::Error {
    fn from(e: HalError) -> Self {
        match e {
            HalError::SecretLocked | HalError::KeySourceLocked | HalError::SecureBootDisabled => {
                Self::HardwareUnavailable
            }
            HalError::SecretReadFailed => Self::SecretReadFailure,
            HalError::RollForwardFailed => Self::SecretHideFailure,
            HalError::RngError => Self::RngFailure,
            HalError::InvalidParameter => Self::InvalidParameter,
            HalError::NotInitialized
            | HalError::NotSupported
            | HalError::HardwareFault
            | HalError::InvalidCsf => Self::HardwareFault,
        }
    }
}

/// HAL Result type
pub type HalResult<T> = Result<T, HalError>;
