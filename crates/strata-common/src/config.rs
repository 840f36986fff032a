// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Attestation configuration for Qbitel Strata
//!
//! All configuration is compile-time or provisioned at the factory. The
//! output regions are not configuration: callers hand them in as mutable
//! slices with their own capacity.

use crate::constants::{
    CHAIN_LAYERS, DEFAULT_ROOT_PATH_LEN, MAX_CERT_KEY_SIZE, MAX_FWID_SIZE, MAX_NAME_LEN,
};
use crate::errors::{Error, Result};

/// Behaviour when the security state does not permit reading the secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityPolicy {
    /// Abort the build with `HardwareUnavailable`
    #[default]
    FailClosed,
    /// Continue with a fixed, non-secret test identity (test builds only)
    FailOpen,
}

impl SecurityPolicy {
    /// Get the policy name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FailClosed => "fail-closed",
            Self::FailOpen => "fail-open",
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Copy)]
pub struct StrataConfig {
    /// Secret acquisition configuration
    pub identity: IdentityConfig,
    /// Certificate chain configuration
    pub chain: ChainConfig,
}

impl StrataConfig {
    /// Default configuration (fail-closed, default path length)
    pub const DEFAULT: Self = Self {
        identity: IdentityConfig::DEFAULT,
        chain: ChainConfig::DEFAULT,
    };

    /// Validate the whole configuration
    ///
    /// # Errors
    ///
    /// See [`ChainConfig::validate`].
    pub fn validate(&self) -> Result<()> {
        self.chain.validate()
    }
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Secret acquisition configuration
#[derive(Debug, Clone, Copy)]
pub struct IdentityConfig {
    /// What to do when the secret is not readable
    pub security_policy: SecurityPolicy,
}

impl IdentityConfig {
    /// Default identity configuration
    pub const DEFAULT: Self = Self {
        security_policy: SecurityPolicy::FailClosed,
    };

    /// Configuration for test builds that must boot without a trusted state
    pub const TESTING: Self = Self {
        security_policy: SecurityPolicy::FailOpen,
    };

    /// Whether the non-secret fallback identity may be used
    #[must_use]
    pub const fn allows_fallback(&self) -> bool {
        matches!(self.security_policy, SecurityPolicy::FailOpen)
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Certificate chain configuration
#[derive(Debug, Clone, Copy)]
pub struct ChainConfig {
    /// Path length constraint of the root certificate
    pub max_path_len: u8,
    /// Subject of the self-signed root certificate
    pub root_subject: &'static str,
    /// Subject of the device certificate, i.e. this stage's name
    pub device_subject: &'static str,
    /// Firmware version string recorded in the root certificate
    pub firmware_version: &'static str,
    /// Public key recorded as this stage's authenticator when the
    /// platform cannot report one
    pub stage_auth_key: &'static [u8],
}

impl ChainConfig {
    /// Default chain configuration
    pub const DEFAULT: Self = Self {
        max_path_len: DEFAULT_ROOT_PATH_LEN,
        root_subject: "Strata Root",
        device_subject: "SPL",
        firmware_version: env!("CARGO_PKG_VERSION"),
        // Placeholder for platforms without secure boot key reporting
        stage_auth_key: &[0x00],
    };

    /// Create a chain configuration with the given path length and names
    #[must_use]
    pub const fn new(
        max_path_len: u8,
        root_subject: &'static str,
        device_subject: &'static str,
        firmware_version: &'static str,
        stage_auth_key: &'static [u8],
    ) -> Self {
        Self {
            max_path_len,
            root_subject,
            device_subject,
            firmware_version,
            stage_auth_key,
        }
    }

    /// Path length constraint of the certificate at `layer` (0 = root and device)
    #[must_use]
    pub const fn path_len_for_layer(&self, layer: u8) -> Option<u8> {
        self.max_path_len.checked_sub(layer)
    }

    /// Validate the chain configuration
    ///
    /// # Errors
    ///
    /// - `ChainDepthExceeded` if the path length leaves no room for the alias layer
    /// - `InvalidConfig` if a name or key is empty or too long
    pub fn validate(&self) -> Result<()> {
        if self.max_path_len < CHAIN_LAYERS - 1 {
            return Err(Error::ChainDepthExceeded);
        }
        for name in [self.root_subject, self.device_subject] {
            if name.is_empty() || name.len() > MAX_NAME_LEN {
                return Err(Error::InvalidConfig);
            }
        }
        if self.firmware_version.is_empty() || self.firmware_version.len() > MAX_FWID_SIZE {
            return Err(Error::InvalidConfig);
        }
        if self.stage_auth_key.is_empty() || self.stage_auth_key.len() > MAX_CERT_KEY_SIZE {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fail_closed() {
        let config = StrataConfig::default();
        assert_eq!(config.identity.security_policy, SecurityPolicy::FailClosed);
        assert!(!config.identity.allows_fallback());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_path_len_per_layer() {
        let chain = ChainConfig::DEFAULT;
        assert_eq!(chain.path_len_for_layer(0), Some(DEFAULT_ROOT_PATH_LEN));
        assert_eq!(chain.path_len_for_layer(2), Some(DEFAULT_ROOT_PATH_LEN - 2));
        assert_eq!(chain.path_len_for_layer(DEFAULT_ROOT_PATH_LEN + 1), None);
    }

    #[test]
    fn test_shallow_path_len_rejected() {
        let mut chain = ChainConfig::DEFAULT;
        chain.max_path_len = 0;
        assert_eq!(chain.validate(), Err(Error::ChainDepthExceeded));
        chain.max_path_len = 1;
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn test_empty_names_rejected() {
        let mut chain = ChainConfig::DEFAULT;
        chain.device_subject = "";
        assert_eq!(chain.validate(), Err(Error::InvalidConfig));
    }
}
