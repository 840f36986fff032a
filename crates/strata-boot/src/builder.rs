// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! DICE certificate chain builder
//!
//! Runs once per boot, before control passes to the next stage:
//!
//! ```text
//! Init ─▶ IdentityAcquired ─▶ RootCertBuilt ─▶ AliasKeyDerived
//!                                                     │
//!        Done ◀─ KeyBlobWritten ◀─ AliasCertBuilt ◀───┘
//!
//! any failure ─▶ Cleanup (both regions zeroed) ─▶ Done(err)
//! ```
//!
//! The secret is hidden exactly once on every path, after the chain work
//! and before `build` returns. A failed hide is fatal even if the chain was
//! built.
//!
//! | Layer  | Subject        | Issuer         | Subject key        | Signed by  | Path |
//! |--------|----------------|----------------|--------------------|------------|------|
//! | root   | root subject   | root subject   | device public key  | device key | N    |
//! | device | device subject | root subject   | device public key  | device key | N    |
//! | alias  | next image     | device subject | next image auth key| device key | N-1  |
//!
//! The alias certificate also carries the alias public key (`issued_key`)
//! so the key blob can be tied back to the chain. Root and device carry the
//! key that authenticated this stage, as reported by the platform; keys too
//! large for a certificate field are recorded as their SHA-256 digest.

use strata_common::constants::{MAX_CERT_KEY_SIZE, MAX_STAGE_AUTH_KEY_SIZE};
use strata_common::{log_debug, log_error, log_info, log_warn};
use strata_common::{Error, LogSink, NextImage, Result, StrataConfig};
use strata_crypto::zeroize_utils::secure_zero;
use strata_crypto::{derive_key_pair, sha256, EccKeyPair};
use strata_hal::{AttestationPlatform, HalError};
use strata_identity::{
    derive_cdi, read_secret, HardwareSecret, HideGuard, HideOutcome, SecretProvenance,
};

use crate::cert::{issue, CertKind, TbsCertificate};
use crate::chain::ChainBlob;
use crate::key_blob::KeyBlobStore;

const MODULE: &str = "chain";

// ============================================================================
// Build State
// ============================================================================

/// Progress of a chain build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing done yet
    Init,
    /// Secret read (or placeholder substituted) and CDI derived
    IdentityAcquired,
    /// Root and device certificates in the chain
    RootCertBuilt,
    /// Alias key pair derived
    AliasKeyDerived,
    /// Alias certificate in the chain
    AliasCertBuilt,
    /// Alias key pair persisted
    KeyBlobWritten,
    /// Secret hidden, build complete
    Done,
    /// Rolling back after a failure
    Cleanup,
}

impl BuildState {
    /// Get the state name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::IdentityAcquired => "identity-acquired",
            Self::RootCertBuilt => "root-cert-built",
            Self::AliasKeyDerived => "alias-key-derived",
            Self::AliasCertBuilt => "alias-cert-built",
            Self::KeyBlobWritten => "key-blob-written",
            Self::Done => "done",
            Self::Cleanup => "cleanup",
        }
    }
}

/// Summary of a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Where the identity came from
    pub provenance: SecretProvenance,
    /// Result of hiding the secret
    pub hide: HideOutcome,
    /// Certificates in the chain
    pub cert_count: u16,
    /// Bytes of the chain region in use
    pub chain_len: usize,
}

// ============================================================================
// Builder
// ============================================================================

/// One-shot certificate chain builder
///
/// Holds the platform exclusively; `build` consumes the builder, so a
/// second build over the same platform borrow cannot start.
pub struct CertChainBuilder<'p, P: AttestationPlatform + ?Sized, L: LogSink> {
    platform: &'p mut P,
    config: StrataConfig,
    log: L,
    state: BuildState,
}

impl<'p, P: AttestationPlatform + ?Sized, L: LogSink> CertChainBuilder<'p, P, L> {
    /// Create a builder over `platform`
    pub fn new(platform: &'p mut P, config: StrataConfig, log: L) -> Self {
        Self {
            platform,
            config,
            log,
            state: BuildState::Init,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> BuildState {
        self.state
    }

    /// Build the chain for `next` into `chain_region` and persist the
    /// alias key pair into `key_region`
    ///
    /// On any error both regions are left all zero, and the secret is
    /// hidden regardless.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`, `ChainDepthExceeded`, `InvalidParameter` before
    ///   anything is read
    /// - `HardwareUnavailable` under the fail-closed policy
    /// - `SecretReadFailure`, `ChainInitFailure`, `CertInsertOverflow`,
    ///   `SignatureFailure`, `KeyDerivationFailure`, `KeyBlobWriteFailure`
    /// - `SecretHideFailure` if the roll-forward failed
    pub fn build(
        mut self,
        next: &NextImage<'_>,
        chain_region: &mut [u8],
        key_region: &mut [u8],
    ) -> Result<BuildReport> {
        let mut guard = HideGuard::new(&mut *self.platform);
        let built = run(
            &mut guard,
            &self.config,
            next,
            chain_region,
            key_region,
            &mut self.log,
            &mut self.state,
        );
        let hidden = guard.finish();

        let result = match (built, hidden) {
            (Ok(built), Ok(hide)) => Ok(BuildReport {
                provenance: built.provenance,
                hide,
                cert_count: built.cert_count,
                chain_len: built.chain_len,
            }),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        };

        match result {
            Ok(report) => {
                advance(&mut self.log, &mut self.state, BuildState::Done);
                log_info!(
                    self.log,
                    MODULE,
                    "chain built: {} certs, {} bytes",
                    report.cert_count,
                    report.chain_len
                );
            }
            Err(e) => {
                log_error!(self.log, MODULE, "build failed in {}: {}", self.state.as_str(), e);
                advance(&mut self.log, &mut self.state, BuildState::Cleanup);
                secure_zero(chain_region);
                secure_zero(key_region);
                advance(&mut self.log, &mut self.state, BuildState::Done);
            }
        }
        result
    }
}

struct Built {
    provenance: SecretProvenance,
    cert_count: u16,
    chain_len: usize,
}

fn advance<L: LogSink>(log: &mut L, state: &mut BuildState, to: BuildState) {
    log_debug!(log, MODULE, "{} -> {}", state.as_str(), to.as_str());
    *state = to;
}

fn run<P, L>(
    guard: &mut HideGuard<'_, P>,
    config: &StrataConfig,
    next: &NextImage<'_>,
    chain_region: &mut [u8],
    key_region: &mut [u8],
    log: &mut L,
    state: &mut BuildState,
) -> Result<Built>
where
    P: AttestationPlatform + ?Sized,
    L: LogSink,
{
    config.validate()?;
    next.validate()?;
    let chain_config = &config.chain;
    let path_len = |layer: CertKind| {
        chain_config
            .path_len_for_layer(layer.layer())
            .ok_or(Error::ChainDepthExceeded)
    };
    let (root_path, device_path, alias_path) = (
        path_len(CertKind::Root)?,
        path_len(CertKind::Device)?,
        path_len(CertKind::Alias)?,
    );

    let mut auth_key_buf = [0u8; MAX_STAGE_AUTH_KEY_SIZE];
    let auth_key_digest;
    let stage_auth_key: &[u8] = match guard.source().stage_auth_key(&mut auth_key_buf) {
        Ok(len) if len <= MAX_CERT_KEY_SIZE => &auth_key_buf[..len],
        Ok(len) => {
            // Too large for a certificate field (RSA): record its digest
            auth_key_digest = sha256(&auth_key_buf[..len]);
            auth_key_digest.as_bytes()
        }
        Err(HalError::NotSupported) => {
            log_info!(log, MODULE, "platform reports no stage key; using configured key");
            chain_config.stage_auth_key
        }
        Err(HalError::SecureBootDisabled) => {
            log_warn!(log, MODULE, "secure boot disabled; using configured stage key");
            chain_config.stage_auth_key
        }
        Err(e) => {
            log_error!(log, MODULE, "stage key lookup failed: {}", e);
            return Err(e.into());
        }
    };

    // Identity
    let mut secret = HardwareSecret::empty();
    let provenance = read_secret(guard.source(), &mut secret, &config.identity, log)?;
    let cdi = derive_cdi(&secret);
    secret.scrub(guard.source());
    let device = derive_key_pair(cdi.as_bytes())?;
    drop(cdi);
    advance(log, state, BuildState::IdentityAcquired);

    // Root and device certificates
    let mut chain = ChainBlob::init(chain_region)?;
    let identity_digest = sha256(device.public().as_bytes());
    let device_key = device.public().as_bytes();
    let fwid = chain_config.firmware_version.as_bytes();

    let root = issue(
        &TbsCertificate {
            kind: CertKind::Root,
            path_len: root_path,
            subject: chain_config.root_subject,
            issuer: chain_config.root_subject,
            subject_public_key: device_key,
            subject_digest: identity_digest.as_bytes(),
            fwid,
            auth_key: stage_auth_key,
            issued_key: &[],
        },
        device.private(),
    )?;
    let device_cert = issue(
        &TbsCertificate {
            kind: CertKind::Device,
            path_len: device_path,
            subject: chain_config.device_subject,
            issuer: chain_config.root_subject,
            subject_public_key: device_key,
            subject_digest: identity_digest.as_bytes(),
            fwid,
            auth_key: stage_auth_key,
            issued_key: &[],
        },
        device.private(),
    )?;
    chain.insert_pair(&root, &device_cert)?;
    advance(log, state, BuildState::RootCertBuilt);

    // Alias key pair, seeded by the device private key
    let alias = derive_alias(&device)?;
    advance(log, state, BuildState::AliasKeyDerived);

    let alias_cert = issue(
        &TbsCertificate {
            kind: CertKind::Alias,
            path_len: alias_path,
            subject: next.name,
            issuer: chain_config.device_subject,
            subject_public_key: next.auth_key,
            subject_digest: next.digest,
            fwid: &[],
            auth_key: &[],
            issued_key: alias.public().as_bytes(),
        },
        device.private(),
    )?;
    drop(device);
    chain.insert(&alias_cert)?;
    advance(log, state, BuildState::AliasCertBuilt);

    KeyBlobStore::new(key_region).write(&alias)?;
    advance(log, state, BuildState::KeyBlobWritten);

    Ok(Built {
        provenance,
        cert_count: chain.count(),
        chain_len: chain.len(),
    })
}

fn derive_alias(device: &EccKeyPair) -> Result<EccKeyPair> {
    Ok(derive_key_pair(device.private().as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::NullLog;
    use strata_hal::sim::SimulatedPlatform;

    const KEY: [u8; 32] = [0x6B; 32];

    fn next() -> NextImage<'static> {
        NextImage::new("u-boot", &[0xD1; 32], &[0x04; 65])
    }

    #[test]
    fn test_build_reports_three_certs() {
        let mut platform = SimulatedPlatform::trusted(KEY);
        let mut chain = [0u8; 2048];
        let mut key = [0u8; 256];
        let builder = CertChainBuilder::new(&mut platform, StrataConfig::DEFAULT, NullLog);
        assert_eq!(builder.state(), BuildState::Init);

        let report = builder.build(&next(), &mut chain, &mut key).unwrap();
        assert_eq!(report.cert_count, 3);
        assert_eq!(report.hide, HideOutcome::Hidden);
        assert_eq!(report.provenance, SecretProvenance::Hardware);
        assert!(platform.is_hidden());
    }

    #[test]
    fn test_alias_is_derived_from_device_key() {
        let device = derive_key_pair(&[0x01; 32]).unwrap();
        let a = derive_alias(&device).unwrap();
        let b = derive_alias(&device).unwrap();
        assert_eq!(a.public(), b.public());
        assert_ne!(a.public(), device.public());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(BuildState::Init.as_str(), "init");
        assert_eq!(BuildState::KeyBlobWritten.as_str(), "key-blob-written");
    }
}
