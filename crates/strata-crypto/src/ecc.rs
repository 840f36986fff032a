// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! NIST P-256 keys and deterministic key pair derivation
//!
//! `derive_key_pair` maps arbitrary seed bytes to a P-256 key pair with
//! HKDF-SHA256. The same seed always yields the same key pair, on any
//! device and across restarts, which is what lets a later stage re-derive
//! rather than store its identity.
//!
//! Candidate scalars outside `[1, n)` are rejected and the next HKDF block
//! is tried, so derivation never biases the scalar.

use core::fmt;

use hkdf::Hkdf;
use p256::ecdsa::{SigningKey, VerifyingKey};
use sha2::Sha256;
use strata_common::constants::{P256_SCALAR_SIZE, P256_UNCOMPRESSED_POINT_SIZE, SEC1_UNCOMPRESSED_TAG};
use strata_common::CurveId;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};
use crate::traits::constant_time_eq;

/// HKDF salt for key pair derivation
const DERIVE_SALT: &[u8] = b"qbitel-strata/ecc-p256/v1";

/// HKDF info label; a one-byte attempt counter is appended
const DERIVE_LABEL: &[u8] = b"strata key pair";

/// Attempts before giving up; each succeeds with probability ~1 - 2^-32
const MAX_DERIVE_ATTEMPTS: u8 = 8;

// =============================================================================
// Private Key
// =============================================================================

/// P-256 private scalar (big-endian)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EccPrivateKey([u8; P256_SCALAR_SIZE]);

impl EccPrivateKey {
    /// Import a scalar, checking it is in range
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the scalar is zero or not below the group order.
    pub fn from_bytes(bytes: &[u8; P256_SCALAR_SIZE]) -> CryptoResult<Self> {
        SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self(*bytes))
    }

    /// Get the scalar bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; P256_SCALAR_SIZE] {
        &self.0
    }

    /// Build the ECDSA signing key
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the stored scalar is out of range.
    pub fn signing_key(&self) -> CryptoResult<SigningKey> {
        SigningKey::from_slice(&self.0).map_err(|_| CryptoError::InvalidKey)
    }

    /// Compute the matching public key
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the stored scalar is out of range.
    pub fn public_key(&self) -> CryptoResult<EccPublicKey> {
        EccPublicKey::from_verifying_key(self.signing_key()?.verifying_key())
    }
}

impl fmt::Debug for EccPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EccPrivateKey([REDACTED])")
    }
}

// =============================================================================
// Public Key
// =============================================================================

/// P-256 public key as an uncompressed SEC1 point `0x04 || x || y`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EccPublicKey([u8; P256_UNCOMPRESSED_POINT_SIZE]);

impl EccPublicKey {
    /// Curve of every public key of this type
    pub const CURVE: CurveId = CurveId::NistP256;

    /// Import an uncompressed SEC1 point, checking it is on the curve
    ///
    /// # Errors
    ///
    /// `InvalidKey` for a wrong length, a compressed point or a point not on the curve.
    pub fn from_sec1(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != P256_UNCOMPRESSED_POINT_SIZE || bytes[0] != SEC1_UNCOMPRESSED_TAG {
            return Err(CryptoError::InvalidKey);
        }
        VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidKey)?;
        let mut out = [0u8; P256_UNCOMPRESSED_POINT_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    fn from_verifying_key(key: &VerifyingKey) -> CryptoResult<Self> {
        let point = key.to_encoded_point(false);
        let bytes = point.as_bytes();
        if bytes.len() != P256_UNCOMPRESSED_POINT_SIZE {
            return Err(CryptoError::InternalError);
        }
        let mut out = [0u8; P256_UNCOMPRESSED_POINT_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Get the encoded point
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; P256_UNCOMPRESSED_POINT_SIZE] {
        &self.0
    }

    /// X coordinate
    #[must_use]
    pub fn x(&self) -> &[u8] {
        &self.0[1..=P256_SCALAR_SIZE]
    }

    /// Y coordinate
    #[must_use]
    pub fn y(&self) -> &[u8] {
        &self.0[1 + P256_SCALAR_SIZE..]
    }

    /// Build the ECDSA verifying key
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the point is not on the curve.
    pub fn verifying_key(&self) -> CryptoResult<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidKey)
    }
}

impl AsRef<[u8]> for EccPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EccPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EccPublicKey(")?;
        for b in &self.0[..9] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "..)")
    }
}

// =============================================================================
// Key Pair
// =============================================================================

/// P-256 key pair; the private half is wiped on drop
#[derive(Clone)]
pub struct EccKeyPair {
    public: EccPublicKey,
    private: EccPrivateKey,
}

impl EccKeyPair {
    /// Build a key pair from a private key
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the private scalar is out of range.
    pub fn from_private(private: EccPrivateKey) -> CryptoResult<Self> {
        let public = private.public_key()?;
        Ok(Self { public, private })
    }

    /// The public key
    #[must_use]
    pub const fn public(&self) -> &EccPublicKey {
        &self.public
    }

    /// The private key
    #[must_use]
    pub const fn private(&self) -> &EccPrivateKey {
        &self.private
    }

    /// Check that `public` belongs to this pair
    #[must_use]
    pub fn matches(&self, public: &EccPublicKey) -> bool {
        constant_time_eq(self.public.as_bytes(), public.as_bytes())
    }
}

impl fmt::Debug for EccKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EccKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Deterministically derive a P-256 key pair from `seed`
///
/// Used with the CDI as seed for the device key pair and with the device
/// private key as seed for the alias key pair.
///
/// # Errors
///
/// `KeyDerivationFailed` for an empty seed, or if no attempt produced a
/// valid scalar.
pub fn derive_key_pair(seed: &[u8]) -> CryptoResult<EccKeyPair> {
    if seed.is_empty() {
        return Err(CryptoError::KeyDerivationFailed);
    }

    let hk = Hkdf::<Sha256>::new(Some(DERIVE_SALT), seed);
    let mut info = [0u8; DERIVE_LABEL.len() + 1];
    info[..DERIVE_LABEL.len()].copy_from_slice(DERIVE_LABEL);

    let mut candidate = [0u8; P256_SCALAR_SIZE];
    for attempt in 0..MAX_DERIVE_ATTEMPTS {
        info[DERIVE_LABEL.len()] = attempt;
        if hk.expand(&info, &mut candidate).is_err() {
            break;
        }
        if let Ok(private) = EccPrivateKey::from_bytes(&candidate) {
            candidate.zeroize();
            return EccKeyPair::from_private(private).map_err(|_| CryptoError::KeyDerivationFailed);
        }
    }

    candidate.zeroize();
    Err(CryptoError::KeyDerivationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_key_pair(b"seed").unwrap();
        let b = derive_key_pair(b"seed").unwrap();
        assert_eq!(a.public(), b.public());
        assert_eq!(a.private().as_bytes(), b.private().as_bytes());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = derive_key_pair(b"seed-a").unwrap();
        let b = derive_key_pair(b"seed-b").unwrap();
        assert_ne!(a.public(), b.public());
    }

    #[test]
    fn test_empty_seed_rejected() {
        assert_eq!(derive_key_pair(&[]).err(), Some(CryptoError::KeyDerivationFailed));
    }

    #[test]
    fn test_public_key_encoding() {
        let pair = derive_key_pair(&[0x42; 32]).unwrap();
        let pk = pair.public();
        assert_eq!(pk.as_bytes()[0], SEC1_UNCOMPRESSED_TAG);
        assert_eq!(pk.x().len(), P256_SCALAR_SIZE);
        assert_eq!(pk.y().len(), P256_SCALAR_SIZE);
        assert_eq!(EccPublicKey::from_sec1(pk.as_bytes()).unwrap(), *pk);
    }

    #[test]
    fn test_scalar_range_checked() {
        assert!(EccPrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(EccPrivateKey::from_bytes(&[0xFF; 32]).is_err());
        let key = EccPrivateKey::from_bytes(&[0x01; 32]).unwrap();
        assert!(key.signing_key().is_ok());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        use core::fmt::Write;
        let pair = derive_key_pair(b"seed").unwrap();
        let mut s = heapless::String::<64>::new();
        write!(s, "{:?}", pair.private()).unwrap();
        assert!(s.contains("REDACTED"));
    }
}
