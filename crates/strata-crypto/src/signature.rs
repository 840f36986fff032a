// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! ECDSA P-256 signature engine
//!
//! Signing hashes a list of regions with SHA-256 and signs the digest
//! (RFC 6979 deterministic nonces), returning a DER signature.
//!
//! Verification checks a DER signature against a [`KeyManifest`]:
//!
//! 1. Only the SHA-256 checksum is accepted
//! 2. The signature is DER-decoded before any digest work
//! 3. The required key is tried first, then the hinted key, then every
//!    other node in document order; the first key that verifies wins
//!
//! # Security
//!
//! The candidate scan stops at the first match, so its running time
//! reveals which key verified. That is acceptable for a boot-time check
//! with no adversarial observer of timing.

use heapless::Vec;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::Signature;
use strata_common::constants::{DIGEST_SIZE, MAX_DER_SIGNATURE_SIZE};
use strata_common::{CurveId, HashAlgorithm};

use crate::ecc::{EccPrivateKey, EccPublicKey};
use crate::error::{CryptoError, CryptoResult, VerifyFailure};
use crate::hash::{sha256_regions, Sha256Output};
use crate::manifest::{KeyManifest, KeyNode};

/// DER-encoded ECDSA signature
pub type DerSignature = Vec<u8, MAX_DER_SIGNATURE_SIZE>;

/// Smallest acceptable declared key length (compressed point or less is rejected)
const MIN_KEY_LEN: u32 = 33;

/// Sign the concatenation of `regions`
///
/// # Errors
///
/// `SigningFailed` on any failure of the underlying primitive.
pub fn sign(key: &EccPrivateKey, regions: &[&[u8]]) -> CryptoResult<DerSignature> {
    let digest = sha256_regions(regions);
    sign_digest(key, digest.as_bytes())
}

/// Sign a precomputed SHA-256 digest
///
/// # Errors
///
/// `SigningFailed` on any failure of the underlying primitive.
pub fn sign_digest(key: &EccPrivateKey, digest: &[u8; DIGEST_SIZE]) -> CryptoResult<DerSignature> {
    let signing_key = key.signing_key().map_err(|_| CryptoError::SigningFailed)?;
    let signature: Signature = signing_key
        .sign_prehash(digest)
        .map_err(|_| CryptoError::SigningFailed)?;
    let der = signature.to_der();
    Vec::from_slice(der.as_bytes()).map_err(|()| CryptoError::SigningFailed)
}

/// Verify a DER signature over `regions` against a single public key
///
/// # Errors
///
/// - `MalformedSignature` if `signature` is not valid DER
/// - `HashMismatch` if the signature does not verify
pub fn verify_with_key(
    key: &EccPublicKey,
    regions: &[&[u8]],
    signature: &[u8],
) -> Result<(), VerifyFailure> {
    let signature = decode_signature(signature)?;
    let digest = sha256_regions(regions);
    verify_digest(key, &digest, &signature)
}

/// Which manifest keys to try first
#[derive(Debug, Clone, Copy)]
pub struct VerifyParams<'a> {
    /// Checksum algorithm of the signed image
    pub checksum: &'a str,
    /// Name hint of the key that signed the image
    pub key_hint: Option<&'a str>,
    /// Name of a key that must be tried before any other
    pub required_key: Option<&'a str>,
}

impl<'a> VerifyParams<'a> {
    /// SHA-256 with no hint and no required key
    pub const DEFAULT: Self = Self {
        checksum: HashAlgorithm::Sha256.name(),
        key_hint: None,
        required_key: None,
    };

    /// SHA-256 with a key name hint
    #[must_use]
    pub const fn with_hint(key_hint: &'a str) -> Self {
        Self {
            checksum: HashAlgorithm::Sha256.name(),
            key_hint: Some(key_hint),
            required_key: None,
        }
    }
}

impl Default for VerifyParams<'_> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of trying one key node
enum NodeResult {
    Verified,
    Unusable,
    Mismatch,
}

/// Verify a DER signature over `regions` against the manifest
///
/// Returns the node that verified.
///
/// # Errors
///
/// - `UnsupportedHash` if `params.checksum` is not SHA-256
/// - `MalformedSignature` if `signature` is not valid DER
/// - `UnsupportedCurve` if no candidate node carries a usable P-256 key
/// - `HashMismatch` if exactly one usable key was tried and did not verify
/// - `NoMatchingKey` otherwise
pub fn verify<'m>(
    manifest: &'m KeyManifest,
    params: &VerifyParams<'_>,
    regions: &[&[u8]],
    signature: &[u8],
) -> Result<&'m KeyNode, VerifyFailure> {
    if HashAlgorithm::from_name(params.checksum) != Some(HashAlgorithm::Sha256) {
        return Err(VerifyFailure::UnsupportedHash);
    }

    let signature = decode_signature(signature)?;
    let digest = sha256_regions(regions);

    let nodes = manifest.nodes();
    let required = params.required_key.and_then(|name| manifest.find(name));
    let hinted = params.key_hint.and_then(|name| manifest.find(name));

    let mut usable = 0usize;
    let mut tried = 0usize;
    let mut try_node = |node: &KeyNode| -> bool {
        tried += 1;
        match verify_with_key_node(node, &digest, &signature) {
            NodeResult::Verified => true,
            NodeResult::Mismatch => {
                usable += 1;
                false
            }
            NodeResult::Unusable => false,
        }
    };

    if let Some((_, node)) = required {
        if try_node(node) {
            return Ok(node);
        }
    }
    if let Some((h, node)) = hinted {
        let already_tried = required.is_some_and(|(r, _)| r == h);
        if !already_tried && try_node(node) {
            return Ok(node);
        }
    }

    let skip = |idx: usize| {
        required.is_some_and(|(r, _)| r == idx) || hinted.is_some_and(|(h, _)| h == idx)
    };
    for (idx, node) in nodes.iter().enumerate() {
        if !skip(idx) && try_node(node) {
            return Ok(node);
        }
    }

    Err(match (tried, usable) {
        (0, _) => VerifyFailure::NoMatchingKey,
        (_, 0) => VerifyFailure::UnsupportedCurve,
        (_, 1) => VerifyFailure::HashMismatch,
        _ => VerifyFailure::NoMatchingKey,
    })
}

fn verify_with_key_node(node: &KeyNode, digest: &Sha256Output, signature: &Signature) -> NodeResult {
    if CurveId::from_id(node.curve_id) != Some(EccPublicKey::CURVE)
        || node.key_len <= MIN_KEY_LEN
        || node.key_len as usize != node.public_key.len()
    {
        return NodeResult::Unusable;
    }
    let Ok(key) = EccPublicKey::from_sec1(&node.public_key) else {
        return NodeResult::Unusable;
    };
    match verify_digest(&key, digest, signature) {
        Ok(()) => NodeResult::Verified,
        Err(_) => NodeResult::Mismatch,
    }
}

fn decode_signature(signature: &[u8]) -> Result<Signature, VerifyFailure> {
    if signature.is_empty() || signature.len() > MAX_DER_SIGNATURE_SIZE {
        return Err(VerifyFailure::MalformedSignature);
    }
    Signature::from_der(signature).map_err(|_| VerifyFailure::MalformedSignature)
}

fn verify_digest(
    key: &EccPublicKey,
    digest: &Sha256Output,
    signature: &Signature,
) -> Result<(), VerifyFailure> {
    let verifying_key = key
        .verifying_key()
        .map_err(|_| VerifyFailure::UnsupportedCurve)?;
    verifying_key
        .verify_prehash(digest.as_bytes(), signature)
        .map_err(|_| VerifyFailure::HashMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::derive_key_pair;

    #[test]
    fn test_sign_is_deterministic() {
        let pair = derive_key_pair(b"signer").unwrap();
        let a = sign(pair.private(), &[b"hello", b"world"]).unwrap();
        let b = sign(pair.private(), &[b"hello", b"world"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_region_split_does_not_matter() {
        let pair = derive_key_pair(b"signer").unwrap();
        let sig = sign(pair.private(), &[b"hello", b"world"]).unwrap();
        assert!(verify_with_key(pair.public(), &[b"helloworld"], &sig).is_ok());
    }

    #[test]
    fn test_wrong_key_mismatch() {
        let pair = derive_key_pair(b"signer").unwrap();
        let other = derive_key_pair(b"other").unwrap();
        let sig = sign(pair.private(), &[b"msg"]).unwrap();
        assert_eq!(
            verify_with_key(other.public(), &[b"msg"], &sig),
            Err(VerifyFailure::HashMismatch)
        );
    }

    #[test]
    fn test_garbage_signature_malformed() {
        let pair = derive_key_pair(b"signer").unwrap();
        assert_eq!(
            verify_with_key(pair.public(), &[b"msg"], &[0x30, 0x02, 0x01]),
            Err(VerifyFailure::MalformedSignature)
        );
        assert_eq!(
            verify_with_key(pair.public(), &[b"msg"], &[]),
            Err(VerifyFailure::MalformedSignature)
        );
    }
}
