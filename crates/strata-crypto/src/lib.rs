// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel Strata Cryptography
//!
//! The cryptographic primitives of the attestation pipeline:
//!
//! - **Hashing**: SHA-256 over one or many regions (`hash`)
//! - **Key pairs**: deterministic NIST P-256 derivation from seed bytes (`ecc`)
//! - **Signatures**: ECDSA P-256 sign/verify with DER encoding (`signature`)
//! - **Manifest**: named public-key nodes consumed by verification (`manifest`)
//!
//! # Security Requirements
//!
//! All cryptographic operations in this crate:
//! - Zeroize private keys on drop
//! - Never log or expose key material
//! - Use deterministic nonces, so no RNG is needed for signing

#![no_std]
#![allow(unsafe_code)] // Volatile writes in zeroize_utils
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

#[cfg(feature = "std")]
extern crate std;

// Core cryptographic modules
pub mod error;
pub mod traits;
pub mod zeroize_utils;

// Hash functions
pub mod hash;

// Elliptic curve keys and signatures
pub mod ecc;
pub mod manifest;
pub mod signature;

// Re-exports
pub use ecc::{derive_key_pair, EccKeyPair, EccPrivateKey, EccPublicKey};
pub use error::{CryptoError, CryptoResult, VerifyFailure};
pub use hash::{sha256, sha256_regions, Sha256, Sha256Output};
pub use manifest::{validate_key_support, KeyManifest, KeyNode, RequiredScope};
pub use signature::{sign, verify, verify_with_key, DerSignature, VerifyParams};
pub use traits::{constant_time_eq, Hash};
