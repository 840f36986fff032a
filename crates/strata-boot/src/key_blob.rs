// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Key blob store
//!
//! Persists the alias key pair for the next boot stage in a caller-supplied
//! region. The next stage could re-derive the same pair from the device
//! key, but it has no access to the device key, so the pair is handed over
//! here.
//!
//! # Layout
//!
//! ```text
//! Offset  Size   Field
//! 0x00    4      Magic "SKBL" (LE)
//! 0x04    2      Format version
//! 0x06    2      Curve id
//! 0x08    32     Private scalar (big-endian)
//! 0x28    65     Public key, SEC1 uncompressed
//! 0x69    32     SHA-256 over bytes 0x00..0x69
//! ```
//!
//! Bytes past the blob are zero.

use strata_common::constants::{
    DIGEST_SIZE, KEY_BLOB_MAGIC, KEY_BLOB_VERSION, P256_SCALAR_SIZE, P256_UNCOMPRESSED_POINT_SIZE,
};
use strata_common::{CurveId, Error, Result};
use strata_crypto::zeroize_utils::{secure_zero, SecureBuffer};
use strata_crypto::{constant_time_eq, sha256, EccKeyPair, EccPrivateKey, EccPublicKey};

const PRIVATE_OFFSET: usize = 8;
const PUBLIC_OFFSET: usize = PRIVATE_OFFSET + P256_SCALAR_SIZE;
const CHECK_OFFSET: usize = PUBLIC_OFFSET + P256_UNCOMPRESSED_POINT_SIZE;

/// Serialized size of a key blob
pub const KEY_BLOB_SIZE: usize = CHECK_OFFSET + DIGEST_SIZE;

/// Writer over the key blob region
#[derive(Debug)]
pub struct KeyBlobStore<'r> {
    region: &'r mut [u8],
}

impl<'r> KeyBlobStore<'r> {
    /// Take the key blob region
    pub fn new(region: &'r mut [u8]) -> Self {
        Self { region }
    }

    /// Region size
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Serialize `pair` into the region
    ///
    /// # Errors
    ///
    /// `KeyBlobWriteFailure` if the region is too small; the region is
    /// left zeroed.
    pub fn write(&mut self, pair: &EccKeyPair) -> Result<()> {
        secure_zero(self.region);
        if self.region.len() < KEY_BLOB_SIZE {
            return Err(Error::KeyBlobWriteFailure);
        }

        let mut blob = SecureBuffer::<KEY_BLOB_SIZE>::new();
        let bytes = blob.as_mut_array();
        bytes[0..4].copy_from_slice(&KEY_BLOB_MAGIC.to_le_bytes());
        bytes[4..6].copy_from_slice(&KEY_BLOB_VERSION.to_le_bytes());
        let curve = EccPublicKey::CURVE.id() as u16;
        bytes[6..8].copy_from_slice(&curve.to_le_bytes());
        bytes[PRIVATE_OFFSET..PUBLIC_OFFSET].copy_from_slice(pair.private().as_bytes());
        bytes[PUBLIC_OFFSET..CHECK_OFFSET].copy_from_slice(pair.public().as_bytes());
        let check = sha256(&bytes[..CHECK_OFFSET]);
        bytes[CHECK_OFFSET..].copy_from_slice(check.as_bytes());

        self.region[..KEY_BLOB_SIZE].copy_from_slice(blob.as_array());
        Ok(())
    }

    /// Overwrite the whole region with zeros
    pub fn clear(&mut self) {
        secure_zero(self.region);
    }
}

/// Key pair read back from a key blob
#[derive(Debug)]
pub struct KeyBlob {
    pair: EccKeyPair,
}

impl KeyBlob {
    /// Parse and check a key blob
    ///
    /// # Errors
    ///
    /// `InvalidKeyBlob` on a short buffer, wrong header or curve, a bad
    /// check digest, or a public key that does not match the private key.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let blob = bytes.get(..KEY_BLOB_SIZE).ok_or(Error::InvalidKeyBlob)?;
        let magic = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]);
        let version = u16::from_le_bytes([blob[4], blob[5]]);
        let curve = u16::from_le_bytes([blob[6], blob[7]]);
        if magic != KEY_BLOB_MAGIC
            || version != KEY_BLOB_VERSION
            || CurveId::from_id(u32::from(curve)) != Some(EccPublicKey::CURVE)
        {
            return Err(Error::InvalidKeyBlob);
        }

        let check = sha256(&blob[..CHECK_OFFSET]);
        if !constant_time_eq(check.as_bytes(), &blob[CHECK_OFFSET..]) {
            return Err(Error::InvalidKeyBlob);
        }

        let mut scalar = SecureBuffer::<P256_SCALAR_SIZE>::new();
        scalar
            .as_mut_array()
            .copy_from_slice(&blob[PRIVATE_OFFSET..PUBLIC_OFFSET]);
        let private =
            EccPrivateKey::from_bytes(scalar.as_array()).map_err(|_| Error::InvalidKeyBlob)?;
        let pair = EccKeyPair::from_private(private).map_err(|_| Error::InvalidKeyBlob)?;
        if !constant_time_eq(pair.public().as_bytes(), &blob[PUBLIC_OFFSET..CHECK_OFFSET]) {
            return Err(Error::InvalidKeyBlob);
        }
        Ok(Self { pair })
    }

    /// The recovered key pair
    #[must_use]
    pub const fn key_pair(&self) -> &EccKeyPair {
        &self.pair
    }

    /// Consume into the key pair
    #[must_use]
    pub fn into_key_pair(self) -> EccKeyPair {
        self.pair
    }
}
