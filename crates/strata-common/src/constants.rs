// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! System-wide constants for Qbitel Strata
//!
//! All sizes are fixed at compile time; nothing in the attestation path
//! allocates.

// =============================================================================
// Identity Constants
// =============================================================================

/// Hardware secret size in bytes
pub const HARDWARE_SECRET_SIZE: usize = 32;

/// SHA-256 digest size in bytes (CDI, extended CDI, image digests)
pub const DIGEST_SIZE: usize = 32;

/// Identity seed record magic: "CCDI"
pub const IDENTITY_SEED_MAGIC: u32 = 0x4343_4449;

/// Identity seed record version
pub const IDENTITY_SEED_VERSION: u32 = 1;

// =============================================================================
// ECC Constants
// =============================================================================

/// NIST P-256 scalar / coordinate size in bytes
pub const P256_SCALAR_SIZE: usize = 32;

/// Uncompressed SEC1 point size: 0x04 || x || y
pub const P256_UNCOMPRESSED_POINT_SIZE: usize = 1 + 2 * P256_SCALAR_SIZE;

/// Tag byte of an uncompressed SEC1 point
pub const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

/// Maximum DER-encoded ECDSA P-256 signature size
pub const MAX_DER_SIGNATURE_SIZE: usize = 72;

/// Manifest curve identifier for NIST P-256
pub const ECC_NIST_P256_ID: u32 = 0x1;

/// Manifest curve name for NIST P-256
pub const ECC_NIST_P256_NAME: &str = "ecc-prime256v1";

/// The only checksum algorithm accepted for ECC signatures
pub const SHA256_NAME: &str = "sha256";

// =============================================================================
// Certificate Chain Constants
// =============================================================================

/// Maximum subject/issuer name length in bytes
pub const MAX_NAME_LEN: usize = 64;

/// Maximum encoded public key length carried in a certificate
pub const MAX_CERT_KEY_SIZE: usize = 133;

/// Largest stage authentication key a platform may report (RSA-4096
/// modulus and exponent)
pub const MAX_STAGE_AUTH_KEY_SIZE: usize = 1024;

/// Maximum digest / firmware-id length carried in a certificate
pub const MAX_CERT_DIGEST_SIZE: usize = 64;

/// Maximum firmware version string length
pub const MAX_FWID_SIZE: usize = 64;

/// Certificate chain blob magic: "SCCH"
pub const CHAIN_BLOB_MAGIC: u32 = 0x5343_4348;

/// Certificate chain blob format version
pub const CHAIN_BLOB_VERSION: u16 = 1;

/// Key blob magic: "SKBL"
pub const KEY_BLOB_MAGIC: u32 = 0x534B_424C;

/// Key blob format version
pub const KEY_BLOB_VERSION: u16 = 1;

/// DICE layers below the root: the device layer and the alias layer
///
/// Root and device certificates certify the same key and share a layer.
pub const CHAIN_LAYERS: u8 = 2;

/// Default maximum path length of the root certificate
pub const DEFAULT_ROOT_PATH_LEN: u8 = 4;

// =============================================================================
// Signature Manifest Constants
// =============================================================================

/// Maximum number of key nodes in a signature manifest
pub const MAX_MANIFEST_KEYS: usize = 8;

/// Maximum key name length (without the `key-` prefix)
pub const MAX_KEY_NAME_LEN: usize = 32;

/// Maximum algorithm name length, e.g. `sha256,ecc-prime256v1`
pub const MAX_ALGORITHM_NAME_LEN: usize = 32;

/// Prefix of every key node name in a manifest
pub const KEY_NODE_PREFIX: &str = "key-";

// =============================================================================
// Logging Constants
// =============================================================================

/// Maximum log message length
pub const MAX_LOG_MESSAGE_LEN: usize = 96;

/// Log buffer capacity (number of entries)
pub const LOG_BUFFER_SIZE: usize = 32;
