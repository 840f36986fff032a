// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Signature key manifest
//!
//! The manifest is the set of named public-key nodes that signed images
//! are checked against. Each node mirrors the properties written by the
//! image-signing toolchain:
//!
//! | Property          | Field         |
//! |-------------------|---------------|
//! | node name         | `key-<hint>`  |
//! | `ecc,curve_id`    | `curve_id`    |
//! | `ecc,pub-key`     | `public_key`  |
//! | `ecc,pub-key-len` | `key_len`     |
//! | `key-name-hint`   | `name_hint`   |
//! | `algo`            | `algorithm`   |
//! | `required`        | `required`    |
//!
//! Nodes keep document order; verification falls back to scanning them in
//! that order.

use heapless::{String, Vec};
use strata_common::constants::{
    KEY_NODE_PREFIX, MAX_ALGORITHM_NAME_LEN, MAX_CERT_KEY_SIZE, MAX_KEY_NAME_LEN,
    MAX_MANIFEST_KEYS,
};
use strata_common::{CurveId, HashAlgorithm};

use crate::ecc::EccPublicKey;
use crate::error::{CryptoError, CryptoResult};

/// Maximum node name length including the `key-` prefix
pub const MAX_NODE_NAME_LEN: usize = MAX_KEY_NAME_LEN + 4;

/// Which configuration a key is required for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredScope {
    /// Key must verify every image
    Image,
    /// Key must verify the configuration
    Conf,
}

impl RequiredScope {
    /// Property value as written by the signing tool
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Conf => "conf",
        }
    }

    /// Parse a property value
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "image" => Some(Self::Image),
            "conf" => Some(Self::Conf),
            _ => None,
        }
    }
}

/// One public key node
#[derive(Debug, Clone)]
pub struct KeyNode {
    /// Node name, `key-<hint>`
    pub name: String<MAX_NODE_NAME_LEN>,
    /// Key name hint
    pub name_hint: String<MAX_KEY_NAME_LEN>,
    /// Curve identifier
    pub curve_id: u32,
    /// Encoded public key
    pub public_key: Vec<u8, MAX_CERT_KEY_SIZE>,
    /// Declared encoded key length
    pub key_len: u32,
    /// Algorithm name, e.g. `sha256,ecc-prime256v1`
    pub algorithm: String<MAX_ALGORITHM_NAME_LEN>,
    /// Required scope, if any
    pub required: Option<RequiredScope>,
}

impl KeyNode {
    /// Build a node from raw properties
    ///
    /// Properties are stored as given; unsupported curves or lengths are
    /// only rejected when the node is used for verification.
    ///
    /// # Errors
    ///
    /// `BufferTooSmall` if a name or the key exceeds its capacity.
    pub fn from_properties(
        name_hint: &str,
        curve_id: u32,
        public_key: &[u8],
        key_len: u32,
        algorithm: &str,
        required: Option<RequiredScope>,
    ) -> CryptoResult<Self> {
        let mut name = String::new();
        name.push_str(KEY_NODE_PREFIX)
            .and_then(|()| name.push_str(name_hint))
            .map_err(|()| CryptoError::BufferTooSmall)?;
        Ok(Self {
            name,
            name_hint: String::try_from(name_hint).map_err(|()| CryptoError::BufferTooSmall)?,
            curve_id,
            public_key: Vec::from_slice(public_key).map_err(|()| CryptoError::BufferTooSmall)?,
            key_len,
            algorithm: String::try_from(algorithm).map_err(|()| CryptoError::BufferTooSmall)?,
            required,
        })
    }

    /// Whether this node is the one named by `hint`
    #[must_use]
    pub fn has_hint(&self, hint: &str) -> bool {
        self.name_hint.as_str() == hint
    }
}

/// Ordered collection of key nodes
#[derive(Debug, Clone, Default)]
pub struct KeyManifest {
    nodes: Vec<KeyNode, MAX_MANIFEST_KEYS>,
}

impl KeyManifest {
    /// Create an empty manifest
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add or replace the `key-<name_hint>` node for a P-256 key
    ///
    /// The algorithm is validated first; an existing node of the same name
    /// is overwritten in place, keeping its position.
    ///
    /// # Errors
    ///
    /// - `UnsupportedHash` / `UnsupportedCurve` / `UnsupportedAlgorithm` from
    ///   [`validate_key_support`]
    /// - `BufferTooSmall` for overlong names
    /// - `ManifestFull` when a new node does not fit
    pub fn add_key(
        &mut self,
        name_hint: &str,
        key: &EccPublicKey,
        algorithm: &str,
        required: Option<RequiredScope>,
    ) -> CryptoResult<()> {
        let (_, curve) = validate_key_support(algorithm)?;
        let encoded = key.as_bytes();
        #[allow(clippy::cast_possible_truncation)]
        let node = KeyNode::from_properties(
            name_hint,
            curve.id(),
            encoded,
            encoded.len() as u32,
            algorithm,
            required,
        )?;
        self.insert_node(node)
    }

    /// Insert a raw node, replacing any node with the same name
    ///
    /// # Errors
    ///
    /// `ManifestFull` when a new node does not fit.
    pub fn insert_node(&mut self, node: KeyNode) -> CryptoResult<()> {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.name == node.name) {
            *existing = node;
            return Ok(());
        }
        self.nodes.push(node).map_err(|_| CryptoError::ManifestFull)
    }

    /// Find the node whose hint is `hint`
    #[must_use]
    pub fn find(&self, hint: &str) -> Option<(usize, &KeyNode)> {
        self.nodes.iter().enumerate().find(|(_, n)| n.has_hint(hint))
    }

    /// All nodes in document order
    #[must_use]
    pub fn nodes(&self) -> &[KeyNode] {
        &self.nodes
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the manifest has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Check that an algorithm string names a supported hash and curve
///
/// The only accepted combination is `sha256,ecc-prime256v1`.
///
/// # Errors
///
/// - `UnsupportedAlgorithm` if there is no `,` separator
/// - `UnsupportedHash` for any checksum other than SHA-256
/// - `UnsupportedCurve` for any curve other than NIST P-256
pub fn validate_key_support(algorithm: &str) -> CryptoResult<(HashAlgorithm, CurveId)> {
    let (hash, curve) = algorithm
        .split_once(',')
        .ok_or(CryptoError::UnsupportedAlgorithm)?;
    let hash = HashAlgorithm::from_name(hash).ok_or(CryptoError::UnsupportedHash)?;
    let curve = CurveId::from_name(curve).ok_or(CryptoError::UnsupportedCurve)?;
    Ok((hash, curve))
}
