// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Image authentication
//!
//! Checks a signed image (or configuration) against the key manifest
//! before it is loaded. Independent of the chain builder; both share the
//! signature engine.

use strata_common::{log_error, log_info};
use strata_common::{Error, LogSink, Result};
use strata_crypto::{validate_key_support, verify, CryptoError, KeyManifest, KeyNode, VerifyParams};

const MODULE: &str = "image";

/// Signature metadata attached to a signed image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSignInfo<'a> {
    /// `"<checksum>,<crypto>"`, e.g. `"sha256,ecc-prime256v1"`
    pub algorithm: &'a str,
    /// Name hint of the signing key
    pub key_name_hint: Option<&'a str>,
    /// Key that must be tried first
    pub required_key: Option<&'a str>,
}

impl<'a> ImageSignInfo<'a> {
    /// Signature info with a key hint and no required key
    #[must_use]
    pub const fn new(algorithm: &'a str, key_name_hint: Option<&'a str>) -> Self {
        Self {
            algorithm,
            key_name_hint,
            required_key: None,
        }
    }
}

/// Verify `signature` over `regions` with the manifest keys
///
/// Returns the key node that verified.
///
/// # Errors
///
/// - `VerifyUnsupportedHash` / `VerifyUnsupportedCurve` if the algorithm
///   is not `sha256,ecc-prime256v1`
/// - any other `Verify*` error from the manifest scan
pub fn verify_image<'m, L: LogSink + ?Sized>(
    manifest: &'m KeyManifest,
    info: &ImageSignInfo<'_>,
    regions: &[&[u8]],
    signature: &[u8],
    log: &mut L,
) -> Result<&'m KeyNode> {
    let (hash, _curve) = validate_key_support(info.algorithm).map_err(|e| {
        log_error!(log, MODULE, "unsupported algorithm '{}'", info.algorithm);
        match e {
            CryptoError::UnsupportedHash => Error::VerifyUnsupportedHash,
            _ => Error::VerifyUnsupportedCurve,
        }
    })?;

    let params = VerifyParams {
        checksum: hash.name(),
        key_hint: info.key_name_hint,
        required_key: info.required_key,
    };
    match verify(manifest, &params, regions, signature) {
        Ok(node) => {
            log_info!(log, MODULE, "verified with {}", node.name.as_str());
            Ok(node)
        }
        Err(reason) => {
            let e = Error::from(reason);
            log_error!(log, MODULE, "verification failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::NullLog;
    use strata_crypto::{derive_key_pair, sign};

    const ALGO: &str = "sha256,ecc-prime256v1";

    #[test]
    fn test_unsupported_algorithms() {
        let manifest = KeyManifest::new();
        let sha1 = ImageSignInfo::new("sha1,ecc-prime256v1", None);
        assert_eq!(
            verify_image(&manifest, &sha1, &[b"img"], &[], &mut NullLog).err(),
            Some(Error::VerifyUnsupportedHash)
        );
        let rsa = ImageSignInfo::new("sha256,rsa2048", None);
        assert_eq!(
            verify_image(&manifest, &rsa, &[b"img"], &[], &mut NullLog).err(),
            Some(Error::VerifyUnsupportedCurve)
        );
    }

    #[test]
    fn test_hinted_image_verifies() {
        let pair = derive_key_pair(b"dev").unwrap();
        let mut manifest = KeyManifest::new();
        manifest.add_key("dev", pair.public(), ALGO, None).unwrap();
        let sig = sign(pair.private(), &[b"img"]).unwrap();

        let info = ImageSignInfo::new(ALGO, Some("dev"));
        let node = verify_image(&manifest, &info, &[b"img"], &sig, &mut NullLog).unwrap();
        assert_eq!(node.name.as_str(), "key-dev");
    }
}
