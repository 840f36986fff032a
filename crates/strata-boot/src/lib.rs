// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel Strata Boot Attestation
//!
//! The per-boot attestation step run by the first-stage loader:
//!
//! - **Builder**: acquire identity, build root/device/alias chain, hide secret (`builder`)
//! - **Certificates**: compact signed certificates (`cert`)
//! - **Chain blob**: fixed-capacity root-to-leaf store and its verifier (`chain`)
//! - **Key blob**: alias key pair handed to the next stage (`key_blob`)
//! - **Image authentication**: manifest-based signature check of images (`image_auth`)
//!
//! # Example
//!
//! ```ignore
//! let builder = CertChainBuilder::new(&mut board, StrataConfig::DEFAULT, &mut log);
//! let result = builder.build(&next_image, chain_region, key_region);
//! return status_code(&result);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod builder;
pub mod cert;
pub mod chain;
pub mod image_auth;
pub mod key_blob;

pub use builder::{BuildReport, BuildState, CertChainBuilder};
pub use cert::{CertKind, Certificate, TbsCertificate, MAX_CERT_SIZE};
pub use chain::{verify_chain, ChainBlob, ChainReader, CHAIN_HEADER_SIZE};
pub use image_auth::{verify_image, ImageSignInfo};
pub use key_blob::{KeyBlob, KeyBlobStore, KEY_BLOB_SIZE};

use strata_common::Result;

/// Boot return code for a result: `0` on success, the error code otherwise
#[must_use]
pub fn status_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => i32::from(e.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::Error;

    #[test]
    fn test_status_codes() {
        assert_eq!(status_code(&Ok(())), 0);
        assert_eq!(status_code::<()>(&Err(Error::CertInsertOverflow)), 0x0202);
        assert_ne!(status_code::<()>(&Err(Error::HardwareUnavailable)), 0);
    }
}
