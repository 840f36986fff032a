// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Certificate chain blob
//!
//! Append-only, fixed-capacity store of encoded certificates in root to
//! leaf order, laid over a caller-supplied memory region.
//!
//! # Layout
//!
//! ```text
//! Offset  Size   Field
//! 0x00    4      Magic "SCCH" (LE)
//! 0x04    2      Format version
//! 0x06    2      Certificate count
//! 0x08    4      Payload length in bytes
//! 0x0C    4      Reserved (zero)
//! 0x10    ...    Certificates, back to back
//! ```
//!
//! Bytes past the payload are always zero. An insertion either lands whole
//! or not at all.

use strata_common::constants::{CHAIN_BLOB_MAGIC, CHAIN_BLOB_VERSION};
use strata_common::{Error, Result};
use strata_crypto::zeroize_utils::secure_zero;

use crate::cert::Certificate;

/// Size of the chain blob header
pub const CHAIN_HEADER_SIZE: usize = 16;

// ============================================================================
// Writer
// ============================================================================

/// Chain blob being built in a caller-owned region
#[derive(Debug)]
pub struct ChainBlob<'r> {
    region: &'r mut [u8],
    used: usize,
    count: u16,
}

impl<'r> ChainBlob<'r> {
    /// Zero `region` and write an empty chain header
    ///
    /// # Errors
    ///
    /// `ChainInitFailure` if the region cannot hold the header.
    pub fn init(region: &'r mut [u8]) -> Result<Self> {
        if region.len() < CHAIN_HEADER_SIZE {
            return Err(Error::ChainInitFailure);
        }
        secure_zero(region);
        let mut blob = Self {
            region,
            used: 0,
            count: 0,
        };
        blob.write_header();
        Ok(blob)
    }

    /// Total region size
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Bytes in use, header included
    #[must_use]
    pub const fn len(&self) -> usize {
        CHAIN_HEADER_SIZE + self.used
    }

    /// Whether no certificate has been inserted
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of certificates
    #[must_use]
    pub const fn count(&self) -> u16 {
        self.count
    }

    /// Bytes still available
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Append one certificate
    ///
    /// # Errors
    ///
    /// `CertInsertOverflow` if it does not fit; nothing is written.
    pub fn insert(&mut self, cert: &[u8]) -> Result<()> {
        self.insert_all(&[cert])
    }

    /// Append two certificates as one insertion
    ///
    /// # Errors
    ///
    /// `CertInsertOverflow` if they do not both fit; nothing is written.
    pub fn insert_pair(&mut self, first: &[u8], second: &[u8]) -> Result<()> {
        self.insert_all(&[first, second])
    }

    fn insert_all(&mut self, certs: &[&[u8]]) -> Result<()> {
        let needed: usize = certs.iter().map(|c| c.len()).sum();
        let added = u16::try_from(certs.len()).map_err(|_| Error::CertInsertOverflow)?;
        if needed > self.remaining() {
            return Err(Error::CertInsertOverflow);
        }
        let count = self
            .count
            .checked_add(added)
            .ok_or(Error::CertInsertOverflow)?;
        u32::try_from(self.used + needed).map_err(|_| Error::CertInsertOverflow)?;

        let mut offset = self.len();
        for cert in certs {
            self.region[offset..offset + cert.len()].copy_from_slice(cert);
            offset += cert.len();
        }
        self.used += needed;
        self.count = count;
        self.write_header();
        Ok(())
    }

    /// Zero the whole region and reset to empty
    pub fn clear(&mut self) {
        secure_zero(self.region);
        self.used = 0;
        self.count = 0;
    }

    /// The populated bytes, header included
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.region[..self.len()]
    }

    fn write_header(&mut self) {
        let header = &mut self.region[..CHAIN_HEADER_SIZE];
        header[0..4].copy_from_slice(&CHAIN_BLOB_MAGIC.to_le_bytes());
        header[4..6].copy_from_slice(&CHAIN_BLOB_VERSION.to_le_bytes());
        header[6..8].copy_from_slice(&self.count.to_le_bytes());
        // Bounded by the check in insert_all
        header[8..12].copy_from_slice(&(self.used as u32).to_le_bytes());
        header[12..16].fill(0);
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Iterator over the certificates of a chain blob
#[derive(Debug, Clone)]
pub struct ChainReader<'a> {
    payload: &'a [u8],
    offset: usize,
    remaining: u16,
}

impl<'a> ChainReader<'a> {
    /// Validate the header of `blob`
    ///
    /// # Errors
    ///
    /// `MalformedCertificate` if the magic, version or payload length is
    /// wrong.
    pub fn new(blob: &'a [u8]) -> Result<Self> {
        let header = blob
            .get(..CHAIN_HEADER_SIZE)
            .ok_or(Error::MalformedCertificate)?;
        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let version = u16::from_le_bytes([header[4], header[5]]);
        let count = u16::from_le_bytes([header[6], header[7]]);
        let used = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        if magic != CHAIN_BLOB_MAGIC || version != CHAIN_BLOB_VERSION {
            return Err(Error::MalformedCertificate);
        }
        let used = usize::try_from(used).map_err(|_| Error::MalformedCertificate)?;
        let payload = blob
            .get(CHAIN_HEADER_SIZE..CHAIN_HEADER_SIZE + used)
            .ok_or(Error::MalformedCertificate)?;
        Ok(Self {
            payload,
            offset: 0,
            remaining: count,
        })
    }

    /// Certificates not yet returned
    #[must_use]
    pub const fn remaining(&self) -> u16 {
        self.remaining
    }
}

impl<'a> Iterator for ChainReader<'a> {
    type Item = Result<Certificate<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        match Certificate::parse(&self.payload[self.offset..]) {
            Ok((cert, used)) => {
                self.offset += used;
                Some(Ok(cert))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Check linkage, path lengths and signatures of a chain blob
///
/// - the first certificate is self-issued and self-signed
/// - each later certificate names the previous subject as its issuer and
///   is signed by the previous certificate's subject key
/// - a certificate for the parent's own key keeps the parent's path length;
///   any other key steps it down by exactly one
///
/// Returns the number of certificates.
///
/// # Errors
///
/// - `MalformedCertificate` if the blob cannot be parsed
/// - `ChainVerificationFailed` if any check fails or the chain is empty
pub fn verify_chain(blob: &[u8]) -> Result<usize> {
    let reader = ChainReader::new(blob)?;
    let mut previous: Option<Certificate<'_>> = None;
    let mut count = 0usize;

    for cert in reader {
        let cert = cert?;
        match previous {
            None => {
                if !cert.is_self_issued() {
                    return Err(Error::ChainVerificationFailed);
                }
                cert.verify_signature(cert.subject_public_key)?;
            }
            Some(parent) => {
                let expected = if cert.subject_public_key == parent.subject_public_key {
                    Some(parent.path_len)
                } else {
                    parent.path_len.checked_sub(1)
                };
                if cert.issuer != parent.subject || expected != Some(cert.path_len) {
                    return Err(Error::ChainVerificationFailed);
                }
                cert.verify_signature(parent.subject_public_key)?;
            }
        }
        previous = Some(cert);
        count += 1;
    }

    if count == 0 {
        return Err(Error::ChainVerificationFailed);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_crypto::zeroize_utils::is_zeroed;

    #[test]
    fn test_init_requires_header_room() {
        let mut small = [0xFFu8; CHAIN_HEADER_SIZE - 1];
        assert_eq!(ChainBlob::init(&mut small).err(), Some(Error::ChainInitFailure));
    }

    #[test]
    fn test_insert_updates_header() {
        let mut region = [0xFFu8; 64];
        let mut blob = ChainBlob::init(&mut region).unwrap();
        blob.insert_pair(&[1, 2, 3], &[4, 5]).unwrap();
        assert_eq!(blob.count(), 2);
        assert_eq!(blob.len(), CHAIN_HEADER_SIZE + 5);
        assert_eq!(&blob.as_bytes()[CHAIN_HEADER_SIZE..], &[1, 2, 3, 4, 5]);
        assert!(is_zeroed(&region[CHAIN_HEADER_SIZE + 5..]));
    }

    #[test]
    fn test_pair_overflow_writes_nothing() {
        let mut region = [0u8; CHAIN_HEADER_SIZE + 4];
        let mut blob = ChainBlob::init(&mut region).unwrap();
        assert_eq!(
            blob.insert_pair(&[1, 2, 3], &[4, 5]),
            Err(Error::CertInsertOverflow)
        );
        assert_eq!(blob.count(), 0);
        assert!(is_zeroed(&region[CHAIN_HEADER_SIZE..]));
    }

    #[test]
    fn test_clear_zeroes_region() {
        let mut region = [0u8; 48];
        let mut blob = ChainBlob::init(&mut region).unwrap();
        blob.insert(&[9; 8]).unwrap();
        blob.clear();
        assert!(blob.is_empty());
        assert!(is_zeroed(&region));
    }

    #[test]
    fn test_reader_rejects_bad_magic() {
        let mut region = [0u8; 32];
        ChainBlob::init(&mut region).unwrap();
        region[0] ^= 0xFF;
        assert_eq!(ChainReader::new(&region).err(), Some(Error::MalformedCertificate));
    }

    #[test]
    fn test_empty_chain_does_not_verify() {
        let mut region = [0u8; 32];
        ChainBlob::init(&mut region).unwrap();
        assert_eq!(verify_chain(&region), Err(Error::ChainVerificationFailed));
    }
}
