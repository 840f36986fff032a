// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Attestation certificates
//!
//! Compact tag-length-value certificates, one per chain layer.
//!
//! # Layout
//!
//! ```text
//! Offset  Size   Field
//! 0x00    2      Body length (LE, bytes after this field)
//! 0x02    1      Kind (1 = root, 2 = device, 3 = alias)
//! 0x03    1      Path length constraint
//! 0x04    ...    Fields: tag (1) | length (1) | value
//!                  0x01 subject            (required)
//!                  0x02 issuer             (required)
//!                  0x03 subject public key (required)
//!                  0x04 subject digest
//!                  0x05 firmware id
//!                  0x06 authentication key
//!                  0x07 issued key
//!                  0x7F signature          (required, last)
//! ```
//!
//! The signature covers everything from the kind byte up to the signature
//! field. Optional fields are omitted when empty.

use heapless::Vec;
use strata_common::constants::{
    MAX_CERT_DIGEST_SIZE, MAX_CERT_KEY_SIZE, MAX_DER_SIGNATURE_SIZE, MAX_FWID_SIZE, MAX_NAME_LEN,
};
use strata_common::{Error, Result};
use strata_crypto::{sign, verify_with_key, EccPrivateKey, EccPublicKey};

// ============================================================================
// Constants
// ============================================================================

/// Largest encoded certificate
pub const MAX_CERT_SIZE: usize = 768;

/// Encoded certificate buffer
pub type CertBuffer = Vec<u8, MAX_CERT_SIZE>;

const LENGTH_SIZE: usize = 2;

mod tag {
    pub const SUBJECT: u8 = 0x01;
    pub const ISSUER: u8 = 0x02;
    pub const SUBJECT_PUBLIC_KEY: u8 = 0x03;
    pub const SUBJECT_DIGEST: u8 = 0x04;
    pub const FWID: u8 = 0x05;
    pub const AUTH_KEY: u8 = 0x06;
    pub const ISSUED_KEY: u8 = 0x07;
    pub const SIGNATURE: u8 = 0x7F;
}

// ============================================================================
// Certificate Kind
// ============================================================================

/// Chain layer a certificate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CertKind {
    /// Self-signed root
    Root = 1,
    /// Device certificate, bound to the device key pair
    Device = 2,
    /// Alias certificate authenticating the next stage
    Alias = 3,
}

impl CertKind {
    /// Convert from the encoded byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Root),
            2 => Some(Self::Device),
            3 => Some(Self::Alias),
            _ => None,
        }
    }

    /// DICE layer; root and device certify the same key and share layer 0
    #[must_use]
    pub const fn layer(&self) -> u8 {
        match self {
            Self::Root | Self::Device => 0,
            Self::Alias => 1,
        }
    }
}

// ============================================================================
// Issuing
// ============================================================================

/// To-be-signed certificate contents
#[derive(Debug, Clone, Copy)]
pub struct TbsCertificate<'a> {
    /// Chain layer
    pub kind: CertKind,
    /// Remaining chain depth
    pub path_len: u8,
    /// Subject name
    pub subject: &'a str,
    /// Issuer name (equal to `subject` for the root)
    pub issuer: &'a str,
    /// Public key the certificate vouches for
    pub subject_public_key: &'a [u8],
    /// Measurement or identity digest of the subject
    pub subject_digest: &'a [u8],
    /// Firmware identifier
    pub fwid: &'a [u8],
    /// Key that authenticated the subject's code
    pub auth_key: &'a [u8],
    /// Public half of the key pair handed to the subject
    pub issued_key: &'a [u8],
}

impl TbsCertificate<'_> {
    fn validate(&self) -> Result<()> {
        let within = |value: &[u8], max: usize, required: bool| {
            value.len() <= max && (!required || !value.is_empty())
        };
        let ok = within(self.subject.as_bytes(), MAX_NAME_LEN, true)
            && within(self.issuer.as_bytes(), MAX_NAME_LEN, true)
            && within(self.subject_public_key, MAX_CERT_KEY_SIZE, true)
            && within(self.subject_digest, MAX_CERT_DIGEST_SIZE, false)
            && within(self.fwid, MAX_FWID_SIZE, false)
            && within(self.auth_key, MAX_CERT_KEY_SIZE, false)
            && within(self.issued_key, MAX_CERT_KEY_SIZE, false);
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidParameter)
        }
    }
}

/// Encode and sign a certificate
///
/// # Errors
///
/// - `InvalidParameter` if a field is missing or too long
/// - `SignatureFailure` if signing fails
pub fn issue(tbs: &TbsCertificate<'_>, signer: &EccPrivateKey) -> Result<CertBuffer> {
    tbs.validate()?;

    let mut out = CertBuffer::new();
    push(&mut out, &[0, 0])?;
    push(&mut out, &[tbs.kind as u8, tbs.path_len])?;
    push_field(&mut out, tag::SUBJECT, tbs.subject.as_bytes())?;
    push_field(&mut out, tag::ISSUER, tbs.issuer.as_bytes())?;
    push_field(&mut out, tag::SUBJECT_PUBLIC_KEY, tbs.subject_public_key)?;
    push_optional(&mut out, tag::SUBJECT_DIGEST, tbs.subject_digest)?;
    push_optional(&mut out, tag::FWID, tbs.fwid)?;
    push_optional(&mut out, tag::AUTH_KEY, tbs.auth_key)?;
    push_optional(&mut out, tag::ISSUED_KEY, tbs.issued_key)?;

    let signature = sign(signer, &[&out[LENGTH_SIZE..]])?;
    push_field(&mut out, tag::SIGNATURE, &signature)?;

    let body_len = u16::try_from(out.len() - LENGTH_SIZE).map_err(|_| Error::InternalError)?;
    out[..LENGTH_SIZE].copy_from_slice(&body_len.to_le_bytes());
    Ok(out)
}

fn push(out: &mut CertBuffer, bytes: &[u8]) -> Result<()> {
    out.extend_from_slice(bytes).map_err(|()| Error::InternalError)
}

fn push_field(out: &mut CertBuffer, tag: u8, value: &[u8]) -> Result<()> {
    let len = u8::try_from(value.len()).map_err(|_| Error::InvalidParameter)?;
    push(out, &[tag, len])?;
    push(out, value)
}

fn push_optional(out: &mut CertBuffer, tag: u8, value: &[u8]) -> Result<()> {
    if value.is_empty() {
        Ok(())
    } else {
        push_field(out, tag, value)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parsed view of an encoded certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Certificate<'a> {
    /// Chain layer
    pub kind: CertKind,
    /// Remaining chain depth
    pub path_len: u8,
    /// Subject name
    pub subject: &'a str,
    /// Issuer name
    pub issuer: &'a str,
    /// Public key the certificate vouches for
    pub subject_public_key: &'a [u8],
    /// Subject digest (empty if absent)
    pub subject_digest: &'a [u8],
    /// Firmware identifier (empty if absent)
    pub fwid: &'a [u8],
    /// Authentication key (empty if absent)
    pub auth_key: &'a [u8],
    /// Issued key (empty if absent)
    pub issued_key: &'a [u8],
    /// DER signature
    pub signature: &'a [u8],
    tbs: &'a [u8],
}

impl<'a> Certificate<'a> {
    /// Parse one certificate from the front of `bytes`
    ///
    /// Returns the certificate and the number of bytes it occupies.
    ///
    /// # Errors
    ///
    /// `MalformedCertificate` on truncation, unknown tags, duplicate or
    /// missing required fields, or trailing data after the signature.
    pub fn parse(bytes: &'a [u8]) -> Result<(Self, usize)> {
        if bytes.len() < LENGTH_SIZE + 2 {
            return Err(Error::MalformedCertificate);
        }
        let body_len = usize::from(u16::from_le_bytes([bytes[0], bytes[1]]));
        let total = LENGTH_SIZE + body_len;
        let body = bytes
            .get(LENGTH_SIZE..total)
            .ok_or(Error::MalformedCertificate)?;
        if body.len() < 2 {
            return Err(Error::MalformedCertificate);
        }

        let kind = CertKind::from_u8(body[0]).ok_or(Error::MalformedCertificate)?;
        let path_len = body[1];

        let mut fields: [Option<&'a [u8]>; 8] = [None; 8];
        let mut signature = None;
        let mut offset = 2;
        while offset < body.len() {
            let header = body
                .get(offset..offset + 2)
                .ok_or(Error::MalformedCertificate)?;
            let (tag, len) = (header[0], usize::from(header[1]));
            let value = body
                .get(offset + 2..offset + 2 + len)
                .ok_or(Error::MalformedCertificate)?;

            if tag == tag::SIGNATURE {
                if offset + 2 + len != body.len() {
                    return Err(Error::MalformedCertificate);
                }
                signature = Some((offset, value));
                break;
            }
            let slot = match tag {
                tag::SUBJECT..=tag::ISSUED_KEY => &mut fields[usize::from(tag)],
                _ => return Err(Error::MalformedCertificate),
            };
            if slot.replace(value).is_some() {
                return Err(Error::MalformedCertificate);
            }
            offset += 2 + len;
        }

        let (sig_offset, signature) = signature.ok_or(Error::MalformedCertificate)?;
        let text = |tag: u8| -> Result<&'a str> {
            let value = fields[usize::from(tag)].ok_or(Error::MalformedCertificate)?;
            core::str::from_utf8(value).map_err(|_| Error::MalformedCertificate)
        };
        let optional = |tag: u8| fields[usize::from(tag)].unwrap_or(&[]);

        let cert = Self {
            kind,
            path_len,
            subject: text(tag::SUBJECT)?,
            issuer: text(tag::ISSUER)?,
            subject_public_key: fields[usize::from(tag::SUBJECT_PUBLIC_KEY)]
                .ok_or(Error::MalformedCertificate)?,
            subject_digest: optional(tag::SUBJECT_DIGEST),
            fwid: optional(tag::FWID),
            auth_key: optional(tag::AUTH_KEY),
            issued_key: optional(tag::ISSUED_KEY),
            signature,
            tbs: &body[..sig_offset],
        };
        Ok((cert, total))
    }

    /// The signed portion of the certificate
    #[must_use]
    pub const fn tbs_bytes(&self) -> &'a [u8] {
        self.tbs
    }

    /// Whether issuer and subject are the same
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    /// Check the signature against `issuer_key`
    ///
    /// # Errors
    ///
    /// `ChainVerificationFailed` if the key is not a valid point or the
    /// signature does not verify.
    pub fn verify_signature(&self, issuer_key: &[u8]) -> Result<()> {
        if self.signature.len() > MAX_DER_SIGNATURE_SIZE {
            return Err(Error::ChainVerificationFailed);
        }
        let key = EccPublicKey::from_sec1(issuer_key).map_err(|_| Error::ChainVerificationFailed)?;
        verify_with_key(&key, &[self.tbs], self.signature)
            .map_err(|_| Error::ChainVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_crypto::derive_key_pair;

    fn tbs<'a>(public: &'a [u8]) -> TbsCertificate<'a> {
        TbsCertificate {
            kind: CertKind::Root,
            path_len: 4,
            subject: "Strata Root",
            issuer: "Strata Root",
            subject_public_key: public,
            subject_digest: &[0x11; 32],
            fwid: b"1.0.0",
            auth_key: &[0x00],
            issued_key: &[],
        }
    }

    #[test]
    fn test_issue_then_parse() {
        let pair = derive_key_pair(b"root").unwrap();
        let encoded = issue(&tbs(pair.public().as_bytes()), pair.private()).unwrap();
        let (cert, used) = Certificate::parse(&encoded).unwrap();

        assert_eq!(used, encoded.len());
        assert_eq!(cert.kind, CertKind::Root);
        assert_eq!(cert.path_len, 4);
        assert!(cert.is_self_issued());
        assert_eq!(cert.fwid, b"1.0.0");
        assert!(cert.issued_key.is_empty());
        assert!(cert.verify_signature(pair.public().as_bytes()).is_ok());
    }

    #[test]
    fn test_tampered_tbs_fails_signature() {
        let pair = derive_key_pair(b"root").unwrap();
        let mut encoded = issue(&tbs(pair.public().as_bytes()), pair.private()).unwrap();
        // Path length byte
        encoded[3] ^= 0x01;
        let (cert, _) = Certificate::parse(&encoded).unwrap();
        assert_eq!(
            cert.verify_signature(pair.public().as_bytes()),
            Err(Error::ChainVerificationFailed)
        );
    }

    #[test]
    fn test_missing_subject_rejected() {
        let pair = derive_key_pair(b"root").unwrap();
        let mut bad = tbs(pair.public().as_bytes());
        bad.subject = "";
        assert_eq!(issue(&bad, pair.private()), Err(Error::InvalidParameter));
    }

    #[test]
    fn test_truncated_rejected() {
        let pair = derive_key_pair(b"root").unwrap();
        let encoded = issue(&tbs(pair.public().as_bytes()), pair.private()).unwrap();
        assert_eq!(
            Certificate::parse(&encoded[..encoded.len() - 1]).err(),
            Some(Error::MalformedCertificate)
        );
        assert_eq!(Certificate::parse(&[]).err(), Some(Error::MalformedCertificate));
    }

    #[test]
    fn test_kind_layers() {
        assert_eq!(CertKind::Root.layer(), 0);
        assert_eq!(CertKind::Device.layer(), 0);
        assert_eq!(CertKind::Alias.layer(), 1);
        assert_eq!(CertKind::from_u8(0), None);
    }
}
