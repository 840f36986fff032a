// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for strata-crypto
//!
//! These tests exercise hashing, key derivation, signing and manifest
//! verification end to end, including the rejection reasons and the key
//! selection order.

const ALGO: &str = "sha256,ecc-prime256v1";

mod hash_tests {
    use strata_crypto::hash::{sha256, sha256_regions, Sha256};
    use strata_crypto::traits::Hash;

    #[test]
    fn test_sha256_abc() {
        // FIPS 180-2 example: SHA-256("abc")
        let expected = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea,
            0x41, 0x41, 0x40, 0xde, 0x5d, 0xae, 0x22, 0x23,
            0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c,
            0xb4, 0x10, 0xff, 0x61, 0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(sha256(b"abc").as_bytes(), &expected);
        assert_eq!(Sha256::hash(b"abc").as_ref(), &expected);
    }

    #[test]
    fn test_regions_equal_incremental() {
        let mut h = Sha256::new();
        h.update(b"root");
        h.update(b"device");
        assert_eq!(h.finalize(), sha256_regions(&[b"root", b"device"]));
    }
}

mod key_derivation_tests {
    use strata_crypto::{derive_key_pair, EccPrivateKey, EccPublicKey};

    #[test]
    fn test_same_seed_same_pair() {
        let cdi = [0x5Au8; 32];
        let a = derive_key_pair(&cdi).unwrap();
        let b = derive_key_pair(&cdi).unwrap();
        assert_eq!(a.public(), b.public());
        assert!(a.matches(b.public()));
    }

    #[test]
    fn test_chained_derivation_is_stable() {
        let device = derive_key_pair(&[0x01; 32]).unwrap();
        let alias_a = derive_key_pair(device.private().as_bytes()).unwrap();
        let alias_b = derive_key_pair(device.private().as_bytes()).unwrap();
        assert_eq!(alias_a.public(), alias_b.public());
        assert_ne!(alias_a.public(), device.public());
    }

    #[test]
    fn test_private_key_roundtrip() {
        let pair = derive_key_pair(b"roundtrip").unwrap();
        let imported = EccPrivateKey::from_bytes(pair.private().as_bytes()).unwrap();
        assert_eq!(imported.public_key().unwrap(), *pair.public());
    }

    #[test]
    fn test_compressed_point_rejected() {
        let pair = derive_key_pair(b"k").unwrap();
        let mut compressed = [0u8; 33];
        compressed[0] = 0x02;
        compressed[1..].copy_from_slice(pair.public().x());
        assert!(EccPublicKey::from_sec1(&compressed).is_err());
    }

    #[test]
    fn test_point_off_curve_rejected() {
        let pair = derive_key_pair(b"k").unwrap();
        let mut bytes = *pair.public().as_bytes();
        bytes[64] ^= 0x01;
        assert!(EccPublicKey::from_sec1(&bytes).is_err());
    }
}

mod sign_verify_tests {
    use strata_crypto::{derive_key_pair, sign, verify_with_key, VerifyFailure};

    #[test]
    fn test_round_trip() {
        let pair = derive_key_pair(b"roundtrip").unwrap();
        let regions: [&[u8]; 3] = [b"header", b"payload", b"trailer"];
        let sig = sign(pair.private(), &regions).unwrap();
        assert!(verify_with_key(pair.public(), &regions, &sig).is_ok());
    }

    #[test]
    fn test_any_signature_byte_flip_fails() {
        let pair = derive_key_pair(b"flip-sig").unwrap();
        let regions: [&[u8]; 2] = [b"first region", b"second region"];
        let sig = sign(pair.private(), &regions).unwrap();
        for i in 0..sig.len() {
            let mut bad = sig.clone();
            bad[i] ^= 0x01;
            assert!(
                verify_with_key(pair.public(), &regions, &bad).is_err(),
                "flip at byte {i} verified"
            );
        }
    }

    #[test]
    fn test_any_message_byte_flip_fails() {
        let pair = derive_key_pair(b"flip-msg").unwrap();
        let first = *b"first region";
        let second = *b"second";
        let sig = sign(pair.private(), &[&first, &second]).unwrap();

        for i in 0..first.len() {
            let mut bad = first;
            bad[i] ^= 0x80;
            assert_eq!(
                verify_with_key(pair.public(), &[&bad, &second], &sig),
                Err(VerifyFailure::HashMismatch)
            );
        }
        for i in 0..second.len() {
            let mut bad = second;
            bad[i] ^= 0x80;
            assert_eq!(
                verify_with_key(pair.public(), &[&first, &bad], &sig),
                Err(VerifyFailure::HashMismatch)
            );
        }
    }

    #[test]
    fn test_signature_is_der_sequence() {
        let pair = derive_key_pair(b"der").unwrap();
        let sig = sign(pair.private(), &[b"x"]).unwrap();
        assert_eq!(sig[0], 0x30);
        assert_eq!(usize::from(sig[1]) + 2, sig.len());
        assert!(sig.len() <= 72);
    }
}

mod manifest_verify_tests {
    use super::ALGO;
    use strata_crypto::manifest::KeyNode;
    use strata_crypto::{
        derive_key_pair, sign, verify, EccKeyPair, KeyManifest, VerifyFailure, VerifyParams,
    };

    fn pairs() -> (EccKeyPair, EccKeyPair, EccKeyPair) {
        (
            derive_key_pair(b"alpha").unwrap(),
            derive_key_pair(b"beta").unwrap(),
            derive_key_pair(b"gamma").unwrap(),
        )
    }

    #[test]
    fn test_hinted_key_verifies() {
        let (a, b, _) = pairs();
        let mut manifest = KeyManifest::new();
        manifest.add_key("alpha", a.public(), ALGO, None).unwrap();
        manifest.add_key("beta", b.public(), ALGO, None).unwrap();

        let sig = sign(b.private(), &[b"image"]).unwrap();
        let node = verify(&manifest, &VerifyParams::with_hint("beta"), &[b"image"], &sig).unwrap();
        assert_eq!(node.name.as_str(), "key-beta");
    }

    #[test]
    fn test_falls_back_to_scan_in_order() {
        let (a, b, c) = pairs();
        let mut manifest = KeyManifest::new();
        manifest.add_key("alpha", a.public(), ALGO, None).unwrap();
        manifest.add_key("beta", b.public(), ALGO, None).unwrap();
        manifest.add_key("gamma", c.public(), ALGO, None).unwrap();

        let sig = sign(c.private(), &[b"image"]).unwrap();
        let node = verify(&manifest, &VerifyParams::with_hint("alpha"), &[b"image"], &sig).unwrap();
        assert_eq!(node.name.as_str(), "key-gamma");

        let node = verify(&manifest, &VerifyParams::with_hint("missing"), &[b"image"], &sig).unwrap();
        assert_eq!(node.name.as_str(), "key-gamma");
    }

    #[test]
    fn test_required_key_tried_first() {
        let (a, _, _) = pairs();
        let mut manifest = KeyManifest::new();
        // Same key under two names: the required one must be reported
        manifest.add_key("first", a.public(), ALGO, None).unwrap();
        manifest.add_key("second", a.public(), ALGO, None).unwrap();

        let sig = sign(a.private(), &[b"image"]).unwrap();
        let params = VerifyParams {
            required_key: Some("second"),
            ..VerifyParams::with_hint("first")
        };
        let node = verify(&manifest, &params, &[b"image"], &sig).unwrap();
        assert_eq!(node.name.as_str(), "key-second");
    }

    #[test]
    fn test_no_matching_key() {
        let (a, b, c) = pairs();
        let mut manifest = KeyManifest::new();
        manifest.add_key("alpha", a.public(), ALGO, None).unwrap();
        manifest.add_key("beta", b.public(), ALGO, None).unwrap();

        let sig = sign(c.private(), &[b"image"]).unwrap();
        assert_eq!(
            verify(&manifest, &VerifyParams::DEFAULT, &[b"image"], &sig).err(),
            Some(VerifyFailure::NoMatchingKey)
        );
        assert_eq!(
            verify(&KeyManifest::new(), &VerifyParams::DEFAULT, &[b"image"], &sig).err(),
            Some(VerifyFailure::NoMatchingKey)
        );
    }

    #[test]
    fn test_single_key_mismatch() {
        let (a, _, _) = pairs();
        let mut manifest = KeyManifest::new();
        manifest.add_key("alpha", a.public(), ALGO, None).unwrap();
        let sig = sign(a.private(), &[b"image"]).unwrap();
        assert_eq!(
            verify(&manifest, &VerifyParams::DEFAULT, &[b"tampered"], &sig).err(),
            Some(VerifyFailure::HashMismatch)
        );
    }

    #[test]
    fn test_required_and_hinted_same_key_tried_once() {
        let (a, _, _) = pairs();
        let mut manifest = KeyManifest::new();
        manifest.add_key("alpha", a.public(), ALGO, None).unwrap();
        let sig = sign(a.private(), &[b"image"]).unwrap();

        let hinted = VerifyParams::with_hint("alpha");
        let both = VerifyParams {
            required_key: Some("alpha"),
            ..hinted
        };
        for params in [hinted, both] {
            assert_eq!(
                verify(&manifest, &params, &[b"tampered"], &sig).err(),
                Some(VerifyFailure::HashMismatch)
            );
        }
        assert!(verify(&manifest, &both, &[b"image"], &sig).is_ok());
    }

    #[test]
    fn test_unsupported_curve_nodes() {
        let (a, _, _) = pairs();
        let mut manifest = KeyManifest::new();
        let node = KeyNode::from_properties(
            "p384",
            2,
            a.public().as_bytes(),
            65,
            "sha256,ecc-secp384r1",
            None,
        )
        .unwrap();
        manifest.insert_node(node).unwrap();
        let short = KeyNode::from_properties("short", 1, &a.public().as_bytes()[..33], 33, ALGO, None)
            .unwrap();
        manifest.insert_node(short).unwrap();

        let sig = sign(a.private(), &[b"image"]).unwrap();
        assert_eq!(
            verify(&manifest, &VerifyParams::DEFAULT, &[b"image"], &sig).err(),
            Some(VerifyFailure::UnsupportedCurve)
        );
    }

    #[test]
    fn test_unsupported_hash_rejected_before_decoding() {
        let manifest = KeyManifest::new();
        let params = VerifyParams {
            checksum: "sha1",
            ..VerifyParams::DEFAULT
        };
        assert_eq!(
            verify(&manifest, &params, &[b"image"], b"not der").err(),
            Some(VerifyFailure::UnsupportedHash)
        );
    }

    #[test]
    fn test_malformed_signature() {
        let (a, _, _) = pairs();
        let mut manifest = KeyManifest::new();
        manifest.add_key("alpha", a.public(), ALGO, None).unwrap();
        assert_eq!(
            verify(&manifest, &VerifyParams::DEFAULT, &[b"image"], b"not der").err(),
            Some(VerifyFailure::MalformedSignature)
        );
    }
}

mod error_conversion_tests {
    use strata_common::Error;
    use strata_crypto::{CryptoError, VerifyFailure};

    #[test]
    fn test_verify_failures_map_to_distinct_errors() {
        let all = [
            VerifyFailure::NoMatchingKey,
            VerifyFailure::MalformedSignature,
            VerifyFailure::UnsupportedCurve,
            VerifyFailure::UnsupportedHash,
            VerifyFailure::HashMismatch,
        ];
        for (i, a) in all.iter().enumerate() {
            let ea = Error::from(*a);
            assert!(ea.is_verify_failure());
            for b in &all[i + 1..] {
                assert_ne!(ea, Error::from(*b));
            }
        }
    }

    #[test]
    fn test_signing_failure_maps_to_chain_error() {
        assert_eq!(Error::from(CryptoError::SigningFailed), Error::SignatureFailure);
        assert_eq!(
            Error::from(CryptoError::KeyDerivationFailed),
            Error::KeyDerivationFailure
        );
    }
}
