//! Crate-level tests: wire-format scenarios with literal byte vectors and
//! an X.509-shaped exercise of the schema macros.

#[cfg(all(feature = "parse", feature = "encode"))]
mod wire_scenario_tests {
    use super::super::*;
    use hex_literal::hex;

    #[derive(Debug, PartialEq)]
    struct Pair {
        a: u8,
        b: u8,
    }

    der_sequence! {
        Pair {
            a: u8,
            b: u8,
        }
    }

    #[test]
    fn test_integer_zero() {
        assert_eq!(from_der::<u8>(&hex!("020100")).unwrap(), 0);
        assert_eq!(to_der(&0u8), hex!("020100"));
    }

    #[test]
    fn test_integer_with_sign_padding() {
        // 0xFFFF needs a pad octet to stay positive
        let bytes = hex!("020300ffff");
        assert_eq!(from_der::<u16>(&bytes).unwrap(), 65535);
        assert_eq!(to_der(&65535u16), bytes);
    }

    #[test]
    fn test_non_canonical_integer_rejected() {
        assert_eq!(from_der::<u8>(&hex!("02020001")), Err(Error::NonCanonical));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(to_der(&true), hex!("0101ff"));
        assert_eq!(to_der(&false), hex!("010100"));
        assert_eq!(from_der::<bool>(&hex!("0101ff")).unwrap(), true);
        assert_eq!(from_der::<bool>(&hex!("010100")).unwrap(), false);
        assert_eq!(from_der::<bool>(&hex!("010101")), Err(Error::InvalidBool));
    }

    #[test]
    fn test_sequence_of_two_integers() {
        let bytes = hex!("3006020105020106");
        let pair = Pair { a: 5, b: 6 };
        assert_eq!(to_der(&pair), bytes);
        assert_eq!(from_der::<Pair>(&bytes).unwrap(), pair);
    }

    #[test]
    fn test_bit_string_with_padding() {
        let bytes = hex!("03030504a0");
        let bits = from_der::<BitString>(&bytes).unwrap();
        assert_eq!(bits.bytes(), &hex!("04a0"));
        assert_eq!(bits.unused_bits(), 5);
        assert_eq!(to_der(&bits), bytes);

        // 0xa0 is clean under 4 or 5 pad bits but dirty under 6
        assert!(from_der::<BitString>(&hex!("03030404a0")).is_ok());
        assert_eq!(from_der::<BitString>(&hex!("03030604a0")), Err(Error::InvalidBitString));
    }

    #[test]
    fn test_utc_time_rfc5280_pivot() {
        let bytes = hex!("170d3234303131353133333030305a");
        let mut decoder = Decoder::new(&bytes);
        let dt = decoder.utc_time().unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt, DateTime::new(2024, 1, 15, 13, 30, 0).unwrap());

        let mut encoder = Encoder::new();
        encoder.utc_time(&dt);
        assert_eq!(encoder.into_bytes(), bytes);
    }

    #[test]
    fn test_explicit_tagged_version() {
        let bytes = hex!("a003020102");
        let mut decoder = Decoder::new(&bytes);
        let version = decoder.field(FieldTag::explicit(0), |d| d.any::<u8>()).unwrap();
        assert_eq!(version, 2);
        decoder.eof().unwrap();
    }

    #[test]
    fn test_adversarial_length() {
        // Claims 4 GiB of content in a 6-byte input
        let bytes = hex!("3084ffffffff");
        assert_eq!(decode_element(&bytes, 0), Err(Error::InvalidLength));
        assert_eq!(from_der::<Opaque>(&bytes), Err(Error::InvalidLength));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert_eq!(from_der::<u8>(&hex!("02010500")), Err(Error::NonCanonical));
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(from_der::<u8>(&hex!("02")), Err(Error::EndOfStream));
        assert_eq!(from_der::<u8>(&[]), Err(Error::EndOfStream));
        // A complete header whose content overruns the input
        assert_eq!(from_der::<u8>(&hex!("020201")), Err(Error::InvalidLength));
    }

    #[test]
    fn test_short_form_length_boundary() {
        // 127 content octets keep the one-octet length form
        let payload = [0xabu8; 127];
        let encoded = to_der(payload.as_slice());
        assert_eq!(&encoded[..2], &hex!("047f"));
        assert_eq!(encoded.len(), 2 + 127);

        // 128 content octets require the long form
        let payload = [0xabu8; 128];
        let encoded = to_der(payload.as_slice());
        assert_eq!(&encoded[..3], &hex!("048180"));
        assert_eq!(encoded.len(), 3 + 128);

        // 256 content octets need two length octets
        let payload = [0xabu8; 256];
        let encoded = to_der(payload.as_slice());
        assert_eq!(&encoded[..4], &hex!("04820100"));
    }

    #[test]
    fn test_stability() {
        // encode(decode(bytes)) == bytes for everything that decodes
        let integer = hex!("020300ffff");
        assert_eq!(to_der(&from_der::<u16>(&integer).unwrap()), integer);

        let pair = hex!("3006020105020106");
        assert_eq!(to_der(&from_der::<Pair>(&pair).unwrap()), pair);

        let bits = hex!("03030504a0");
        assert_eq!(to_der(&from_der::<BitString>(&bits).unwrap()), bits);

        let oid = hex!("06092a864886f70d01010b");
        assert_eq!(to_der(&from_der::<Oid>(&oid).unwrap()), oid);
    }

    #[test]
    fn test_decoded_views_stay_in_input() {
        let bytes = hex!("30080406aabbccddeeff");
        let opaque = from_der::<Opaque>(&bytes).unwrap();
        let range = bytes.as_ptr_range();
        assert!(range.contains(&opaque.content.as_ptr()));
        assert!(opaque.content.as_ptr() as usize + opaque.content.len() <= range.end as usize);
    }

    #[test]
    fn test_integer_width_roundtrips() {
        assert_eq!(from_der::<i64>(&to_der(&i64::MIN)).unwrap(), i64::MIN);
        assert_eq!(from_der::<i64>(&to_der(&-1i64)).unwrap(), -1);
        assert_eq!(from_der::<u128>(&to_der(&u128::MAX)).unwrap(), u128::MAX);
        assert_eq!(from_der::<i8>(&to_der(&-128i8)).unwrap(), -128);
        assert_eq!(from_der::<u32>(&to_der(&0x8000_0000u32)).unwrap(), 0x8000_0000);
    }
}

#[cfg(all(feature = "parse", feature = "encode"))]
mod certificate_shape_tests {
    use super::super::*;
    use crate::oid::encode_oid;
    use derive_try_from_primitive::TryFromPrimitive;
    use hex_literal::hex;

    const SHA256_RSA: [u8; 9] = encode_oid(&[1, 2, 840, 113549, 1, 1, 11]);
    const ECDSA_SHA256: [u8; 8] = encode_oid(&[1, 2, 840, 10045, 4, 3, 2]);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SignatureAlgorithm {
        Sha256WithRsa,
        EcdsaWithSha256,
    }

    der_oid_enum! {
        SignatureAlgorithm {
            Sha256WithRsa => &SHA256_RSA,
            EcdsaWithSha256 => &ECDSA_SHA256,
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
    #[repr(u8)]
    enum Version {
        V1 = 0,
        V2 = 1,
        V3 = 2,
    }

    der_enumerated!(Version: u8);

    #[derive(Debug, PartialEq)]
    struct Validity {
        not_before: UtcTime,
        not_after: UtcTime,
    }

    der_sequence! {
        Validity {
            not_before: UtcTime,
            not_after: UtcTime,
        }
    }

    #[derive(Debug, PartialEq)]
    struct TbsCertificate<'a> {
        version: Version,
        serial_number: u64,
        signature: SignatureAlgorithm,
        validity: Validity,
        subject_key: BitString<'a>,
        issuer_unique_id: Option<Opaque<'a>>,
    }

    der_sequence! {
        TbsCertificate<'a> {
            [explicit 0, default Version::V1] version: Version,
            serial_number: u64,
            signature: SignatureAlgorithm,
            validity: Validity,
            subject_key: BitString<'a>,
            [implicit 1] issuer_unique_id: Option<Opaque<'a>>,
        }
    }

    fn sample_validity() -> Validity {
        Validity {
            not_before: UtcTime(DateTime::new(2024, 1, 15, 13, 30, 0).unwrap()),
            not_after: UtcTime(DateTime::new(2025, 1, 15, 13, 30, 0).unwrap()),
        }
    }

    #[test]
    fn test_oid_enum_roundtrip() {
        let bytes = to_der(&SignatureAlgorithm::EcdsaWithSha256);
        assert_eq!(bytes, hex!("06082a8648ce3d040302"));
        assert_eq!(
            from_der::<SignatureAlgorithm>(&bytes).unwrap(),
            SignatureAlgorithm::EcdsaWithSha256
        );
    }

    #[test]
    fn test_oid_enum_unknown_oid() {
        // 1.2.3 is not in the table
        let bytes = hex!("06022a03");
        assert_eq!(from_der::<SignatureAlgorithm>(&bytes), Err(Error::UnknownOid));
    }

    #[test]
    fn test_enumerated_version() {
        assert_eq!(to_der(&Version::V3), hex!("020102"));
        assert_eq!(from_der::<Version>(&hex!("020102")).unwrap(), Version::V3);
        // Out-of-domain discriminant
        assert_eq!(from_der::<Version>(&hex!("020103")), Err(Error::UnexpectedElement));
    }

    #[test]
    fn test_tbs_byte_exact() {
        let key_bytes = hex!("04a0");
        let unique_id = hex!("dead");
        let tbs = TbsCertificate {
            version: Version::V3,
            serial_number: 0x1001,
            signature: SignatureAlgorithm::EcdsaWithSha256,
            validity: sample_validity(),
            subject_key: BitString::new(&key_bytes, 5).unwrap(),
            issuer_unique_id: Some(Opaque { tag: Tag::context(1), content: &unique_id }),
        };

        let expected = hex!(
            "303c"
            "a003020102" // [0] EXPLICIT version v3
            "02021001" // serialNumber
            "06082a8648ce3d040302" // ecdsa-with-SHA256
            "301e" // validity
            "170d3234303131353133333030305a"
            "170d3235303131353133333030305a"
            "03030504a0" // subject key bits
            "8102dead" // [1] IMPLICIT issuerUniqueID
        );

        let encoded = to_der(&tbs);
        assert_eq!(encoded, expected);
        assert_eq!(from_der::<TbsCertificate>(&expected).unwrap(), tbs);
    }

    #[test]
    fn test_default_version_is_omitted() {
        let tbs = TbsCertificate {
            version: Version::V1,
            serial_number: 0x1001,
            signature: SignatureAlgorithm::EcdsaWithSha256,
            validity: sample_validity(),
            subject_key: BitString::new(&[], 0).unwrap(),
            issuer_unique_id: None,
        };

        let encoded = to_der(&tbs);
        // The encoding begins directly with the serial number
        assert_eq!(&encoded[2..6], &hex!("02021001"));
        assert!(!encoded.windows(2).any(|w| w == &hex!("a003")));

        let decoded = from_der::<TbsCertificate>(&encoded).unwrap();
        assert_eq!(decoded, tbs);
        assert_eq!(decoded.version, Version::V1);
    }

    #[test]
    fn test_encoded_default_version_rejected() {
        // Same shape, but the writer encoded DEFAULT v1 explicitly
        let bytes = hex!(
            "303c"
            "a003020100" // [0] EXPLICIT version v1 (forbidden)
            "02021001"
            "06082a8648ce3d040302"
            "301e"
            "170d3234303131353133333030305a"
            "170d3235303131353133333030305a"
            "03030504a0"
            "8102dead"
        );
        assert_eq!(from_der::<TbsCertificate>(&bytes), Err(Error::NonCanonical));
    }

    #[test]
    fn test_absent_optional_field() {
        let tbs = TbsCertificate {
            version: Version::V3,
            serial_number: 7,
            signature: SignatureAlgorithm::Sha256WithRsa,
            validity: sample_validity(),
            subject_key: BitString::new(&[], 0).unwrap(),
            issuer_unique_id: None,
        };

        let encoded = to_der(&tbs);
        let decoded = from_der::<TbsCertificate>(&encoded).unwrap();
        assert_eq!(decoded, tbs);
        assert_eq!(decoded.issuer_unique_id, None);
    }

    #[test]
    fn test_sequence_of_algorithms() {
        let algorithms = [SignatureAlgorithm::Sha256WithRsa, SignatureAlgorithm::EcdsaWithSha256];

        let mut encoder = Encoder::new();
        encoder.sequence(|e| {
            for algorithm in &algorithms {
                e.any(algorithm);
            }
        });
        let bytes = encoder.into_bytes();

        let mut decoder = Decoder::new(&bytes);
        let decoded: Result<alloc::vec::Vec<SignatureAlgorithm>, Error> =
            decoder.sequence_of::<SignatureAlgorithm>().unwrap().collect();
        assert_eq!(decoded.unwrap(), algorithms);
        decoder.eof().unwrap();
    }

    #[test]
    fn test_opaque_defers_substructure() {
        // The validity SEQUENCE captured opaquely, parsed later
        let bytes = hex!(
            "301e"
            "170d3234303131353133333030305a"
            "170d3235303131353133333030305a"
        );
        let opaque = from_der::<Opaque>(&bytes).unwrap();
        assert_eq!(opaque.tag, Tag::SEQUENCE);

        let mut decoder = Decoder::new(opaque.content);
        assert_eq!(decoder.utc_time().unwrap().year(), 2024);
        assert_eq!(decoder.utc_time().unwrap().year(), 2025);
        decoder.eof().unwrap();

        // And re-emitted byte-identically
        assert_eq!(to_der(&opaque), bytes);
    }
}
