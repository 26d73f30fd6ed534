// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detached CMS signature generation.
//!
//! Produces RFC 5652 `SignedData` with a single signer, bound to SHA-512
//! and serialized as DER. The encapsulated content is omitted: verifiers
//! check the signature over the signed attributes, which carry the
//! document's digest.
//!
//! The structure is assembled directly from the `asn1::rfc5652` types so
//! the digest algorithm can be pinned to SHA-512 before the signature is
//! computed. Signing happens in two stages: build the signed attributes,
//! then seal them into a signed, DER-encoded structure.

use {
    crate::{credentials::SigningCredentials, DocsignError},
    bcder::{
        encode::{PrimitiveContent, Values},
        Captured, Mode, Oid,
    },
    bytes::Bytes,
    cryptographic_message_syntax::asn1::rfc5652::{
        CertificateChoices, CertificateSet, CmsVersion,
        DigestAlgorithmIdentifiers, EncapsulatedContentInfo, IssuerAndSerialNumber,
        SignatureValue, SignedAttributes, SignedData, SignerIdentifier, SignerInfo, SignerInfos,
        OID_CONTENT_TYPE, OID_ID_DATA, OID_MESSAGE_DIGEST, OID_SIGNING_TIME,
    },
    log::debug,
    ring::{rand::SystemRandom, signature::RSA_PKCS1_SHA512},
    x509_certificate::{
        asn1time::UtcTime, rfc5280,
        rfc5652::{Attribute, AttributeValue},
        DigestAlgorithm, EcdsaCurve, InMemorySigningKeyPair,
        KeyAlgorithm, SignatureAlgorithm,
    },
};

/// Signature algorithm a key will sign with.
///
/// RSA keys are bound to SHA-512. ring offers no SHA-512 profile for its
/// ECDSA curves, so those sign with the curve's native digest; content
/// digesting remains SHA-512 either way. Ed25519 is not supported.
fn signature_algorithm_for_key(
    key: &InMemorySigningKeyPair,
) -> Result<SignatureAlgorithm, DocsignError> {
    match key {
        InMemorySigningKeyPair::Rsa(_, _) => Ok(SignatureAlgorithm::RsaSha512),
        InMemorySigningKeyPair::Ecdsa(_, curve, _) => Ok(match curve {
            EcdsaCurve::Secp256r1 => SignatureAlgorithm::EcdsaSha256,
            EcdsaCurve::Secp384r1 => SignatureAlgorithm::EcdsaSha384,
        }),
        InMemorySigningKeyPair::Ed25519(_) => {
            Err(DocsignError::UnsupportedKeyAlgorithm(KeyAlgorithm::Ed25519))
        }
    }
}

/// Create the raw signature over `message` with the algorithm chosen by
/// [signature_algorithm_for_key].
fn create_signature(
    key: &InMemorySigningKeyPair,
    message: &[u8],
) -> Result<Vec<u8>, DocsignError> {
    match key {
        InMemorySigningKeyPair::Rsa(pair, _) => {
            let mut signature = vec![0; pair.public_modulus_len()];

            pair.sign(
                &RSA_PKCS1_SHA512,
                &SystemRandom::new(),
                message,
                &mut signature,
            )
            .map_err(|_| DocsignError::SignatureCreation)?;

            Ok(signature)
        }
        InMemorySigningKeyPair::Ecdsa(pair, _, _) => {
            let signature = pair
                .sign(&SystemRandom::new(), message)
                .map_err(|_| DocsignError::SignatureCreation)?;

            Ok(signature.as_ref().to_vec())
        }
        InMemorySigningKeyPair::Ed25519(_) => {
            Err(DocsignError::UnsupportedKeyAlgorithm(KeyAlgorithm::Ed25519))
        }
    }
}

/// The mandatory content-type signed attribute, naming `id-data`.
pub(crate) fn content_type_attribute() -> Attribute {
    Attribute {
        typ: Oid(Bytes::copy_from_slice(OID_CONTENT_TYPE.as_ref())),
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())).encode_ref(),
        ))],
    }
}

/// The signing-time signed attribute, stamped with the current UTC time.
pub(crate) fn signing_time_attribute() -> Attribute {
    Attribute {
        typ: Oid(Bytes::copy_from_slice(OID_SIGNING_TIME.as_ref())),
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            UtcTime::now().encode(),
        ))],
    }
}

/// The message-digest signed attribute carrying the content digest.
pub(crate) fn message_digest_attribute(digest: &[u8]) -> Attribute {
    Attribute {
        typ: Oid(Bytes::copy_from_slice(OID_MESSAGE_DIGEST.as_ref())),
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            digest.encode(),
        ))],
    }
}

/// Sign `content` with `credentials`, producing a detached CMS signature
/// as DER-encoded `ContentInfo` bytes.
///
/// The content is treated as opaque binary. It is digested with SHA-512
/// into the `message-digest` signed attribute and is *not* embedded in the
/// output.
pub fn sign_detached(
    credentials: &SigningCredentials,
    content: &[u8],
) -> Result<Vec<u8>, DocsignError> {
    let mut digester = DigestAlgorithm::Sha512.digester();
    digester.update(content);
    let content_digest = digester.finish();

    // Attribute order matters: these three encodings are strictly
    // increasing in length, so the SET OF is emitted already DER-sorted.
    let mut signed_attributes = SignedAttributes::default();
    signed_attributes.push(content_type_attribute());
    signed_attributes.push(signing_time_attribute());
    signed_attributes.push(message_digest_attribute(content_digest.as_ref()));

    seal_signed_data(credentials, signed_attributes)
}

/// Assemble, sign and DER-encode a detached `SignedData` around
/// already-built signed attributes.
///
/// With detached content, the message that gets signed is the DER EXPLICIT
/// SET OF encoding of the signed attributes alone.
pub(crate) fn seal_signed_data(
    credentials: &SigningCredentials,
    signed_attributes: SignedAttributes,
) -> Result<Vec<u8>, DocsignError> {
    let cert = &credentials.certificate;
    let signature_algorithm = signature_algorithm_for_key(&credentials.signing_key)?;

    let mut signer_info = SignerInfo {
        version: CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: cert.issuer_name().clone(),
            serial_number: cert.serial_number_asn1().clone(),
        }),
        digest_algorithm: DigestAlgorithm::Sha512.into(),
        signed_attributes: Some(signed_attributes),
        signature_algorithm: signature_algorithm.into(),
        signature: SignatureValue::new(Bytes::new()),
        unsigned_attributes: None,
        signed_attributes_data: None,
    };

    let mut signed_message = Vec::new();
    if let Some(attributes_data) = signer_info.signed_attributes_digested_content()? {
        signed_message.extend(attributes_data);
    }

    signer_info.signature = SignatureValue::new(Bytes::from(create_signature(
        &credentials.signing_key,
        &signed_message,
    )?));

    let mut digest_algorithms = DigestAlgorithmIdentifiers::default();
    digest_algorithms.push(DigestAlgorithm::Sha512.into());

    let mut certificates = CertificateSet::default();
    certificates.push(CertificateChoices::Certificate(Box::new(
        rfc5280::Certificate::from(cert.clone()),
    )));
    certificates.extend(credentials.ca_chain.iter().map(|ca| {
        CertificateChoices::Certificate(Box::new(rfc5280::Certificate::from(ca.clone())))
    }));

    let mut signer_infos = SignerInfos::default();
    signer_infos.push(signer_info);

    let signed_data = SignedData {
        version: CmsVersion::V1,
        digest_algorithms,
        content_info: EncapsulatedContentInfo {
            content_type: Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())),
            content: None,
        },
        certificates: Some(certificates),
        crls: None,
        signer_infos,
    };

    let mut der = Vec::new();
    signed_data.encode_ref().write_encoded(Mode::Der, &mut der)?;

    debug!(
        "produced {} byte detached CMS signature with {:?}",
        der.len(),
        signature_algorithm
    );

    Ok(der)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::credentials::SigningCredentials,
        cryptographic_message_syntax::asn1::rfc5652,
        ring::signature::Ed25519KeyPair,
        x509_certificate::{KeyAlgorithm, X509CertificateBuilder},
    };

    fn ecdsa_credentials() -> SigningCredentials {
        let mut builder = X509CertificateBuilder::new(KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1));
        builder
            .subject()
            .append_common_name_utf8_string("Signer Tester")
            .unwrap();
        builder.validity_duration(chrono::Duration::hours(1));

        let (certificate, signing_key, _) = builder.create_with_random_keypair().unwrap();

        SigningCredentials {
            signing_key,
            certificate,
            ca_chain: vec![],
        }
    }

    #[test]
    fn output_is_detached_sha512_signed_data() {
        let credentials = ecdsa_credentials();
        let der = sign_detached(&credentials, b"hello, world").unwrap();

        let parsed = rfc5652::SignedData::decode_ber(&der).unwrap();

        // Detached: no encapsulated content.
        assert!(parsed.content_info.content.is_none());

        // SHA-512 everywhere content digesting is described.
        let sha512: Oid = DigestAlgorithm::Sha512.into();
        assert_eq!(parsed.digest_algorithms.len(), 1);
        assert_eq!(parsed.digest_algorithms[0].algorithm, sha512);

        assert_eq!(parsed.signer_infos.len(), 1);
        let signer = &parsed.signer_infos[0];
        assert_eq!(signer.digest_algorithm.algorithm, sha512);

        // contentType, signingTime and messageDigest are all signed.
        let attributes = signer.signed_attributes.as_ref().unwrap();
        for oid in [OID_CONTENT_TYPE, OID_SIGNING_TIME, OID_MESSAGE_DIGEST] {
            assert!(attributes.iter().any(|attr| attr.typ == oid));
        }

        // The signing certificate travels in the certificates field.
        assert_eq!(parsed.certificates.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn der_encoding_round_trips() {
        let credentials = ecdsa_credentials();
        let der = sign_detached(&credentials, b"round trip").unwrap();

        let parsed = rfc5652::SignedData::decode_ber(&der).unwrap();

        let mut reencoded = Vec::new();
        parsed
            .encode_ref()
            .write_encoded(Mode::Der, &mut reencoded)
            .unwrap();

        assert_eq!(der, reencoded);
    }

    #[test]
    fn ca_chain_is_included() {
        let mut credentials = ecdsa_credentials();
        let (ca_cert, _, _) = {
            let mut builder =
                X509CertificateBuilder::new(KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1));
            builder
                .subject()
                .append_common_name_utf8_string("Chain CA")
                .unwrap();
            builder.validity_duration(chrono::Duration::hours(1));
            builder.create_with_random_keypair().unwrap()
        };
        credentials.ca_chain.push(ca_cert);

        let der = sign_detached(&credentials, b"chained").unwrap();
        let parsed = rfc5652::SignedData::decode_ber(&der).unwrap();

        assert_eq!(parsed.certificates.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn ed25519_keys_are_rejected() {
        let document =
            Ed25519KeyPair::generate_pkcs8(&ring::rand::SystemRandom::new()).unwrap();
        let signing_key = InMemorySigningKeyPair::from_pkcs8_der(document.as_ref()).unwrap();

        let credentials = SigningCredentials {
            signing_key,
            certificate: ecdsa_credentials().certificate,
            ca_chain: vec![],
        };

        let err = sign_detached(&credentials, b"nope").unwrap_err();
        assert!(matches!(err, DocsignError::UnsupportedKeyAlgorithm(_)));
    }
}
