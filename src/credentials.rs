// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signing credential loading from PKCS#12 containers.

use {
    crate::DocsignError,
    log::debug,
    std::path::Path,
    x509_certificate::{CapturedX509Certificate, InMemorySigningKeyPair, Sign},
    zeroize::Zeroizing,
};

/// A decrypted signing credential.
///
/// Holds the private key, the end-entity certificate it belongs to, and the
/// CA chain shipped alongside them. Instances live for a single signing
/// operation; decrypted key bytes inside the PKCS#12 parse are zeroized as
/// soon as the key pair is constructed.
#[derive(Debug)]
pub struct SigningCredentials {
    /// The private key used to produce signatures.
    pub signing_key: InMemorySigningKeyPair,

    /// Certificate whose public key corresponds to [Self::signing_key].
    pub certificate: CapturedX509Certificate,

    /// Additional certificates from the bundle, in container order.
    ///
    /// Usually the issuing chain of the end-entity certificate. Possibly
    /// empty; nothing here relies on its ordering.
    pub ca_chain: Vec<CapturedX509Certificate>,
}

/// Convert a password to the BMPString form used by PKCS#12 key derivation.
fn bmp_string(s: &str) -> Zeroizing<Vec<u8>> {
    let utf16: Vec<u16> = s.encode_utf16().collect();

    let mut bytes = Vec::with_capacity(utf16.len() * 2 + 2);
    for c in utf16 {
        bytes.push((c / 256) as u8);
        bytes.push((c % 256) as u8);
    }
    bytes.push(0x00);
    bytes.push(0x00);

    Zeroizing::new(bytes)
}

impl SigningCredentials {
    /// Load and decrypt a PKCS#12 file.
    pub fn from_pkcs12_path(
        path: impl AsRef<Path>,
        password: &str,
    ) -> Result<Self, DocsignError> {
        let data = std::fs::read(path.as_ref())?;

        Self::from_pkcs12_der(&data, password)
    }

    /// Parse PKCS#12 (PFX) data into a signing credential.
    ///
    /// The MAC is verified with the supplied password before any content is
    /// decrypted. A MAC or key-decryption failure reports
    /// [DocsignError::PfxBadPassword]; no further distinction is made
    /// between a wrong password and corrupted encrypted content.
    pub fn from_pkcs12_der(data: &[u8], password: &str) -> Result<Self, DocsignError> {
        let pfx = p12::PFX::parse(data).map_err(|e| {
            DocsignError::PfxParse(format!("data does not appear to be PKCS#12: {:?}", e))
        })?;

        if !pfx.verify_mac(password) {
            return Err(DocsignError::PfxBadPassword);
        }

        let data = match pfx.auth_safe {
            p12::ContentInfo::Data(data) => data,
            _ => {
                return Err(DocsignError::PfxParse(
                    "unexpected PKCS#12 authSafe content".to_string(),
                ));
            }
        };

        let content_infos = yasna::parse_der(&data, |reader| {
            reader.collect_sequence_of(p12::ContentInfo::parse)
        })
        .map_err(|e| {
            DocsignError::PfxParse(format!("failed parsing inner ContentInfo: {:?}", e))
        })?;

        let bmp_password = bmp_string(password);

        let mut certificates = Vec::new();
        let mut signing_key = None;

        for content in content_infos {
            let bags_data = match content {
                p12::ContentInfo::Data(inner) => inner,
                p12::ContentInfo::EncryptedData(encrypted) => encrypted
                    .data(bmp_password.as_slice())
                    .ok_or(DocsignError::PfxBadPassword)?,
                p12::ContentInfo::OtherContext(_) => {
                    return Err(DocsignError::PfxParse(
                        "unexpected content type in inner PFX data".to_string(),
                    ));
                }
            };

            let bags = yasna::parse_ber(&bags_data, |reader| {
                reader.collect_sequence_of(p12::SafeBag::parse)
            })
            .map_err(|e| {
                DocsignError::PfxParse(format!("failed parsing SafeBag within inner data: {:?}", e))
            })?;

            for bag in bags {
                match bag.bag {
                    p12::SafeBagKind::CertBag(p12::CertBag::X509(cert_data)) => {
                        certificates.push(CapturedX509Certificate::from_der(cert_data)?);
                    }
                    p12::SafeBagKind::CertBag(p12::CertBag::SDSI(_)) => {
                        return Err(DocsignError::PfxParse(
                            "unexpected SDSI certificate data".to_string(),
                        ));
                    }
                    p12::SafeBagKind::Pkcs8ShroudedKeyBag(key_bag) => {
                        let decrypted = Zeroizing::new(
                            key_bag
                                .decrypt(bmp_password.as_slice())
                                .ok_or(DocsignError::PfxBadPassword)?,
                        );

                        signing_key =
                            Some(InMemorySigningKeyPair::from_pkcs8_der(decrypted.as_slice())?);
                    }
                    // Vendor-specific bags are skipped; a bundle does not
                    // stop loading because of extras we don't consume.
                    p12::SafeBagKind::OtherBagKind(_) => {}
                }
            }
        }

        let signing_key = signing_key.ok_or_else(|| {
            DocsignError::PfxParse("no private key found in PKCS#12 data".to_string())
        })?;

        // The end-entity certificate is the one carrying the signing key's
        // public key; everything else is chain material.
        let public_key = signing_key.public_key_data();

        let mut certificate = None;
        let mut ca_chain = Vec::new();

        for cert in certificates {
            if certificate.is_none() && cert.public_key_data() == public_key {
                certificate = Some(cert);
            } else {
                ca_chain.push(cert);
            }
        }

        let certificate = certificate.ok_or(DocsignError::PfxKeyCertificateMismatch)?;

        debug!(
            "loaded PKCS#12 credential with {} chain certificate(s)",
            ca_chain.len()
        );

        Ok(Self {
            signing_key,
            certificate,
            ca_chain,
        })
    }
}
