// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    cryptographic_message_syntax::CmsError,
    thiserror::Error,
    x509_certificate::{KeyAlgorithm, X509CertificateError},
};

/// Unified error type for the signing service.
#[derive(Debug, Error)]
pub enum DocsignError {
    #[error("unknown command")]
    CliUnknownCommand,

    #[error("bad argument")]
    CliBadArgument,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    #[error("X.509 certificate error: {0}")]
    X509(#[from] X509CertificateError),

    #[error("PKCS#12 error: {0}")]
    PfxParse(String),

    #[error("PKCS#12 password incorrect")]
    PfxBadPassword,

    #[error("no certificate in the PKCS#12 bundle matches the signing key")]
    PfxKeyCertificateMismatch,

    #[error("cannot sign with a {0:?} key")]
    UnsupportedKeyAlgorithm(KeyAlgorithm),

    #[error("unspecified cryptography error during signature creation")]
    SignatureCreation,

    #[error("signer certificate not found in the CMS structure")]
    CertificateNotFound,

    #[error("signature verification failed")]
    SignatureVerification,

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("signature did not verify")]
    VerificationFailed,
}
