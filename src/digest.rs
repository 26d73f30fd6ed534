// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document digest computation.
//!
//! The digest operation is its own deliverable: its lowercase hex output
//! documents a file's SHA-512 independently of the uppercase rendering the
//! verifier uses for signed attributes. The two are separate contracts.

use {crate::DocsignError, std::path::Path, x509_certificate::DigestAlgorithm};

/// Compute the SHA-512 digest of a byte slice, rendered as lowercase hex.
pub fn sha512_hex(data: &[u8]) -> String {
    let mut digester = DigestAlgorithm::Sha512.digester();
    digester.update(data);

    hex::encode(digester.finish().as_ref())
}

/// Compute the SHA-512 digest of a file's full contents.
///
/// Returns 128 lowercase hex characters. Fails if the path cannot be opened
/// or a read fails mid-stream.
pub fn sha512_hex_path(path: impl AsRef<Path>) -> Result<String, DocsignError> {
    Ok(hex::encode(
        DigestAlgorithm::Sha512.digest_path(path.as_ref())?,
    ))
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn known_digest() {
        assert_eq!(
            sha512_hex(b"123456"),
            "ba3253876aed6bc22d4a6ff53d8406c6ad864195ed144ab5c87621b6c233b548baeae6956df346ec8c17f5ea10f35ee3cbc514797ed7ddd3145464e2a0bab413"
        );
    }

    #[test]
    fn empty_digest() {
        assert_eq!(
            sha512_hex(b""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn file_digest_matches_slice_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"123456").unwrap();
        file.flush().unwrap();

        let digest = sha512_hex_path(file.path()).unwrap();
        assert_eq!(digest, sha512_hex(b"123456"));
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(sha512_hex_path("/nonexistent/docsign-digest-input").is_err());
    }
}
