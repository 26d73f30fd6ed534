// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Detached CMS document signing and verification.

This crate implements an HTTP service that produces and validates detached
[RFC 5652](https://tools.ietf.org/rfc/rfc5652.txt) signatures over arbitrary
binary documents. Documents are digested with SHA-512 and signed with
credentials loaded from password-protected PKCS#12 containers.

Functionality is split into small, independently usable pieces:

* [digest] computes document digests (the standalone *digest* operation).
* [credentials] loads and decrypts PKCS#12 bundles into usable key material.
* [signer] builds detached `SignedData` structures and serializes them to DER.
* [verifier] checks the cryptographic integrity of CMS signatures and
  extracts signer metadata.
* [staging] and [server] form the HTTP surface: multipart bodies are staged
  to disk, pipelines are invoked, and responses are rendered.

# IMPORTANT SECURITY LIMITATIONS

Verification here is *integrity only*: it confirms that each embedded
signature is mathematically valid for the signer certificate shipped inside
the CMS structure. It does **not** build a certification path to a trust
anchor, check expiration, or consult revocation data. Answering *do I trust
the signer* requires additional machinery that is deliberately out of scope;
see the verifier module documentation.
*/

pub mod config;
pub mod credentials;
pub mod digest;
mod error;
pub mod server;
pub mod signer;
pub mod staging;
pub mod verifier;

pub use error::DocsignError;
