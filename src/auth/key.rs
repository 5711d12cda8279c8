// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RSA verification key loading.
//!
//! The key is configured once at startup, either as a PEM document or as the
//! bare base64 of an X.509 `SubjectPublicKeyInfo` DER blob. Both end up as a
//! `jsonwebtoken::DecodingKey` shared read-only by every request.

use base64::{engine::general_purpose::STANDARD, Engine};
use jsonwebtoken::DecodingKey;
use thiserror::Error;

/// PEM tag for an X.509 `SubjectPublicKeyInfo`.
const SPKI_PEM_TAG: &str = "PUBLIC KEY";

/// Errors while loading the verification key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("verification key is empty")]
    Empty,
    #[error("verification key is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("verification key is not valid PEM: {0}")]
    Pem(#[from] pem::PemError),
    #[error("verification key is not an RSA public key: {0}")]
    Rsa(#[from] jsonwebtoken::errors::Error),
}

/// The single public key tokens are verified against.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct VerificationKey {
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey").finish_non_exhaustive()
    }
}

impl VerificationKey {
    /// Load from a PEM document (`PUBLIC KEY` or `RSA PUBLIC KEY`).
    pub fn from_pem(document: &str) -> Result<Self, KeyError> {
        let document = document.trim();
        if document.is_empty() {
            return Err(KeyError::Empty);
        }
        // Parse first so PEM framing errors are reported as such
        pem::parse(document)?;
        let decoding_key = DecodingKey::from_rsa_pem(document.as_bytes())?;
        Ok(Self { decoding_key })
    }

    /// Load from base64 `SubjectPublicKeyInfo` DER. Whitespace is ignored.
    pub fn from_base64_der(encoded: &str) -> Result<Self, KeyError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(KeyError::Empty);
        }

        let der = STANDARD.decode(compact)?;
        let document = pem::encode(&pem::Pem::new(SPKI_PEM_TAG, der));
        let decoding_key = DecodingKey::from_rsa_pem(document.as_bytes())?;
        Ok(Self { decoding_key })
    }

    /// Accept either form, telling them apart by the PEM armor.
    pub fn parse(value: &str) -> Result<Self, KeyError> {
        if value.contains("-----BEGIN") {
            Self::from_pem(value)
        } else {
            Self::from_base64_der(value)
        }
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support;

    #[test]
    fn loads_pem_public_key() {
        assert!(VerificationKey::from_pem(test_support::PUBLIC_KEY_PEM).is_ok());
    }

    #[test]
    fn loads_base64_der_public_key() {
        assert!(VerificationKey::from_base64_der(test_support::PUBLIC_KEY_DER_B64).is_ok());
    }

    #[test]
    fn base64_form_tolerates_line_breaks() {
        let wrapped: String = test_support::PUBLIC_KEY_DER_B64
            .trim()
            .as_bytes()
            .chunks(60)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(VerificationKey::from_base64_der(&wrapped).is_ok());
    }

    #[test]
    fn parse_detects_format() {
        assert!(VerificationKey::parse(test_support::PUBLIC_KEY_PEM).is_ok());
        assert!(VerificationKey::parse(test_support::PUBLIC_KEY_DER_B64).is_ok());
    }

    #[test]
    fn rejects_empty_key() {
        assert!(matches!(
            VerificationKey::parse("   "),
            Err(KeyError::Empty)
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            VerificationKey::from_base64_der("not base64 !!"),
            Err(KeyError::Base64(_))
        ));
    }

    #[test]
    fn debug_hides_key_material() {
        let key = VerificationKey::from_pem(test_support::PUBLIC_KEY_PEM).unwrap();
        assert_eq!(format!("{key:?}"), "VerificationKey { .. }");
    }
}
