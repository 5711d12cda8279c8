// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixture keys and token minting for tests.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;

use super::{TokenValidator, VerificationKey};

pub(crate) const PRIVATE_KEY_PEM: &str = include_str!("../../testdata/signing_key.pem");
pub(crate) const PUBLIC_KEY_PEM: &str = include_str!("../../testdata/signing_key.pub.pem");
pub(crate) const PUBLIC_KEY_DER_B64: &str = include_str!("../../testdata/signing_key.pub.der.b64");
pub(crate) const FOREIGN_PRIVATE_KEY_PEM: &str = include_str!("../../testdata/foreign_key.pem");

/// Sign `claims` with the fixture key the validator trusts.
pub(crate) fn sign(claims: &Value) -> String {
    sign_with(claims, PRIVATE_KEY_PEM, Algorithm::RS256)
}

/// Sign `claims` with an unrelated RSA key.
pub(crate) fn sign_foreign(claims: &Value) -> String {
    sign_with(claims, FOREIGN_PRIVATE_KEY_PEM, Algorithm::RS256)
}

pub(crate) fn sign_with(claims: &Value, private_pem: &str, algorithm: Algorithm) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    encode(&Header::new(algorithm), claims, &key).unwrap()
}

pub(crate) fn validator() -> TokenValidator {
    TokenValidator::new(VerificationKey::from_pem(PUBLIC_KEY_PEM).unwrap())
}
