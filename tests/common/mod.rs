// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures: RSA test keys, a mock JWKS endpoint and token minting.

#![allow(dead_code)]

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use casting_agency_server::auth::{jwks, validator, Authorizer};
use casting_agency_server::config::AuthSettings;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::{pkcs8::DecodePublicKey, traits::PublicKeyParts, RsaPublicKey};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUER: &str = "https://casting.test/";
pub const AUDIENCE: &str = "casting";
pub const KID: &str = "casting-signing-1";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
pub const ROGUE_KEY: &[u8] = include_bytes!("../fixtures/rogue_key.pem");
const SIGNING_PUB: &str = include_str!("../fixtures/signing_key.pub.pem");
const ROGUE_PUB: &str = include_str!("../fixtures/rogue_key.pub.pem");

/// JWK for the public half of `tests/fixtures/signing_key.pem`.
pub fn signing_jwk(kid: &str) -> Value {
    rsa_jwk(kid, SIGNING_PUB)
}

/// JWK for the public half of `tests/fixtures/rogue_key.pem`.
pub fn rogue_jwk(kid: &str) -> Value {
    rsa_jwk(kid, ROGUE_PUB)
}

fn rsa_jwk(kid: &str, public_pem: &str) -> Value {
    let key = RsaPublicKey::from_public_key_pem(public_pem).expect("fixture public key");
    json!({
        "kty": "RSA",
        "kid": kid,
        "use": "sig",
        "alg": "RS256",
        "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
    })
}

pub fn jwks_body(keys: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "keys": keys }))
}

/// Mock identity provider serving `keys` on every request.
pub async fn jwks_server(keys: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(jwks_body(keys))
        .mount(&server)
        .await;
    server
}

/// Number of key-set fetches the mock has answered.
pub async fn fetch_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

pub fn settings_for(server: &MockServer, cache_ttl: Duration) -> AuthSettings {
    AuthSettings {
        issuer: ISSUER.to_string(),
        audience: AUDIENCE.to_string(),
        jwks_url: Url::parse(&format!("{}{JWKS_PATH}", server.uri())).unwrap(),
        algorithm: Algorithm::RS256,
        cache_ttl,
        fetch_timeout: Duration::from_secs(5),
        retry_backoff: jwks::DEFAULT_RETRY_BACKOFF,
        leeway_secs: validator::DEFAULT_LEEWAY_SECS,
    }
}

pub fn authorizer_for(server: &MockServer) -> Authorizer {
    settings_for(server, Duration::from_secs(300))
        .build_authorizer()
        .unwrap()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims of a valid, unexpired token granting `permissions`.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|casting-director",
        "iss": ISSUER,
        "aud": [AUDIENCE, "https://casting.test/userinfo"],
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

/// Sign `claims` with RS256 using the PKCS#8 PEM `private_key`.
pub fn mint(claims: &Value, kid: Option<&str>, private_key: &[u8]) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(private_key).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// A properly signed token for [`KID`].
pub fn token_with(permissions: &[&str]) -> String {
    mint(&claims(permissions), Some(KID), SIGNING_KEY)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
