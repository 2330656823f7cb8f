// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `Authorization` header parsing.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Bearer token taken verbatim from the `Authorization` header.
///
/// Nothing about the token content is checked here; see
/// [`UnverifiedToken`](super::token::UnverifiedToken) for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Split a raw header value into scheme and token.
///
/// The header must be exactly `Bearer <token>`: two parts separated by a
/// single space, the scheme matched case-sensitively, and a non-empty token.
pub fn parse_authorization(raw: Option<&str>) -> Result<BearerToken, AuthError> {
    let raw = raw.ok_or(AuthError::AuthorizationHeaderMissing)?;

    let parts: Vec<&str> = raw.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => {
            Ok(BearerToken((*token).to_string()))
        }
        _ => Err(AuthError::InvalidHeaderFormat),
    }
}

/// Read the `Authorization` header from a request and parse it.
///
/// A header whose bytes are not visible ASCII cannot be a bearer credential
/// and is reported as [`AuthError::InvalidHeaderFormat`].
pub fn bearer_from_headers(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
    match headers.get(AUTHORIZATION) {
        None => parse_authorization(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::InvalidHeaderFormat)?;
            parse_authorization(Some(value))
        }
    }
}
