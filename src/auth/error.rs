// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors and their wire representation.
//!
//! `IntoResponse` below is the only place an [`AuthError`] becomes an HTTP
//! response. Every stage of the pipeline returns the typed error and leaves
//! formatting to this boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authorization failure.
///
/// Each variant maps to a fixed HTTP status and a stable machine-readable
/// code. Stages fail fast, so the variant always names the first violated
/// check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Authorization header is expected")]
    AuthorizationHeaderMissing,
    /// Header is not of the form `Bearer <token>`
    #[error("Authorization header must be of the form 'Bearer <token>'")]
    InvalidHeaderFormat,
    /// Token is not three base64url segments with a readable header and payload
    #[error("Unable to parse authentication token")]
    MalformedToken,
    /// Token declares an algorithm other than the trusted one
    #[error("Token signing algorithm is not accepted")]
    UnsupportedAlgorithm,
    /// Key id absent from the key set, even after a refresh
    #[error("Unable to find the appropriate signing key")]
    SigningKeyNotFound,
    /// Key set could not be fetched and nothing is cached
    #[error("Signing keys are currently unavailable")]
    KeySetUnavailable,
    /// Signature does not verify against the resolved key
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// `exp` is in the past
    #[error("Token expired")]
    TokenExpired,
    /// `nbf` is in the future
    #[error("Token is not yet valid")]
    TokenNotYetValid,
    /// `iss` differs from the configured issuer
    #[error("Incorrect claims, please check the issuer")]
    InvalidIssuer,
    /// `aud` does not contain the configured audience
    #[error("Incorrect claims, please check the audience")]
    InvalidAudience,
    /// Required permission is not granted by the token
    #[error("Permission not found")]
    PermissionNotGranted,
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: u16,
    code: &'static str,
    message: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthorizationHeaderMissing => "authorization_header_missing",
            AuthError::InvalidHeaderFormat => "invalid_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::SigningKeyNotFound => "signing_key_not_found",
            AuthError::KeySetUnavailable => "key_set_unavailable",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::PermissionNotGranted => "permission_not_granted",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthorizationHeaderMissing
            | AuthError::InvalidHeaderFormat
            | AuthError::MalformedToken
            | AuthError::UnsupportedAlgorithm
            | AuthError::SigningKeyNotFound
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::TokenNotYetValid
            | AuthError::InvalidIssuer
            | AuthError::InvalidAudience => StatusCode::UNAUTHORIZED,
            AuthError::PermissionNotGranted => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(code = self.error_code(), status = status.as_u16(), "request rejected");
        let body = Json(AuthErrorBody {
            success: false,
            error: status.as_u16(),
            code: self.error_code(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
