// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization of protected operations.
//!
//! [`Authorizer`] runs the whole pipeline for one request:
//!
//! ```text
//! Authorization header ─▶ parse_authorization ─▶ TokenValidator ─▶ check_permission
//!                                                   │
//!                                              KeySetCache
//! ```
//!
//! Any failure short-circuits with an [`AuthError`]; the protected operation
//! only ever runs with [`TrustedClaims`] in hand.

use std::future::Future;
use std::sync::Arc;

use axum::http::HeaderMap;

use super::{
    bearer_from_headers, check_permission, parse_authorization, AuthError, BearerToken,
    KeySetCache, RequiredPermission, TokenValidator, TrustedClaims,
};

/// Shared authorization pipeline. Clones share one validator.
#[derive(Clone)]
pub struct Authorizer {
    validator: Arc<TokenValidator>,
}

impl Authorizer {
    pub fn new(validator: TokenValidator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    pub fn key_set(&self) -> &KeySetCache {
        self.validator.key_set()
    }

    /// Parse and verify the credential without checking any permission.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<TrustedClaims, AuthError> {
        let token = parse_authorization(header)?;
        self.validator.validate(&token).await
    }

    /// Full pipeline for a raw header value.
    pub async fn authorize(
        &self,
        header: Option<&str>,
        required: RequiredPermission,
    ) -> Result<TrustedClaims, AuthError> {
        let token = parse_authorization(header)?;
        self.authorize_token(&token, required).await
    }

    /// Full pipeline for a request's headers.
    pub async fn authorize_headers(
        &self,
        headers: &HeaderMap,
        required: RequiredPermission,
    ) -> Result<TrustedClaims, AuthError> {
        let token = bearer_from_headers(headers)?;
        self.authorize_token(&token, required).await
    }

    async fn authorize_token(
        &self,
        token: &BearerToken,
        required: RequiredPermission,
    ) -> Result<TrustedClaims, AuthError> {
        let claims = self.validator.validate(token).await?;
        check_permission(&claims, required)?;
        tracing::debug!(
            sub = claims.subject().unwrap_or("-"),
            permission = %required,
            "request authorized"
        );
        Ok(claims)
    }

    /// Authorize, then run `operation` with the verified claims.
    ///
    /// `operation` is not called at all when authorization fails.
    pub async fn protect<F, Fut, T>(
        &self,
        header: Option<&str>,
        required: RequiredPermission,
        operation: F,
    ) -> Result<T, AuthError>
    where
        F: FnOnce(TrustedClaims) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(header, required).await?;
        Ok(operation(claims).await)
    }
}
