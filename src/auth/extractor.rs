// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for permission-gated handlers.
//!
//! Put `Authorized<P>` first in a handler's argument list to require the
//! permission `P`:
//!
//! ```rust,ignore
//! async fn list_movies(
//!     Authorized(claims, _): Authorized<ViewMovies>,
//!     State(state): State<AppState>,
//! ) -> Result<Json<MoviesResponse>, ApiError> {
//!     // claims are verified and carry `view:movies`
//! }
//! ```
//!
//! Extraction failure rejects the request with the [`AuthError`] response,
//! so the handler body does not run.

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{AuthError, Authorizer, Permission, TrustedClaims};

/// Verified claims of a caller holding permission `P`.
pub struct Authorized<P: Permission>(pub TrustedClaims, pub PhantomData<fn() -> P>);

impl<P: Permission> Authorized<P> {
    pub fn claims(&self) -> &TrustedClaims {
        &self.0
    }

    pub fn into_claims(self) -> TrustedClaims {
        self.0
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    P: Permission,
    Authorizer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authorizer = Authorizer::from_ref(state);
        let claims = authorizer
            .authorize_headers(&parts.headers, P::REQUIRED)
            .await?;
        Ok(Authorized(claims, PhantomData))
    }
}
