// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Bearer-token authorization for the movies and actors API.
//!
//! ## Auth Flow
//!
//! 1. The client obtains an access token from the identity provider
//! 2. The client sends `Authorization: Bearer <JWT>`
//! 3. The server:
//!    - splits the header (`header`)
//!    - decodes the token segments without trusting them (`token`)
//!    - checks the algorithm, resolves the signing key from the cached
//!      JWKS (`jwks`), verifies signature, expiry, issuer, audience
//!      (`validator`)
//!    - checks the operation's required permission (`permissions`)
//! 4. The handler receives the verified [`TrustedClaims`]
//!
//! ## Security
//!
//! - Exactly one asymmetric algorithm is trusted; `none` and HMAC are refused
//! - Every failure denies the request
//! - JWKS is cached with TTL and refreshed once on unknown key ids
//! - No clock skew tolerance unless configured

pub mod claims;
pub mod error;
pub mod extractor;
pub mod header;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod token;
pub mod validator;

pub use claims::TrustedClaims;
pub use error::AuthError;
pub use extractor::Authorized;
pub use header::{bearer_from_headers, parse_authorization, BearerToken};
pub use jwks::{KeySetCache, SigningKeySet};
pub use middleware::Authorizer;
pub use permissions::{
    check_permission, DeleteActors, DeleteMovies, Permission, PostActors, PostMovies,
    RequiredPermission, UpdateActors, UpdateMovies, ViewActors, ViewMovies,
};
pub use validator::TokenValidator;
