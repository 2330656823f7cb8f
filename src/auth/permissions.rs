// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permissions required by protected operations.
//!
//! ## Catalogue
//!
//! | Marker | Permission |
//! |--------|------------|
//! | [`ViewMovies`] | `view:movies` |
//! | [`ViewActors`] | `view:actors` |
//! | [`PostMovies`] | `post:movies` |
//! | [`PostActors`] | `post:actors` |
//! | [`UpdateMovies`] | `update:movies` |
//! | [`UpdateActors`] | `update:actors` |
//! | [`DeleteMovies`] | `delete:movies` |
//! | [`DeleteActors`] | `delete:actors` |
//!
//! Which roles hold which permissions is configured at the identity
//! provider; this service only checks what the token says.

use super::{AuthError, TrustedClaims};

/// Permission string an operation requires, fixed when the operation is
/// registered.
///
/// Construction rejects the empty string; in a `const` context that is a
/// compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequiredPermission(&'static str);

impl RequiredPermission {
    pub const fn new(permission: &'static str) -> Self {
        assert!(
            !permission.is_empty(),
            "a protected operation must require a non-empty permission"
        );
        Self(permission)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for RequiredPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Succeed only if `required` is among the granted permissions.
///
/// Exact string membership: no prefixes, no wildcards, no case folding.
pub fn check_permission(
    claims: &TrustedClaims,
    required: RequiredPermission,
) -> Result<(), AuthError> {
    if claims.has_permission(required.as_str()) {
        Ok(())
    } else {
        Err(AuthError::PermissionNotGranted)
    }
}

/// Type-level permission, used to parameterise the
/// [`Authorized`](super::Authorized) extractor.
pub trait Permission: Send + Sync + 'static {
    const REQUIRED: RequiredPermission;
}

macro_rules! permissions {
    ($($(#[$meta:meta])* $marker:ident => $value:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl Permission for $marker {
                const REQUIRED: RequiredPermission = RequiredPermission::new($value);
            }
        )*
    };
}

permissions! {
    /// List movies
    ViewMovies => "view:movies";
    /// List actors
    ViewActors => "view:actors";
    /// Create movies
    PostMovies => "post:movies";
    /// Create actors
    PostActors => "post:actors";
    /// Modify movies
    UpdateMovies => "update:movies";
    /// Modify actors
    UpdateActors => "update:actors";
    /// Delete movies
    DeleteMovies => "delete:movies";
    /// Delete actors
    DeleteActors => "delete:actors";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_with(permissions: &[&str]) -> TrustedClaims {
        TrustedClaims::from_verified(json!({
            "iss": "https://issuer.example.com/",
            "aud": ["casting"],
            "exp": 1_900_000_000,
            "permissions": permissions,
        }))
        .unwrap()
    }

    #[test]
    fn granted_permission_passes() {
        let claims = claims_with(&["post:movies", "view:movies"]);
        assert_eq!(check_permission(&claims, ViewMovies::REQUIRED), Ok(()));
    }

    #[test]
    fn missing_permission_is_not_granted() {
        let claims = claims_with(&["view:movies"]);
        assert_eq!(
            check_permission(&claims, PostMovies::REQUIRED),
            Err(AuthError::PermissionNotGranted)
        );
    }

    #[test]
    fn empty_permission_set_grants_nothing() {
        let claims = claims_with(&[]);
        for required in [ViewMovies::REQUIRED, DeleteActors::REQUIRED] {
            assert_eq!(
                check_permission(&claims, required),
                Err(AuthError::PermissionNotGranted)
            );
        }
    }

    #[test]
    fn no_prefix_or_wildcard_matching() {
        let claims = claims_with(&["view:*", "view", "view:movies:all"]);
        assert_eq!(
            check_permission(&claims, ViewMovies::REQUIRED),
            Err(AuthError::PermissionNotGranted)
        );
    }

    #[test]
    fn catalogue_strings() {
        assert_eq!(UpdateActors::REQUIRED.as_str(), "update:actors");
        assert_eq!(DeleteMovies::REQUIRED.to_string(), "delete:movies");
    }

    #[test]
    #[should_panic(expected = "non-empty permission")]
    fn empty_required_permission_is_rejected() {
        let permission = String::new();
        let leaked: &'static str = Box::leak(permission.into_boxed_str());
        let _ = RequiredPermission::new(leaked);
    }
}
