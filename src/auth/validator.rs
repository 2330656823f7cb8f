// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! Checks run in a fixed order and the first failure is reported:
//!
//! 1. structure (three base64url segments, JSON header and payload)
//! 2. algorithm (must be the single trusted, asymmetric algorithm)
//! 3. key resolution through the [`KeySetCache`]
//! 4. signature
//! 5. `exp`, `nbf`, `iss`, `aud`

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, Validation};

use super::token::UnverifiedToken;
use super::{AuthError, BearerToken, KeySetCache, TrustedClaims};

/// Clock skew tolerance. None by default: a token is expired the second its
/// `exp` passes.
pub const DEFAULT_LEEWAY_SECS: u64 = 0;

/// Whether `algorithm` is a public-key signature algorithm.
///
/// HMAC algorithms are excluded: accepting them next to asymmetric keys is
/// the classic key-confusion hole.
pub fn is_asymmetric(algorithm: Algorithm) -> bool {
    !matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Verifies bearer tokens and produces [`TrustedClaims`].
#[derive(Clone)]
pub struct TokenValidator {
    keys: KeySetCache,
    validation: Validation,
}

impl TokenValidator {
    /// Create a validator trusting the algorithm configured on `keys`.
    ///
    /// Tokens must carry `iss == issuer` and an `aud` containing `audience`.
    pub fn new(keys: KeySetCache, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = DEFAULT_LEEWAY_SECS;

        Self { keys, validation }
    }

    /// Set the clock skew tolerance applied to `exp` and `nbf`.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.validation.leeway = seconds;
        self
    }

    pub fn key_set(&self) -> &KeySetCache {
        &self.keys
    }

    pub async fn validate(&self, token: &BearerToken) -> Result<TrustedClaims, AuthError> {
        let unverified = UnverifiedToken::decode(token)?;

        let trusted = self.keys.algorithm();
        let declared: Algorithm = unverified
            .header
            .alg
            .parse()
            .map_err(|_| AuthError::UnsupportedAlgorithm)?;
        if declared != trusted || !is_asymmetric(declared) {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let kid = unverified
            .header
            .kid
            .as_deref()
            .ok_or(AuthError::MalformedToken)?;
        let key = self.keys.get(kid).await?;

        let token_data = decode::<serde_json::Value>(token.as_str(), &key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?;

        TrustedClaims::from_verified(token_data.claims)
    }
}

fn map_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidKeyFormat => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
            "iss" => AuthError::InvalidIssuer,
            "aud" => AuthError::InvalidAudience,
            _ => AuthError::MalformedToken,
        },
        _ => AuthError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::parse_authorization;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use std::time::Duration;
    use url::Url;

    // Points at a port nothing listens on; tests here never get far enough
    // to need a key.
    fn validator(algorithm: Algorithm) -> TokenValidator {
        let keys = KeySetCache::new(
            Url::parse("http://127.0.0.1:9/.well-known/jwks.json").unwrap(),
            algorithm,
            Duration::from_millis(200),
        )
        .unwrap();
        TokenValidator::new(keys, "https://issuer.example.com/", "casting")
    }

    fn token(header: &str) -> BearerToken {
        let b64 = |s: &str| URL_SAFE_NO_PAD.encode(s.as_bytes());
        parse_authorization(Some(&format!(
            "Bearer {}.{}.{}",
            b64(header),
            b64(r#"{"sub":"x"}"#),
            b64("signature")
        )))
        .unwrap()
    }

    #[test]
    fn hmac_is_not_asymmetric() {
        assert!(!is_asymmetric(Algorithm::HS256));
        assert!(is_asymmetric(Algorithm::RS256));
        assert!(is_asymmetric(Algorithm::ES256));
        assert!(is_asymmetric(Algorithm::EdDSA));
    }

    #[tokio::test]
    async fn none_algorithm_is_rejected() {
        let result = validator(Algorithm::RS256)
            .validate(&token(r#"{"alg":"none","kid":"k"}"#))
            .await;
        assert_eq!(result, Err(AuthError::UnsupportedAlgorithm));
    }

    #[tokio::test]
    async fn hmac_algorithm_is_rejected() {
        let result = validator(Algorithm::RS256)
            .validate(&token(r#"{"alg":"HS256","kid":"k"}"#))
            .await;
        assert_eq!(result, Err(AuthError::UnsupportedAlgorithm));
    }

    #[tokio::test]
    async fn other_asymmetric_algorithm_is_rejected() {
        let result = validator(Algorithm::RS256)
            .validate(&token(r#"{"alg":"ES256","kid":"k"}"#))
            .await;
        assert_eq!(result, Err(AuthError::UnsupportedAlgorithm));
    }

    #[tokio::test]
    async fn hmac_is_rejected_even_when_configured() {
        let result = validator(Algorithm::HS256)
            .validate(&token(r#"{"alg":"HS256","kid":"k"}"#))
            .await;
        assert_eq!(result, Err(AuthError::UnsupportedAlgorithm));
    }

    #[tokio::test]
    async fn missing_kid_is_malformed() {
        let result = validator(Algorithm::RS256)
            .validate(&token(r#"{"alg":"RS256"}"#))
            .await;
        assert_eq!(result, Err(AuthError::MalformedToken));
    }

    #[tokio::test]
    async fn unreachable_key_set_is_unavailable() {
        let result = validator(Algorithm::RS256)
            .validate(&token(r#"{"alg":"RS256","kid":"k"}"#))
            .await;
        assert_eq!(result, Err(AuthError::KeySetUnavailable));
    }

    #[test]
    fn missing_claims_map_to_their_check() {
        assert_eq!(
            map_jwt_error(&ErrorKind::MissingRequiredClaim("iss".into())),
            AuthError::InvalidIssuer
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::MissingRequiredClaim("aud".into())),
            AuthError::InvalidAudience
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::MissingRequiredClaim("exp".into())),
            AuthError::MalformedToken
        );
    }
}
