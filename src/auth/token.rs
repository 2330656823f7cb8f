// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Structural decoding of a compact JWS before any trust is established.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

use super::{AuthError, BearerToken};

/// JOSE header fields the validator looks at.
///
/// `alg` is kept as the raw string so that values `jsonwebtoken` has no
/// variant for (`none`, typos) still decode and are rejected as
/// [`AuthError::UnsupportedAlgorithm`] rather than as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct UnverifiedHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// A token split into its three segments, each base64url-decoded.
///
/// Nothing in here is trusted. It exists so the validator can pick an
/// algorithm and a key before checking the signature.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    pub header: UnverifiedHeader,
    pub payload: serde_json::Map<String, serde_json::Value>,
    pub signature: Vec<u8>,
}

impl UnverifiedToken {
    pub fn decode(token: &BearerToken) -> Result<Self, AuthError> {
        let segments: Vec<&str> = token.as_str().split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(AuthError::MalformedToken);
        };

        let header = decode_segment(header)?;
        let payload = decode_segment(payload)?;
        let signature = decode_segment(signature)?;

        let header: UnverifiedHeader =
            serde_json::from_slice(&header).map_err(|_| AuthError::MalformedToken)?;
        let payload = serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedToken)?;

        Ok(Self {
            header,
            payload,
            signature,
        })
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    if segment.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::parse_authorization;

    fn b64(value: &str) -> String {
        URL_SAFE_NO_PAD.encode(value.as_bytes())
    }

    fn bearer(token: &str) -> BearerToken {
        parse_authorization(Some(&format!("Bearer {token}"))).unwrap()
    }

    #[test]
    fn decodes_three_segments() {
        let token = format!(
            "{}.{}.{}",
            b64(r#"{"alg":"RS256","kid":"k1","typ":"JWT"}"#),
            b64(r#"{"sub":"auth0|1","permissions":["view:movies"]}"#),
            b64("sig")
        );

        let decoded = UnverifiedToken::decode(&bearer(&token)).unwrap();
        assert_eq!(decoded.header.alg, "RS256");
        assert_eq!(decoded.header.kid.as_deref(), Some("k1"));
        assert_eq!(decoded.payload["sub"], "auth0|1");
        assert_eq!(decoded.signature, b"sig");
    }

    #[test]
    fn garbage_segments_are_malformed() {
        let result = UnverifiedToken::decode(&bearer("abc.def.ghi"));
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn invalid_base64_segment_is_malformed() {
        let payload = b64("{}");
        for header in ["a", "a$c", "ab==", "ab+/"] {
            let token = format!("{header}.{payload}.{payload}");
            assert!(
                matches!(
                    UnverifiedToken::decode(&bearer(&token)),
                    Err(AuthError::MalformedToken)
                ),
                "{header:?}"
            );
        }
    }

    #[test]
    fn empty_signature_is_malformed() {
        let token = format!("{}.{}.", b64(r#"{"alg":"RS256"}"#), b64("{}"));
        assert!(matches!(
            UnverifiedToken::decode(&bearer(&token)),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let header = b64(r#"{"alg":"RS256"}"#);
        for token in [header.clone(), format!("{header}.{header}"), format!("{header}.a.b.c")] {
            assert!(matches!(
                UnverifiedToken::decode(&bearer(&token)),
                Err(AuthError::MalformedToken)
            ));
        }
    }

    #[test]
    fn non_json_header_is_malformed() {
        let token = format!("{}.{}.{}", b64("not json"), b64("{}"), b64("sig"));
        assert!(matches!(
            UnverifiedToken::decode(&bearer(&token)),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn unknown_algorithm_still_decodes() {
        let token = format!("{}.{}.{}", b64(r#"{"alg":"none"}"#), b64("{}"), b64("x"));
        let decoded = UnverifiedToken::decode(&bearer(&token)).unwrap();
        assert_eq!(decoded.header.alg, "none");
    }
}
