// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified token claims.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use super::AuthError;

/// Claims of a token that passed signature, algorithm, issuer, audience and
/// expiry validation.
///
/// Only [`TokenValidator`](super::TokenValidator) builds this type, so holding
/// one means the token was verified. It is handed to protected handlers as
/// explicit context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustedClaims {
    /// Subject (user ID at the identity provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer
    pub iss: String,

    /// Audience (a single string on the wire is accepted)
    #[serde(deserialize_with = "one_or_many")]
    pub aud: Vec<String>,

    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Authorized party
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// RBAC permissions granted by the identity provider
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    /// OAuth2 scope string, space-delimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Any other claims, untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TrustedClaims {
    /// Build from a payload that has already been verified.
    ///
    /// Entries of `scope` are folded into `permissions`. A payload without
    /// either claim yields an empty permission set.
    pub(crate) fn from_verified(payload: serde_json::Value) -> Result<Self, AuthError> {
        let mut claims: TrustedClaims =
            serde_json::from_value(payload).map_err(|_| AuthError::MalformedToken)?;

        if let Some(scope) = &claims.scope {
            claims
                .permissions
                .extend(scope.split_whitespace().map(str::to_string));
        }

        Ok(claims)
    }

    /// Whether `permission` is granted, by exact string match.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
