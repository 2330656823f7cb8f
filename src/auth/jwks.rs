// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - The set is fetched on first use and again once it is older than the TTL
//! - A key id missing from the cached set triggers one refresh, never more
//! - A failed fetch falls back to the last good set when there is one
//! - A fetched set is built completely before it replaces the old one;
//!   readers holding the old `Arc` keep using it undisturbed
//! - Concurrent refreshes are funnelled through one gate, and a caller that
//!   waited on the gate reuses the outcome of the attempt made while it
//!   waited, success or failure
//! - After a failed fetch no new fetch is made for the retry backoff

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default bound on a single JWKS fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause after a failed fetch, during which the last set is served.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Verification keys indexed by key id.
///
/// Only keys usable with the trusted algorithm are admitted.
#[derive(Clone, Default)]
pub struct SigningKeySet {
    keys: BTreeMap<String, DecodingKey>,
}

impl SigningKeySet {
    /// Build a key set from a JWKS document, skipping entries that cannot
    /// verify `algorithm` signatures.
    pub fn from_jwks(jwks: &JwkSet, algorithm: Algorithm) -> Self {
        let mut keys = BTreeMap::new();

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                tracing::warn!("skipping JWK without kid");
                continue;
            };

            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                tracing::debug!(kid, "skipping encryption JWK");
                continue;
            }

            if !fits_algorithm(algorithm, &jwk.algorithm) {
                tracing::warn!(kid, ?algorithm, "skipping JWK of a different key type");
                continue;
            }

            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid.to_string(), key);
                }
                Err(e) => tracing::warn!(kid, error = %e, "skipping unusable JWK"),
            }
        }

        Self { keys }
    }

    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn fits_algorithm(algorithm: Algorithm, parameters: &AlgorithmParameters) -> bool {
    use Algorithm::*;

    match parameters {
        AlgorithmParameters::RSA(_) => {
            matches!(algorithm, RS256 | RS384 | RS512 | PS256 | PS384 | PS512)
        }
        AlgorithmParameters::EllipticCurve(_) => matches!(algorithm, ES256 | ES384),
        AlgorithmParameters::OctetKeyPair(_) => algorithm == EdDSA,
        _ => false,
    }
}

/// Published key set plus the moment it was fetched.
#[derive(Clone)]
struct CacheEntry {
    keys: Arc<SigningKeySet>,
    fetched_at: Instant,
}

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0} from JWKS endpoint")]
    Status(reqwest::StatusCode),
}

/// JWKS cache shared by every request.
///
/// Cloning is cheap; clones share the cached set.
#[derive(Clone)]
pub struct KeySetCache {
    /// JWKS URL (identity provider's well-known endpoint)
    jwks_url: Url,
    /// The only algorithm keys are admitted for
    algorithm: Algorithm,
    /// Cache TTL
    cache_ttl: Duration,
    /// Pause after a failed fetch before the next one
    retry_backoff: Duration,
    /// HTTP client, carries the fetch timeout
    client: reqwest::Client,
    /// Currently published set
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Completed fetch attempts, successful or not
    attempts: Arc<AtomicU64>,
    /// Held for the duration of a fetch; guards the time of the last failure
    refresh_gate: Arc<Mutex<Option<Instant>>>,
}

impl KeySetCache {
    /// Create a new cache for the given JWKS URL.
    ///
    /// `fetch_timeout` bounds each request to the identity provider.
    pub fn new(
        jwks_url: Url,
        algorithm: Algorithm,
        fetch_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;

        Ok(Self {
            jwks_url,
            algorithm,
            cache_ttl: DEFAULT_CACHE_TTL,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            client,
            cache: Arc::new(RwLock::new(None)),
            attempts: Arc::new(AtomicU64::new(0)),
            refresh_gate: Arc::new(Mutex::new(None)),
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set how long a failed fetch suppresses further fetches.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Resolve the verification key for `kid`.
    ///
    /// Fails with [`AuthError::KeySetUnavailable`] when no set can be
    /// obtained at all, and with [`AuthError::SigningKeyNotFound`] when the
    /// id is absent from the set even after one refresh.
    pub async fn get(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        // Any attempt completing after this point answers this call.
        let seen = self.attempts.load(Ordering::Acquire);

        let entry = match self.fresh_entry().await {
            Some(entry) => entry,
            None => self.refresh_stale(seen).await?,
        };

        if let Some(key) = entry.keys.get(kid) {
            return Ok(key.clone());
        }

        tracing::debug!(kid, "key id not in cached set, refreshing once");
        let entry = self.refresh_after(seen).await?;
        entry
            .keys
            .get(kid)
            .cloned()
            .ok_or(AuthError::SigningKeyNotFound)
    }

    /// Force a fetch and publish the result.
    ///
    /// Returns the number of usable keys in the new set.
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        let mut last_failure = self.refresh_gate.lock().await;
        let result = self.fetch().await;
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(keys) => {
                *last_failure = None;
                let count = keys.len();
                self.publish(keys).await;
                Ok(count)
            }
            Err(e) => {
                *last_failure = Some(Instant::now());
                tracing::warn!(url = %self.jwks_url, error = %e, "JWKS fetch failed");
                Err(AuthError::KeySetUnavailable)
            }
        }
    }

    /// Check if JWKS is currently cached and within its TTL.
    pub async fn is_cached(&self) -> bool {
        self.fresh_entry().await.is_some()
    }

    async fn current(&self) -> Option<CacheEntry> {
        self.cache.read().await.clone()
    }

    async fn fresh_entry(&self) -> Option<CacheEntry> {
        self.current()
            .await
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
    }

    /// Whatever is published, stale or not.
    async fn published(&self) -> Result<CacheEntry, AuthError> {
        self.current().await.ok_or(AuthError::KeySetUnavailable)
    }

    /// Refresh because the set is missing or expired.
    async fn refresh_stale(&self, seen: u64) -> Result<CacheEntry, AuthError> {
        let mut last_failure = self.refresh_gate.lock().await;

        if let Some(entry) = self.fresh_entry().await {
            return Ok(entry);
        }

        self.fetch_unless_answered(seen, &mut last_failure).await
    }

    /// Refresh because a key id was missing from a set current at attempt `seen`.
    async fn refresh_after(&self, seen: u64) -> Result<CacheEntry, AuthError> {
        let mut last_failure = self.refresh_gate.lock().await;
        self.fetch_unless_answered(seen, &mut last_failure).await
    }

    /// Caller holds the refresh gate.
    ///
    /// An attempt that completed after `seen` already answered the caller,
    /// and a recent failure suppresses fetching; both serve the published set.
    async fn fetch_unless_answered(
        &self,
        seen: u64,
        last_failure: &mut Option<Instant>,
    ) -> Result<CacheEntry, AuthError> {
        if self.attempts.load(Ordering::Acquire) != seen {
            return self.published().await;
        }
        if let Some(failed_at) = *last_failure {
            if failed_at.elapsed() < self.retry_backoff {
                tracing::debug!(url = %self.jwks_url, "JWKS fetch backing off");
                return self.published().await;
            }
        }

        let result = self.fetch().await;
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(keys) => {
                *last_failure = None;
                Ok(self.publish(keys).await)
            }
            Err(e) => {
                *last_failure = Some(Instant::now());
                match self.current().await {
                    Some(entry) => {
                        tracing::warn!(
                            url = %self.jwks_url,
                            error = %e,
                            age_secs = entry.fetched_at.elapsed().as_secs(),
                            "JWKS fetch failed, serving last known set"
                        );
                        Ok(entry)
                    }
                    None => {
                        tracing::error!(url = %self.jwks_url, error = %e, "JWKS fetch failed, no cached set");
                        Err(AuthError::KeySetUnavailable)
                    }
                }
            }
        }
    }

    async fn publish(&self, keys: SigningKeySet) -> CacheEntry {
        let entry = CacheEntry {
            keys: Arc::new(keys),
            fetched_at: Instant::now(),
        };
        *self.cache.write().await = Some(entry.clone());
        entry
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch(&self) -> Result<SigningKeySet, FetchError> {
        let response = self.client.get(self.jwks_url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let jwks: JwkSet = response.json().await?;
        let keys = SigningKeySet::from_jwks(&jwks, self.algorithm);
        tracing::info!(
            url = %self.jwks_url,
            published = jwks.keys.len(),
            usable = keys.len(),
            "fetched signing keys"
        );
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Public half of tests/fixtures/signing_key.pem.
    const N: &str = "vZWreMdpy4fJsxy26iX33ldteC68xn6zliua-0ZEvsBAm_lJtewmbFyfct6yRuY28W5RyS2nNXKgpdas_9HgQC71rOzHjEVSaO33mokh6XnrAerJ5AleZsP2zIOINfEJiBhfYtFMWEQthQkWEHImEyd_ST6fWM8e7Tru8vtnkTqyUyBOBwnFvJvxQPt92fAnW0MKEBE2O-gBjAoXUSBncMGF74y4AzYmJ8zujCCRhaobBTdWC5oDpvEaHFfDf9iSwAlG8rm9mFw7x8XLRxBpglTBp2F-CNgyPlZagxTVCy0f533cE8-viGCr4FXMdvhJ53lJxRDasl5bHoCacHfECQ";
    const E: &str = "AQAB";

    fn jwks(keys: serde_json::Value) -> JwkSet {
        serde_json::from_value(json!({ "keys": keys })).unwrap()
    }

    fn rsa_jwk(kid: &str) -> serde_json::Value {
        json!({ "kty": "RSA", "kid": kid, "use": "sig", "alg": "RS256", "n": N, "e": E })
    }

    #[test]
    fn from_jwks_indexes_by_kid() {
        let set = SigningKeySet::from_jwks(&jwks(json!([rsa_jwk("a"), rsa_jwk("b")])), Algorithm::RS256);
        assert_eq!(set.len(), 2);
        assert!(set.get("a").is_some());
        assert!(set.get("c").is_none());
        assert_eq!(set.key_ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn from_jwks_skips_keys_without_kid() {
        let mut jwk = rsa_jwk("a");
        jwk.as_object_mut().unwrap().remove("kid");
        let set = SigningKeySet::from_jwks(&jwks(json!([jwk])), Algorithm::RS256);
        assert!(set.is_empty());
    }

    #[test]
    fn from_jwks_skips_encryption_keys() {
        let mut jwk = rsa_jwk("enc");
        jwk["use"] = json!("enc");
        let set = SigningKeySet::from_jwks(&jwks(json!([jwk, rsa_jwk("sig")])), Algorithm::RS256);
        assert_eq!(set.key_ids().collect::<Vec<_>>(), vec!["sig"]);
    }

    #[test]
    fn from_jwks_skips_keys_of_other_type() {
        let set = SigningKeySet::from_jwks(&jwks(json!([rsa_jwk("a")])), Algorithm::ES256);
        assert!(set.is_empty());
    }

    #[test]
    fn symmetric_keys_are_never_admitted() {
        let oct = json!({ "kty": "oct", "kid": "hmac", "k": "c2VjcmV0" });
        let set = SigningKeySet::from_jwks(&jwks(json!([oct])), Algorithm::RS256);
        assert!(set.is_empty());
    }

    #[test]
    fn custom_cache_ttl() {
        let cache = KeySetCache::new(
            Url::parse("https://example.com/.well-known/jwks.json").unwrap(),
            Algorithm::RS256,
            DEFAULT_FETCH_TIMEOUT,
        )
        .unwrap()
        .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(cache.cache_ttl, Duration::from_secs(60));
        assert_eq!(cache.jwks_url().path(), "/.well-known/jwks.json");
    }

    fn unreachable_cache() -> KeySetCache {
        KeySetCache::new(
            Url::parse("http://127.0.0.1:9/.well-known/jwks.json").unwrap(),
            Algorithm::RS256,
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn failed_fetch_backs_off() {
        let cache = unreachable_cache();

        assert!(matches!(cache.get("k1").await, Err(AuthError::KeySetUnavailable)));
        assert!(matches!(cache.get("k1").await, Err(AuthError::KeySetUnavailable)));
        assert_eq!(cache.attempts.load(Ordering::Acquire), 1);
    }

    #[tokio::test]
    async fn fetch_resumes_after_backoff() {
        let cache = unreachable_cache().with_retry_backoff(Duration::ZERO);

        let _ = cache.get("k1").await;
        let _ = cache.get("k1").await;
        assert_eq!(cache.attempts.load(Ordering::Acquire), 2);
    }

    #[tokio::test]
    async fn forced_refresh_ignores_backoff() {
        let cache = unreachable_cache();

        let _ = cache.get("k1").await;
        assert_eq!(cache.refresh().await, Err(AuthError::KeySetUnavailable));
        assert_eq!(cache.attempts.load(Ordering::Acquire), 2);
    }

    #[tokio::test]
    async fn cache_initially_empty() {
        let cache = KeySetCache::new(
            Url::parse("https://example.com/.well-known/jwks.json").unwrap(),
            Algorithm::RS256,
            DEFAULT_FETCH_TIMEOUT,
        )
        .unwrap();
        assert!(!cache.is_cached().await);
    }
}
