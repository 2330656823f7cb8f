// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_DOMAIN` | Identity provider domain, derives issuer and JWKS URL | - |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | `https://<AUTH_DOMAIN>/` |
//! | `AUTH_AUDIENCE` | Expected JWT audience claim | Required |
//! | `AUTH_JWKS_URL` | JWKS endpoint for signature verification | `https://<AUTH_DOMAIN>/.well-known/jwks.json` |
//! | `AUTH_ALGORITHM` | The single trusted signing algorithm | `RS256` |
//! | `AUTH_JWKS_CACHE_TTL_SECS` | JWKS cache lifetime | `300` |
//! | `AUTH_JWKS_FETCH_TIMEOUT_SECS` | Bound on one JWKS fetch | `10` |
//! | `AUTH_JWKS_RETRY_BACKOFF_SECS` | No refetch for this long after a failed fetch | `5` |
//! | `AUTH_LEEWAY_SECS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::{jwks, validator, Authorizer, KeySetCache, TokenValidator};
use crate::telemetry::LogFormat;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_DOMAIN_ENV: &str = "AUTH_DOMAIN";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUTH_AUDIENCE_ENV: &str = "AUTH_AUDIENCE";
pub const AUTH_JWKS_URL_ENV: &str = "AUTH_JWKS_URL";
pub const AUTH_ALGORITHM_ENV: &str = "AUTH_ALGORITHM";
pub const AUTH_JWKS_CACHE_TTL_ENV: &str = "AUTH_JWKS_CACHE_TTL_SECS";
pub const AUTH_JWKS_FETCH_TIMEOUT_ENV: &str = "AUTH_JWKS_FETCH_TIMEOUT_SECS";
pub const AUTH_JWKS_RETRY_BACKOFF_ENV: &str = "AUTH_JWKS_RETRY_BACKOFF_SECS";
pub const AUTH_LEEWAY_ENV: &str = "AUTH_LEEWAY_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Well-known JWKS path below the identity provider's domain.
const JWKS_PATH: &str = ".well-known/jwks.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("'{0}' is not a valid bind address")]
    InvalidBindAddress(String),
    #[error("unknown signing algorithm '{0}'")]
    UnknownAlgorithm(String),
    #[error("signing algorithm {0:?} is symmetric; only asymmetric algorithms can be trusted")]
    SymmetricAlgorithm(Algorithm),
    #[error("failed to build JWKS HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Settings consumed by the authorization core.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: Url,
    pub algorithm: Algorithm,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub retry_backoff: Duration,
    pub leeway_secs: u64,
}

impl AuthSettings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let domain = get(AUTH_DOMAIN_ENV);

        let issuer = match (get(AUTH_ISSUER_ENV), &domain) {
            (Some(issuer), _) => issuer,
            (None, Some(domain)) => format!("https://{domain}/"),
            (None, None) => return Err(ConfigError::Missing(AUTH_ISSUER_ENV)),
        };
        Url::parse(&issuer).map_err(|source| ConfigError::InvalidUrl {
            var: AUTH_ISSUER_ENV,
            source,
        })?;

        let jwks_url = match (get(AUTH_JWKS_URL_ENV), &domain) {
            (Some(url), _) => url,
            (None, Some(domain)) => format!("https://{domain}/{JWKS_PATH}"),
            (None, None) => return Err(ConfigError::Missing(AUTH_JWKS_URL_ENV)),
        };
        let jwks_url = Url::parse(&jwks_url).map_err(|source| ConfigError::InvalidUrl {
            var: AUTH_JWKS_URL_ENV,
            source,
        })?;

        let audience = get(AUTH_AUDIENCE_ENV).ok_or(ConfigError::Missing(AUTH_AUDIENCE_ENV))?;

        let algorithm = match get(AUTH_ALGORITHM_ENV) {
            Some(name) => parse_algorithm(&name)?,
            None => Algorithm::RS256,
        };

        let cache_ttl = seconds(&get, AUTH_JWKS_CACHE_TTL_ENV, jwks::DEFAULT_CACHE_TTL.as_secs())?;
        let fetch_timeout = seconds(
            &get,
            AUTH_JWKS_FETCH_TIMEOUT_ENV,
            jwks::DEFAULT_FETCH_TIMEOUT.as_secs(),
        )?;
        let retry_backoff = seconds(
            &get,
            AUTH_JWKS_RETRY_BACKOFF_ENV,
            jwks::DEFAULT_RETRY_BACKOFF.as_secs(),
        )?;
        let leeway_secs = seconds(&get, AUTH_LEEWAY_ENV, validator::DEFAULT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            algorithm,
            cache_ttl: Duration::from_secs(cache_ttl),
            fetch_timeout: Duration::from_secs(fetch_timeout),
            retry_backoff: Duration::from_secs(retry_backoff),
            leeway_secs,
        })
    }

    /// Wire up the key-set cache, validator and authorizer.
    pub fn build_authorizer(&self) -> Result<Authorizer, ConfigError> {
        let keys = KeySetCache::new(self.jwks_url.clone(), self.algorithm, self.fetch_timeout)?
            .with_cache_ttl(self.cache_ttl)
            .with_retry_backoff(self.retry_backoff);
        let validator = TokenValidator::new(keys, &self.issuer, &self.audience)
            .with_leeway(self.leeway_secs);
        Ok(Authorizer::new(validator))
    }
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub auth: AuthSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(port) => port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
                var: PORT_ENV,
                value: port,
            })?,
            None => DEFAULT_PORT,
        };
        let addr = format!("{host}:{port}");
        let bind_addr = addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(addr))?;

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|value| LogFormat::from_str(&value).unwrap_or_default())
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            log_format,
            auth: AuthSettings::from_lookup(&lookup)?,
        })
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| ConfigError::UnknownAlgorithm(name.to_string()))?;
    if !validator::is_asymmetric(algorithm) {
        return Err(ConfigError::SymmetricAlgorithm(algorithm));
    }
    Ok(algorithm)
}

fn seconds<G>(get: &G, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}
