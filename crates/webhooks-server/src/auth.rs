use std::collections::HashMap;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use webhooks_config::ApiToken;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,
    #[error("malformed authorization header")]
    Malformed,
    #[error("unknown token")]
    Unknown,
    #[error("token is inactive")]
    Inactive,
    #[error("token has expired")]
    Expired,
}

/// Hex SHA-256 of a bearer token, the form tokens are stored in config.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone)]
struct Grant {
    username: String,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
}

/// Accepted API tokens, keyed by digest.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    grants: HashMap<String, Grant>,
}

impl TokenRegistry {
    pub fn from_config(tokens: &[ApiToken]) -> Result<Self, String> {
        let mut grants = HashMap::new();
        for token in tokens {
            let expires_at = token
                .expires_at
                .as_deref()
                .map(|ts| {
                    DateTime::parse_from_rfc3339(ts)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| format!("token `{}` has invalid expires_at: {e}", token.username))
                })
                .transpose()?;
            grants.insert(
                token.token_sha256.to_ascii_lowercase(),
                Grant {
                    username: token.username.clone(),
                    active: token.active,
                    expires_at,
                },
            );
        }
        Ok(Self { grants })
    }

    /// Returns the username owning the bearer token in `headers`.
    pub fn authorize(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<String, AuthError> {
        let value = headers.get(AUTHORIZATION).ok_or(AuthError::Missing)?;
        let value = value.to_str().map_err(|_| AuthError::Malformed)?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Malformed)?;

        let grant = self
            .grants
            .get(&hash_token(token))
            .ok_or(AuthError::Unknown)?;
        if !grant.active {
            return Err(AuthError::Inactive);
        }
        if matches!(grant.expires_at, Some(at) if at <= now) {
            return Err(AuthError::Expired);
        }
        Ok(grant.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn registry() -> TokenRegistry {
        TokenRegistry::from_config(&[
            ApiToken {
                username: "dialogflow".to_string(),
                token_sha256: hash_token("s3cret"),
                active: true,
                expires_at: None,
            },
            ApiToken {
                username: "old".to_string(),
                token_sha256: hash_token("old"),
                active: true,
                expires_at: Some("2024-01-01T00:00:00Z".to_string()),
            },
            ApiToken {
                username: "off".to_string(),
                token_sha256: hash_token("off"),
                active: false,
                expires_at: None,
            },
        ])
        .unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn hash_is_lowercase_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn accepts_known_active_token() {
        let now = Utc::now();
        assert_eq!(registry().authorize(&bearer("s3cret"), now).unwrap(), "dialogflow");
    }

    #[test]
    fn rejects_each_failure_kind() {
        let now = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let registry = registry();
        assert_eq!(registry.authorize(&HeaderMap::new(), now), Err(AuthError::Missing));
        let mut basic = HeaderMap::new();
        basic.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(registry.authorize(&basic, now), Err(AuthError::Malformed));
        assert_eq!(registry.authorize(&bearer("nope"), now), Err(AuthError::Unknown));
        assert_eq!(registry.authorize(&bearer("off"), now), Err(AuthError::Inactive));
        assert_eq!(registry.authorize(&bearer("old"), now), Err(AuthError::Expired));
    }

    #[test]
    fn bad_expiry_is_a_config_error() {
        let err = TokenRegistry::from_config(&[ApiToken {
            username: "x".to_string(),
            token_sha256: hash_token("x"),
            active: true,
            expires_at: Some("tomorrow".to_string()),
        }]);
        assert!(err.is_err());
    }
}
