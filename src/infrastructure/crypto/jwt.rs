//! JWT access-token issuance
//!
//! Tokens are HS256-signed JWTs so any verifier holding the shared secret can
//! validate them without calling back into this service.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Claim names owned by the issuer; caller-supplied claims may not shadow them.
const RESERVED_CLAIMS: &[&str] = &["sub", "iat", "nbf", "exp", "jti", "iss", "type"];

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token ID
    pub jti: String,
    /// Issuer
    pub iss: String,
    #[serde(rename = "type")]
    pub token_type: String,
    /// Identity claims (`name`, `email`, `role`)
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl TokenClaims {
    /// Fails when `now + ttl` falls outside the representable time range.
    pub fn new(
        subject: &str,
        claims: &BTreeMap<String, String>,
        ttl: Duration,
        issuer: &str,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            DomainError::TokenIssuance(format!("token TTL of {}s overflows", ttl.num_seconds()))
        })?;

        Ok(Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: issuer.to_string(),
            token_type: "access".to_string(),
            extra: claims.clone(),
        })
    }
}

/// Signs access tokens with a symmetric secret provisioned at startup.
///
/// Holds no per-token state; clone freely across request handlers.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    issuer: String,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build an issuer. An empty secret is refused outright.
    pub fn new(secret: &SecretString, issuer: impl Into<String>) -> Result<Self, DomainError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(DomainError::TokenIssuance("signing secret is empty".into()));
        }

        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        })
    }

    /// Issue a signed token for `subject` carrying `claims`, valid for `ttl`.
    pub fn issue(
        &self,
        subject: &str,
        claims: &BTreeMap<String, String>,
        ttl: Duration,
    ) -> Result<String, DomainError> {
        if let Some(name) = claims.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(DomainError::TokenIssuance(format!(
                "claim '{}' is reserved",
                name
            )));
        }

        let token_claims = TokenClaims::new(subject, claims, ttl, &self.issuer)?;

        encode(&Header::default(), &token_claims, &self.key)
            .map_err(|e| DomainError::TokenIssuance(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(SECRET.to_string()), "auth-service").unwrap()
    }

    fn identity() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), "A".to_string()),
            ("email".to_string(), "a@x.com".to_string()),
            ("role".to_string(), "customer".to_string()),
        ])
    }

    fn decode_claims(token: &str) -> TokenClaims {
        let mut validation = Validation::default();
        validation.set_issuer(&["auth-service"]);
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn test_issue_embeds_subject_and_claims() {
        let token = issuer()
            .issue("42", &identity(), Duration::minutes(15))
            .unwrap();

        let claims = decode_claims(&token);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.extra["name"], "A");
        assert_eq!(claims.extra["email"], "a@x.com");
        assert_eq!(claims.extra["role"], "customer");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_identical_calls_issue_distinct_tokens() {
        let issuer = issuer();
        let a = issuer.issue("42", &identity(), Duration::minutes(15)).unwrap();
        let b = issuer.issue("42", &identity(), Duration::minutes(15)).unwrap();

        assert_ne!(a, b);
        assert_ne!(decode_claims(&a).jti, decode_claims(&b).jti);
    }

    #[test]
    fn test_wrong_secret_does_not_verify() {
        let token = issuer()
            .issue("42", &identity(), Duration::minutes(15))
            .unwrap();
        let result = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(b"another-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_is_rejected_by_verifier() {
        let token = issuer()
            .issue("42", &identity(), Duration::minutes(-10))
            .unwrap();
        let result = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_secret_refused() {
        let result = TokenIssuer::new(&SecretString::from(String::new()), "auth-service");
        assert!(matches!(result, Err(DomainError::TokenIssuance(_))));
    }

    #[test]
    fn test_reserved_claim_refused() {
        let mut claims = identity();
        claims.insert("sub".into(), "admin".into());
        let result = issuer().issue("42", &claims, Duration::minutes(15));
        assert!(matches!(result, Err(DomainError::TokenIssuance(_))));
    }

    #[test]
    fn test_overflowing_ttl_is_an_error() {
        let result = issuer().issue("42", &identity(), Duration::minutes(200_000_000_000));
        assert!(matches!(result, Err(DomainError::TokenIssuance(_))));

        let result = issuer().issue("42", &identity(), Duration::MAX);
        assert!(matches!(result, Err(DomainError::TokenIssuance(_))));
    }
}
