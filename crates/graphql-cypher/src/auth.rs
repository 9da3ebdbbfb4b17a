//! Bearer token verification. The verified claims become `$jwt` in the
//! authorization filters.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::{AuthorizationConfig, JwtAlgorithm};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthenticated: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("Unauthenticated: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// The claims of a token, without its `Bearer ` prefix.
    async fn authenticate(&self, token: &str) -> Result<Map<String, Value>, AuthError>;
}

/// Verifies tokens signed with a shared secret.
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(config: &AuthorizationConfig) -> Self {
        let algorithm = match config.algorithm {
            JwtAlgorithm::Hs256 => Algorithm::HS256,
            JwtAlgorithm::Hs384 => Algorithm::HS384,
            JwtAlgorithm::Hs512 => Algorithm::HS512,
        };

        let validation = {
            let mut validation = Validation::new(algorithm);
            if let Some(issuer) = config.issuer.as_ref() {
                validation.set_issuer(&[issuer]);
            }
            if let Some(audience) = config.audience.as_ref() {
                validation.set_audience(&[audience]);
            } else {
                validation.validate_aud = false;
            }
            validation.validate_nbf = true;
            validation
        };

        Self {
            key: DecodingKey::from_secret(config.key.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Map<String, Value>, AuthError> {
        let token = jsonwebtoken::decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
        Ok(token.claims)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;

    const FAR_FUTURE: u64 = 4_102_444_800;

    fn config() -> AuthorizationConfig {
        AuthorizationConfig {
            key: String::from("secret"),
            algorithm: JwtAlgorithm::Hs256,
            issuer: Some(String::from("https://auth.example.com")),
            audience: None,
        }
    }

    fn token(claims: Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returns_the_claims_of_a_valid_token() {
        let authenticator = JwtAuthenticator::new(&config());
        let token = token(
            json!({ "sub": "user-1", "roles": ["admin"], "iss": "https://auth.example.com", "exp": FAR_FUTURE }),
            "secret",
        );

        let claims = authenticator.authenticate(&token).await.unwrap();

        assert_eq!(claims["sub"], json!("user-1"));
        assert_eq!(claims["roles"], json!(["admin"]));
    }

    #[tokio::test]
    async fn rejects_a_token_signed_with_another_key() {
        let authenticator = JwtAuthenticator::new(&config());
        let token = token(
            json!({ "sub": "user-1", "iss": "https://auth.example.com", "exp": FAR_FUTURE }),
            "not the secret",
        );

        let error = authenticator.authenticate(&token).await.unwrap_err();

        assert!(matches!(error, AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn rejects_a_token_from_another_issuer() {
        let authenticator = JwtAuthenticator::new(&config());
        let token = token(
            json!({ "sub": "user-1", "iss": "https://elsewhere.example.com", "exp": FAR_FUTURE }),
            "secret",
        );

        assert!(authenticator.authenticate(&token).await.is_err());
    }

    #[tokio::test]
    async fn rejects_an_expired_token() {
        let authenticator = JwtAuthenticator::new(&config());
        let token = token(
            json!({ "sub": "user-1", "iss": "https://auth.example.com", "exp": 1_000_000 }),
            "secret",
        );

        assert!(authenticator.authenticate(&token).await.is_err());
    }
}
