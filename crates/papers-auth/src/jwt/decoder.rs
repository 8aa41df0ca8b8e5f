//! JWT validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use papers_core::config::AuthConfig;
use papers_core::error::AppError;

use super::claims::Claims;

/// Validates access tokens signed by [`JwtEncoder`](super::JwtEncoder).
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Check the signature and expiry of `token` and return its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use papers_core::error::ErrorKind;
    use papers_core::types::UserId;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issue_then_decode() {
        let cfg = config("test-secret");
        let user = UserId::new();
        let token = JwtEncoder::new(&cfg).issue(user).expect("issue");
        let claims = JwtDecoder::new(&cfg).decode(&token).expect("decode");
        assert_eq!(claims.user_id(), user);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config("a")).issue(UserId::new()).expect("issue");
        let err = JwtDecoder::new(&config("b")).decode(&token).expect_err("bad sig");
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_garbage_rejected() {
        let err = JwtDecoder::new(&config("a"))
            .decode("not.a.token")
            .expect_err("garbage");
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_rejected() {
        let cfg = config("a");
        let claims = Claims {
            sub: UserId::new(),
            iat: 0,
            exp: 1,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        )
        .expect("encode");
        let err = JwtDecoder::new(&cfg).decode(&token).expect_err("expired");
        assert!(err.message.contains("expired"));
    }
}
