//! Credential hashing (Argon2) and bearer tokens (HS256 JWT)

use crate::domain::errors::AuthError;
use crate::domain::ports::{AuthProvider, IssuedToken};
use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

pub struct JwtAuthProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }
}

impl AuthProvider for JwtAuthProvider {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, credential: &str) -> bool {
        match PasswordHash::new(credential) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                debug!("Stored credential is not a valid hash: {}", e);
                false
            }
        }
    }

    fn issue_token(&self, identity: &str) -> Result<IssuedToken, AuthError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.token_ttl;
        let claims = Claims {
            sub: identity.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            token_type: "bearer".to_string(),
            username: identity.to_string(),
            expires_at,
        })
    }

    fn current_user(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AuthError::Unauthenticated(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::Unauthenticated("Token has no subject".to_string()));
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtAuthProvider {
        JwtAuthProvider::new("test-secret", Duration::minutes(30))
    }

    #[test]
    fn test_hash_and_verify() {
        let auth = provider();
        let hash = auth.hash("hunter2").unwrap();

        assert_ne!(hash, "hunter2");
        assert!(auth.verify("hunter2", &hash));
        assert!(!auth.verify("wrong", &hash));
        assert!(!auth.verify("hunter2", "not-a-hash"));
    }

    #[test]
    fn test_token_round_trip() {
        let auth = provider();
        let token = auth.issue_token("alice").unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(auth.current_user(&token.access_token).unwrap(), "alice");
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = JwtAuthProvider::new("other", Duration::minutes(30))
            .issue_token("alice")
            .unwrap();

        let err = provider().current_user(&token.access_token).unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = JwtAuthProvider::new("test-secret", Duration::minutes(-5));
        let token = auth.issue_token("alice").unwrap();

        assert!(matches!(
            auth.current_user(&token.access_token),
            Err(AuthError::Unauthenticated(_))
        ));
    }
}
