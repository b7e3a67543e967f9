use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// JWT claims carried by every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User email
    pub name: String,  // User name
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
    pub jti: String,   // Token ID, unique per issuance
}

impl JwtClaims {
    /// The authenticated user's id, if the subject is a UUID.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Stateless HS256 token issuer and verifier.
///
/// Every call to [`JwtAuth::create_access_token`] yields a fresh token (new
/// `jti`); nothing is stored server-side.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    ttl_seconds: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(ttl_seconds = config.access_token_ttl_secs, "JWT auth initialized");
        Self {
            encoding: Arc::new(EncodingKey::from_secret(config.secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            ttl_seconds: config.access_token_ttl_secs,
        }
    }

    /// Create an access token for the given user.
    pub fn create_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        Ok(encode(&header, &claims, &self.encoding)?)
    }

    /// Verify signature and expiry, then decode the claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding,
            &Validation::new(jsonwebtoken::Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!"))
    }

    #[test]
    fn test_token_round_trip_carries_user() {
        let auth = auth();
        let id = Uuid::new_v4();
        let token = auth.create_access_token(id, "a@example.com", "A").unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(id));
        assert_eq!(claims.email, "a@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_each_issuance_is_fresh() {
        let auth = auth();
        let id = Uuid::new_v4();
        let first = auth.create_access_token(id, "a@example.com", "A").unwrap();
        let second = auth.create_access_token(id, "a@example.com", "A").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = auth()
            .create_access_token(Uuid::new_v4(), "a@example.com", "A")
            .unwrap();
        let other = JwtAuth::new(&JwtConfig::new("a-completely-different-secret-value!!"));
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuth::new(
            &JwtConfig::new("this-is-a-valid-secret-with-32-chars!").with_ttl(-3600),
        );
        let token = auth
            .create_access_token(Uuid::new_v4(), "a@example.com", "A")
            .unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(auth().verify_token("not-a-token").is_err());
    }
}
