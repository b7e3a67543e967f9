//! Password hashing and bearer-token issuance.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::auth::JwtAuth;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Token type label returned with every access token.
pub const TOKEN_TYPE: &str = "Bearer";

/// Body returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BearerToken {
    pub access_token: String,
    pub token_type: String,
}

impl BearerToken {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

/// Hashes and checks passwords and issues access tokens.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialService: Send + Sync {
    fn hash(&self, password: &str) -> UserResult<String>;

    /// `Ok(false)` on mismatch; errors only for an unreadable stored hash.
    fn verify(&self, password: &str, hash: &str) -> UserResult<bool>;

    /// Issues a fresh token on every call.
    fn issue_token(&self, user: &User) -> UserResult<BearerToken>;
}

/// Argon2id hashing with JWT access tokens.
#[derive(Clone)]
pub struct Argon2Credentials {
    jwt: JwtAuth,
}

impl Argon2Credentials {
    pub fn new(jwt: JwtAuth) -> Self {
        Self { jwt }
    }
}

impl CredentialService for Argon2Credentials {
    fn hash(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn issue_token(&self, user: &User) -> UserResult<BearerToken> {
        self.jwt
            .create_access_token(user.id, &user.email, &user.name)
            .map(BearerToken::new)
            .map_err(|e| UserError::Token(e.to_string()))
    }
}
