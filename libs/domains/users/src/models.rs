use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Page size used when only `offset` is given.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// User entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// User display name
    pub name: String,
    /// User email (unique, case-insensitive)
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user (password must already be hashed)
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copies name and email, and the new hash when the password changed.
    pub fn apply_update(&mut self, update: UpdateUser, new_password_hash: Option<String>) {
        self.name = update.name.trim().to_string();
        self.email = update.email.trim().to_string();
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Update body. `password` is only changed when present and non-blank.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUser {
    /// The new password exactly as sent, if a non-blank one was supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Query parameters for listing users.
///
/// Without either parameter every user is returned and no pagination block
/// is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl UserFilter {
    pub fn page(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// Effective limit; `None` means unbounded.
    pub fn effective_limit(&self) -> Option<usize> {
        match (self.limit, self.offset) {
            (Some(limit), _) => Some(limit),
            (None, Some(_)) => Some(DEFAULT_PAGE_SIZE),
            (None, None) => None,
        }
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}
