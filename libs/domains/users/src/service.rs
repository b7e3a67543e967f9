use axum_helpers::envelope::Pagination;
use std::sync::Arc;
use uuid::Uuid;

use crate::credentials::{BearerToken, CredentialService};
use crate::error::{UserError, UserResult};
use crate::models::{LoginUser, RegisterUser, UpdateUser, User, UserFilter, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Inputs are assumed to have passed the request rule sets. The service still
/// owns the actor checks so every caller gets the same authorization.
pub struct UserService<R: UserRepository, C: CredentialService> {
    repository: Arc<R>,
    credentials: Arc<C>,
}

impl<R: UserRepository, C: CredentialService> Clone for UserService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

/// Keeps a duplicate or missing row as-is; any other write error is a failed save.
fn save_error(e: UserError) -> UserError {
    match e {
        UserError::DuplicateEmail(_) | UserError::NotFound(_) | UserError::SaveFailed(_) => e,
        other => UserError::SaveFailed(other.to_string()),
    }
}

impl<R: UserRepository, C: CredentialService> UserService<R, C> {
    pub fn new(repository: R, credentials: C) -> Self {
        Self {
            repository: Arc::new(repository),
            credentials: Arc::new(credentials),
        }
    }

    /// Shared handle to the store, used by request rules such as email uniqueness.
    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    /// Create a user and issue its first token.
    pub async fn register(&self, input: RegisterUser) -> UserResult<BearerToken> {
        let password_hash = self.credentials.hash(&input.password)?;
        let user = User::new(
            input.name.trim().to_string(),
            input.email.trim().to_string(),
            password_hash,
        );

        let created = self.repository.create(user).await.map_err(save_error)?;
        tracing::info!(user_id = %created.id, "User registered");

        self.credentials.issue_token(&created)
    }

    /// Check credentials and issue a fresh token.
    pub async fn login(&self, input: LoginUser) -> UserResult<BearerToken> {
        let email = input.email.trim();
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.to_string()))?;

        if !self.credentials.verify(&input.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.credentials.issue_token(&user)
    }

    /// Resolves a token's actor to a live user.
    ///
    /// Once its user is deleted a token stops working.
    pub async fn authenticate(&self, actor: Uuid) -> UserResult<User> {
        match self.repository.get_by_id(actor).await? {
            Some(user) => Ok(user),
            None => {
                tracing::info!(actor = %actor, "Token rejected: user no longer exists");
                Err(UserError::Unauthorized)
            }
        }
    }

    /// List users; a pagination block is returned only for paged requests.
    pub async fn index(
        &self,
        filter: UserFilter,
    ) -> UserResult<(Vec<UserResponse>, Option<Pagination>)> {
        let users = self.repository.list(filter).await?;
        let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();

        if !filter.is_paginated() {
            return Ok((users, None));
        }

        let pagination = Pagination {
            total: self.repository.count().await?,
            limit: filter.effective_limit().unwrap_or(users.len()),
            offset: filter.effective_offset(),
        };
        Ok((users, Some(pagination)))
    }

    /// Get a user by ID
    pub async fn show(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// Update the actor's own record.
    ///
    /// Name and email are always replaced; the password only when a non-blank
    /// one is supplied.
    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<UserResponse> {
        if actor != id {
            tracing::info!(actor = %actor, user_id = %id, "Update rejected: not the owner");
            return Err(UserError::Unauthorized);
        }

        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let new_password_hash = input
            .new_password()
            .map(|password| self.credentials.hash(password))
            .transpose()?;

        user.apply_update(input, new_password_hash);

        let updated = self.repository.update(user).await.map_err(save_error)?;
        tracing::info!(user_id = %updated.id, "User updated");
        Ok(updated.into())
    }

    /// Delete the actor's own record and return what was deleted.
    pub async fn destroy(&self, actor: Uuid, id: Uuid) -> UserResult<UserResponse> {
        if actor != id {
            tracing::info!(actor = %actor, user_id = %id, "Delete rejected: not the owner");
            return Err(UserError::Unauthorized);
        }

        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if !self.repository.delete(id).await.map_err(save_error)? {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MockCredentialService;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn plain_credentials() -> MockCredentialService {
        let mut credentials = MockCredentialService::new();
        credentials
            .expect_hash()
            .returning(|password| Ok(format!("hashed:{password}")));
        credentials
            .expect_verify()
            .returning(|password, hash| Ok(hash == format!("hashed:{password}")));
        credentials
            .expect_issue_token()
            .returning(|user| Ok(BearerToken::new(format!("token-for-{}", user.id))));
        credentials
    }

    fn register_input(email: &str) -> RegisterUser {
        RegisterUser {
            name: "Ach Rozikin".to_string(),
            email: email.to_string(),
            password: "JustAPassword2".to_string(),
        }
    }

    fn stored_user() -> User {
        User::new(
            "Ach Rozikin".to_string(),
            "geronimo794@gmail.com".to_string(),
            "hashed:JustAPassword2".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_issues_token() {
        let repository = InMemoryUserRepository::new();
        let service = UserService::new(repository.clone(), plain_credentials());

        let token = service
            .register(register_input(" geronimo794@gmail.com "))
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");

        let stored = repository
            .get_by_email("geronimo794@gmail.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, "hashed:JustAPassword2");
        assert_eq!(token.access_token, format!("token-for-{}", stored.id));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_reported_not_saved() {
        let service = UserService::new(InMemoryUserRepository::new(), plain_credentials());

        service.register(register_input("a@example.com")).await.unwrap();
        let result = service.register(register_input("A@example.com")).await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let service = UserService::new(InMemoryUserRepository::new(), plain_credentials());
        service.register(register_input("a@example.com")).await.unwrap();

        let ok = service
            .login(LoginUser {
                email: "a@example.com".into(),
                password: "JustAPassword2".into(),
            })
            .await;
        assert!(ok.is_ok());

        let wrong_password = service
            .login(LoginUser {
                email: "a@example.com".into(),
                password: "No Password".into(),
            })
            .await;
        assert!(matches!(wrong_password, Err(UserError::InvalidCredentials)));

        let unknown = service
            .login(LoginUser {
                email: "b@example.com".into(),
                password: "JustAPassword2".into(),
            })
            .await;
        assert!(matches!(unknown, Err(UserError::EmailNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_by_other_actor_never_touches_store() {
        // No expectations: any repository call would panic.
        let service = UserService::new(MockUserRepository::new(), MockCredentialService::new());

        let result = service
            .update(Uuid::now_v7(), Uuid::now_v7(), UpdateUser::default())
            .await;
        assert!(matches!(result, Err(UserError::Unauthorized)));

        let result = service.destroy(Uuid::now_v7(), Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_persistence_failure_is_save_failed() {
        let user = stored_user();
        let id = user.id;

        let mut repository = MockUserRepository::new();
        repository
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .returning(|_| Err(UserError::Internal("connection reset".to_string())));

        let service = UserService::new(repository, plain_credentials());
        let result = service
            .update(
                id,
                id,
                UpdateUser {
                    name: "Rozikin".into(),
                    email: "geronimo794@gmail.com".into(),
                    password: None,
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::SaveFailed(_))));
    }

    #[tokio::test]
    async fn test_update_rehashes_only_supplied_password() {
        let repository = InMemoryUserRepository::new();
        let user = repository.create(stored_user()).await.unwrap();
        let service = UserService::new(repository.clone(), plain_credentials());

        let updated = service
            .update(
                user.id,
                user.id,
                UpdateUser {
                    name: "Rozikin".into(),
                    email: "rozikin@example.com".into(),
                    password: Some(String::new()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Rozikin");
        assert_eq!(updated.email, "rozikin@example.com");

        let stored = repository.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "hashed:JustAPassword2");

        service
            .update(
                user.id,
                user.id,
                UpdateUser {
                    name: "Rozikin".into(),
                    email: "rozikin@example.com".into(),
                    password: Some("NewPassword".into()),
                },
            )
            .await
            .unwrap();
        let stored = repository.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "hashed:NewPassword");
    }

    #[tokio::test]
    async fn test_destroy_returns_snapshot() {
        let repository = InMemoryUserRepository::new();
        let user = repository.create(stored_user()).await.unwrap();
        let service = UserService::new(repository.clone(), plain_credentials());

        let deleted = service.destroy(user.id, user.id).await.unwrap();
        assert_eq!(deleted.id, user.id);
        assert!(repository.get_by_id(user.id).await.unwrap().is_none());

        let again = service.destroy(user.id, user.id).await;
        assert!(matches!(again, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_index_pagination() {
        let repository = InMemoryUserRepository::new();
        for i in 0..3 {
            repository
                .create(User::new(
                    format!("User {i}"),
                    format!("user{i}@example.com"),
                    "hash".into(),
                ))
                .await
                .unwrap();
        }
        let service = UserService::new(repository, plain_credentials());

        let (all, pagination) = service.index(UserFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(pagination.is_none());

        let (page, pagination) = service.index(UserFilter::page(2, 2)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(
            pagination,
            Some(Pagination {
                total: 3,
                limit: 2,
                offset: 2
            })
        );
    }

    #[tokio::test]
    async fn test_authenticate_requires_live_user() {
        let repository = InMemoryUserRepository::new();
        let user = repository.create(stored_user()).await.unwrap();
        let service = UserService::new(repository.clone(), plain_credentials());

        assert_eq!(service.authenticate(user.id).await.unwrap().id, user.id);

        repository.delete(user.id).await.unwrap();
        let result = service.authenticate(user.id).await;
        assert!(matches!(result, Err(UserError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_show_missing_user() {
        let service = UserService::new(InMemoryUserRepository::new(), plain_credentials());
        let result = service.show(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
