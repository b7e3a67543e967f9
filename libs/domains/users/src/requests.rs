//! Authorization and rule sets for each request body.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use axum_helpers::auth::Actor;
use axum_helpers::extractors::RequestRules;
use axum_helpers::validation::{Rule, RuleSet, email, min_length, required};
use std::sync::Arc;
use uuid::Uuid;

use crate::credentials::CredentialService;
use crate::error::email_taken_message;
use crate::models::{LoginUser, RegisterUser, UpdateUser};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Shortest password accepted anywhere.
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Router state shared by the user handlers.
pub type SharedService<R, C> = Arc<UserService<R, C>>;

/// Fails when the email already belongs to a user other than `except`.
pub struct UniqueEmail<R> {
    repository: Arc<R>,
    except: Option<Uuid>,
}

impl<R: UserRepository + 'static> UniqueEmail<R> {
    pub fn rule(repository: Arc<R>, except: Option<Uuid>) -> Box<dyn Rule> {
        Box::new(Self { repository, except })
    }
}

#[async_trait]
impl<R: UserRepository> Rule for UniqueEmail<R> {
    async fn check(&self, field: &str, value: &str) -> Option<String> {
        match self.repository.email_exists(value, self.except).await {
            Ok(false) => None,
            Ok(true) => Some(email_taken_message(field)),
            Err(e) => {
                // The write itself still enforces uniqueness.
                tracing::warn!(error = %e, "Email uniqueness lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl<R, C> RequestRules<SharedService<R, C>> for RegisterUser
where
    R: UserRepository + 'static,
    C: CredentialService + 'static,
{
    async fn rules(_parts: &mut Parts, state: &SharedService<R, C>) -> RuleSet {
        RuleSet::new()
            .field("name", [required()])
            .field(
                "email",
                [
                    required(),
                    email(),
                    UniqueEmail::rule(state.repository(), None),
                ],
            )
            .raw_field("password", [required(), min_length(MIN_PASSWORD_LENGTH)])
    }
}

#[async_trait]
impl<R, C> RequestRules<SharedService<R, C>> for LoginUser
where
    R: UserRepository + 'static,
    C: CredentialService + 'static,
{
    async fn rules(_parts: &mut Parts, _state: &SharedService<R, C>) -> RuleSet {
        RuleSet::new()
            .field("email", [required(), email()])
            .raw_field("password", [required(), min_length(MIN_PASSWORD_LENGTH)])
    }
}

async fn target_id<S: Send + Sync>(parts: &mut Parts, state: &S) -> Option<Uuid> {
    Path::<Uuid>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|Path(id)| id)
}

/// Only the owner of the record may update it.
#[async_trait]
impl<R, C> RequestRules<SharedService<R, C>> for UpdateUser
where
    R: UserRepository + 'static,
    C: CredentialService + 'static,
{
    async fn authorize(parts: &mut Parts, state: &SharedService<R, C>) -> bool {
        let Some(Actor(actor)) = Actor::from_parts(parts) else {
            return false;
        };
        target_id(parts, state).await == Some(actor)
    }

    async fn rules(parts: &mut Parts, state: &SharedService<R, C>) -> RuleSet {
        let actor = Actor::from_parts(parts).map(|Actor(id)| id);

        RuleSet::new()
            .field("name", [required()])
            .field(
                "email",
                [
                    required(),
                    email(),
                    UniqueEmail::rule(state.repository(), actor),
                ],
            )
            .raw_field("password", [min_length(MIN_PASSWORD_LENGTH)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repository::InMemoryUserRepository;
    use axum_helpers::validation::Input;
    use serde_json::json;

    async fn seeded() -> (Arc<InMemoryUserRepository>, User) {
        let repository = InMemoryUserRepository::new();
        let user = repository
            .create(User::new(
                "Ach Rozikin".into(),
                "geronimo794@gmail.com".into(),
                "hash".into(),
            ))
            .await
            .unwrap();
        (Arc::new(repository), user)
    }

    fn input(value: serde_json::Value) -> Input {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_unique_email_detects_taken_address() {
        let (repository, _) = seeded().await;
        let rules = RuleSet::new().field("email", [UniqueEmail::rule(repository, None)]);

        let errors = rules
            .validate(&input(json!({ "email": "GERONIMO794@gmail.com" })))
            .await
            .unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            ["The email has already been taken."]
        );

        assert!(
            rules
                .validate(&input(json!({ "email": "new@example.com" })))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unique_email_ignores_own_record() {
        let (repository, user) = seeded().await;
        let rules = RuleSet::new().field("email", [UniqueEmail::rule(repository, Some(user.id))]);

        assert!(
            rules
                .validate(&input(json!({ "email": "geronimo794@gmail.com" })))
                .await
                .is_ok()
        );
    }
}
