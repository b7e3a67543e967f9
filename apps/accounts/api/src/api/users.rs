use axum::Router;
use axum_helpers::auth::JwtAuth;
use domain_users::{
    Argon2Credentials, InMemoryUserRepository, PostgresUserRepository, UserService, handlers,
};

use crate::store::Store;

pub fn router(store: &Store, jwt: JwtAuth) -> Router {
    let credentials = Argon2Credentials::new(jwt.clone());

    match store {
        Store::InMemory => {
            handlers::router(UserService::new(InMemoryUserRepository::new(), credentials), jwt)
        }
        Store::Postgres(db) => handlers::router(
            UserService::new(PostgresUserRepository::new(db.clone()), credentials),
            jwt,
        ),
    }
}
