use axum::{
    Router,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    Actor, JwtAuth, UuidPath, ValidatedJson,
    envelope::{self, EnvelopeSchema, FieldErrors, Pagination},
    jwt_auth_middleware,
};
use utoipa::OpenApi;

use crate::credentials::{BearerToken, CredentialService};
use crate::error::UserResult;
use crate::models::{LoginUser, RegisterUser, UpdateUser, UserFilter, UserResponse};
use crate::repository::UserRepository;
use crate::requests::SharedService;
use crate::service::UserService;

const TAG: &str = "users";

/// OpenAPI documentation for the users API
#[derive(OpenApi)]
#[openapi(
    paths(register, login, index, show, update, destroy),
    components(schemas(
        EnvelopeSchema,
        FieldErrors,
        Pagination,
        BearerToken,
        UserResponse,
        RegisterUser,
        LoginUser,
        UpdateUser,
    )),
    tags((name = TAG, description = "Registration, login and user management"))
)]
pub struct ApiDoc;

/// Create the users router.
///
/// `/register` and `/login` are public; every `/users` route requires a
/// bearer token issued by `auth` whose user still exists.
pub fn router<R, C>(service: UserService<R, C>, auth: JwtAuth) -> Router
where
    R: UserRepository + 'static,
    C: CredentialService + 'static,
{
    let shared_service: SharedService<R, C> = std::sync::Arc::new(service);

    let protected = Router::new()
        .route("/users", get(index::<R, C>))
        .route(
            "/users/{id}",
            get(show::<R, C>)
                .put(update::<R, C>)
                .patch(update::<R, C>)
                .delete(destroy::<R, C>),
        )
        .route_layer(middleware::from_fn_with_state(
            shared_service.clone(),
            require_live_actor::<R, C>,
        ))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/register", post(register::<R, C>))
        .route("/login", post(login::<R, C>))
        .merge(protected)
        .with_state(shared_service)
}

/// Runs after [`jwt_auth_middleware`]; rejects tokens of deleted users.
async fn require_live_actor<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    Actor(actor): Actor,
    request: Request,
    next: Next,
) -> Response {
    match service.authenticate(actor).await {
        Ok(_) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User created; `data` holds a BearerToken", body = EnvelopeSchema),
        (status = 422, description = "Validation failed", body = EnvelopeSchema),
        (status = 500, description = "Save failed", body = EnvelopeSchema)
    )
)]
async fn register<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<Response> {
    let token = service.register(input).await?;
    Ok(envelope::build_success(token).into_response_with(StatusCode::CREATED))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginUser,
    responses(
        (status = 200, description = "Logged in; `data` holds a BearerToken", body = EnvelopeSchema),
        (status = 401, description = "Wrong password", body = EnvelopeSchema),
        (status = 404, description = "Unknown email", body = EnvelopeSchema),
        (status = 422, description = "Validation failed", body = EnvelopeSchema)
    )
)]
async fn login<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    ValidatedJson(input): ValidatedJson<LoginUser>,
) -> UserResult<Response> {
    let token = service.login(input).await?;
    Ok(envelope::build_success(token).into_response_with(StatusCode::OK))
}

/// List users
///
/// With `limit` or `offset` the envelope carries a `pagination` block.
#[utoipa::path(
    get,
    path = "/users",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "Users; `data` holds UserResponse[]", body = EnvelopeSchema),
        (status = 401, description = "Missing or invalid token", body = EnvelopeSchema)
    )
)]
async fn index<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    Query(filter): Query<UserFilter>,
) -> UserResult<Response> {
    let (users, pagination) = service.index(filter).await?;

    let envelope = match pagination {
        Some(pagination) => envelope::build_success_with_pagination(users, pagination),
        None => envelope::build_success(users),
    };
    Ok(envelope.into_response_with(StatusCode::OK))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User; `data` holds a UserResponse", body = EnvelopeSchema),
        (status = 401, description = "Missing or invalid token", body = EnvelopeSchema),
        (status = 404, description = "User not found", body = EnvelopeSchema)
    )
)]
async fn show<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    UuidPath(id): UuidPath,
) -> UserResult<Response> {
    let user = service.show(id).await?;
    Ok(envelope::build_success(user).into_response_with(StatusCode::OK))
}

/// Update your own user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated user; `data` holds a UserResponse", body = EnvelopeSchema),
        (status = 401, description = "Not the owner, or missing token", body = EnvelopeSchema),
        (status = 404, description = "User not found", body = EnvelopeSchema),
        (status = 422, description = "Validation failed", body = EnvelopeSchema),
        (status = 500, description = "Save failed", body = EnvelopeSchema)
    )
)]
async fn update<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    Actor(actor): Actor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Response> {
    let user = service.update(actor, id, input).await?;
    Ok(envelope::build_success(user).into_response_with(StatusCode::OK))
}

/// Delete your own user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted user; `data` holds a UserResponse", body = EnvelopeSchema),
        (status = 401, description = "Not the owner, or missing token", body = EnvelopeSchema),
        (status = 404, description = "User not found", body = EnvelopeSchema)
    )
)]
async fn destroy<R: UserRepository, C: CredentialService>(
    State(service): State<SharedService<R, C>>,
    Actor(actor): Actor,
    UuidPath(id): UuidPath,
) -> UserResult<Response> {
    let user = service.destroy(actor, id).await?;
    Ok(envelope::build_success(user).into_response_with(StatusCode::OK))
}
