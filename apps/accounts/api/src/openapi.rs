use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Accounts API",
        version = "0.1.0",
        description = "User registration, login and account management"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct AccountsDoc;

/// Application document: service info plus every domain's paths and schemas.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = AccountsDoc::openapi();
        doc.merge(domain_users::ApiDoc::openapi());
        doc
    }
}
