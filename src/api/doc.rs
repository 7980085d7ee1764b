use utoipa::OpenApi;

pub const USER_TAG: &str = "User";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "REST API Starter",
        description = "User management REST API",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::Pagination,
            crate::api::dto::PaginationResponse,
        )
    ),
    tags(
        (name = USER_TAG, description = "User management endpoints"),
        (name = HEALTH_TAG, description = "Liveness endpoints"),
    )
)]
pub struct ApiDoc;
