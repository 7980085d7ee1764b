//! Liveness check.

use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::state::AppState;

pub fn ping_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(ping))
}

/// GET /ping - Liveness check
#[utoipa::path(
    get,
    path = "/ping",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    )
)]
async fn ping() -> &'static str {
    "pong"
}
