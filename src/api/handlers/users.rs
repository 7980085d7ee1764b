//! User request handlers.
//!
//! Every handler finishes through the response writers so success and
//! error bodies share the same envelope.

use axum::{
    extract::{Path, State},
    response::Response,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{CreateUpdateUserRequest, ErrorResponse, ListResponse, UserFilter, UserResponse};
use crate::api::request::{RequestContext, bind_query, decode_json};
use crate::api::response::{write_error, write_ok};
use crate::error::AppError;
use crate::state::AppState;

/// Creates user-related routes.
///
/// Routes:
/// - GET /users        - List users by filter and page
/// - POST /users       - Create a new user
/// - GET /users/{id}   - Get user by ID
/// - PUT /users/{id}   - Update user by ID
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_users, create_user))
        .routes(routes!(get_user_by_id, update_user))
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("invalid user id {raw:?}: {e}")))
}

/// GET /users - List users
#[utoipa::path(
    get,
    path = "/users",
    tag = USER_TAG,
    params(
        ("email" = Option<String>, Query, description = "Substring of the email address"),
        ("created_at" = Option<String>, Query, description = "RFC 3339 lower bound on creation time"),
        ("page" = Option<i32>, Query, description = "Page number, raised to 1 when lower"),
        ("limit" = Option<i32>, Query, description = "Page size, clamped to 1..=100"),
    ),
    responses(
        (status = 200, description = "One page of users", body = crate::api::dto::Response<ListResponse<UserResponse>>),
        (status = 400, description = "Malformed query parameter", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn get_users(State(state): State<AppState>, ctx: RequestContext) -> Response {
    let mut filter = UserFilter::default();
    if let Err(err) = bind_query(&ctx.uri, &mut filter) {
        return write_error(&ctx, AppError::bad_request(err).into());
    }

    match state.services.users.get_users(filter).await {
        Ok(list) => write_ok(&ctx, list),
        Err(err) => write_error(&ctx, err),
    }
}

/// GET /users/{id} - Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = USER_TAG,
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = crate::api::dto::Response<UserResponse>),
        (status = 400, description = "Id is not a number", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(err) => return write_error(&ctx, err.into()),
    };

    match state.services.users.get_user_by_id(id).await {
        Ok(user) => write_ok(&ctx, user),
        Err(err) => write_error(&ctx, err),
    }
}

/// POST /users - Create user
#[utoipa::path(
    post,
    path = "/users",
    tag = USER_TAG,
    request_body = CreateUpdateUserRequest,
    responses(
        (status = 200, description = "User created", body = crate::api::dto::Response<String>),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn create_user(State(state): State<AppState>, ctx: RequestContext) -> Response {
    let request: CreateUpdateUserRequest = match decode_json(&ctx.body) {
        Ok(request) => request,
        Err(err) => return write_error(&ctx, err.into()),
    };

    match state.services.users.create_user(request).await {
        Ok(()) => write_ok(&ctx, "create User success"),
        Err(err) => write_error(&ctx, err),
    }
}

/// PUT /users/{id} - Update user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = USER_TAG,
    params(("id" = i64, Path, description = "User id")),
    request_body = CreateUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = crate::api::dto::Response<String>),
        (status = 400, description = "Invalid id or request body", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(err) => return write_error(&ctx, err.into()),
    };
    let request: CreateUpdateUserRequest = match decode_json(&ctx.body) {
        Ok(request) => request,
        Err(err) => return write_error(&ctx, err.into()),
    };

    match state.services.users.update_user(id, request).await {
        Ok(()) => write_ok(&ctx, "update User success"),
        Err(err) => write_error(&ctx, err),
    }
}
