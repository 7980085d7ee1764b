//! User service for business logic operations.
//!
//! Classifies store failures for the HTTP layer and runs writes inside a
//! transaction.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use jiff_diesel::ToDiesel;

use crate::api::dto::{
    CreateUpdateUserRequest, ListResponse, PaginationResponse, UserFilter, UserResponse,
};
use crate::error::{AppError, StoreError};
use crate::models::{NewUser, UpdateUser};
use crate::repositories::UserStore;
use crate::utils::clock::Clock;
use crate::utils::validate::validate_request;

/// User operations exposed to handlers.
///
/// Errors carry an [`AppError`] class somewhere in their chain.
#[async_trait]
pub trait UserUsecase: Send + Sync {
    async fn get_users(&self, filter: UserFilter) -> anyhow::Result<ListResponse<UserResponse>>;

    async fn get_user_by_id(&self, id: i64) -> anyhow::Result<UserResponse>;

    async fn create_user(&self, request: CreateUpdateUserRequest) -> anyhow::Result<()>;

    async fn update_user(&self, id: i64, request: CreateUpdateUserRequest) -> anyhow::Result<()>;
}

fn is_store_error(err: &anyhow::Error, kind: StoreError) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<StoreError>() == Some(&kind))
}

/// NotFound for a missing row, Internal for anything else.
fn classify_lookup(err: anyhow::Error) -> AppError {
    if is_store_error(&err, StoreError::NotFound) {
        AppError::not_found(err)
    } else {
        AppError::internal(err)
    }
}

/// Logs a failed transaction teardown without failing the request.
fn log_tx_end(operation: &str, write_failed: bool, err: &anyhow::Error) {
    if write_failed && is_store_error(err, StoreError::TransactionAborted) {
        tracing::debug!(operation, "transaction rolled back");
    } else {
        tracing::error!(operation, error = %format!("{err:#}"), "transaction teardown failed");
    }
}

/// User service for handling user-related business logic.
pub struct UserService<R> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: UserStore> UserService<R> {
    /// Creates a new UserService with the given repository and clock.
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn validated_email(request: CreateUpdateUserRequest) -> anyhow::Result<String> {
        validate_request(&request)?;
        request
            .email
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("email is a required field")).into())
    }
}

#[async_trait]
impl<R: UserStore> UserUsecase for UserService<R> {
    async fn get_users(&self, mut filter: UserFilter) -> anyhow::Result<ListResponse<UserResponse>> {
        filter.pagination.normalize();

        let users = self
            .repo
            .get_users(&filter)
            .await
            .map_err(AppError::internal)
            .context("UserService.get_users.get_users")?;

        let total = self
            .repo
            .count_users(&filter)
            .await
            .map_err(AppError::internal)
            .context("UserService.get_users.count_users")?;

        let pagination = PaginationResponse::new(filter.pagination, total)
            .map_err(AppError::internal)
            .context("UserService.get_users.total_page")?;

        Ok(ListResponse {
            data: users.into_iter().map(UserResponse::from).collect(),
            pagination,
        })
    }

    async fn get_user_by_id(&self, id: i64) -> anyhow::Result<UserResponse> {
        let user = self
            .repo
            .get_user_by_id(id)
            .await
            .map_err(classify_lookup)
            .context("UserService.get_user_by_id.get_user_by_id")?;

        Ok(user.into())
    }

    async fn create_user(&self, request: CreateUpdateUserRequest) -> anyhow::Result<()> {
        let email = Self::validated_email(request).context("UserService.create_user.validate")?;

        let user = NewUser {
            created_at: self.clock.now().to_diesel(),
            created_by: email.clone(),
            email,
        };

        let mut tx = self
            .repo
            .tx_begin()
            .await
            .map_err(AppError::internal)
            .context("UserService.create_user.tx_begin")?;

        let result = self.repo.insert_user(&mut tx, user).await;
        if let Err(err) = self.repo.tx_end(tx, result.as_ref().err()).await {
            log_tx_end("UserService.create_user.tx_end", result.is_err(), &err);
        }

        let id = result
            .map_err(AppError::internal)
            .context("UserService.create_user.insert_user")?;
        tracing::info!(user_id = id, "user created");
        Ok(())
    }

    async fn update_user(&self, id: i64, request: CreateUpdateUserRequest) -> anyhow::Result<()> {
        let email = Self::validated_email(request).context("UserService.update_user.validate")?;

        self.repo
            .get_user_by_id(id)
            .await
            .map_err(classify_lookup)
            .context("UserService.update_user.get_user_by_id")?;

        let user = UpdateUser {
            email: Some(email.clone()),
            updated_at: Some(self.clock.now().to_diesel()),
            updated_by: Some(email),
        };

        let mut tx = self
            .repo
            .tx_begin()
            .await
            .map_err(AppError::internal)
            .context("UserService.update_user.tx_begin")?;

        let result = self.repo.update_user(&mut tx, id, user).await;
        if let Err(err) = self.repo.tx_end(tx, result.as_ref().err()).await {
            log_tx_end("UserService.update_user.tx_end", result.is_err(), &err);
        }

        result
            .map_err(AppError::internal)
            .context("UserService.update_user.update_user")?;
        tracing::info!(user_id = id, "user updated");
        Ok(())
    }
}
