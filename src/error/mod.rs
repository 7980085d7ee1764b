mod app_error;
mod database_converter;
mod store_error;

pub use app_error::{AppError, AppResult};
pub use database_converter::DatabaseErrorConverter;
pub use store_error::StoreError;
