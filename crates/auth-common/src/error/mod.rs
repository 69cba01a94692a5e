//! Error taxonomy shared by every layer above the domain

mod app_error;

pub use app_error::{AppError, AppResult, ErrorResponse};
