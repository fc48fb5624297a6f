use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::database::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("Item not found")]
    ItemNotFound,

    #[error("Progress store unavailable: {0}")]
    Storage(#[from] StoreError),

    #[error("Submission conflicted with concurrent updates, try again")]
    WriteContention,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::ItemNotFound => StatusCode::NOT_FOUND,
            AppError::Storage { .. } | AppError::WriteContention => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        (status, self.to_string()).into_response()
    }
}
