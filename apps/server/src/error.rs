use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tickerlift_core::errors::Error as CoreError;
use tickerlift_core::files::FileError;
use tickerlift_core::tables::TableError;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    // Surface the underlying error message to help debugging during development
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

fn core_status(error: &CoreError) -> StatusCode {
    match error {
        CoreError::Validation(_) | CoreError::Table(_) => StatusCode::BAD_REQUEST,
        CoreError::File(e) => match e {
            FileError::NotFound(_) => StatusCode::NOT_FOUND,
            FileError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            FileError::InvalidName(_) | FileError::InvalidExtension(_) => StatusCode::BAD_REQUEST,
            FileError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        CoreError::Cancelled | CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<FileError> for ApiError {
    fn from(err: FileError) -> Self {
        ApiError::Core(CoreError::File(err))
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        ApiError::Core(CoreError::Table(err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
