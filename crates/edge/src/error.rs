use adapt::Error as AdaptError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;
use serve::{ContentError, Error as ServeError};
use std::io;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("adapt error: {0}")]
    AdaptError(#[from] AdaptError),

    #[error("serve error: {0}")]
    ServeError(#[from] ServeError),

    #[error("page {0} not found")]
    PageNotFound(usize),
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::ServeError(e) => e.to_status(),
            Error::PageNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ContentError> for Error {
    fn from(e: ContentError) -> Self {
        Error::ServeError(ServeError::from(e))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_status();
        let message = if status.is_server_error() {
            error!("{self}");
            "internal error".to_owned()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
