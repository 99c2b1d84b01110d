// crates/adapt/src/http/error.rs

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::contact::FieldError;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::UpstreamError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid fields")]
    Validation(Vec<FieldError>),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body or query string that does not deserialize.
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("email delivery failed: {0}")]
    Email(#[source] UpstreamError),

    #[error("registrar lookup failed: {0}")]
    Registrar(#[source] UpstreamError),

    #[error("internal error: {0}")]
    Internal(#[from] crate::Error),
}

impl ApiError {
    pub fn to_status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Malformed(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Registrar(_) => StatusCode::BAD_GATEWAY,
            ApiError::Email(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the caller sees. Upstream details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(_) => "invalid request".to_owned(),
            ApiError::BadRequest(reason) => reason.clone(),
            ApiError::Malformed(_) => "malformed request".to_owned(),
            ApiError::NotConfigured(what) => format!("{what} is unavailable"),
            ApiError::Email(_) => "failed to send message".to_owned(),
            ApiError::Registrar(_) => "domain availability check failed".to_owned(),
            ApiError::Internal(_) => "internal error".to_owned(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("rejected JSON body: {rejection}");
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("rejected query string: {rejection}");
        ApiError::Malformed(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.to_status();
        if status.is_server_error() {
            error!("{self}");
        }
        let fields = match &self {
            ApiError::Validation(fields) => Some(fields.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.public_message(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}
