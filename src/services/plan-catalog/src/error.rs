//! Error handling for the HTTP layer
//!
//! Maps domain and extraction failures onto status codes and a uniform JSON
//! body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::PlanError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Main error type for the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A domain failure on a recommendation request; carries the cities a
    /// client could pick instead
    #[error("{source}")]
    Recommendation {
        source: PlanError,
        available_cities: Vec<String>,
    },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Standardized error response structure
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_cities: Option<Vec<String>>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Attach the catalog's cities to a recommendation failure
    pub fn with_available_cities(self, available_cities: Vec<String>) -> Self {
        match self {
            ApiError::Plan(source) | ApiError::Recommendation { source, .. } => {
                ApiError::Recommendation {
                    source,
                    available_cities,
                }
            }
            other => other,
        }
    }

    fn plan_error(&self) -> Option<&PlanError> {
        match self {
            ApiError::Plan(source) | ApiError::Recommendation { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.plan_error() {
            Some(PlanError::InvalidArgument(_)) | Some(PlanError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(PlanError::NotFound(_)) => StatusCode::NOT_FOUND,
            None => match self {
                ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error type string for API responses
    pub fn error_type(&self) -> &'static str {
        match self.plan_error() {
            Some(PlanError::InvalidArgument(_)) => "invalid_argument",
            Some(PlanError::Validation(_)) => "validation_error",
            Some(PlanError::NotFound(_)) => "not_found",
            None => match self {
                ApiError::BadRequest { .. } => "invalid_request",
                _ => "internal_error",
            },
        }
    }

    /// Client errors are expected traffic; only server errors are logged
    pub fn should_log(&self) -> bool {
        self.status_code().is_server_error()
    }

    fn client_message(&self) -> String {
        match (self.plan_error(), self) {
            (Some(source), _) => detail(source).to_string(),
            (None, ApiError::BadRequest { message }) => message.clone(),
            (None, _) => "An unexpected error occurred".to_string(),
        }
    }
}

fn detail(error: &PlanError) -> &str {
    match error {
        PlanError::InvalidArgument(message)
        | PlanError::Validation(message)
        | PlanError::NotFound(message) => message,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_type = self.error_type();

        if self.should_log() {
            error!(
                error = %self,
                status_code = %status_code,
                error_type = error_type,
                "API error occurred"
            );
        }

        let message = self.client_message();
        let available_cities = match self {
            ApiError::Recommendation {
                available_cities, ..
            } => Some(available_cities),
            _ => None,
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: Some(message),
            available_cities,
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::bad_request(errors.to_string())
    }
}
