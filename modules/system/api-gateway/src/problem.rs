//! RFC 9457 problem details.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    /// No identity carrier produced a user. Carriers are not named.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authentication required",
        )
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            "You do not have permission to perform this operation",
        )
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", detail)
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "An internal error occurred",
        )
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(self),
        )
            .into_response()
    }
}

impl From<menu::DomainError> for Problem {
    fn from(e: menu::DomainError) -> Self {
        use menu::DomainError;
        match e {
            DomainError::ItemNotFound(_) | DomainError::GroupNotFound(_) => {
                Self::not_found(e.to_string())
            }
            DomainError::Validation { .. } => Self::bad_request(e.to_string()),
            DomainError::Database(err) => {
                tracing::error!(error = %err, "data store operation failed");
                Self::internal()
            }
        }
    }
}

impl From<authz_resolver::DomainError> for Problem {
    fn from(e: authz_resolver::DomainError) -> Self {
        use authz_resolver::DomainError;
        match e {
            DomainError::InvalidTuple(_) => Self::bad_request(e.to_string()),
            DomainError::Timeout { .. } | DomainError::PolicyStore(_) => {
                tracing::error!(error = %e, "policy store write failed");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "Bad Gateway",
                    "The policy store could not complete the request",
                )
            }
        }
    }
}
