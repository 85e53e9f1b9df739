//! Error types.
//!
//! Code that talks to Google or bootstraps the process uses `anyhow` through the `Res` alias.
//! Everything that can reach an HTTP client is expressed as an [`Error`], which knows its own
//! status code and renders itself as a `{"data": message}` JSON body.

use crate::model::{Field, FieldError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

pub(crate) type Res<T> = anyhow::Result<T>;

pub type Result<T> = std::result::Result<T, Error>;

/// The message shown to clients for any failure of the backing spreadsheet.
pub const GATEWAY_FAILURE_MESSAGE: &str = "An error occurred while accessing the spreadsheet";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path or body parameter that must be supplied was not.
    #[error("{0}")]
    MissingParameter(String),

    /// The request body could not be understood.
    #[error("{0}")]
    InvalidBody(String),

    /// A sheet or a row index does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("The body must have a {0} param.")]
    MissingRequiredField(Field),

    #[error("The {field} param is invalid: {reason}")]
    InvalidField { field: Field, reason: String },

    #[error("A sheet with this name already exists")]
    DuplicateName(String),

    /// A stored row holds data that cannot be represented as a transaction.
    #[error("The row {row_number} cannot be read: {source}")]
    MalformedRow {
        row_number: usize,
        #[source]
        source: FieldError,
    },

    #[error("{GATEWAY_FAILURE_MESSAGE}")]
    GatewayFailure(#[source] anyhow::Error),
}

impl Error {
    /// Collapses any failure of the spreadsheet gateway into the generic client-facing error,
    /// logging the full chain first.
    pub(crate) fn gateway(e: anyhow::Error) -> Self {
        error!("Spreadsheet gateway failure: {e:#}");
        Error::GatewayFailure(e)
    }

    pub(crate) fn sheet_not_found(sheet: &str) -> Self {
        Error::NotFound(format!("The {sheet} sheet not exists"))
    }

    pub(crate) fn row_not_found(row: &str) -> Self {
        Error::NotFound(format!("The {row} row not exists"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParameter(_)
            | Error::InvalidBody(_)
            | Error::NotFound(_)
            | Error::MissingRequiredField(_)
            | Error::InvalidField { .. }
            | Error::DuplicateName(_) => StatusCode::BAD_REQUEST,
            Error::MalformedRow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::GatewayFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<FieldError> for Error {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::MissingRequired(field) => Error::MissingRequiredField(field),
            FieldError::Invalid { field, reason } => Error::InvalidField { field, reason },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "data": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        let errors = [
            Error::MissingParameter("Sheet name must be in body.".into()),
            Error::InvalidBody("bad".into()),
            Error::sheet_not_found("Income"),
            Error::MissingRequiredField(Field::Name),
            Error::InvalidField {
                field: Field::Value,
                reason: "not a number".into(),
            },
            Error::DuplicateName("Expenses".into()),
        ];
        for e in errors {
            assert_eq!(e.status_code(), StatusCode::BAD_REQUEST, "{e}");
        }
    }

    #[test]
    fn test_gateway_failure_hides_details() {
        let e = Error::gateway(anyhow::anyhow!("invalid_grant: account disabled"));
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.to_string(), GATEWAY_FAILURE_MESSAGE);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::MissingRequiredField(Field::PaymentMethod).to_string(),
            "The body must have a payment_method param."
        );
        assert_eq!(
            Error::row_not_found("7").to_string(),
            "The 7 row not exists"
        );
        assert_eq!(
            Error::sheet_not_found("Income").to_string(),
            "The Income sheet not exists"
        );
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = Error::DuplicateName("Expenses".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({ "data": "A sheet with this name already exists" })
        );
    }
}
