//! Error types for prism-web page handlers
//!
//! Every error still renders the full page (shell and form) so the user
//! never lands on a bare error body.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use prism_model::ModelError;
use thiserror::Error;
use tracing::{error, warn};

use crate::api::ui::form::FormValues;
use crate::api::ui::page;

/// Page error type
#[derive(Debug, Error)]
pub enum PageError {
    /// A submitted field is not of the expected type (400)
    #[error("Invalid {field}: {message}")]
    BadInput {
        field: &'static str,
        message: String,
        /// Submitted values, re-rendered into the form
        form: FormValues,
    },

    /// The model rejected the subject (500)
    #[error("Model error: {source}")]
    Model {
        source: ModelError,
        /// Submitted values, re-rendered into the form
        form: FormValues,
    },
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::BadInput {
                field,
                message,
                form,
            } => {
                // Field name only: submitted values are never logged
                warn!("Rejected submission: invalid {}", field);
                let notice = format!("Invalid {}: {}", field, message);
                (
                    StatusCode::BAD_REQUEST,
                    Html(page::render(&form, None, Some(&notice))),
                )
                    .into_response()
            }
            PageError::Model { source, form } => {
                error!("Prediction failed: {}", source);
                let notice = format!("The model could not evaluate this input: {}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(page::render(&form, None, Some(&notice))),
                )
                    .into_response()
            }
        }
    }
}

/// Result type for page handlers
pub type PageResult<T> = Result<T, PageError>;
