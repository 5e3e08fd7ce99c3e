use std::fmt::Display;

use axum::{
    http::{self, header},
    response::{IntoResponse, Response},
    Json,
};
use hearth::basic_models::MessageResponse;

use crate::validation::ValidationErrors;

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Internal Server Error: {0:#}")]
    Internal(#[from] anyhow::Error),
    #[error("Failed to save changes: {0:#}")]
    Persistence(anyhow::Error),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Missing or invalid bearer token: {0}")]
    Unauthenticated(String),
    #[error("Not found")]
    NotFound,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        // In development, we want to return the error message
        // In production, we want to return a generic error message
        let display = |err: &dyn Display, generic: &str| {
            if cfg!(debug_assertions) {
                err.to_string()
            } else {
                generic.to_string()
            }
        };
        match self {
            WebError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    display(&err, "Internal Server Error"),
                )
                    .into_response()
            }
            WebError::Persistence(err) => {
                tracing::error!("Persistence failure: {:#}", err);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    display(&err, "Failed to save changes."),
                )
                    .into_response()
            }
            WebError::Validation(errors) => {
                (http::StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            // Never say which part of the credentials was wrong
            WebError::Auth(reason) => {
                tracing::info!("Rejected login: {}", reason);
                (
                    http::StatusCode::UNAUTHORIZED,
                    Json(MessageResponse {
                        message: "Invalid login attempt.".into(),
                    }),
                )
                    .into_response()
            }
            WebError::Unauthenticated(reason) => {
                tracing::debug!("Rejected bearer token: {}", reason);
                (
                    http::StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                )
                    .into_response()
            }
            WebError::NotFound => http::StatusCode::NOT_FOUND.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn status_codes() {
        let cases = [
            (WebError::NotFound, StatusCode::NOT_FOUND),
            (
                WebError::Auth("bad password".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                WebError::Validation(ValidationErrors::single("title", "required")),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebError::Persistence(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                WebError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn token_failures_ask_for_a_bearer_token() {
        let response = WebError::Unauthenticated("expired".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
