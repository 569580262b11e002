use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures while bringing the service up. These never reach a client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Caller mistakes detected before any upstream call is made.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Prompt is required.")]
    MissingPrompt,
}

/// Every way a relay request can end without a successful answer.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Upstream answered with a non-success status; status and body are passed through.
    #[error("Gemini API error: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Upstream answered successfully but without `candidates[0].content.parts[0].text`.
    #[error("Invalid response structure from API.")]
    InvalidResponseStructure,

    /// Missing configuration, unparsable inbound body, network failure, or anything else.
    #[error("{0}")]
    Unclassified(#[from] anyhow::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        match self {
            RelayError::Client(err) => {
                let status = match err {
                    ClientError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
                    ClientError::MissingPrompt => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string()).into_response()
            }
            RelayError::Upstream { status, body } => {
                (status, format!("Gemini API error: {}", body)).into_response()
            }
            RelayError::InvalidResponseStructure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RelayError::InvalidResponseStructure.to_string(),
            )
                .into_response(),
            RelayError::Unclassified(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    fn content_type(res: &Response) -> String {
        res.headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn client_errors_map_to_plain_text_statuses() {
        let res = RelayError::from(ClientError::MethodNotAllowed).into_response();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(content_type(&res).starts_with("text/plain"));

        let res = RelayError::from(ClientError::MissingPrompt).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_status_is_passed_through() {
        let res = RelayError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "overloaded".to_string(),
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unclassified_errors_are_json() {
        let res = RelayError::Unclassified(anyhow::anyhow!("boom")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type(&res).starts_with("application/json"));
    }
}
