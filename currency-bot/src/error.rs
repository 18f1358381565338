use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ::config::ConfigError),
    #[error("listen port must be set (PORT or CURRENCY_BOT_PORT)")]
    MissingPort,
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("HTTP server failed: {0}")]
    Server(#[from] hyper::Error),
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
        endpoint: &'static str,
    },
    #[error("reply rejected with {status}: {body}")]
    ReplyRejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Failures of an inbound webhook delivery, answered with an HTTP status.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("webhook body could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature => StatusCode::BAD_REQUEST,
            WebhookError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
