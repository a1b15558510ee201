use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Provider failure. The detail is logged; clients only see the summary.
    #[error("{summary}")]
    Upstream { summary: &'static str, detail: String },
}

impl ProxyError {
    pub fn upstream(summary: &'static str, detail: impl ToString) -> Self {
        ProxyError::Upstream {
            summary,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ProxyError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ProxyError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ProxyError::Upstream { summary, ref detail } => {
                tracing::error!(%detail, "{summary}");
                (StatusCode::BAD_GATEWAY, summary.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
