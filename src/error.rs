use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{}", describe_service_failure(.status, .message))]
    Service { status: Option<u16>, message: String },
}

fn describe_service_failure(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("API request failed: {code}: {message}"),
        None => format!("API request failed: {message}"),
    }
}

impl ResearchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ResearchError::Service { status, .. } => *status,
            ResearchError::Validation(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResearchError::Validation(_) => "validation",
            ResearchError::Service { status: Some(429), .. } => "rate_limit",
            ResearchError::Service { status: Some(401 | 403), .. } => "auth_error",
            ResearchError::Service { status: Some(400..=499), .. } => "invalid_request",
            ResearchError::Service { status: Some(_), .. } => "server_error",
            ResearchError::Service { status: None, .. } => "network_error",
        }
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        ResearchError::Service {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Research(#[from] ResearchError),
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Research(ResearchError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Research(err @ ResearchError::Service { .. }) => {
                tracing::error!(error = %err, error.type = err.kind(), "Research session failed");
                (StatusCode::BAD_GATEWAY, format!("Research failed: {err}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
