use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// 門禁拒絕原因，原樣回傳給呼叫端
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("missing token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("domain not allowed")]
    DomainNotAllowed,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingToken => "missing token",
            Rejection::InvalidToken => "invalid or expired token",
            Rejection::DomainNotAllowed => "domain not allowed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Rejection::MissingToken => StatusCode::UNAUTHORIZED,
            Rejection::InvalidToken | Rejection::DomainNotAllowed => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Authorization failed: {0}")]
    AuthError(#[from] Rejection),

    #[error("Assistant service error: {message}")]
    UpstreamError { message: String },

    #[error("Assistant request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Token signing error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Widget asset missing: {asset}")]
    AssetMissing { asset: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Auth,
    Upstream,
    Configuration,
    Internal,
}

impl WidgetError {
    pub fn validation(message: impl Into<String>) -> Self {
        WidgetError::ValidationError {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        WidgetError::UpstreamError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            WidgetError::ValidationError { .. } => ErrorCategory::Validation,
            WidgetError::AuthError(_) => ErrorCategory::Auth,
            WidgetError::UpstreamError { .. } | WidgetError::HttpError(_) => {
                ErrorCategory::Upstream
            }
            WidgetError::ConfigError { .. }
            | WidgetError::MissingConfigError { .. }
            | WidgetError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            WidgetError::TokenError(_)
            | WidgetError::IoError(_)
            | WidgetError::SerializationError(_)
            | WidgetError::AssetMissing { .. } => ErrorCategory::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WidgetError::AuthError(rejection) => rejection.status_code(),
            _ => match self.category() {
                ErrorCategory::Validation => StatusCode::BAD_REQUEST,
                ErrorCategory::Upstream => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// 對外顯示的原因；內部細節只寫進日誌
    pub fn public_reason(&self) -> String {
        match self {
            WidgetError::ValidationError { message } => message.clone(),
            WidgetError::AuthError(rejection) => rejection.reason().to_string(),
            WidgetError::UpstreamError { .. } | WidgetError::HttpError(_) => {
                "assistant unavailable".to_string()
            }
            WidgetError::AssetMissing { asset } => format!("{} is missing", asset),
            _ => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for WidgetError {
    fn into_response(self) -> Response {
        match self.category() {
            ErrorCategory::Upstream => tracing::error!("❌ {}", self),
            ErrorCategory::Internal | ErrorCategory::Configuration => {
                tracing::error!("❌ Request failed: {}", self)
            }
            ErrorCategory::Auth => tracing::warn!("🚫 Rejected: {}", self),
            ErrorCategory::Validation => tracing::debug!("Bad request: {}", self),
        }

        let body = serde_json::json!({ "reason": self.public_reason() });
        (self.status_code(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;
