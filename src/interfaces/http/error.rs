//! Error type for the HTTP surface.
//!
//! Every domain error converts into an `ApiError`, and each variant declares
//! its status code. Bodies are `{"error": <code>, "detail": <message>}`.
//! Upstream and storage causes are logged and never sent to the client.

use crate::domain::errors::{AccountError, AuthError, CatalogError, FeedError, LedgerError};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InsufficientFunds(String),

    #[error("{0}")]
    InsufficientHoldings(String),

    #[error("Market data provider is unavailable, please retry later")]
    Upstream(#[source] anyhow::Error),

    #[error("Internal server error")]
    Persistence(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InsufficientFunds(_)
            | ApiError::InsufficientHoldings(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::InsufficientFunds(_) => "insufficient_funds",
            ApiError::InsufficientHoldings(_) => "insufficient_holdings",
            ApiError::Upstream(_) => "upstream_unavailable",
            ApiError::Persistence(_) => "persistence_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(source) => error!("Upstream failure: {:#}", source),
            ApiError::Persistence(source) => error!("Persistence failure: {:#}", source),
            _ => {}
        }

        let status = self.status();
        let body = Json(json!({
            "error": self.code(),
            "detail": self.to_string(),
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        ApiError::Upstream(anyhow::Error::new(err))
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateTicker(_) => ApiError::Conflict(err.to_string()),
            CatalogError::InvalidPrice(_) | CatalogError::EmptyTicker => {
                ApiError::Validation(err.to_string())
            }
            CatalogError::Feed(feed) => feed.into(),
            CatalogError::SyncFailed(source) | CatalogError::Storage(source) => {
                ApiError::Persistence(source)
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidVolume(_)
            | LedgerError::InvalidSide(_)
            | LedgerError::NotTradable { .. } => ApiError::Validation(err.to_string()),
            LedgerError::InstrumentNotFound(_) | LedgerError::AccountNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            LedgerError::InsufficientBalance { .. } => ApiError::InsufficientFunds(err.to_string()),
            LedgerError::InsufficientHoldings { .. } => {
                ApiError::InsufficientHoldings(err.to_string())
            }
            LedgerError::CommitFailed(source) => ApiError::Persistence(source),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthenticated("Incorrect username or password".to_string())
            }
            AuthError::Unauthenticated(_) => {
                ApiError::Unauthenticated("Could not validate credentials".to_string())
            }
            AuthError::Internal(msg) => ApiError::Persistence(anyhow::anyhow!(msg)),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidUsername
            | AccountError::InvalidPassword
            | AccountError::InvalidInitialBalance(_) => ApiError::Validation(err.to_string()),
            AccountError::DuplicateUsername(_) => ApiError::Conflict(err.to_string()),
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            AccountError::Auth(auth) => auth.into(),
            AccountError::Storage(source) => ApiError::Persistence(source),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
