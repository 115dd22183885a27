use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::catalog::{CatalogImportError, SearchError};
use crate::workflows::listing::{BoardError, CommitError, WizardOpenError};
use crate::workflows::seller::IdentityError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Catalog(CatalogImportError),
    Board(BoardError),
    Identity(IdentityError),
    Search(SearchError),
    Submission(WizardOpenError),
    Commit(CommitError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog import error: {}", err),
            AppError::Board(err) => write!(f, "board error: {}", err),
            AppError::Identity(err) => write!(f, "identity error: {}", err),
            AppError::Search(err) => write!(f, "catalog search error: {}", err),
            AppError::Submission(err) => write!(f, "listing registration unavailable: {}", err),
            AppError::Commit(err) => write!(f, "listing submission failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Board(err) => Some(err),
            AppError::Identity(err) => Some(err),
            AppError::Search(err) => Some(err),
            AppError::Submission(err) => Some(err),
            AppError::Commit(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Search(SearchError::Catalog(_)) => StatusCode::BAD_GATEWAY,
            AppError::Catalog(_) | AppError::Search(_) => StatusCode::BAD_REQUEST,
            AppError::Submission(WizardOpenError::Blocked(_)) => StatusCode::FORBIDDEN,
            AppError::Commit(CommitError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Commit(CommitError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            AppError::Board(_)
            | AppError::Identity(_)
            | AppError::Submission(_)
            | AppError::Commit(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<CatalogImportError> for AppError {
    fn from(value: CatalogImportError) -> Self {
        Self::Catalog(value)
    }
}

impl From<BoardError> for AppError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<SearchError> for AppError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<WizardOpenError> for AppError {
    fn from(value: WizardOpenError) -> Self {
        Self::Submission(value)
    }
}

impl From<CommitError> for AppError {
    fn from(value: CommitError) -> Self {
        Self::Commit(value)
    }
}
