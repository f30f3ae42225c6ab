use crate::config::ConfigError;
use crate::listings::ListingImportError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use std::fmt;

/// Coarse classification shared by the domain errors so the HTTP layer can
/// decide between a redirect with a message and an error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Conflict,
    NotFound,
    Authentication,
    Unavailable,
}

impl FailureKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            FailureKind::Validation => StatusCode::BAD_REQUEST,
            FailureKind::Conflict => StatusCode::CONFLICT,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::Authentication => StatusCode::UNAUTHORIZED,
            FailureKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether a form submission failing this way should bounce back to the
    /// user with a message rather than surface as a server error.
    pub fn is_user_facing(self) -> bool {
        !matches!(self, FailureKind::Unavailable)
    }
}

/// Startup and process-level failures of the service binary.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Import(ListingImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Import(err) => write!(f, "listing import error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Import(err) => Some(err),
        }
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

impl From<ListingImportError> for AppError {
    fn from(value: ListingImportError) -> Self {
        Self::Import(value)
    }
}
