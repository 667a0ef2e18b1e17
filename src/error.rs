//! Unified application error model and mapping helpers.
//! This module provides a common error enum used across the client, the
//! shell views and validation, along with mappers to and from HTTP statuses.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    Validation { code: String, message: String },
    Auth { code: String, message: String },
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Api { code: String, message: String },
    Transport { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Api { code, .. }
            | AppError::Transport { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Api { message, .. }
            | AppError::Transport { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn api<S: Into<String>>(code: S, msg: S) -> Self { AppError::Api { code: code.into(), message: msg.into() } }
    pub fn transport<S: Into<String>>(code: S, msg: S) -> Self { AppError::Transport { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map a collaborator HTTP status plus its reported message to a variant.
    /// 401 is classified as Auth so the expiry guard can act on it; everything
    /// else keeps the collaborator's message verbatim for display.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => AppError::Auth { code: "no_autorizado".into(), message },
            403 => AppError::Forbidden { code: "prohibido".into(), message },
            404 => AppError::NotFound { code: "no_encontrado".into(), message },
            409 => AppError::Conflict { code: "conflicto".into(), message },
            _ => AppError::Api { code: format!("api_{}", status), message },
        }
    }

    /// Map back to an HTTP status code (used by tests and diagnostics).
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::Auth { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Api { .. } => 422,
            AppError::Transport { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }

    pub fn is_auth(&self) -> bool { matches!(self, AppError::Auth { .. }) }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures carry a generic fallback; callers that have
        // a structured collaborator message use from_status instead.
        AppError::Transport { code: "transporte".into(), message: format!("error de red: {}", err) }
    }
}
