use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    NotFound,
    InvalidReference,
    Validation,
    Timeout,
    Internal,
}

/// Serializable error handed across the presentation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrmError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} {id} references unknown {reference}")]
    InvalidReference {
        entity: &'static str,
        id: String,
        reference: String,
    },
    #[error("validation failed: {0}")]
    Validation(String),
}

impl CrmError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_reference(
        entity: &'static str,
        id: impl ToString,
        reference: impl Into<String>,
    ) -> Self {
        Self::InvalidReference {
            entity,
            id: id.to_string(),
            reference: reference.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CrmError::NotFound { .. } => ErrorCode::NotFound,
            CrmError::InvalidReference { .. } => ErrorCode::InvalidReference,
            CrmError::Validation(_) => ErrorCode::Validation,
        }
    }
}

impl From<CrmError> for ApiError {
    fn from(value: CrmError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

pub type CrmResult<T> = Result<T, CrmError>;
