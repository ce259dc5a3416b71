//! Error types for the contacts API.

use crate::auth::{PasswordError, TokenError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contacts_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use twilio_client::SmsError;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    UserExists,

    #[error("{0}")]
    Conflict(String),

    /// Same message for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Cannot send OTP to unverified number. Please verify the number or upgrade your Twilio account.")]
    UnverifiedRecipient { more_info: Option<String> },

    #[error("Failed to send OTP: {0}")]
    Gateway(String),

    /// The provider accepted the message but its recipient vanished before
    /// the log entry was written.
    #[error("Message {provider_sid} was sent but not logged: the contact was deleted")]
    DeliveredNotLogged { provider_sid: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(rename = "moreInfo", skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UserExists => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnverifiedRecipient { .. } => StatusCode::BAD_REQUEST,
            ApiError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DeliveredNotLogged { .. } => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::UserExists => "USER_EXISTS",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UnverifiedRecipient { .. } => "UNVERIFIED_RECIPIENT",
            ApiError::Gateway(_) => "GATEWAY_ERROR",
            ApiError::DeliveredNotLogged { .. } => "DELIVERED_NOT_LOGGED",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let more_info = match &self {
            ApiError::UnverifiedRecipient { more_info } => more_info.clone(),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            more_info,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidInput(msg) => ApiError::Validation(msg),
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Io(_) | StoreError::Serialization(_) => ApiError::Storage(e.to_string()),
        }
    }
}

impl From<SmsError> for ApiError {
    fn from(e: SmsError) -> Self {
        match e {
            SmsError::UnverifiedRecipient { more_info, .. } => {
                ApiError::UnverifiedRecipient { more_info }
            }
            other => ApiError::Gateway(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::Unauthorized("Token has expired".into()),
            TokenError::InvalidKey | TokenError::Encoding(_) => ApiError::Internal(e.to_string()),
            _ => ApiError::Unauthorized("Token is not valid".into()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(e.to_string())
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
