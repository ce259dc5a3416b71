//! Extractors whose rejections use the API error body.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON body; malformed input becomes a validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string; malformed input becomes a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
