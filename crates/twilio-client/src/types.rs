//! Twilio API types.

use serde::{Deserialize, Serialize};

/// Twilio error code for sends to unverified numbers from trial accounts.
pub const UNVERIFIED_RECIPIENT_CODE: i64 = 21608;

/// Form body for the Messages resource.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageForm<'a> {
    #[serde(rename = "To")]
    pub to: &'a str,
    #[serde(rename = "From")]
    pub from: &'a str,
    #[serde(rename = "Body")]
    pub body: &'a str,
}

/// Message resource returned on a successful send.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResource {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body returned by the Twilio REST API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub more_info: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Outcome of an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReceipt {
    /// Provider message id.
    pub sid: String,
    /// Provider delivery status at acceptance time (e.g. "queued").
    pub status: Option<String>,
}

impl From<MessageResource> for SmsReceipt {
    fn from(resource: MessageResource) -> Self {
        Self {
            sid: resource.sid,
            status: resource.status,
        }
    }
}
