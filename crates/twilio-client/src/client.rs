//! Twilio HTTP client.

use crate::error::SmsError;
use crate::gateway::SmsGateway;
use crate::types::*;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Public Twilio REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.twilio.com";

/// Twilio Programmable Messaging client.
///
/// The auth token is held as a `SecretString` so it never appears in
/// debug output.
#[derive(Clone)]
pub struct TwilioClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl TwilioClient {
    /// Create a new Twilio client.
    pub fn new(
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: SecretString,
        from_number: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SmsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token,
            from_number: from_number.into(),
        })
    }

    /// Sender number messages are sent from.
    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    fn account_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}",
            self.base_url,
            encode(&self.account_sid)
        )
    }

    /// Send an SMS through the Messages resource.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        let form = SendMessageForm {
            to,
            from: &self.from_number,
            body,
        };

        let response = self
            .client
            .post(format!("{}/Messages.json", self.account_url()))
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Twilio send failed");
            return Err(classify_error(status.as_u16(), &text));
        }

        let resource: MessageResource = response.json().await?;
        debug!(sid = %resource.sid, status = ?resource.status, "Message accepted");
        Ok(resource.into())
    }

    /// Check that the account resource is readable with our credentials.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}.json", self.account_url()))
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// Turn a failed response into an error, singling out unverified recipients.
fn classify_error(status: u16, text: &str) -> SmsError {
    let body: ApiErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = body
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| text.to_string());

    if body.code == Some(UNVERIFIED_RECIPIENT_CODE) {
        return SmsError::UnverifiedRecipient {
            message,
            more_info: body.more_info,
        };
    }

    SmsError::Rejected {
        status: body.status.unwrap_or(status),
        code: body.code,
        message,
    }
}

#[async_trait]
impl SmsGateway for TwilioClient {
    async fn send_sms(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        self.send(to, body).await
    }

    async fn health_check(&self) -> bool {
        TwilioClient::health_check(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unverified_recipient() {
        let body = r#"{"code": 21608, "message": "The number is unverified.", "more_info": "https://www.twilio.com/docs/errors/21608", "status": 400}"#;

        match classify_error(400, body) {
            SmsError::UnverifiedRecipient { message, more_info } => {
                assert_eq!(message, "The number is unverified.");
                assert_eq!(
                    more_info.as_deref(),
                    Some("https://www.twilio.com/docs/errors/21608")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_provider_error() {
        let body = r#"{"code": 21211, "message": "Invalid 'To' Phone Number", "status": 400}"#;

        match classify_error(400, body) {
            SmsError::Rejected { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(21211));
                assert_eq!(message, "Invalid 'To' Phone Number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_non_json_body() {
        match classify_error(503, "Service Unavailable") {
            SmsError::Rejected { status, code, message } => {
                assert_eq!(status, 503);
                assert_eq!(code, None);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
