//! Gateway abstraction used by the API layer.

use crate::error::SmsError;
use crate::types::SmsReceipt;
use async_trait::async_trait;

/// Something that can deliver a text message to a phone number.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `body` to `to` (E.164). Returns once the provider accepted
    /// or rejected the message.
    async fn send_sms(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError>;

    /// Whether the provider is reachable with the configured credentials.
    async fn health_check(&self) -> bool {
        true
    }
}
