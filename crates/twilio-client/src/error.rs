//! SMS gateway errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider only delivers to numbers verified on the account.
    #[error("Recipient number is not verified: {message}")]
    UnverifiedRecipient {
        message: String,
        more_info: Option<String>,
    },

    #[error("Provider rejected message ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },
}

impl SmsError {
    pub fn is_unverified_recipient(&self) -> bool {
        matches!(self, SmsError::UnverifiedRecipient { .. })
    }
}
