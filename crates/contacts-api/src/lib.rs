//! Contacts API - contact management and OTP text messages over REST.
//!
//! Users register and sign in for a bearer token, manage a shared contact
//! list (search, paging, bulk import) and send text messages to contacts
//! through Twilio. Every sent message is logged.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::ApiError;
