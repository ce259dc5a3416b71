//! Client for the contacts API.
//!
//! Sign in with [`ContactsClient::login`] or [`ContactsClient::register`] to
//! get a [`Session`], then pass it to each call.

mod client;
mod error;
mod import;
mod session;
mod types;

pub use client::ContactsClient;
pub use error::ClientError;
pub use import::{check_row, ImportReport, RowError};
pub use session::Session;
pub use types::*;
