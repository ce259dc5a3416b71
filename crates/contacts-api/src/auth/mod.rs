//! Credentials and bearer tokens.

mod password;
mod token;

pub use password::{CredentialHasher, PasswordError};
pub use token::{Claims, TokenError, TokenIssuer};
