//! Authenticated session.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Server address and bearer token for one signed-in user.
///
/// Passed to every authenticated call.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    token: SecretString,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let session = Session::new("http://localhost:5000/", "t");
        assert_eq!(session.base_url(), "http://localhost:5000");
        assert_eq!(session.url("/api/contacts"), "http://localhost:5000/api/contacts");
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new("http://localhost", "super-secret-token");
        assert!(!format!("{:?}", session).contains("super-secret-token"));
    }
}
