//! Contacts API HTTP client.

use crate::error::ClientError;
use crate::session::Session;
use crate::types::*;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Typed client for the contacts API.
#[derive(Clone)]
pub struct ContactsClient {
    client: Client,
}

impl ContactsClient {
    /// Create a new client.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Check server health.
    pub async fn health(&self, base_url: &str) -> Result<Health, ClientError> {
        let base_url = base_url.trim_end_matches('/');
        let response = self.client.get(format!("{}/health", base_url)).send().await?;
        parse(response).await
    }

    /// Create an account and start a session for it.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(
        &self,
        base_url: &str,
        registration: &Registration,
    ) -> Result<(Session, User), ClientError> {
        let base_url = base_url.trim_end_matches('/');
        let response = self
            .client
            .post(format!("{}/api/auth/register", base_url))
            .json(registration)
            .send()
            .await?;

        let body: RegisterResponse = parse(response).await?;
        debug!(user_id = %body.user.id, "Registered");
        Ok((Session::new(base_url, body.token), body.user))
    }

    /// Sign in.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        base_url: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let base_url = base_url.trim_end_matches('/');
        let response = self
            .client
            .post(format!("{}/api/auth/login", base_url))
            .json(&Credentials { email, password })
            .send()
            .await?;

        let body: LoginResponse = parse(response).await?;
        Ok(Session::new(base_url, body.token))
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.bearer_auth(session.token())
    }

    #[instrument(skip(self, session))]
    pub async fn list_contacts(
        &self,
        session: &Session,
        query: &ContactQuery,
    ) -> Result<ContactsPage, ClientError> {
        let request = self
            .client
            .get(session.url("/api/contacts"))
            .query(query);
        parse(self.authed(request, session).send().await?).await
    }

    #[instrument(skip(self, session))]
    pub async fn get_contact(&self, session: &Session, id: &str) -> Result<Contact, ClientError> {
        let request = self
            .client
            .get(session.url(&format!("/api/contacts/{}", encode(id))));
        parse(self.authed(request, session).send().await?).await
    }

    #[instrument(skip(self, session, draft))]
    pub async fn create_contact(
        &self,
        session: &Session,
        draft: &ContactDraft,
    ) -> Result<Contact, ClientError> {
        let request = self.client.post(session.url("/api/contacts")).json(draft);
        parse(self.authed(request, session).send().await?).await
    }

    /// Submit a batch; rejected items come back in `errors`.
    #[instrument(skip(self, session, drafts), fields(batch = drafts.len()))]
    pub async fn create_contacts_bulk(
        &self,
        session: &Session,
        drafts: &[ContactDraft],
    ) -> Result<BulkResult, ClientError> {
        let request = self
            .client
            .post(session.url("/api/contacts/bulk"))
            .json(drafts);
        parse(self.authed(request, session).send().await?).await
    }

    #[instrument(skip(self, session))]
    pub async fn delete_contact(&self, session: &Session, id: &str) -> Result<(), ClientError> {
        let request = self
            .client
            .delete(session.url(&format!("/api/contacts/{}", encode(id))));
        let response = self.authed(request, session).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Text a contact.
    #[instrument(skip(self, session, message))]
    pub async fn send_otp(
        &self,
        session: &Session,
        contact_id: &str,
        message: &str,
    ) -> Result<SendOtpResult, ClientError> {
        let request = self
            .client
            .post(session.url("/api/contacts/send-otp"))
            .json(&SendOtpRequest {
                contact_id,
                message,
            });
        parse(self.authed(request, session).send().await?).await
    }

    #[instrument(skip(self, session))]
    pub async fn list_messages(
        &self,
        session: &Session,
        query: &MessageQuery,
    ) -> Result<MessagesPage, ClientError> {
        let request = self
            .client
            .get(session.url("/api/messages"))
            .query(query);
        parse(self.authed(request, session).send().await?).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    warn!(status = %status, "Contacts API request failed");

    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    ClientError::Api {
        status: status.as_u16(),
        code: body.code,
        message: body.error.unwrap_or(text),
        more_info: body.more_info,
    }
}
