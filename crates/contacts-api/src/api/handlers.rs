//! HTTP request handlers.

use super::extract::{ApiJson, ApiQuery};
use super::middleware::AuthUser;
use super::types::{
    BulkResponse, ContactInput, ContactsPage, HealthResponse, ListContactsQuery,
    ListMessagesQuery, LoginRequest, LoginResponse, MessagesPage, RegisterRequest,
    RegisterResponse, SendOtpRequest, SendOtpResponse,
};
use super::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use contacts_store::{
    BulkItem, Contact, NewContact, PageRequest, StoreError, User, DEFAULT_PAGE_LIMIT,
};
use tracing::{info, warn};

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1600;

/// Liveness text.
pub async fn root() -> &'static str {
    "Working"
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.db.stats().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        contacts: stats.contacts,
        messages: stats.messages,
    })
}

/// Validate paging parameters, capping `limit` at the configured maximum.
fn page_request(
    state: &AppState,
    page: Option<u64>,
    limit: Option<u64>,
) -> Result<PageRequest, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(state.max_page_size);
    Ok(PageRequest::new(page.unwrap_or(1), limit)?)
}

/// Create an account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if let Some(problem) = request.problem() {
        return Err(ApiError::Validation(problem));
    }

    let email = request.email.trim();
    if state.db.find_user_by_email(email).await.is_some() {
        return Err(ApiError::UserExists);
    }

    let password_hash = state.hasher.hash(&request.password).await?;
    let user = User::new(
        request.name.trim(),
        email,
        request.phone.trim(),
        password_hash,
    );

    let user = state.db.insert_user(user).await.map_err(|e| match e {
        StoreError::Conflict(_) => ApiError::UserExists,
        other => other.into(),
    })?;
    let token = state.tokens.issue(&user.id)?;

    info!(user_id = %user.id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Exchange credentials for a token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.db.find_user_by_email(request.email.trim()).await;
    let matched = state
        .hasher
        .verify(
            &request.password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        )
        .await?;

    let user = match user {
        Some(user) if matched => user,
        _ => {
            warn!("Login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state.tokens.issue(&user.id)?;
    info!(user_id = %user.id, "Login succeeded");

    Ok(Json(LoginResponse { token }))
}

/// List contacts, optionally filtered by a search term.
pub async fn list_contacts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListContactsQuery>,
) -> Result<Json<ContactsPage>, ApiError> {
    let request = page_request(&state, query.page, query.limit)?;
    let page = state.db.list_contacts(request, query.search.trim()).await;

    Ok(Json(ContactsPage {
        contacts: page.items,
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(state.db.get_contact(&id).await?))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let contact = state.db.create_contact(NewContact::from(input)).await?;
    info!(user_id = %user.id, contact_id = %contact.id, "Contact created");

    Ok((StatusCode::CREATED, Json(contact)))
}

/// Import a batch; rejected items are reported, not fatal.
///
/// Entries are decoded one at a time so a malformed entry only rejects itself.
pub async fn create_contacts_bulk(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(items): ApiJson<Vec<serde_json::Value>>,
) -> (StatusCode, Json<BulkResponse>) {
    let items = items
        .into_iter()
        .map(|value| match serde_json::from_value::<ContactInput>(value) {
            Ok(input) => BulkItem::Draft(input.into()),
            Err(e) => BulkItem::Unreadable(e.to_string()),
        });
    let outcome = state.db.create_contacts_bulk(items).await;

    info!(
        user_id = %user.id,
        created = outcome.valid_contacts.len(),
        rejected = outcome.errors.len(),
        "Bulk import finished"
    );

    (
        StatusCode::CREATED,
        Json(BulkResponse {
            message: "Contacts processed".to_string(),
            outcome,
        }),
    )
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_contact(&id).await?;
    info!(user_id = %user.id, contact_id = %id, "Contact deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Text a contact and log the message.
pub async fn send_otp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    let contact_id = request.contact_id.trim();
    if contact_id.is_empty() {
        return Err(ApiError::Validation("contactId is required".into()));
    }
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message is required".into()));
    }
    if request.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::Validation(format!(
            "message must be at most {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let contact = state.db.get_contact(contact_id).await?;

    // No store lock is held while the provider is called.
    let receipt = state
        .gateway
        .send_sms(&contact.phone, &request.message)
        .await
        .map_err(|e| {
            warn!(contact_id = %contact.id, error = %e, "SMS dispatch failed");
            ApiError::from(e)
        })?;

    let sent_message = state
        .db
        .log_message(&contact.id, &request.message, Some(receipt.sid.clone()))
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => {
                warn!(
                    contact_id = %contact.id,
                    provider_sid = %receipt.sid,
                    "Contact deleted while the message was in flight"
                );
                ApiError::DeliveredNotLogged {
                    provider_sid: receipt.sid.clone(),
                }
            }
            other => other.into(),
        })?;

    info!(
        user_id = %user.id,
        contact_id = %contact.id,
        message_id = %sent_message.id,
        "Message sent"
    );

    Ok(Json(SendOtpResponse {
        success: true,
        message: "Message sent successfully".to_string(),
        sent_message,
    }))
}

/// Sent messages, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListMessagesQuery>,
) -> Result<Json<MessagesPage>, ApiError> {
    let request = page_request(&state, query.page, query.limit)?;
    let page = state.db.list_messages(request).await;

    Ok(Json(MessagesPage {
        messages: page.items,
        total_pages: page.total_pages,
        current_page: page.current_page,
    }))
}
