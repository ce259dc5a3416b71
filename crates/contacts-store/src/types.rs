//! Document types held by the store.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a new opaque document id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Unique, compared exactly as stored.
    pub email: String,
    pub phone: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// A person who can receive messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Always carries a leading `+` country code.
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Contact fields as submitted, before validation and normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl NewContact {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Trim every field.
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// Name of the first blank required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("phone", &self.phone),
            ("email", &self.email),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Build the stored contact, prefixing the phone with `country_code` when needed.
    pub fn into_contact(self, country_code: &str) -> Contact {
        Contact {
            id: new_id(),
            phone: crate::phone::normalize_phone(&self.phone, country_code),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            created_at: Utc::now(),
        }
    }
}

/// Log entry for one successful dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Id of the receiving contact.
    pub recipient: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    /// Message id assigned by the SMS provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_sid: Option<String>,
}

impl Message {
    pub fn new(
        recipient: impl Into<String>,
        content: impl Into<String>,
        provider_sid: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            recipient: recipient.into(),
            content: content.into(),
            sent_at: Utc::now(),
            provider_sid,
        }
    }
}

/// A message with its recipient resolved against the current contact data.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    /// `None` only if the contact no longer resolves.
    pub recipient: Option<Contact>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_sid: Option<String>,
}

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Validate a page request. Both values must be at least 1.
    pub fn new(page: u64, limit: u64) -> Result<Self, StoreError> {
        if page < 1 {
            return Err(StoreError::InvalidInput("page must be at least 1".into()));
        }
        if limit < 1 {
            return Err(StoreError::InvalidInput("limit must be at least 1".into()));
        }
        Ok(Self { page, limit })
    }

    /// Slice `items` into the requested page.
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let total_pages = total.div_ceil(self.limit);
        let start = (self.page - 1).saturating_mul(self.limit);

        let items = if start >= total {
            Vec::new()
        } else {
            let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
            items.into_iter().skip(start as usize).take(take).collect()
        };

        Page {
            items,
            total_pages,
            current_page: self.page,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
    pub current_page: u64,
}

/// One entry of a bulk import batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkItem {
    Draft(NewContact),
    /// The submitted entry could not be read as a contact.
    Unreadable(String),
}

impl From<NewContact> for BulkItem {
    fn from(draft: NewContact) -> Self {
        BulkItem::Draft(draft)
    }
}

/// Rejected or failed bulk import item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkItemError {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// Result of a bulk import: every input item lands in exactly one list.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub valid_contacts: Vec<Contact>,
    pub errors: Vec<BulkItemError>,
}

/// Collection sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub users: usize,
    pub contacts: usize,
    pub messages: usize,
}
