//! Shared database handle.

use crate::collections::Collections;
use crate::error::StoreError;
use crate::persist::Store;
use crate::phone::{is_local_number, DEFAULT_COUNTRY_CODE};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Concurrent handle to the users, contacts and messages collections.
///
/// Every mutation is written to the persistence backend before it is
/// acknowledged; a failed write is rolled back in memory.
#[derive(Clone)]
pub struct Database {
    collections: Arc<RwLock<Collections>>,
    store: Arc<Store>,
    country_code: Arc<str>,
}

impl Database {
    /// Load collections from `store`.
    pub async fn open(store: Store, country_code: impl Into<String>) -> Result<Self, StoreError> {
        let collections = store.load().await?;
        let country_code: String = country_code.into();

        info!(
            persistent = store.is_persistent(),
            country_code = %country_code,
            "Database opened"
        );

        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
            store: Arc::new(store),
            country_code: country_code.into(),
        })
    }

    /// Empty, memory-only database using the default country code.
    pub fn memory() -> Self {
        Self {
            collections: Arc::new(RwLock::new(Collections::new())),
            store: Arc::new(Store::memory()),
            country_code: DEFAULT_COUNTRY_CODE.into(),
        }
    }

    /// Prefix applied to phone numbers without one.
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Persist, undoing the in-memory change on failure.
    async fn commit(
        &self,
        collections: &mut Collections,
        rollback: impl FnOnce(&mut Collections),
    ) -> Result<(), StoreError> {
        if let Err(e) = self.store.save(collections).await {
            warn!(error = %e, "Snapshot write failed, rolling back");
            rollback(collections);
            return Err(e);
        }
        Ok(())
    }

    // Users

    /// Insert a user. Fails with `Conflict` if the email is taken.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut collections = self.collections.write().await;

        if collections.user_by_email(&user.email).is_some() {
            return Err(StoreError::Conflict("User already exists".into()));
        }

        let id = user.id.clone();
        collections.insert_user(user.clone());
        self.commit(&mut collections, |c| {
            c.remove_user(&id);
        })
        .await?;

        info!("User registered");
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.collections.read().await.user_by_email(email).cloned()
    }

    // Contacts

    /// One page of contacts matching `search`.
    #[instrument(skip(self))]
    pub async fn list_contacts(&self, request: PageRequest, search: &str) -> Page<Contact> {
        let matches = self.collections.read().await.search_contacts(search);
        debug!(matches = matches.len(), "Contact search");
        request.apply(matches)
    }

    pub async fn get_contact(&self, id: &str) -> Result<Contact, StoreError> {
        self.collections
            .read()
            .await
            .contact(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Contact".into()))
    }

    /// Validate, normalize and store one contact.
    #[instrument(skip(self, draft))]
    pub async fn create_contact(&self, draft: NewContact) -> Result<Contact, StoreError> {
        let draft = draft.trimmed();
        if let Some(field) = draft.missing_field() {
            return Err(StoreError::InvalidInput(format!("{} is required", field)));
        }

        let contact = draft.into_contact(&self.country_code);
        self.store_contact(contact).await
    }

    async fn store_contact(&self, contact: Contact) -> Result<Contact, StoreError> {
        let mut collections = self.collections.write().await;
        let id = contact.id.clone();
        collections.insert_contact(contact.clone());
        self.commit(&mut collections, |c| {
            c.remove_contact(&id);
        })
        .await?;

        debug!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    /// Import a batch item by item.
    ///
    /// Items need all four fields and a phone of exactly ten digits, checked
    /// as submitted. Each accepted item is written on its own, so a failure
    /// never affects its neighbours.
    #[instrument(skip(self, items))]
    pub async fn create_contacts_bulk<I>(&self, items: I) -> BulkOutcome
    where
        I: IntoIterator,
        I::Item: Into<BulkItem>,
    {
        let mut outcome = BulkOutcome::default();

        for (index, item) in items.into_iter().enumerate() {
            let raw = match item.into() {
                BulkItem::Draft(draft) => draft,
                BulkItem::Unreadable(reason) => {
                    outcome.errors.push(BulkItemError {
                        index,
                        message: format!("Invalid contact data for item {}: {}", index + 1, reason),
                    });
                    continue;
                }
            };
            let draft = raw.trimmed();

            if let Some(field) = draft.missing_field() {
                outcome.errors.push(BulkItemError {
                    index,
                    message: format!("Missing {} for item {}", field, index + 1),
                });
                continue;
            }

            if !is_local_number(&raw.phone) {
                outcome.errors.push(BulkItemError {
                    index,
                    message: format!(
                        "Invalid phone number for {} {}: {}",
                        draft.first_name, draft.last_name, raw.phone
                    ),
                });
                continue;
            }

            let (first_name, last_name) = (draft.first_name.clone(), draft.last_name.clone());
            match self.store_contact(draft.into_contact(&self.country_code)).await {
                Ok(contact) => outcome.valid_contacts.push(contact),
                Err(e) => outcome.errors.push(BulkItemError {
                    index,
                    message: format!("Error saving contact {} {}: {}", first_name, last_name, e),
                }),
            }
        }

        info!(
            created = outcome.valid_contacts.len(),
            rejected = outcome.errors.len(),
            "Bulk import processed"
        );
        outcome
    }

    /// Delete a contact that no message refers to.
    #[instrument(skip(self))]
    pub async fn delete_contact(&self, id: &str) -> Result<Contact, StoreError> {
        let mut collections = self.collections.write().await;

        if collections.contact(id).is_none() {
            return Err(StoreError::NotFound("Contact".into()));
        }
        if collections.is_referenced(id) {
            return Err(StoreError::Conflict(
                "Contact has sent messages and cannot be deleted".into(),
            ));
        }

        let removed = collections
            .remove_contact(id)
            .ok_or_else(|| StoreError::NotFound("Contact".into()))?;
        let restore = removed.clone();
        self.commit(&mut collections, move |c| c.insert_contact(restore))
            .await?;

        info!("Contact deleted");
        Ok(removed)
    }

    // Messages

    /// Record a delivered message. The recipient must still exist.
    #[instrument(skip(self, content))]
    pub async fn log_message(
        &self,
        recipient_id: &str,
        content: &str,
        provider_sid: Option<String>,
    ) -> Result<Message, StoreError> {
        let mut collections = self.collections.write().await;

        if collections.contact(recipient_id).is_none() {
            return Err(StoreError::NotFound("Contact".into()));
        }

        let message = Message::new(recipient_id, content, provider_sid);
        collections.push_message(message.clone());
        self.commit(&mut collections, |c| {
            c.pop_message();
        })
        .await?;

        debug!(message_id = %message.id, "Message logged");
        Ok(message)
    }

    /// One page of sent messages, newest first.
    pub async fn list_messages(&self, request: PageRequest) -> Page<SentMessage> {
        let sent = self.collections.read().await.sent_messages();
        request.apply(sent)
    }

    pub async fn stats(&self) -> StoreStats {
        self.collections.read().await.stats()
    }
}
