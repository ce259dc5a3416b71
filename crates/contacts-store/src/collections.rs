//! In-memory document collections.

use crate::types::{Contact, Message, SentMessage, StoreStats, User};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

/// The users, contacts and messages collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default = "snapshot_version")]
    version: u32,
    #[serde(default)]
    users: HashMap<String, User>,
    #[serde(default)]
    contacts: HashMap<String, Contact>,
    /// Kept in insertion order.
    #[serde(default)]
    messages: Vec<Message>,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users: HashMap::new(),
            contacts: HashMap::new(),
            messages: Vec::new(),
        }
    }
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema version the collections were written with.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn remove_user(&mut self, id: &str) -> Option<User> {
        self.users.remove(id)
    }

    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.get(id)
    }

    pub fn insert_contact(&mut self, contact: Contact) {
        self.contacts.insert(contact.id.clone(), contact);
    }

    pub fn remove_contact(&mut self, id: &str) -> Option<Contact> {
        self.contacts.remove(id)
    }

    /// Contacts whose first name, last name or phone contains `term`,
    /// ignoring case, ordered by first name then last name.
    pub fn search_contacts(&self, term: &str) -> Vec<Contact> {
        let needle = term.trim().to_lowercase();

        let mut matches: Vec<Contact> = self
            .contacts
            .values()
            .filter(|c| {
                needle.is_empty()
                    || c.first_name.to_lowercase().contains(&needle)
                    || c.last_name.to_lowercase().contains(&needle)
                    || c.phone.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        matches
    }

    /// Whether any logged message points at the contact.
    pub fn is_referenced(&self, contact_id: &str) -> bool {
        self.messages.iter().any(|m| m.recipient == contact_id)
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn pop_message(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Messages newest first, each joined with its current recipient.
    ///
    /// Equal timestamps keep reverse insertion order.
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        let mut messages: Vec<&Message> = self.messages.iter().rev().collect();
        messages.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));

        messages
            .into_iter()
            .map(|m| SentMessage {
                id: m.id.clone(),
                recipient: self.contacts.get(&m.recipient).cloned(),
                content: m.content.clone(),
                sent_at: m.sent_at,
                provider_sid: m.provider_sid.clone(),
            })
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            users: self.users.len(),
            contacts: self.contacts.len(),
            messages: self.messages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewContact;
    use chrono::{Duration, Utc};

    fn contact(first: &str, last: &str, phone: &str) -> Contact {
        NewContact::new(first, last, phone, "someone@example.com").into_contact("+91")
    }

    #[test]
    fn test_search_matches_any_field_ignoring_case() {
        let mut collections = Collections::new();
        collections.insert_contact(contact("Jane", "Doe", "5551234567"));
        collections.insert_contact(contact("John", "Smith", "9876543210"));

        for term in ["jane", "DOE", "5551234567", "ja"] {
            let found = collections.search_contacts(term);
            assert_eq!(found.len(), 1, "term {term:?}");
            assert_eq!(found[0].first_name, "Jane");
        }

        assert_eq!(collections.search_contacts("").len(), 2);
        assert!(collections.search_contacts("zzz").is_empty());
    }

    #[test]
    fn test_search_is_or_across_fields() {
        let mut collections = Collections::new();
        collections.insert_contact(contact("Anna", "Smith", "1111111111"));
        collections.insert_contact(contact("Bob", "Anders", "2222222222"));

        // "an" hits Anna by first name and Anders by last name.
        assert_eq!(collections.search_contacts("an").len(), 2);
    }

    #[test]
    fn test_search_treats_term_literally() {
        let mut collections = Collections::new();
        collections.insert_contact(contact("Jane", "Doe", "5551234567"));

        assert!(collections.search_contacts(".*").is_empty());
        assert_eq!(collections.search_contacts("+91555").len(), 1);
    }

    #[test]
    fn test_search_sorted_by_first_then_last_name() {
        let mut collections = Collections::new();
        collections.insert_contact(contact("Bob", "Zed", "1111111111"));
        collections.insert_contact(contact("Alice", "Young", "2222222222"));
        collections.insert_contact(contact("Bob", "Adams", "3333333333"));

        let names: Vec<_> = collections
            .search_contacts("")
            .into_iter()
            .map(|c| format!("{} {}", c.first_name, c.last_name))
            .collect();

        assert_eq!(names, vec!["Alice Young", "Bob Adams", "Bob Zed"]);
    }

    #[test]
    fn test_sent_messages_newest_first_with_current_recipient() {
        let mut collections = Collections::new();
        let mut jane = contact("Jane", "Doe", "5551234567");
        collections.insert_contact(jane.clone());

        let mut older = Message::new(&jane.id, "first", None);
        older.sent_at = Utc::now() - Duration::seconds(10);
        collections.push_message(older);
        collections.push_message(Message::new(&jane.id, "second", None));

        // The join reflects the contact as it is now.
        jane.email = "jane@new.example.com".into();
        collections.insert_contact(jane);

        let sent = collections.sent_messages();
        assert_eq!(sent[0].content, "second");
        assert_eq!(sent[1].content, "first");
        assert_eq!(
            sent[0].recipient.as_ref().unwrap().email,
            "jane@new.example.com"
        );
    }

    #[test]
    fn test_sent_messages_ties_keep_latest_first() {
        let mut collections = Collections::new();
        let jane = contact("Jane", "Doe", "5551234567");
        collections.insert_contact(jane.clone());

        let now = Utc::now();
        for content in ["a", "b", "c"] {
            let mut message = Message::new(&jane.id, content, None);
            message.sent_at = now;
            collections.push_message(message);
        }

        let order: Vec<_> = collections
            .sent_messages()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_is_referenced() {
        let mut collections = Collections::new();
        let jane = contact("Jane", "Doe", "5551234567");
        collections.insert_contact(jane.clone());

        assert!(!collections.is_referenced(&jane.id));
        collections.push_message(Message::new(&jane.id, "hi", None));
        assert!(collections.is_referenced(&jane.id));
    }

    #[test]
    fn test_collections_serialization() {
        let mut collections = Collections::new();
        collections.insert_user(User::new("Ann", "ann@example.com", "1", "hash"));
        collections.insert_contact(contact("Jane", "Doe", "5551234567"));

        let json = serde_json::to_string(&collections).unwrap();
        let restored: Collections = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.stats(), collections.stats());
        assert!(restored.user_by_email("ann@example.com").is_some());
    }

    #[test]
    fn test_user_lookup_is_case_sensitive() {
        let mut collections = Collections::new();
        collections.insert_user(User::new("Ann", "Ann@example.com", "1", "hash"));

        assert!(collections.user_by_email("Ann@example.com").is_some());
        assert!(collections.user_by_email("ann@example.com").is_none());
    }
}
