//! API request and response types.

use contacts_store::{BulkOutcome, Contact, NewContact, SentMessage, User};
use serde::{Deserialize, Deserializer, Serialize};

/// Request to create an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// First problem with the submitted fields, if any.
    pub fn problem(&self) -> Option<String> {
        let missing = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| format!("{} is required", field));

        missing.or_else(|| {
            (!self.email.contains('@')).then(|| "email must be a valid address".to_string())
        })
    }
}

/// Account as shown to clients; never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Query for `GET /api/contacts`.
#[derive(Debug, Default, Deserialize)]
pub struct ListContactsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsPage {
    pub contacts: Vec<Contact>,
    pub total_pages: u64,
    pub current_page: u64,
}

/// A contact as submitted, singly or inside a bulk batch.
///
/// Missing fields deserialize as empty and are reported by the store. The
/// phone may arrive as a JSON string or number.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl From<ContactInput> for NewContact {
    fn from(input: ContactInput) -> Self {
        NewContact::new(input.first_name, input.last_name, input.phone, input.email)
    }
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    #[serde(default)]
    pub contact_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub sent_message: contacts_store::Message,
}

/// Query for `GET /api/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesPage {
    pub messages: Vec<SentMessage>,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub contacts: usize,
    pub messages: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Accept a string, a number or null.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<StringOrNumber>::deserialize(deserializer)? {
            Some(StringOrNumber::Text(text)) => text,
            Some(StringOrNumber::Number(number)) => number.to_string(),
            None => String::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_input_accepts_numeric_phone() {
        let input: ContactInput = serde_json::from_str(
            r#"{"firstName":"A","lastName":"B","phone":9876543210,"email":"a@b.c"}"#,
        )
        .unwrap();
        assert_eq!(input.phone, "9876543210");

        let input: ContactInput = serde_json::from_str(r#"{"firstName":"A","phone":null}"#).unwrap();
        assert_eq!(input.phone, "");
        assert_eq!(input.last_name, "");
    }

    #[test]
    fn test_register_request_problems() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"name":"Ann","email":"ann@example.com","phone":"1","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(request.problem(), None);

        let request: RegisterRequest =
            serde_json::from_str(r#"{"name":"Ann","email":"ann@example.com","phone":"1"}"#)
                .unwrap();
        assert_eq!(request.problem().as_deref(), Some("password is required"));

        let request: RegisterRequest = serde_json::from_str(
            r#"{"name":"Ann","email":"ann","phone":"1","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(
            request.problem().as_deref(),
            Some("email must be a valid address")
        );
    }

    #[test]
    fn test_user_view_hides_password_hash() {
        let user = User::new("Ann", "ann@example.com", "1", "$argon2id$secret");
        let json = serde_json::to_value(UserView::from(user)).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "ann@example.com");
    }
}
