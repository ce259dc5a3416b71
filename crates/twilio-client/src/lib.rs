//! SMS delivery through the Twilio REST API.

mod client;
mod error;
mod gateway;
mod types;

pub use client::{TwilioClient, DEFAULT_API_URL};
pub use error::SmsError;
pub use gateway::SmsGateway;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SID: &str = "AC00000000000000000000000000000000";

    fn create_test_client(mock_server: &MockServer) -> TwilioClient {
        TwilioClient::new(
            mock_server.uri(),
            SID,
            SecretString::new("test-token".into()),
            "+15005550006",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn messages_path() -> String {
        format!("/2010-04-01/Accounts/{}/Messages.json", SID)
    }

    #[tokio::test]
    async fn test_send_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(messages_path()))
            .and(basic_auth(SID, "test-token"))
            .and(body_string_contains("To=%2B919876543210"))
            .and(body_string_contains("From=%2B15005550006"))
            .and(body_string_contains("Body=Your+OTP+is+123456"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM123",
                "status": "queued",
                "to": "+919876543210"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let receipt = client
            .send("+919876543210", "Your OTP is 123456")
            .await
            .unwrap();

        assert_eq!(receipt.sid, "SM123");
        assert_eq!(receipt.status.as_deref(), Some("queued"));
    }

    #[tokio::test]
    async fn test_send_unverified_recipient() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(messages_path()))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21608,
                "message": "The number +919876543210 is unverified.",
                "more_info": "https://www.twilio.com/docs/errors/21608",
                "status": 400
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.send("+919876543210", "hi").await;

        let err = result.unwrap_err();
        assert!(err.is_unverified_recipient());
    }

    #[tokio::test]
    async fn test_send_generic_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(messages_path()))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": 20003,
                "message": "Authenticate",
                "status": 401
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.send("+919876543210", "hi").await;

        assert!(matches!(
            result,
            Err(SmsError::Rejected { status: 401, code: Some(20003), .. })
        ));
    }

    #[tokio::test]
    async fn test_send_through_trait_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(messages_path()))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({ "sid": "SM9" })),
            )
            .mount(&mock_server)
            .await;

        let gateway: Box<dyn SmsGateway> = Box::new(create_test_client(&mock_server));
        let receipt = gateway.send_sms("+15551234567", "hello").await.unwrap();

        assert_eq!(receipt.sid, "SM9");
        assert_eq!(receipt.status, None);
    }

    #[tokio::test]
    async fn test_health_check() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/2010-04-01/Accounts/{}.json", SID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sid": SID,
                "status": "active"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_bad_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(!client.health_check().await);
    }
}
