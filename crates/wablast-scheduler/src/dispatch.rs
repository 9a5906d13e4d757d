//! Delivery of fired jobs to the messaging service over HTTP.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Marks scheduler-originated requests so the messaging service exempts
/// them from its browser-origin checks.
pub const SOURCE_HEADER: &str = "WABLAST-SOURCE";
pub const SOURCE_VALUE: &str = "crond";

/// Which send endpoint a delivery goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Direct,
    Group,
}

impl DeliveryMode {
    fn endpoint(self) -> &'static str {
        match self {
            DeliveryMode::Direct => "send-message",
            DeliveryMode::Group => "send-group-message",
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    number: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    status: bool,
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl Dispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Dispatcher {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// POST one message. `Ok(true)` means the service accepted it,
    /// `Ok(false)` means the service rejected it with a reason, and `Err`
    /// means the request never produced a decodable response.
    pub async fn send(&self, mode: DeliveryMode, number: &str, message: &str) -> Result<bool> {
        let url = format!("{}/api/message/{}", self.base_url, mode.endpoint());
        let response = self
            .client
            .post(&url)
            .header(SOURCE_HEADER, SOURCE_VALUE)
            .json(&SendRequest { number, message })
            .send()
            .await?;
        let body: SendResponse = response.json().await?;

        if body.status {
            info!(%number, ?mode, "message dispatched");
            Ok(true)
        } else {
            warn!(%number, ?mode, reason = %body.message, "delivery rejected by messaging service");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn direct_send_posts_number_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/message/send-message"))
            .and(header(SOURCE_HEADER, SOURCE_VALUE))
            .and(body_json(serde_json::json!({
                "number": "628123456789",
                "message": "hello",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": true,
                "message": "queued",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(server.uri());
        let delivered = dispatcher
            .send(DeliveryMode::Direct, "628123456789", "hello")
            .await
            .unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn group_send_uses_group_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/message/send-group-message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(server.uri());
        let delivered = dispatcher
            .send(DeliveryMode::Group, "12036@g.us", "standup time")
            .await
            .unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn service_rejection_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/message/send-message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": false,
                "message": "number not registered",
            })))
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(server.uri());
        let delivered = dispatcher
            .send(DeliveryMode::Direct, "000", "hello")
            .await
            .unwrap();
        assert!(!delivered);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let dispatcher = Dispatcher::new("http://127.0.0.1:1");
        let result = dispatcher.send(DeliveryMode::Direct, "628", "hello").await;
        assert!(result.is_err());
    }
}
