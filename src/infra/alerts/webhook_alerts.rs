// Chat webhook alert sink.
//
// Discord incoming webhooks take `{"content": ...}`, Slack incoming webhooks
// take `{"text": ...}`. Both accept a plain POST with no auth beyond the URL.

use crate::core::submissions::{AlertError, AlertSink, FlagAlert};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    Discord,
    Slack,
}

impl WebhookKind {
    fn payload(&self, message: String) -> serde_json::Value {
        match self {
            WebhookKind::Discord => json!({ "content": message }),
            WebhookKind::Slack => json!({ "text": message }),
        }
    }
}

pub struct WebhookAlertSink {
    client: Client,
    kind: WebhookKind,
    url: String,
}

impl WebhookAlertSink {
    pub fn new(client: Client, kind: WebhookKind, url: String) -> Self {
        Self { client, kind, url }
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn send_alert(&self, alert: &FlagAlert) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.kind.payload(alert.message()))
            .send()
            .await
            .map_err(|e| AlertError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AlertError::Delivery(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        tracing::debug!(kind = ?self.kind, "Flag alert delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{Category, CategoryFlags};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert() -> FlagAlert {
        let mut categories = CategoryFlags::default();
        categories.set(Category::Violence, true);
        categories.set(Category::Hate, true);
        FlagAlert {
            title: "Bad prompt".to_string(),
            wallet: Some("0xabc".to_string()),
            categories,
        }
    }

    const EXPECTED: &str =
        "🚨 Prompt flagged by moderation!\nTitle: Bad prompt\nWallet: 0xabc\nReason: hate, violence";

    #[tokio::test]
    async fn test_discord_payload_uses_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({ "content": EXPECTED })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookAlertSink::new(
            Client::new(),
            WebhookKind::Discord,
            format!("{}/hook", server.uri()),
        );
        sink.send_alert(&alert()).await.unwrap();
    }

    #[tokio::test]
    async fn test_slack_payload_uses_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "text": EXPECTED })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookAlertSink::new(Client::new(), WebhookKind::Slack, server.uri());
        sink.send_alert(&alert()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_webhook_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let sink = WebhookAlertSink::new(Client::new(), WebhookKind::Discord, server.uri());
        let err = sink.send_alert(&alert()).await.unwrap_err();
        assert!(matches!(err, AlertError::Delivery(msg) if msg.contains("404")));
    }
}
