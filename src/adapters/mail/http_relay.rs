//! HTTP relay dispatcher. POSTs the mail request as JSON to a relay service.

use crate::domain::{DeliveryResult, DomainError, MailRequest};
use crate::ports::MailDispatcher;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body sent to the relay.
#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    id: String,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    #[serde(flatten)]
    request: &'a MailRequest,
}

/// Optional fields a relay may answer with.
#[derive(Debug, Default, Deserialize)]
struct RelayReply {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    queued: Option<bool>,
}

/// Relay adapter. Any 2xx answer counts as accepted.
pub struct HttpRelayDispatcher {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpRelayDispatcher {
    /// * `url` - Relay endpoint accepting POSTed JSON
    /// * `token` - Optional bearer token
    pub fn new(url: String, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            token,
        }
    }
}

#[async_trait::async_trait]
impl MailDispatcher for HttpRelayDispatcher {
    async fn dispatch(&self, request: MailRequest) -> Result<DeliveryResult, DomainError> {
        let payload = RelayPayload {
            id: request.mail_id(),
            to: &request.recipient,
            subject: request.subject(),
            body: request.body(),
            request: &request,
        };

        let mut req = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let res = req
            .send()
            .await
            .map_err(|e| DomainError::Mail(format!("Request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::Mail(format!(
                "Relay error {}: {}",
                status, text
            )));
        }

        // Relays are not required to answer with JSON.
        let reply: RelayReply = res.json().await.unwrap_or_default();
        info!(
            mail_id = %request.mail_id(),
            to = %request.recipient,
            relay_id = reply.id.as_deref().unwrap_or("-"),
            "mail handed to relay"
        );

        Ok(DeliveryResult {
            mail_id: request.mail_id(),
            recipient: request.recipient.clone(),
            language: request.language.code.clone(),
            sent: reply.queued.unwrap_or(true),
            transport_id: reply.id,
            dispatched_at: Utc::now(),
        })
    }
}
