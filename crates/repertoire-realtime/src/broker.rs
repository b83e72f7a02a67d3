//! Pub/sub broker client.
//!
//! The backend only ever publishes. A session is opened with a broker
//! token, used for one or more publishes and then closed.

use async_trait::async_trait;
use repertoire_core::error::DomainError;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

/// Opens publishing sessions on the broker.
#[async_trait]
pub trait RealtimeBroker: Send + Sync {
    /// Connects with `token`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the broker refuses the
    /// connection.
    async fn connect(&self, token: &str) -> Result<Box<dyn BrokerSession>, DomainError>;
}

/// An open connection to the broker.
#[async_trait]
pub trait BrokerSession: Send {
    /// Publishes `data` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the broker rejects the
    /// publication.
    async fn publish(&mut self, channel: &str, data: &Value) -> Result<(), DomainError>;

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the close handshake fails.
    async fn disconnect(self: Box<Self>) -> Result<(), DomainError>;
}

/// Broker reached through its HTTP publish API.
#[derive(Debug, Clone)]
pub struct HttpBroker {
    client: Client,
    base_url: String,
}

impl HttpBroker {
    /// Creates a broker client for `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl RealtimeBroker for HttpBroker {
    async fn connect(&self, token: &str) -> Result<Box<dyn BrokerSession>, DomainError> {
        if token.is_empty() {
            return Err(DomainError::Infrastructure(
                "broker connection requires a token".into(),
            ));
        }
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            publish_url: format!("{}/api/publish", self.base_url),
            token: token.to_owned(),
        }))
    }
}

struct HttpSession {
    client: Client,
    publish_url: String,
    token: String,
}

#[async_trait]
impl BrokerSession for HttpSession {
    async fn publish(&mut self, channel: &str, data: &Value) -> Result<(), DomainError> {
        let response = self
            .client
            .post(&self.publish_url)
            .bearer_auth(&self.token)
            .json(&json!({ "channel": channel, "data": data }))
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("broker unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Infrastructure(format!(
                "broker returned {status}: {body}"
            )));
        }
        debug!(channel, "published to broker");
        Ok(())
    }

    async fn disconnect(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}
