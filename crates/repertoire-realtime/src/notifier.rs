//! Per-user search cache invalidation.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use repertoire_core::error::DomainError;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::broker::RealtimeBroker;
use crate::token::TokenIssuer;

/// Action clients react to by dropping cached search results.
pub const SEARCH_CACHE_INVALIDATION: &str = "SEARCH_CACHE_INVALIDATION";

const TOKEN_KEY: &str = "broker";

/// Channel a user's clients subscribe to for search events.
#[must_use]
pub fn search_channel(user_id: Uuid) -> String {
    format!("search:{user_id}")
}

/// The invalidation message body.
#[must_use]
pub fn invalidation_payload() -> Value {
    json!({ "action": SEARCH_CACHE_INVALIDATION })
}

/// Publishes cache-invalidation events to a user's search channel.
pub struct RealtimeNotifier {
    broker: Arc<dyn RealtimeBroker>,
    issuer: Arc<dyn TokenIssuer>,
    tokens: Cache<&'static str, String>,
}

impl std::fmt::Debug for RealtimeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeNotifier")
            .field("cached_tokens", &self.tokens.entry_count())
            .finish_non_exhaustive()
    }
}

impl RealtimeNotifier {
    /// Creates a notifier. Issued tokens are reused for `token_ttl`, which
    /// must be shorter than the lifetime the issuer signs them with.
    #[must_use]
    pub fn new(
        broker: Arc<dyn RealtimeBroker>,
        issuer: Arc<dyn TokenIssuer>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            broker,
            issuer,
            tokens: Cache::builder().time_to_live(token_ttl).build(),
        }
    }

    fn token(&self) -> Result<String, DomainError> {
        if let Some(token) = self.tokens.get(&TOKEN_KEY) {
            return Ok(token);
        }
        let token = self.issuer.issue()?.value;
        self.tokens.insert(TOKEN_KEY, token.clone());
        Ok(token)
    }

    /// Tells `user_id`'s clients that their search results changed.
    ///
    /// The session is closed whether or not the publish succeeds.
    ///
    /// # Errors
    ///
    /// Returns the token, connect or publish failure.
    #[instrument(skip(self))]
    pub async fn notify_search_invalidated(&self, user_id: Uuid) -> Result<(), DomainError> {
        let token = self.token()?;
        let mut session = self.broker.connect(&token).await?;
        let channel = search_channel(user_id);

        let published = session.publish(&channel, &invalidation_payload()).await;
        if let Err(e) = session.disconnect().await {
            warn!(error = %e, "broker disconnect failed");
        }
        published?;

        info!(%channel, "search cache invalidation published");
        Ok(())
    }
}
