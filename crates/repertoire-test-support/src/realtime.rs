//! Test broker: records publications instead of sending them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repertoire_core::error::DomainError;
use repertoire_realtime::broker::{BrokerSession, RealtimeBroker};
use repertoire_realtime::token::{BrokerToken, TokenIssuer};
use serde_json::Value;

#[derive(Debug, Default)]
struct BrokerLog {
    tokens: Mutex<Vec<String>>,
    published: Mutex<Vec<(String, Value)>>,
    disconnects: AtomicUsize,
    reject_publish: AtomicBool,
}

/// A broker that records connects, publications and disconnects.
#[derive(Debug, Clone, Default)]
pub struct RecordingBroker {
    log: Arc<BrokerLog>,
}

impl RecordingBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish fail.
    pub fn reject_publishes(&self) {
        self.log.reject_publish.store(true, Ordering::SeqCst);
    }

    /// Returns a snapshot of `(channel, data)` pairs published.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<(String, Value)> {
        self.log.published.lock().unwrap().clone()
    }

    /// Tokens presented on connect, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn tokens(&self) -> Vec<String> {
        self.log.tokens.lock().unwrap().clone()
    }

    /// Number of sessions closed.
    pub fn disconnects(&self) -> usize {
        self.log.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealtimeBroker for RecordingBroker {
    async fn connect(&self, token: &str) -> Result<Box<dyn BrokerSession>, DomainError> {
        self.log.tokens.lock().unwrap().push(token.to_owned());
        Ok(Box::new(RecordingSession {
            log: self.log.clone(),
        }))
    }
}

struct RecordingSession {
    log: Arc<BrokerLog>,
}

#[async_trait]
impl BrokerSession for RecordingSession {
    async fn publish(&mut self, channel: &str, data: &Value) -> Result<(), DomainError> {
        if self.log.reject_publish.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("broker rejected publish".into()));
        }
        self.log
            .published
            .lock()
            .unwrap()
            .push((channel.to_owned(), data.clone()));
        Ok(())
    }

    async fn disconnect(self: Box<Self>) -> Result<(), DomainError> {
        self.log.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Issues the same token every time.
#[derive(Debug, Clone)]
pub struct StaticTokenIssuer {
    token: String,
    expires_at: DateTime<Utc>,
}

impl StaticTokenIssuer {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: DateTime::<Utc>::MAX_UTC,
        }
    }
}

impl TokenIssuer for StaticTokenIssuer {
    fn issue(&self) -> Result<BrokerToken, DomainError> {
        Ok(BrokerToken {
            value: self.token.clone(),
            expires_at: self.expires_at,
        })
    }
}
