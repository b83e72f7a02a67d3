//! Broker connection tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use repertoire_core::clock::Clock;
use repertoire_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Claims carried by a broker token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerClaims {
    /// Identity the backend connects as.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// A signed token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints tokens the backend presents when connecting to the broker.
pub trait TokenIssuer: Send + Sync {
    /// Issues a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if signing fails.
    fn issue(&self) -> Result<BrokerToken, DomainError>;
}

/// Issues HS256-signed JWTs with a fixed subject.
pub struct HmacTokenIssuer {
    key: EncodingKey,
    subject: String,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HmacTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenIssuer")
            .field("subject", &self.subject)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl HmacTokenIssuer {
    /// Creates an issuer signing with `secret`.
    #[must_use]
    pub fn new(
        secret: &[u8],
        subject: impl Into<String>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            subject: subject.into(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self) -> Result<BrokerToken, DomainError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let claims = BrokerClaims {
            sub: self.subject.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let value = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| DomainError::Infrastructure(format!("broker token signing failed: {e}")))?;
        Ok(BrokerToken { value, expires_at })
    }
}
