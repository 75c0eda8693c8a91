//! Correlation store for accepted public requests.
//!
//! Accepted requests are parked under a one-time token so the follow-up
//! confirmation pages (and the notarized-letter PDF) can find them. Entries
//! live for 24 hours and are swept by a background task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngExt;
use rand::distr::Alphanumeric;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::public_response::PublicResponse;

/// Configuration for the correlation store.
#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    /// How long a stored response stays retrievable.
    pub ttl: Duration,
    /// Sweep interval for the expiry task.
    pub cleanup_interval: Duration,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60 * 24),
            cleanup_interval: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredResponse {
    response: PublicResponse,
    expires_at: Instant,
}

impl StoredResponse {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Token-keyed store of accepted public requests.
#[derive(Clone)]
pub struct CorrelationStore {
    entries: Arc<RwLock<HashMap<String, StoredResponse>>>,
    config: CorrelationConfig,
}

impl CorrelationStore {
    pub fn new(config: CorrelationConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CorrelationConfig::default())
    }

    /// Generate a fresh correlation token: 64 alphanumeric characters from
    /// the system CSPRNG.
    pub fn new_public_key() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }

    /// Park a response under the token.
    pub async fn store(&self, public_key: String, response: PublicResponse) {
        let stored = StoredResponse {
            response,
            expires_at: Instant::now() + self.config.ttl,
        };
        self.entries.write().await.insert(public_key.clone(), stored);
        debug!(public_key, "Stored public response");
    }

    /// Look up a response. Expired entries are treated as missing.
    pub async fn get(&self, public_key: &str) -> Option<PublicResponse> {
        let entries = self.entries.read().await;
        let stored = entries.get(public_key)?;
        if stored.is_expired() {
            return None;
        }
        Some(stored.response.clone())
    }

    /// Drop expired entries and return their tokens.
    pub async fn cleanup_expired(&self) -> Vec<String> {
        let mut entries = self.entries.write().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, stored)| stored.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.remove(key);
            warn!(public_key = %key, "Public response expired unretrieved");
        }

        expired
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::public_response::ResponseKind;
    use time::macros::date;
    use webwhois_registry::ObjectType;
    use webwhois_registry::clients::LogRequestType;
    use webwhois_registry::types::ConfirmationMethod;

    fn sample_response() -> PublicResponse {
        PublicResponse {
            object_type: ObjectType::Contact,
            public_request_id: 24,
            request_type: LogRequestType::AuthInfo,
            handle: "KOCHQ".to_string(),
            confirmation_method: ConfirmationMethod::SignedEmail,
            create_date: date!(2017 - 03 - 08),
            kind: ResponseKind::SendPassword { custom_email: None },
        }
    }

    #[test]
    fn public_keys_are_long_and_alphanumeric() {
        let key = CorrelationStore::new_public_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, CorrelationStore::new_public_key());
    }

    #[tokio::test]
    async fn stored_response_is_retrievable() {
        let store = CorrelationStore::with_defaults();
        let key = CorrelationStore::new_public_key();
        store.store(key.clone(), sample_response()).await;

        let found = store.get(&key).await;
        assert_eq!(found, Some(sample_response()));
    }

    #[tokio::test]
    async fn unknown_token_yields_nothing() {
        let store = CorrelationStore::with_defaults();
        assert!(store.get("no-such-token").await.is_none());
    }

    #[tokio::test]
    async fn expired_response_is_not_returned() {
        let store = CorrelationStore::new(CorrelationConfig {
            ttl: Duration::from_millis(1),
            ..Default::default()
        });
        let key = CorrelationStore::new_public_key();
        store.store(key.clone(), sample_response()).await;

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(store.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn cleanup_sweeps_expired_entries() {
        let store = CorrelationStore::new(CorrelationConfig {
            ttl: Duration::from_millis(1),
            ..Default::default()
        });
        let key = CorrelationStore::new_public_key();
        store.store(key.clone(), sample_response()).await;

        tokio::time::sleep(Duration::from_millis(10)).await;

        let expired = store.cleanup_expired().await;
        assert_eq!(expired, vec![key]);
        assert_eq!(store.count().await, 0);
    }
}
