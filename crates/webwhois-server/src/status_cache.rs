//! Cache of object status descriptions.
//!
//! Status codes rarely change, so each `(object type, language)` catalogue
//! is fetched from the whois backend once and kept for the process
//! lifetime. The fill happens under the write lock, so concurrent misses
//! on one key still produce a single backend fetch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use webwhois_registry::clients::WhoisClient;
use webwhois_registry::{ObjectType, RegistryError};

type DescriptionMap = Arc<HashMap<String, String>>;

/// Lazily filled status-description catalogues.
#[derive(Clone, Default)]
pub struct StatusDescriptionCache {
    entries: Arc<RwLock<HashMap<(ObjectType, String), DescriptionMap>>>,
}

impl StatusDescriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status code -> localized description for one object type.
    pub async fn get(
        &self,
        whois: &dyn WhoisClient,
        object_type: ObjectType,
        lang: &str,
    ) -> Result<DescriptionMap, RegistryError> {
        let key = (object_type, lang.to_string());
        {
            let entries = self.entries.read().await;
            if let Some(found) = entries.get(&key) {
                return Ok(Arc::clone(found));
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(found) = entries.get(&key) {
            return Ok(Arc::clone(found));
        }

        let descriptions = whois.get_status_descriptions(object_type, lang).await?;
        let map: DescriptionMap = Arc::new(
            descriptions
                .into_iter()
                .map(|desc| (desc.handle, desc.name))
                .collect(),
        );
        debug!(
            object_type = object_type.as_str(),
            lang,
            entries = map.len(),
            "Filled status description cache"
        );
        entries.insert(key, Arc::clone(&map));
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webwhois_registry::clients::fake::FakeWhoisClient;

    #[tokio::test]
    async fn repeated_lookups_fetch_once() {
        let whois = FakeWhoisClient::default();
        whois.add_status_description(ObjectType::Contact, "en", "linked", "Has relation to other records");
        let cache = StatusDescriptionCache::new();

        let first = cache.get(&whois, ObjectType::Contact, "en").await.unwrap();
        let second = cache.get(&whois, ObjectType::Contact, "en").await.unwrap();

        assert_eq!(first.get("linked").map(String::as_str), Some("Has relation to other records"));
        assert_eq!(second.get("linked"), first.get("linked"));
        assert_eq!(whois.status_description_calls(), 1);
    }

    #[tokio::test]
    async fn each_language_fills_separately() {
        let whois = FakeWhoisClient::default();
        whois.add_status_description(ObjectType::Domain, "en", "linked", "Has relation to other records");
        whois.add_status_description(ObjectType::Domain, "cs", "linked", "Je navázán na další záznamy");
        let cache = StatusDescriptionCache::new();

        let english = cache.get(&whois, ObjectType::Domain, "en").await.unwrap();
        let czech = cache.get(&whois, ObjectType::Domain, "cs").await.unwrap();

        assert_ne!(english.get("linked"), czech.get("linked"));
        assert_eq!(whois.status_description_calls(), 2);
    }
}
