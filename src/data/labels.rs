use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use lru::LruCache;

pub const ARKHAM_BASE: &str = "https://api.arkhamintelligence.com";

const LABEL_CACHE_SIZE: usize = 1000;

/// Looks up a known-entity label for an address. Lookups never fail: any
/// problem is reported as "no label".
#[async_trait]
pub trait EntityLabeler: Send + Sync {
    async fn label_for(&self, address: Address) -> Option<String>;
}

/// Labeler used when no labeling service is configured.
pub struct NoLabels;

#[async_trait]
impl EntityLabeler for NoLabels {
    async fn label_for(&self, _address: Address) -> Option<String> {
        None
    }
}

/// Arkham Intelligence address lookups, memoized per process.
pub struct ArkhamLabeler {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    cache: Mutex<LruCache<Address, Option<String>>>,
}

impl ArkhamLabeler {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key,
            base_url: base_url.into(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(LABEL_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// GET {base}/intelligence/address/{address}/all
    async fn fetch(&self, api_key: &str, address: Address) -> Option<String> {
        let url = format!("{}/intelligence/address/{address:#x}/all", self.base_url);
        let response = match self
            .client
            .get(&url)
            .header("API-Key", api_key)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(%address, error = %e, "entity label lookup failed");
                return None;
            }
        };

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(%address, error = %e, "entity label response was not JSON");
                return None;
            }
        };
        entity_from_intel(&body)
    }
}

#[async_trait]
impl EntityLabeler for ArkhamLabeler {
    async fn label_for(&self, address: Address) -> Option<String> {
        let api_key = self.api_key.as_deref()?;

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&address) {
                return cached.clone();
            }
        }

        let label = self.fetch(api_key, address).await;

        // Misses are cached too so one address is never asked twice.
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(address, label.clone());
        }
        label
    }
}

/// The response maps chain names to intel objects; the first one carrying an
/// `arkhamEntity` wins.
fn entity_from_intel(body: &serde_json::Value) -> Option<String> {
    body.as_object()?.values().find_map(|intel| {
        intel
            .get("arkhamEntity")?
            .get("id")?
            .as_str()
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn addr() -> Address {
        Address::repeat_byte(0x42)
    }

    fn intel_path() -> String {
        format!("/intelligence/address/{:#x}/all", addr())
    }

    #[test]
    fn test_entity_from_intel() {
        let body = serde_json::json!({
            "ethereum": {"address": "0x42", "arkhamEntity": {"id": "binance", "name": "Binance"}},
        });
        assert_eq!(entity_from_intel(&body).as_deref(), Some("binance"));
    }

    #[test]
    fn test_entity_from_intel_missing() {
        assert!(entity_from_intel(&serde_json::json!({"ethereum": {"address": "0x42"}})).is_none());
        assert!(entity_from_intel(&serde_json::json!([])).is_none());
        assert!(entity_from_intel(&serde_json::json!({"ethereum": null})).is_none());
    }

    #[tokio::test]
    async fn test_no_key_means_no_lookup() {
        let labeler = ArkhamLabeler::new(None, "http://127.0.0.1:1", Duration::from_secs(1));
        assert!(!labeler.is_enabled());
        assert!(labeler.label_for(addr()).await.is_none());
    }

    #[tokio::test]
    async fn test_label_lookup_and_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(intel_path()))
            .and(header("API-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ethereum": {"arkhamEntity": {"id": "coinbase"}},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let labeler = ArkhamLabeler::new(Some("secret".into()), server.uri(), Duration::from_secs(5));
        assert_eq!(labeler.label_for(addr()).await.as_deref(), Some("coinbase"));
        // Second call is served from the cache; the mock expects one request.
        assert_eq!(labeler.label_for(addr()).await.as_deref(), Some("coinbase"));
    }

    #[tokio::test]
    async fn test_label_lookup_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(intel_path()))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let labeler = ArkhamLabeler::new(Some("bad".into()), server.uri(), Duration::from_secs(5));
        assert!(labeler.label_for(addr()).await.is_none());
    }
}
