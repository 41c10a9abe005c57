// Configuration and run-marker stores.
//
// The deployed bot keeps its config blob and the per-tick posting lock
// in a small remote key-value store. Both are reached through traits so
// the pipeline never knows which backend is behind them; the in-memory
// implementations back tests and single-process deployments.
//
// The run marker is advisory, not a hard lock: it expires shortly after
// the expected run duration, so a crash mid-run permits a legitimate
// retry at a later tick.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::BotConfig;
use crate::error::BotResult;

/// Get/set of the single configuration blob.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The last saved configuration, or `None` if nothing was saved yet.
    async fn load(&self) -> BotResult<Option<BotConfig>>;

    /// Persist the configuration. Rejects blobs missing required fields.
    async fn save(&self, config: &BotConfig) -> BotResult<()>;
}

/// Short-lived mutual-exclusion markers keyed by trigger tick.
#[async_trait]
pub trait RunMarkerStore: Send + Sync {
    /// Set the marker if absent or expired. Returns `true` when this
    /// caller owns the tick and may run.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> BotResult<bool>;
}

/// In-memory config store.
#[derive(Default)]
pub struct MemoryConfigStore {
    inner: Mutex<Option<BotConfig>>,
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> BotResult<Option<BotConfig>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, config: &BotConfig) -> BotResult<()> {
        config.validate()?;
        *self.inner.lock().await = Some(config.clone());
        Ok(())
    }
}

/// In-memory marker store with TTL expiry.
#[derive(Default)]
pub struct MemoryMarkerStore {
    entries: Mutex<HashMap<String, Instant>>,
}

#[async_trait]
impl RunMarkerStore for MemoryMarkerStore {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> BotResult<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, expiry| *expiry > now);

        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), now + ttl);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;

    #[tokio::test]
    async fn config_round_trip() {
        let store = MemoryConfigStore::default();
        assert!(store.load().await.unwrap().is_none());

        let config = BotConfig {
            address: "tz1abc".into(),
            platform_handle: "artist.bsky.social".into(),
            ..Default::default()
        };
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.address, "tz1abc");
    }

    #[tokio::test]
    async fn save_rejects_incomplete_config() {
        let store = MemoryConfigStore::default();
        let err = store.save(&BotConfig::default()).await.unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[tokio::test]
    async fn marker_is_exclusive_until_expiry() {
        let store = MemoryMarkerStore::default();
        let ttl = Duration::from_millis(30);

        assert!(store.try_acquire("post_lock:09:00", ttl).await.unwrap());
        assert!(!store.try_acquire("post_lock:09:00", ttl).await.unwrap());
        // A different tick is unaffected
        assert!(store.try_acquire("post_lock:09:01", ttl).await.unwrap());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.try_acquire("post_lock:09:00", ttl).await.unwrap());
    }
}
