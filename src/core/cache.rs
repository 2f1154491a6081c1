use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds the latest value of something fetched as a whole.
///
/// A `put` swaps the stored `Arc` in one step, so readers see either the
/// previous value or the new one, never a mix.
pub struct Cache<V> {
    inner: RwLock<Option<Arc<V>>>,
}

impl<V> Cache<V>
where
    V: Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Option<Arc<V>> {
        let cache = self.inner.read().await;
        let value = cache.clone();
        if value.is_some() {
            debug!("Cache HIT");
        } else {
            debug!("Cache MISS");
        }
        value
    }

    /// Replaces whatever was stored and returns the new shared value.
    pub async fn put(&self, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let mut cache = self.inner.write().await;
        debug!("Cache PUT");
        *cache = Some(Arc::clone(&value));
        value
    }
}

impl<V> Default for Cache<V>
where
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
