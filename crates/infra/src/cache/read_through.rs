//! Read-through cache with per-key single-flight fills.
//!
//! Each key maps to a slot that is either a live value or a fetch that is
//! still in flight:
//!
//! ```text
//! get_or_fetch(key)
//!   ├─ Ready, unexpired  → clone value, store untouched
//!   ├─ Pending          → await the same shared flight
//!   └─ absent / expired → claim key (Pending), spawn fetch task
//!                           ├─ Ok  → slot becomes Ready(now + ttl)
//!                           └─ Err → slot cleared, error fanned out to waiters
//! ```
//!
//! The claim is a short critical section on a std `Mutex` that is never held
//! across an `.await`. Fetches run on their own tokio task, so dropping any
//! caller (including the one that claimed the key) does not cancel the fill.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use catalog_core::PageKey;
use catalog_products::ProductPage;

use crate::product_store::StoreError;

/// Freshness window for cached pages.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(60);

/// The catalogue's page cache: currency-agnostic pages keyed by offset/size.
pub type PageCache = ReadThroughCache<PageKey, ProductPage>;

type Flight<V> = Shared<BoxFuture<'static, Result<V, StoreError>>>;
type Slots<K, V> = Arc<Mutex<HashMap<K, Slot<V>>>>;

enum Slot<V> {
    Ready { value: V, expires_at: Instant },
    Pending(Flight<V>),
}

enum Lookup<V> {
    Hit(V),
    Join(Flight<V>),
    Miss,
}

fn lock<K, V>(slots: &Mutex<HashMap<K, Slot<V>>>) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
    // A panic while holding the lock cannot leave a slot half-written.
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears a pending slot unless the flight commits a value.
///
/// Runs on every exit path of the fetch task, including panics.
struct FlightGuard<K, V>
where
    K: Eq + Hash,
{
    slots: Slots<K, V>,
    key: Option<K>,
}

impl<K, V> FlightGuard<K, V>
where
    K: Eq + Hash,
{
    fn disarm(&mut self) {
        self.key = None;
    }
}

impl<K, V> Drop for FlightGuard<K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            let mut slots = lock(&self.slots);
            if matches!(slots.get(&key), Some(Slot::Pending(_))) {
                slots.remove(&key);
            }
        }
    }
}

/// Concurrent read-through cache with TTL expiry and single-flight misses.
///
/// Cloning is cheap and yields a handle to the same underlying map.
pub struct ReadThroughCache<K, V> {
    ttl: Duration,
    slots: Slots<K, V>,
}

impl<K, V> Clone for ReadThroughCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K, V> fmt::Debug for ReadThroughCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("ttl", &self.ttl)
            .field("entries", &lock(&self.slots).len())
            .finish()
    }
}

impl<K, V> Default for ReadThroughCache<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ReadThroughCache<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_PAGE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live value for `key`, or fill it by calling `fetch` once.
    ///
    /// Concurrent callers for the same key share one in-flight fetch and all
    /// observe its result. Errors are returned to every waiter of that flight
    /// and are not cached; the next call after a failure fetches again.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, StoreError>> + Send + 'static,
    {
        let flight = {
            let mut slots = lock(&self.slots);
            let now = Instant::now();
            let lookup = match slots.get(&key) {
                Some(Slot::Ready { value, expires_at }) if now < *expires_at => {
                    Lookup::Hit(value.clone())
                }
                Some(Slot::Pending(flight)) => Lookup::Join(flight.clone()),
                _ => Lookup::Miss,
            };

            match lookup {
                Lookup::Hit(value) => {
                    tracing::debug!(?key, "cache hit");
                    return Ok(value);
                }
                Lookup::Join(flight) => {
                    tracing::debug!(?key, "joining in-flight fetch");
                    flight
                }
                Lookup::Miss => {
                    tracing::debug!(?key, "cache miss");
                    let flight = self.launch(key.clone(), fetch());
                    slots.insert(key, Slot::Pending(flight.clone()));
                    flight
                }
            }
        };

        flight.await
    }

    /// Spawn the fetch on its own task and wrap its handle as a shared flight.
    ///
    /// Must be called with the slot map locked, so the task cannot commit
    /// before the caller has recorded the key as pending.
    fn launch<Fut>(&self, key: K, fetch: Fut) -> Flight<V>
    where
        Fut: Future<Output = Result<V, StoreError>> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        let ttl = self.ttl;

        let handle: JoinHandle<Result<V, StoreError>> = tokio::spawn(async move {
            let mut guard = FlightGuard {
                slots: Arc::clone(&slots),
                key: Some(key.clone()),
            };

            let result = fetch.await;
            match &result {
                Ok(value) => {
                    lock(&slots).insert(
                        key.clone(),
                        Slot::Ready {
                            value: value.clone(),
                            expires_at: Instant::now() + ttl,
                        },
                    );
                    guard.disarm();
                    tracing::debug!(?key, ttl_secs = ttl.as_secs(), "cache filled");
                }
                Err(err) => {
                    tracing::warn!(?key, error = %err, "fetch failed; nothing cached");
                }
            }
            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(StoreError::Interrupted(join_err.to_string())),
            }
        }
        .boxed()
        .shared()
    }

    /// Number of slots, live, expired or in flight.
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired values. In-flight fetches are left alone.
    ///
    /// Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = lock(&self.slots);
        let before = slots.len();
        slots.retain(|_, slot| match slot {
            Slot::Ready { expires_at, .. } => now < *expires_at,
            Slot::Pending(_) => true,
        });
        before - slots.len()
    }

    /// Drop every stored value. In-flight fetches still complete and fill.
    pub fn invalidate_all(&self) {
        lock(&self.slots).retain(|_, slot| matches!(slot, Slot::Pending(_)));
    }

    /// Periodically purge expired entries until the returned handle is aborted.
    pub fn spawn_janitor(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "expired cache entries purged");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::{Ready, ready};
    use tokio::sync::oneshot;

    fn key(start: u32, size: u32) -> PageKey {
        PageKey::new(start, size)
    }

    fn counted(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnOnce() -> Ready<Result<String, StoreError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            ready(Ok(value.to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_does_not_fetch_again() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_fetch(key(0, 5), counted(&calls, "a")).await.unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = cache.get_or_fetch(key(0, 5), counted(&calls, "b")).await.unwrap();

        assert_eq!(first, "a");
        assert_eq!(second, "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_fetched_again() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(key(0, 5), counted(&calls, "old")).await.unwrap();
        tokio::time::advance(DEFAULT_PAGE_TTL + Duration::from_secs(1)).await;
        let refreshed = cache.get_or_fetch(key(0, 5), counted(&calls, "new")).await.unwrap();

        assert_eq!(refreshed, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_keys_are_cached_independently() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(key(0, 5), counted(&calls, "p1")).await.unwrap();
        let other = cache.get_or_fetch(key(5, 5), counted(&calls, "p2")).await.unwrap();
        let again = cache.get_or_fetch(key(0, 5), counted(&calls, "x")).await.unwrap();

        assert_eq!(other, "p2");
        assert_eq!(again, "p1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_share_one_fetch() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(key(0, 5), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, StoreError>("shared".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let err = cache
            .get_or_fetch(key(0, 5), || ready(Err(StoreError::unavailable("db down"))))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::unavailable("db down"));
        assert!(cache.is_empty());

        let value = cache.get_or_fetch(key(0, 5), counted(&calls, "recovered")).await.unwrap();
        assert_eq!(value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_fetch_reports_interrupted_and_clears_slot() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();

        let err = cache
            .get_or_fetch(key(0, 5), || async {
                if true {
                    panic!("store adapter bug");
                }
                Ok(String::new())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Interrupted(_)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn cancelled_caller_does_not_cancel_shared_fetch() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let claimer = {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(key(0, 5), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = release_rx.await;
                        Ok::<_, StoreError>("filled".to_string())
                    })
                    .await
            })
        };

        // Let the claimer register the flight, then abandon it.
        while cache.is_empty() {
            tokio::task::yield_now().await;
        }
        claimer.abort();
        assert!(claimer.await.unwrap_err().is_cancelled());

        release_tx.send(()).unwrap();
        let value = cache.get_or_fetch(key(0, 5), counted(&calls, "refetched")).await.unwrap();

        assert_eq!(value, "filled");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired_entries() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(key(0, 5), counted(&calls, "old")).await.unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.get_or_fetch(key(5, 5), counted(&calls, "young")).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_all_forces_refetch() {
        let cache: ReadThroughCache<PageKey, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(key(0, 5), counted(&calls, "a")).await.unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());

        let value = cache.get_or_fetch(key(0, 5), counted(&calls, "b")).await.unwrap();
        assert_eq!(value, "b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
