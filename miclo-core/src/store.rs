//! Remote collection stores.
//!
//! A [`RemoteCollectionStore`] owns one collection fetched from the remote
//! data source. Every successful fetch replaces the whole snapshot; a failed
//! fetch leaves the previous snapshot untouched. Readers hold a
//! [`StoreReader`] and never write.
//!
//! Overlapping fetches are not de-duplicated. By default the response that
//! settles last wins, even when it was issued first. With
//! [`ApplyPolicy::DiscardSuperseded`] each fetch carries a sequence number and
//! a response older than the last applied one is dropped instead.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use crate::models::{FavoriteMarker, InfoRecord, Product, ProductComparison};
use crate::remote::{normalize_comparison, normalize_record, Endpoint, FetchError, RemoteSource};

/// A record type served by one remote endpoint.
pub trait RemoteRecord: DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    const ENDPOINT: Endpoint;

    /// Maps a raw storage record to the public shape this type deserializes.
    fn normalize(raw: Value) -> Result<Value, String> {
        normalize_record(raw)
    }
}

impl RemoteRecord for Product {
    const ENDPOINT: Endpoint = Endpoint::Products;
}

impl RemoteRecord for ProductComparison {
    const ENDPOINT: Endpoint = Endpoint::Comparisons;

    fn normalize(raw: Value) -> Result<Value, String> {
        normalize_comparison(raw)
    }
}

impl RemoteRecord for FavoriteMarker {
    const ENDPOINT: Endpoint = Endpoint::Favorites;
}

impl RemoteRecord for InfoRecord {
    const ENDPOINT: Endpoint = Endpoint::Info;
}

/// What to do with a response that settles after a newer one was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyPolicy {
    /// Last response to settle wins.
    #[default]
    LastSettled,
    /// Responses older than the last applied one are discarded.
    DiscardSuperseded,
}

/// An immutable view of a store's collection.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Arc<Vec<T>>,
    /// Bumped on every applied fetch; used as a memoization key.
    pub version: u64,
    /// Sequence number of the fetch that produced this snapshot.
    pub sequence: u64,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            version: 0,
            sequence: 0,
            fetched_at: None,
        }
    }
}

/// Owner of one remote collection.
pub struct RemoteCollectionStore<T: RemoteRecord> {
    remote: Arc<dyn RemoteSource>,
    policy: ApplyPolicy,
    next_sequence: AtomicU64,
    snapshot: watch::Sender<Snapshot<T>>,
    in_flight: watch::Sender<usize>,
}

impl<T: RemoteRecord> RemoteCollectionStore<T> {
    pub fn new(remote: Arc<dyn RemoteSource>, policy: ApplyPolicy) -> Self {
        Self {
            remote,
            policy,
            next_sequence: AtomicU64::new(0),
            snapshot: watch::Sender::new(Snapshot::default()),
            in_flight: watch::Sender::new(0),
        }
    }

    /// Returns a read-only handle to this store.
    pub fn reader(&self) -> StoreReader<T> {
        StoreReader {
            snapshot: self.snapshot.subscribe(),
            in_flight: self.in_flight.subscribe(),
        }
    }

    /// Current items.
    pub fn items(&self) -> Arc<Vec<T>> {
        self.snapshot.borrow().items.clone()
    }

    /// True while at least one fetch is in flight.
    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    /// Issues one request and replaces the collection on success.
    ///
    /// Failures are logged here and leave the collection as it was. The
    /// returned collection is the store's content once this fetch settled,
    /// which under [`ApplyPolicy::DiscardSuperseded`] may come from a newer
    /// fetch.
    pub async fn fetch_all(&self) -> Result<Arc<Vec<T>>, FetchError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let _loading = LoadingGuard::enter(&self.in_flight);

        tracing::debug!(endpoint = %T::ENDPOINT, sequence, "Fetching collection");

        match self.load().await {
            Ok(items) => Ok(self.apply(sequence, items)),
            Err(e) => {
                tracing::warn!(
                    endpoint = %T::ENDPOINT,
                    sequence,
                    error = %e,
                    "Collection fetch failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    /// Fire-and-forget form of [`fetch_all`](Self::fetch_all). Errors are
    /// already logged and are not reported to the caller.
    pub async fn refetch(&self) {
        let _ = self.fetch_all().await;
    }

    async fn load(&self) -> Result<Vec<T>, FetchError> {
        let raw = self.remote.fetch_records(T::ENDPOINT).await?;

        raw.into_iter()
            .map(|record| {
                let normalized = T::normalize(record).map_err(|message| FetchError::Normalize {
                    endpoint: T::ENDPOINT.to_string(),
                    message,
                })?;
                serde_json::from_value(normalized).map_err(|e| FetchError::Decode {
                    endpoint: T::ENDPOINT.to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn apply(&self, sequence: u64, items: Vec<T>) -> Arc<Vec<T>> {
        let policy = self.policy;
        let mut current = None;

        let applied = self.snapshot.send_if_modified(|snapshot| {
            if policy == ApplyPolicy::DiscardSuperseded && sequence < snapshot.sequence {
                current = Some(snapshot.items.clone());
                return false;
            }
            let items = Arc::new(items);
            snapshot.items = items.clone();
            snapshot.version += 1;
            snapshot.sequence = sequence;
            snapshot.fetched_at = Some(Utc::now());
            current = Some(items);
            true
        });

        if applied {
            tracing::debug!(endpoint = %T::ENDPOINT, sequence, "Applied collection snapshot");
        } else {
            tracing::debug!(
                endpoint = %T::ENDPOINT,
                sequence,
                "Discarded superseded response"
            );
        }

        current.unwrap_or_else(|| self.items())
    }
}

/// Read-only handle to a [`RemoteCollectionStore`].
#[derive(Debug, Clone)]
pub struct StoreReader<T> {
    snapshot: watch::Receiver<Snapshot<T>>,
    in_flight: watch::Receiver<usize>,
}

impl<T: Clone> StoreReader<T> {
    pub fn items(&self) -> Arc<Vec<T>> {
        self.snapshot.borrow().items.clone()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot.borrow().version
    }

    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    /// Waits for the next applied snapshot. Returns `false` once the store
    /// has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }

    /// Waits until no fetch is in flight.
    pub async fn wait_idle(&mut self) {
        let _ = self.in_flight.wait_for(|count| *count == 0).await;
    }
}

/// Holds a store's loading flag up for the duration of one fetch; released on
/// drop whether the fetch succeeded, failed or was cancelled.
struct LoadingGuard<'a> {
    in_flight: &'a watch::Sender<usize>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(in_flight: &'a watch::Sender<usize>) -> Self {
        in_flight.send_modify(|count| *count += 1);
        Self { in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRemote;
    use serde_json::json;
    use std::time::Duration;

    fn store<T: RemoteRecord>(
        remote: &Arc<FakeRemote>,
        policy: ApplyPolicy,
    ) -> RemoteCollectionStore<T> {
        RemoteCollectionStore::new(remote.clone(), policy)
    }

    #[tokio::test]
    async fn test_fetch_all_normalizes_records() {
        let remote = FakeRemote::new();
        remote.set(
            Endpoint::Products,
            vec![json!({ "_id": "1", "__v": 0, "name": "A", "category": "mask" })],
        );
        let products = store::<Product>(&remote, ApplyPolicy::LastSettled);

        let items = products.fetch_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].name, "A");
        assert!(!products.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_twice_is_idempotent() {
        let remote = FakeRemote::new();
        remote.set(
            Endpoint::Products,
            vec![json!({ "_id": "1", "name": "A" }), json!({ "_id": "2", "name": "B" })],
        );
        let products = store::<Product>(&remote, ApplyPolicy::LastSettled);

        let first = products.fetch_all().await.unwrap();
        let second = products.fetch_all().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(products.reader().version(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let remote = FakeRemote::new();
        remote.set(Endpoint::Products, vec![json!({ "_id": "1", "name": "A" })]);
        let products = store::<Product>(&remote, ApplyPolicy::LastSettled);
        products.fetch_all().await.unwrap();

        remote.fail(Endpoint::Products);
        assert!(products.fetch_all().await.is_err());

        assert_eq!(products.items().len(), 1);
        assert_eq!(products.reader().version(), 1);
        assert!(!products.is_loading());
    }

    #[tokio::test]
    async fn test_non_object_record_fails_whole_fetch() {
        let remote = FakeRemote::new();
        remote.set(Endpoint::Products, vec![json!({ "_id": "1" }), json!("junk")]);
        let products = store::<Product>(&remote, ApplyPolicy::LastSettled);

        let err = products.fetch_all().await.unwrap_err();
        assert!(matches!(err, FetchError::Normalize { .. }));
        assert!(products.items().is_empty());
    }

    #[tokio::test]
    async fn test_null_fields_do_not_fail_fetch() {
        let remote = FakeRemote::new();
        remote.set(
            Endpoint::Products,
            vec![
                json!({ "_id": "1", "name": "N95", "remarks": "fits well" }),
                json!({ "_id": "2", "name": "Gel", "remarks": null, "price": null }),
            ],
        );
        let products = store::<Product>(&remote, ApplyPolicy::LastSettled);

        let items = products.fetch_all().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].remarks, "");
        assert_eq!(items[1].price, 0.0);
    }

    #[tokio::test]
    async fn test_comparisons_normalize_nested_products() {
        let remote = FakeRemote::new();
        remote.set(
            Endpoint::Comparisons,
            vec![json!({
                "_id": "c1",
                "createdAt": "2020-06-01",
                "productId": "1",
                "comparionsList": [{ "_id": "2", "name": "B" }]
            })],
        );
        let comparisons = store::<ProductComparison>(&remote, ApplyPolicy::LastSettled);

        let items = comparisons.fetch_all().await.unwrap();
        assert_eq!(items[0].product_id, "1");
        assert_eq!(items[0].comparison_list.as_ref().unwrap()[0].id, "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_spans_overlapping_fetches() {
        let remote = FakeRemote::new();
        remote.push_delayed(Endpoint::Favorites, vec![], Duration::from_millis(10));
        remote.push_delayed(Endpoint::Favorites, vec![], Duration::from_millis(50));
        let favorites = Arc::new(store::<FavoriteMarker>(&remote, ApplyPolicy::LastSettled));

        let first = tokio::spawn({
            let favorites = favorites.clone();
            async move { favorites.refetch().await }
        });
        let second = tokio::spawn({
            let favorites = favorites.clone();
            async move { favorites.refetch().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        first.await.unwrap();
        assert!(favorites.is_loading());

        second.await.unwrap();
        assert!(!favorites.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_settled_response_wins() {
        let remote = FakeRemote::new();
        // Issued first, settles last.
        remote.push_delayed(
            Endpoint::Products,
            vec![json!({ "_id": "old" })],
            Duration::from_millis(50),
        );
        remote.push_delayed(
            Endpoint::Products,
            vec![json!({ "_id": "new" })],
            Duration::from_millis(10),
        );
        let products = Arc::new(store::<Product>(&remote, ApplyPolicy::LastSettled));

        let (a, b) = (products.clone(), products.clone());
        let first = tokio::spawn(async move { a.refetch().await });
        tokio::task::yield_now().await;
        let second = tokio::spawn(async move { b.refetch().await });
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(products.items()[0].id, "old");
    }

    #[tokio::test(start_paused = true)]
    async fn test_discard_superseded_keeps_newest_issue() {
        let remote = FakeRemote::new();
        remote.push_delayed(
            Endpoint::Products,
            vec![json!({ "_id": "old" })],
            Duration::from_millis(50),
        );
        remote.push_delayed(
            Endpoint::Products,
            vec![json!({ "_id": "new" })],
            Duration::from_millis(10),
        );
        let products = Arc::new(store::<Product>(&remote, ApplyPolicy::DiscardSuperseded));

        let (a, b) = (products.clone(), products.clone());
        let first = tokio::spawn(async move { a.fetch_all().await });
        tokio::task::yield_now().await;
        let second = tokio::spawn(async move { b.fetch_all().await });

        let stale = first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        // The stale response reports the newer snapshot it lost to.
        assert_eq!(stale[0].id, "new");
        assert_eq!(products.items()[0].id, "new");
        assert_eq!(products.reader().version(), 1);
    }

    #[tokio::test]
    async fn test_reader_observes_changes() {
        let remote = FakeRemote::new();
        remote.set(Endpoint::Favorites, vec![json!({ "productId": "1" })]);
        let favorites = store::<FavoriteMarker>(&remote, ApplyPolicy::LastSettled);
        let mut reader = favorites.reader();

        favorites.refetch().await;

        assert!(reader.changed().await);
        assert_eq!(reader.items()[0], FavoriteMarker::new("1"));
        reader.wait_idle().await;
        assert!(!reader.is_loading());
    }
}
