//! Refetch orchestration across the remote collection stores.
//!
//! The orchestrator owns the stores and drives them from lifecycle events:
//! process start, a listing screen losing focus, and pull-to-refresh. It also
//! owns the loading gate that keeps the splash screen up until bootstrap has
//! resolved and the first fetch has settled.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::models::{FavoriteMarker, InfoRecord, Product, ProductComparison};
use crate::remote::{Endpoint, RemoteSource};
use crate::screen::Screen;
use crate::store::{ApplyPolicy, RemoteCollectionStore, RemoteRecord};

/// Observable state of the loading gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

pub struct RefetchOrchestrator {
    products: Arc<RemoteCollectionStore<Product>>,
    comparisons: Arc<RemoteCollectionStore<ProductComparison>>,
    favorites: Arc<RemoteCollectionStore<FavoriteMarker>>,
    info: Arc<RemoteCollectionStore<InfoRecord>>,
    started: AtomicBool,
    phase: watch::Sender<Phase>,
    refreshing: watch::Sender<bool>,
}

impl RefetchOrchestrator {
    pub fn new(remote: Arc<dyn RemoteSource>, policy: ApplyPolicy) -> Self {
        Self {
            products: Arc::new(RemoteCollectionStore::new(remote.clone(), policy)),
            comparisons: Arc::new(RemoteCollectionStore::new(remote.clone(), policy)),
            favorites: Arc::new(RemoteCollectionStore::new(remote.clone(), policy)),
            info: Arc::new(RemoteCollectionStore::new(remote, policy)),
            started: AtomicBool::new(false),
            phase: watch::Sender::new(Phase::Loading),
            refreshing: watch::Sender::new(false),
        }
    }

    pub fn products(&self) -> &Arc<RemoteCollectionStore<Product>> {
        &self.products
    }

    pub fn comparisons(&self) -> &Arc<RemoteCollectionStore<ProductComparison>> {
        &self.comparisons
    }

    pub fn favorites(&self) -> &Arc<RemoteCollectionStore<FavoriteMarker>> {
        &self.favorites
    }

    pub fn info(&self) -> &Arc<RemoteCollectionStore<InfoRecord>> {
        &self.info
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn phase_reader(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    pub fn refreshing_reader(&self) -> watch::Receiver<bool> {
        self.refreshing.subscribe()
    }

    /// True while any of the product, comparison or favorite stores has a
    /// fetch in flight. The info store does not count.
    pub fn is_any_loading(&self) -> bool {
        self.products.is_loading() || self.comparisons.is_loading() || self.favorites.is_loading()
    }

    /// Kicks off the start-of-process fetches alongside `bootstrap`.
    ///
    /// Every store fetch runs as its own task and emits a disable-loading
    /// signal when it settles, successfully or not. The gate opens once
    /// `bootstrap` has finished and the first signal has arrived. Returns
    /// `None` if the orchestrator was already started.
    pub fn start<F>(self: &Arc<Self>, bootstrap: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Orchestrator already started");
            return None;
        }

        tracing::info!("Starting initial fetches");

        let (tx, mut signals) = mpsc::unbounded_channel();
        spawn_initial_fetch(self.products.clone(), tx.clone());
        spawn_initial_fetch(self.comparisons.clone(), tx.clone());
        spawn_initial_fetch(self.favorites.clone(), tx.clone());
        spawn_initial_fetch(self.info.clone(), tx);

        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let ((), first) = tokio::join!(bootstrap, signals.recv());
            if let Some(endpoint) = first {
                tracing::debug!(%endpoint, "First fetch settled");
            }
            this.mark_ready();
        }))
    }

    fn mark_ready(&self) {
        let opened = self.phase.send_if_modified(|phase| {
            let was_loading = *phase == Phase::Loading;
            *phase = Phase::Ready;
            was_loading
        });
        if opened {
            tracing::info!("Loading gate opened");
        }
    }

    /// Refetches the three record collections in the background when a
    /// listing screen loses focus. Other screens are ignored.
    pub fn screen_lost_focus(&self, screen: Screen) -> Option<JoinHandle<()>> {
        if !screen.is_records_listing() {
            return None;
        }

        tracing::debug!(%screen, "Screen lost focus, refetching records");

        let products = self.products.clone();
        let comparisons = self.comparisons.clone();
        let favorites = self.favorites.clone();
        Some(tokio::spawn(async move {
            futures::join!(products.refetch(), comparisons.refetch(), favorites.refetch());
        }))
    }

    /// Pull-to-refresh: refetches products, comparisons and favorites one
    /// after another. Always completes; a refresh requested while one is
    /// running returns immediately.
    pub async fn refresh(&self) {
        let Some(_refreshing) = RefreshingGuard::enter(&self.refreshing) else {
            tracing::debug!("Refresh already running");
            return;
        };

        self.products.refetch().await;
        self.comparisons.refetch().await;
        self.favorites.refetch().await;

        tracing::debug!("Refresh finished");
    }
}

/// Sends the disable-loading signal for `endpoint` when dropped.
struct DisableLoading {
    endpoint: Endpoint,
    tx: mpsc::UnboundedSender<Endpoint>,
}

impl Drop for DisableLoading {
    fn drop(&mut self) {
        let _ = self.tx.send(self.endpoint);
    }
}

fn spawn_initial_fetch<T: RemoteRecord>(
    store: Arc<RemoteCollectionStore<T>>,
    tx: mpsc::UnboundedSender<Endpoint>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _signal = DisableLoading {
            endpoint: T::ENDPOINT,
            tx,
        };
        store.refetch().await;
    })
}

/// Holds `refreshing` true until dropped.
struct RefreshingGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl<'a> RefreshingGuard<'a> {
    fn enter(flag: &'a watch::Sender<bool>) -> Option<Self> {
        let entered = flag.send_if_modified(|refreshing| !std::mem::replace(refreshing, true));
        entered.then(|| Self { flag })
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}
