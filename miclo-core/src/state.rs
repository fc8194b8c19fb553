//! Shared application state handed to every screen.
//!
//! [`AppState`] is a bundle of read-only handles: one per remote collection,
//! one for the resolved preferences, and the orchestrator's flags. Cloning it
//! is cheap. Writes go through the owning store, resolver or session.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{FavoriteMarker, InfoRecord, Product, ProductComparison};
use crate::orchestrator::{Phase, RefetchOrchestrator};
use crate::preferences::PreferencesReader;
use crate::store::StoreReader;
use crate::views::{
    compute_record_views, favorite_ids, products_in_category, RecordItem, RecordTab, RecordViews,
    ViewCache, ViewKey,
};

#[derive(Debug, Clone)]
pub struct AppState {
    products: StoreReader<Product>,
    comparisons: StoreReader<ProductComparison>,
    favorites: StoreReader<FavoriteMarker>,
    info: StoreReader<InfoRecord>,
    preferences: PreferencesReader,
    phase: watch::Receiver<Phase>,
    refreshing: watch::Receiver<bool>,
    submitting: watch::Receiver<usize>,
    views: Arc<ViewCache>,
}

impl AppState {
    pub(crate) fn new(
        orchestrator: &RefetchOrchestrator,
        preferences: PreferencesReader,
        submitting: watch::Receiver<usize>,
    ) -> Self {
        Self {
            products: orchestrator.products().reader(),
            comparisons: orchestrator.comparisons().reader(),
            favorites: orchestrator.favorites().reader(),
            info: orchestrator.info().reader(),
            preferences,
            phase: orchestrator.phase_reader(),
            refreshing: orchestrator.refreshing_reader(),
            submitting,
            views: Arc::new(ViewCache::new()),
        }
    }

    pub fn products(&self) -> &StoreReader<Product> {
        &self.products
    }

    pub fn comparisons(&self) -> &StoreReader<ProductComparison> {
        &self.comparisons
    }

    pub fn favorites(&self) -> &StoreReader<FavoriteMarker> {
        &self.favorites
    }

    pub fn info(&self) -> &StoreReader<InfoRecord> {
        &self.info
    }

    pub fn preferences(&self) -> &PreferencesReader {
        &self.preferences
    }

    /// Record projections for the current collections, recomputed only when
    /// one of them has changed since the last call.
    pub fn record_views(&self) -> Arc<RecordViews> {
        let products = self.products.snapshot();
        let comparisons = self.comparisons.snapshot();
        let favorites = self.favorites.snapshot();

        let key = ViewKey {
            products: products.version,
            comparisons: comparisons.version,
            favorites: favorites.version,
        };

        self.views.get_or_compute(key, || {
            tracing::debug!(?key, "Recomputing record views");
            compute_record_views(
                &products.items,
                &comparisons.items,
                &favorite_ids(&favorites.items),
            )
        })
    }

    pub fn record_tab(&self, tab: RecordTab) -> Vec<RecordItem> {
        self.record_views().tab(tab).to_vec()
    }

    /// Looks up one product with its favorite flag.
    pub fn product(&self, id: &str) -> Option<RecordItem> {
        let product = self.products.items().iter().find(|p| p.id == id)?.clone();
        let favorite = self.favorites.items().iter().any(|m| m.product_id == id);
        Some(RecordItem { product, favorite })
    }

    /// Products of the user's default category, or all products when none
    /// is selected.
    pub fn products_in_selected_category(&self) -> Vec<RecordItem> {
        products_in_category(
            &self.products.items(),
            &favorite_ids(&self.favorites.items()),
            self.preferences.selected_category(),
        )
    }

    /// Content of the "More" screens: the first info record, or blanks.
    pub fn more_info(&self) -> InfoRecord {
        self.info.items().first().cloned().unwrap_or_default()
    }

    /// Aggregate loading flag over products, comparisons and favorites.
    pub fn is_loading(&self) -> bool {
        self.products.is_loading() || self.comparisons.is_loading() || self.favorites.is_loading()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    pub fn is_submitting(&self) -> bool {
        *self.submitting.borrow() > 0
    }

    /// Waits until the loading gate has opened.
    pub async fn wait_ready(&self) {
        let mut phase = self.phase.clone();
        let _ = phase.wait_for(|p| *p == Phase::Ready).await;
    }
}
