//! Process-wide session wiring the stores, the orchestrator and the
//! preference resolver together.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::Product;
use crate::orchestrator::RefetchOrchestrator;
use crate::preferences::{PreferenceResolver, PreferenceStore};
use crate::remote::{RemoteSource, SubmissionError};
use crate::screen::Screen;
use crate::state::AppState;
use crate::store::ApplyPolicy;
use crate::submit::{parse_stored_product, ProductDraft};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Drop fetch responses that settle after a newer one was applied.
    pub discard_superseded: bool,
}

impl SessionOptions {
    fn policy(&self) -> ApplyPolicy {
        if self.discard_superseded {
            ApplyPolicy::DiscardSuperseded
        } else {
            ApplyPolicy::LastSettled
        }
    }
}

pub struct Session {
    remote: Arc<dyn RemoteSource>,
    orchestrator: Arc<RefetchOrchestrator>,
    preferences: Arc<PreferenceResolver>,
    submitting: watch::Sender<usize>,
    state: AppState,
}

impl Session {
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        preference_store: Arc<dyn PreferenceStore>,
        options: SessionOptions,
    ) -> Self {
        let orchestrator = Arc::new(RefetchOrchestrator::new(remote.clone(), options.policy()));
        let preferences = Arc::new(PreferenceResolver::new(preference_store));
        let submitting = watch::Sender::new(0);
        let state = AppState::new(&orchestrator, preferences.reader(), submitting.subscribe());

        Self {
            remote,
            orchestrator,
            preferences,
            submitting,
            state,
        }
    }

    /// Read-only handle for screens.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn preferences(&self) -> &PreferenceResolver {
        &self.preferences
    }

    pub fn orchestrator(&self) -> &Arc<RefetchOrchestrator> {
        &self.orchestrator
    }

    /// Resolves preferences and fetches every collection concurrently. The
    /// returned task finishes when the loading gate opens; stores keep
    /// filling in afterwards.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let preferences = self.preferences.clone();
        self.orchestrator.start(async move {
            preferences.resolve().await;
        })
    }

    /// Pull-to-refresh.
    pub async fn refresh(&self) {
        self.orchestrator.refresh().await;
    }

    pub fn screen_lost_focus(&self, screen: Screen) -> Option<JoinHandle<()>> {
        self.orchestrator.screen_lost_focus(screen)
    }

    /// Creates a product, or updates `product_id`, and refetches products.
    ///
    /// Returns the stored product, or `None` when the draft is invalid, the
    /// write failed or the stored record could not be decoded. Products are
    /// refetched whenever the server accepted the write. The submitting flag
    /// is cleared either way so the caller can retry.
    pub async fn submit_product(
        &self,
        product_id: Option<&str>,
        draft: ProductDraft,
    ) -> Option<Product> {
        let _submitting = SubmittingGuard::enter(&self.submitting);

        let stored = match self.send(product_id, draft).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(product_id = ?product_id, error = %e, "Product submission failed");
                return None;
            }
        };

        self.orchestrator.products().refetch().await;

        match parse_stored_product(stored) {
            Ok(product) => {
                tracing::info!(product_id = %product.id, "Product submitted");
                Some(product)
            }
            Err(e) => {
                tracing::warn!(
                    product_id = ?product_id,
                    error = %e,
                    "Product accepted but stored record is unreadable"
                );
                None
            }
        }
    }

    async fn send(
        &self,
        product_id: Option<&str>,
        draft: ProductDraft,
    ) -> Result<Value, SubmissionError> {
        let submission = draft.into_submission(self.state.preferences().device_id())?;
        self.remote.submit_product(product_id, &submission).await
    }
}

/// Counts submissions in flight; the flag reads true while any is pending.
struct SubmittingGuard<'a> {
    in_flight: &'a watch::Sender<usize>,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(in_flight: &'a watch::Sender<usize>) -> Self {
        in_flight.send_modify(|count| *count += 1);
        Self { in_flight }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}
