//! Bootstrap preference resolver.
//!
//! Runs once before the first screen is chosen:
//! 1. Read `deviceId`, generating and persisting one when absent
//! 2. Read `displayIntro`; the seen sentinel marks the intro as shown
//! 3. Read `selectedCategory`; a valid value becomes the default filter
//!
//! A read failure stops the sequence and leaves the remaining values at their
//! defaults. Resolution always completes.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use super::error::{PersistenceReadError, PersistenceWriteError};
use super::storage::PreferenceStore;
use super::{keys, CAPTURE_STARTS_WITH_PICKER, INTRO_SEEN};
use crate::models::{Category, CategoryError};
use crate::screen::Screen;

/// Preferences folded into the initial application state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Preferences {
    /// Locally generated correlation token; `None` when the store was
    /// unreadable.
    pub device_id: Option<String>,
    pub intro_seen: bool,
    pub selected_category: Option<Category>,
}

/// Owner of the preference state. Only the resolver writes it.
pub struct PreferenceResolver {
    store: Arc<dyn PreferenceStore>,
    state: watch::Sender<Preferences>,
}

impl PreferenceResolver {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            state: watch::Sender::new(Preferences::default()),
        }
    }

    pub fn reader(&self) -> PreferencesReader {
        PreferencesReader(self.state.subscribe())
    }

    pub fn current(&self) -> Preferences {
        self.state.borrow().clone()
    }

    /// Reads persisted preferences and publishes them. Never fails.
    pub async fn resolve(&self) -> Preferences {
        let mut prefs = Preferences::default();

        if let Err(e) = self.read_into(&mut prefs).await {
            tracing::warn!(error = %e, "Preference store unavailable, using defaults");
        }

        tracing::info!(
            intro_seen = prefs.intro_seen,
            category = ?prefs.selected_category,
            has_device_id = prefs.device_id.is_some(),
            "Resolved preferences"
        );

        self.state.send_replace(prefs.clone());
        prefs
    }

    async fn read_into(&self, prefs: &mut Preferences) -> Result<(), PersistenceReadError> {
        prefs.device_id = Some(self.ensure_device_id().await?);

        if self.store.get(keys::DISPLAY_INTRO).await?.as_deref() == Some(INTRO_SEEN) {
            prefs.intro_seen = true;
        }

        let selected = self
            .store
            .get(keys::SELECTED_CATEGORY)
            .await?
            .filter(|value| !value.is_empty());
        if let Some(value) = selected {
            match value.parse::<Category>() {
                Ok(category) => prefs.selected_category = Some(category),
                Err(e) => tracing::warn!(error = %e, "Ignoring persisted category"),
            }
        }

        Ok(())
    }

    /// Returns the persisted device id, generating one if none is stored.
    /// An existing value is never overwritten.
    async fn ensure_device_id(&self) -> Result<String, PersistenceReadError> {
        let existing = self
            .store
            .get(keys::DEVICE_ID)
            .await?
            .filter(|id| !id.is_empty());
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        if let Err(e) = self.store.set(keys::DEVICE_ID, &id).await {
            tracing::warn!(error = %e, "Failed to persist generated device id");
        }
        tracing::debug!(device_id = %id, "Generated device id");

        Ok(id)
    }

    /// Records that the intro has been shown.
    pub async fn mark_intro_seen(&self) {
        self.state.send_if_modified(|prefs| {
            let changed = !prefs.intro_seen;
            prefs.intro_seen = true;
            changed
        });

        if let Err(e) = self.store.set(keys::DISPLAY_INTRO, INTRO_SEEN).await {
            tracing::warn!(error = %e, "Failed to persist intro flag");
        }
    }

    /// Validates and applies a default category. The state change stands even
    /// if persisting it fails.
    pub async fn update_selected_category(&self, value: &str) -> Result<Category, CategoryError> {
        let category: Category = value.parse()?;

        self.state.send_if_modified(|prefs| {
            let changed = prefs.selected_category != Some(category);
            prefs.selected_category = Some(category);
            changed
        });

        if let Err(e) = self
            .store
            .set(keys::SELECTED_CATEGORY, category.as_str())
            .await
        {
            tracing::warn!(error = %e, "Failed to persist selected category");
        }

        Ok(category)
    }

    /// Chooses whether the capture flow opens on the category picker.
    pub async fn set_capture_default(&self, picker: bool) -> Result<(), PersistenceWriteError> {
        let value = if picker { CAPTURE_STARTS_WITH_PICKER } else { "NO" };
        self.store.set(keys::SELECT_CATEGORY, value).await
    }

    /// Initial screen of the capture flow. Falls back to the scanner when the
    /// flag is absent or unreadable.
    pub async fn resolve_capture_route(&self) -> Screen {
        match self.store.get(keys::SELECT_CATEGORY).await {
            Ok(Some(value)) if value == CAPTURE_STARTS_WITH_PICKER => Screen::ProductCategories,
            Ok(_) => Screen::BarCodeScanner,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read capture default, opening scanner");
                Screen::BarCodeScanner
            }
        }
    }
}

/// Read-only handle to the resolved preferences.
#[derive(Debug, Clone)]
pub struct PreferencesReader(watch::Receiver<Preferences>);

impl PreferencesReader {
    pub fn current(&self) -> Preferences {
        self.0.borrow().clone()
    }

    pub fn device_id(&self) -> Option<String> {
        self.0.borrow().device_id.clone()
    }

    pub fn selected_category(&self) -> Option<Category> {
        self.0.borrow().selected_category
    }

    pub fn intro_seen(&self) -> bool {
        self.0.borrow().intro_seen
    }

    /// Waits for the next change. Returns `false` once the resolver is gone.
    pub async fn changed(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}
