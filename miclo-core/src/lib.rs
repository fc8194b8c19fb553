//! Miclo Core Library
//!
//! Client-side state synchronization for the Miclo product catalogue: remote
//! collection stores, derived record views, refetch orchestration and
//! bootstrap preferences.

pub mod models;
pub mod orchestrator;
pub mod preferences;
pub mod remote;
pub mod screen;
pub mod session;
pub mod state;
pub mod store;
pub mod submit;
pub mod views;

#[cfg(test)]
mod testing;

pub use models::{
    AboutUs, Category, CategoryError, Faq, FavoriteMarker, InfoRecord, Product, ProductComparison,
    Version,
};
pub use orchestrator::{Phase, RefetchOrchestrator};
pub use preferences::{
    FilePreferenceStore, MemoryPreferenceStore, PersistenceReadError, PersistenceWriteError,
    PreferenceResolver, PreferenceStore, Preferences, PreferencesReader,
};
pub use remote::{Endpoint, Endpoints, FetchError, HttpRemote, RemoteSource, SubmissionError};
pub use screen::Screen;
pub use session::{Session, SessionOptions};
pub use state::AppState;
pub use store::{ApplyPolicy, RemoteCollectionStore, RemoteRecord, Snapshot, StoreReader};
pub use submit::{ProductDraft, ProductSubmission};
pub use views::{
    compute_record_views, favorite_ids, products_in_category, RecordItem, RecordTab, RecordViews,
    ViewCache, ViewKey,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
