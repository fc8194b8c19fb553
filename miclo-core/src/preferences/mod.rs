//! Persisted user preferences and the bootstrap that folds them into the
//! initial application state.

mod error;
mod resolver;
mod storage;

pub use error::{PersistenceReadError, PersistenceWriteError};
pub use resolver::{PreferenceResolver, Preferences, PreferencesReader};
pub use storage::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};

/// Keys of the persisted preference store.
pub mod keys {
    pub const DEVICE_ID: &str = "deviceId";
    pub const DISPLAY_INTRO: &str = "displayIntro";
    pub const SELECTED_CATEGORY: &str = "selectedCategory";
    pub const SELECT_CATEGORY: &str = "selectCategory";
}

/// Value of `displayIntro` once the intro has been shown.
pub const INTRO_SEEN: &str = "NO";

/// Value of `selectCategory` that opens the capture flow on the category
/// picker instead of the scanner.
pub const CAPTURE_STARTS_WITH_PICKER: &str = "YES";
