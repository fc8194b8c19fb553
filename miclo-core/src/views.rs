//! Derived record views.
//!
//! Pure projections from the product, comparison and favorite collections
//! into render-ready lists. All three record projections are computed
//! together so switching tabs is only an index change.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::models::{Category, FavoriteMarker, Product, ProductComparison};

/// A product as listed on a records screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordItem {
    pub product: Product,
    /// Membership in the favorite set, independent of `product.favorite`.
    pub favorite: bool,
}

impl RecordItem {
    pub fn id(&self) -> &str {
        &self.product.id
    }
}

/// Tabs of the records screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordTab {
    /// Every product that entered the comparison flow.
    #[default]
    Products,
    /// Products with at least one live comparison.
    Comparisons,
    /// Favorited products.
    Saved,
}

impl RecordTab {
    pub const ALL: [RecordTab; 3] = [RecordTab::Products, RecordTab::Comparisons, RecordTab::Saved];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            RecordTab::Products => 0,
            RecordTab::Comparisons => 1,
            RecordTab::Saved => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RecordTab::Products => "Products",
            RecordTab::Comparisons => "Comparisons",
            RecordTab::Saved => "Saved",
        }
    }
}

impl fmt::Display for RecordTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for RecordTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| format!("Invalid tab index {}. Valid options: 0, 1, 2", index));
        }
        match s.to_lowercase().as_str() {
            "products" => Ok(RecordTab::Products),
            "comparisons" => Ok(RecordTab::Comparisons),
            "saved" | "favorites" => Ok(RecordTab::Saved),
            _ => Err(format!(
                "Invalid tab '{}'. Valid options: products, comparisons, saved",
                s
            )),
        }
    }
}

/// The three record projections, computed together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordViews {
    pub all_compared: Vec<RecordItem>,
    pub active_comparisons: Vec<RecordItem>,
    pub favorites: Vec<RecordItem>,
}

impl RecordViews {
    /// Items shown under `tab`.
    pub fn tab(&self, tab: RecordTab) -> &[RecordItem] {
        match tab {
            RecordTab::Products => &self.all_compared,
            RecordTab::Comparisons => &self.active_comparisons,
            RecordTab::Saved => &self.favorites,
        }
    }
}

/// Set of favorited product ids.
pub fn favorite_ids(markers: &[FavoriteMarker]) -> HashSet<String> {
    markers.iter().map(|m| m.product_id.clone()).collect()
}

/// Computes all record projections.
///
/// Comparison-driven projections follow the order of `comparisons`; a
/// comparison whose product is not in `products` is skipped. Favorites follow
/// the order of `products`. No secondary sort is applied.
pub fn compute_record_views(
    products: &[Product],
    comparisons: &[ProductComparison],
    favorite_ids: &HashSet<String>,
) -> RecordViews {
    let mut by_id: HashMap<&str, &Product> = HashMap::with_capacity(products.len());
    for product in products {
        // First record wins when ids repeat.
        by_id.entry(product.id.as_str()).or_insert(product);
    }

    let item = |product: &Product| RecordItem {
        favorite: favorite_ids.contains(&product.id),
        product: product.clone(),
    };

    let compared = |keep: fn(&ProductComparison) -> bool| -> Vec<RecordItem> {
        comparisons
            .iter()
            .filter(|c| keep(c))
            .filter_map(|c| by_id.get(c.product_id.as_str()).copied())
            .map(item)
            .collect()
    };

    RecordViews {
        all_compared: compared(ProductComparison::is_tracked),
        active_comparisons: compared(ProductComparison::is_active),
        favorites: products
            .iter()
            .filter(|p| favorite_ids.contains(&p.id))
            .map(item)
            .collect(),
    }
}

/// Products of `category` (all products when `None`), in collection order,
/// each flagged with its favorite status.
pub fn products_in_category(
    products: &[Product],
    favorite_ids: &HashSet<String>,
    category: Option<Category>,
) -> Vec<RecordItem> {
    products
        .iter()
        .filter(|p| category.is_none() || p.category == category)
        .map(|p| RecordItem {
            favorite: favorite_ids.contains(&p.id),
            product: p.clone(),
        })
        .collect()
}

/// Versions of the three inputs a [`RecordViews`] was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewKey {
    pub products: u64,
    pub comparisons: u64,
    pub favorites: u64,
}

/// Single-entry memo of [`compute_record_views`] keyed on input versions.
#[derive(Debug, Default)]
pub struct ViewCache {
    last: Mutex<Option<(ViewKey, Arc<RecordViews>)>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached views for `key`, computing them with `compute` on a
    /// miss.
    pub fn get_or_compute<F>(&self, key: ViewKey, compute: F) -> Arc<RecordViews>
    where
        F: FnOnce() -> RecordViews,
    {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_key, views)) = last.as_ref() {
            if *cached_key == key {
                return views.clone();
            }
        }

        let views = Arc::new(compute());
        *last = Some((key, views.clone()));
        views
    }
}
